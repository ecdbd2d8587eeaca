//! Error types for the credential adapter.

use rio_security::DenialReason;
use thiserror::Error;

/// Errors returned by a [`CredentialAdapter`](crate::CredentialAdapter).
///
/// "Nothing presented" and "presented but bad" are distinct variants because
/// some callers pass silently through the former and deny on the latter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// No token or session cookie was presented.
    #[error("no credential presented")]
    NoCredential,

    /// The token or session is malformed or was rejected by the provider.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The session is past its expiry and could not be refreshed.
    #[error("session expired")]
    Expired,

    /// Transport failure or unexpected provider response.
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl CredentialError {
    #[must_use]
    pub fn denial_reason(&self) -> DenialReason {
        match self {
            Self::NoCredential => DenialReason::NoCredential,
            Self::InvalidCredential(_) => DenialReason::InvalidCredential,
            Self::Expired => DenialReason::Expired,
            Self::ProviderUnavailable(_) => DenialReason::ProviderUnavailable,
        }
    }
}

impl From<&CredentialError> for DenialReason {
    fn from(e: &CredentialError) -> Self {
        e.denial_reason()
    }
}
