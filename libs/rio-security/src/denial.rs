//! Denial taxonomy shared by every enforcement layer.

use std::fmt;

/// Internal reason an access check failed.
///
/// The fine-grained reason is only ever logged. Callers see the collapsed
/// [`PublicOutcome`] so that the specific failing check is not leaked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialReason {
    /// No token or cookie was presented.
    NoCredential,
    /// Malformed or provider-rejected token/session.
    InvalidCredential,
    /// Session past its expiry.
    Expired,
    /// The provider call did not settle within the configured bound.
    Timeout,
    /// Valid identity with insufficient role.
    Forbidden,
    /// Unexpected adapter failure.
    ProviderUnavailable,
}

impl DenialReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoCredential => "NO_CREDENTIAL",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::Expired => "EXPIRED",
            Self::Timeout => "TIMEOUT",
            Self::Forbidden => "FORBIDDEN",
            Self::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
        }
    }

    /// Externally visible outcome. Everything except `Forbidden` collapses to
    /// `Unauthorized`.
    #[must_use]
    pub fn outcome(self) -> PublicOutcome {
        match self {
            Self::Forbidden => PublicOutcome::Forbidden,
            Self::NoCredential
            | Self::InvalidCredential
            | Self::Expired
            | Self::Timeout
            | Self::ProviderUnavailable => PublicOutcome::Unauthorized,
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller is allowed to learn about a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicOutcome {
    Unauthorized,
    Forbidden,
}

impl PublicOutcome {
    /// Stable error code used in API envelopes.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
        }
    }

    /// HTTP status matching the outcome.
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
        }
    }
}
