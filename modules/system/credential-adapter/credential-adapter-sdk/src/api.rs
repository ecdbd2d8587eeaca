//! Adapter trait for the external identity provider.
//!
//! Implementations are thin: they call the provider and map its responses to
//! a normalized [`Identity`]. They hold no validation cache; every call
//! re-verifies against the provider.

use async_trait::async_trait;
use rio_security::Identity;

use crate::error::CredentialError;
use crate::models::{SessionCookies, SessionResolution};

/// Credential adapter trait.
///
/// Both operations are network calls with unbounded latency. Callers impose
/// their own timeouts; implementations must not retry.
///
/// ```ignore
/// let adapter: Arc<dyn CredentialAdapter> = Arc::new(RemoteCredentialAdapter::new(cfg)?);
///
/// let identity = adapter.verify_bearer("eyJhbGciOi...").await?;
/// let session = adapter.resolve_session(&cookies).await?;
/// ```
#[async_trait]
pub trait CredentialAdapter: Send + Sync {
    /// Verify a bearer access token and return the identity it belongs to.
    ///
    /// # Arguments
    ///
    /// * `token` - The raw token string (without the "Bearer " prefix)
    ///
    /// # Errors
    ///
    /// - `InvalidCredential` if the token is malformed or rejected
    /// - `ProviderUnavailable` for transport or unexpected provider failures
    async fn verify_bearer(&self, token: &str) -> Result<Identity, CredentialError>;

    /// Read the cookie session, refreshing it when it is near expiry.
    ///
    /// When a refresh happens the new token pair is returned in
    /// [`SessionResolution::refreshed`]; the caller must write it back onto its
    /// own response.
    ///
    /// # Errors
    ///
    /// - `NoCredential` if neither session cookie is present
    /// - `Expired` if the session can no longer be refreshed
    /// - `InvalidCredential` if the session is malformed or rejected
    /// - `ProviderUnavailable` for transport or unexpected provider failures
    async fn resolve_session(
        &self,
        cookies: &SessionCookies,
    ) -> Result<SessionResolution, CredentialError>;
}
