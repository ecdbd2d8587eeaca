//! Client implementation for the remote credential plugin.

use async_trait::async_trait;
use chrono::Utc;
use credential_adapter_sdk::{
    CredentialAdapter, CredentialError, SessionCookies, SessionResolution,
};
use rio_security::Identity;

use super::service::Service;

#[async_trait]
impl CredentialAdapter for Service {
    async fn verify_bearer(&self, token: &str) -> Result<Identity, CredentialError> {
        if token.is_empty() {
            return Err(CredentialError::InvalidCredential("empty token".to_owned()));
        }
        self.fetch_user(token).await
    }

    async fn resolve_session(
        &self,
        cookies: &SessionCookies,
    ) -> Result<SessionResolution, CredentialError> {
        self.resolve_session(cookies, Utc::now()).await
    }
}
