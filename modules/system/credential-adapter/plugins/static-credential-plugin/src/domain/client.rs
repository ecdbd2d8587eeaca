//! Client implementation for the static credential plugin.
//!
//! Implements `CredentialAdapter` using the domain service.

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
        self.verify_bearer(token, Utc::now())
            .ok_or_else(|| CredentialError::InvalidCredential("invalid token".to_owned()))
    }

    async fn resolve_session(
        &self,
        cookies: &SessionCookies,
    ) -> Result<SessionResolution, CredentialError> {
        self.resolve_session(cookies, Utc::now())
    }
}
