//! HTTP calls against the provider's auth API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use credential_adapter_sdk::{CredentialError, RefreshedSession, SessionCookies, SessionResolution};
use reqwest::{Client, StatusCode, Url};
use rio_security::Identity;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::config::RemoteCredentialPluginConfig;
use crate::error::RemotePluginError;
use crate::jwt;
use crate::wire::{RefreshRequest, TokenResponse, UserResponse};

const USER_PATH: &str = "auth/v1/user";
const TOKEN_PATH: &str = "auth/v1/token";

/// Remote credential service.
///
/// Holds one pooled HTTP client; safe for concurrent use.
pub struct Service {
    http: Client,
    base_url: Url,
    api_key: SecretString,
    refresh_margin: chrono::Duration,
}

impl Service {
    /// Build the service from plugin configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL or the HTTP
    /// client cannot be constructed.
    pub fn from_config(cfg: &RemoteCredentialPluginConfig) -> Result<Self, RemotePluginError> {
        let mut raw = cfg.base_url.trim_end_matches('/').to_owned();
        raw.push('/');
        let base_url = Url::parse(&raw).map_err(|e| RemotePluginError::InvalidBaseUrl {
            url: cfg.base_url.clone(),
            reason: e.to_string(),
        })?;

        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: cfg.api_key.clone(),
            refresh_margin: chrono::Duration::seconds(
                i64::try_from(cfg.refresh_margin_secs).unwrap_or(i64::MAX),
            ),
        })
    }

    /// Verify an access token against the user endpoint.
    ///
    /// # Errors
    ///
    /// `InvalidCredential` when the provider rejects the token,
    /// `ProviderUnavailable` on transport errors or unexpected responses.
    pub async fn fetch_user(&self, access_token: &str) -> Result<Identity, CredentialError> {
        let url = self.endpoint(USER_PATH)?;
        let response = self
            .http
            .get(url)
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| unavailable(&e))?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(CredentialError::InvalidCredential(format!(
                "provider rejected access token ({status})"
            )));
        }
        if !status.is_success() {
            warn!(%status, "Unexpected status from provider user endpoint");
            return Err(CredentialError::ProviderUnavailable(format!(
                "user endpoint returned {status}"
            )));
        }

        let user: UserResponse = response.json().await.map_err(|e| unavailable(&e))?;
        Ok(user.into_identity(jwt::expiry(access_token)))
    }

    /// Exchange a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// `Expired` when the provider refuses the refresh token,
    /// `ProviderUnavailable` on transport errors or unexpected responses.
    pub async fn refresh(&self, refresh_token: &str) -> Result<SessionResolution, CredentialError> {
        let mut url = self.endpoint(TOKEN_PATH)?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");

        let response = self
            .http
            .post(url)
            .header("apikey", self.api_key.expose_secret())
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| unavailable(&e))?;

        let status = response.status();
        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) {
            debug!(%status, "Provider refused refresh token");
            return Err(CredentialError::Expired);
        }
        if !status.is_success() {
            warn!(%status, "Unexpected status from provider token endpoint");
            return Err(CredentialError::ProviderUnavailable(format!(
                "token endpoint returned {status}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| unavailable(&e))?;
        let expires_at = token.expiry(Utc::now());
        debug!(user_id = %token.user.id, "Refreshed provider session");

        let TokenResponse {
            access_token,
            refresh_token,
            user,
            ..
        } = token;
        Ok(SessionResolution {
            identity: user.into_identity(expires_at),
            refreshed: Some(RefreshedSession {
                access_token: SecretString::from(access_token),
                refresh_token: SecretString::from(refresh_token),
                expires_at,
            }),
        })
    }

    /// Resolve a cookie session, refreshing it when the access token is
    /// near expiry, past expiry, or rejected.
    ///
    /// # Errors
    ///
    /// See [`credential_adapter_sdk::CredentialAdapter::resolve_session`].
    pub async fn resolve_session(
        &self,
        cookies: &SessionCookies,
        now: DateTime<Utc>,
    ) -> Result<SessionResolution, CredentialError> {
        if cookies.is_empty() {
            return Err(CredentialError::NoCredential);
        }
        let refresh_token = cookies.refresh_token();

        if let Some(access) = cookies.access_token() {
            let expiry = jwt::expiry(access);
            let expired = expiry.is_some_and(|exp| exp <= now);
            let near_expiry = expiry.is_some_and(|exp| exp <= now + self.refresh_margin);

            if expired && refresh_token.is_none() {
                return Err(CredentialError::Expired);
            }

            if !near_expiry || refresh_token.is_none() {
                match self.fetch_user(access).await {
                    Ok(identity) => return Ok(SessionResolution::unchanged(identity)),
                    Err(CredentialError::InvalidCredential(_)) if refresh_token.is_some() => {
                        debug!("Access token rejected, attempting refresh");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        match refresh_token {
            Some(refresh) => self.refresh(refresh).await,
            None => Err(CredentialError::NoCredential),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, CredentialError> {
        self.base_url
            .join(path)
            .map_err(|e| CredentialError::ProviderUnavailable(e.to_string()))
    }
}

fn unavailable(e: &reqwest::Error) -> CredentialError {
    warn!(error = %e, "Identity provider call failed");
    CredentialError::ProviderUnavailable(e.to_string())
}
