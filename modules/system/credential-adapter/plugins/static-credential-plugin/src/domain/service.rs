//! Service implementation for the static credential plugin.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use credential_adapter_sdk::{CredentialError, RefreshedSession, SessionCookies, SessionResolution};
use parking_lot::Mutex;
use rio_security::Identity;
use secrecy::SecretString;
use uuid::Uuid;

use crate::config::{BearerMode, IdentityConfig, StaticCredentialPluginConfig};

#[derive(Debug, Clone)]
struct SessionEntry {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
    identity: IdentityConfig,
    /// Refresh token replaced by the last rotation and when it was replaced.
    rotated_out: Option<(String, DateTime<Utc>)>,
}

impl SessionEntry {
    fn refreshed(&self) -> RefreshedSession {
        RefreshedSession {
            access_token: SecretString::from(self.access_token.clone()),
            refresh_token: SecretString::from(self.refresh_token.clone()),
            expires_at: Some(self.expires_at),
        }
    }

    fn in_grace(&self, refresh: &str, now: DateTime<Utc>, grace: Duration) -> bool {
        self.rotated_out
            .as_ref()
            .is_some_and(|(token, at)| token == refresh && now < *at + grace)
    }
}

/// Static credential service.
///
/// Provides token-to-identity mapping based on configuration mode:
/// - `accept_all`: Any non-empty token maps to the default identity
/// - `static_tokens`: Specific tokens map to specific identities
///
/// Session access tokens are also valid bearer tokens while they are live,
/// mirroring a provider whose cookie session wraps the same access token.
pub struct Service {
    mode: BearerMode,
    default_identity: IdentityConfig,
    token_map: HashMap<String, IdentityConfig>,
    sessions: Mutex<Vec<SessionEntry>>,
    session_ttl: Duration,
    refresh_grace: Duration,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticCredentialPluginConfig) -> Self {
        let token_map: HashMap<String, IdentityConfig> = cfg
            .tokens
            .iter()
            .map(|m| (m.token.clone(), m.identity.clone()))
            .collect();

        let sessions = cfg
            .sessions
            .iter()
            .map(|s| SessionEntry {
                access_token: s.access_token.clone(),
                refresh_token: s.refresh_token.clone(),
                expires_at: s.expires_at,
                identity: s.identity.clone(),
                rotated_out: None,
            })
            .collect();

        Self {
            mode: cfg.mode,
            default_identity: cfg.default_identity.clone(),
            token_map,
            sessions: Mutex::new(sessions),
            session_ttl: seconds(cfg.session_ttl_secs),
            refresh_grace: seconds(cfg.refresh_grace_secs),
        }
    }

    /// Verify a bearer token and return the identity.
    ///
    /// Returns `None` if the token is empty or not recognized.
    #[must_use]
    pub fn verify_bearer(&self, bearer_token: &str, now: DateTime<Utc>) -> Option<Identity> {
        if bearer_token.is_empty() {
            return None;
        }

        if let Some(identity) = self.live_session_identity(bearer_token, now) {
            return Some(identity);
        }

        let identity = match self.mode {
            BearerMode::AcceptAll => &self.default_identity,
            BearerMode::StaticTokens => self.token_map.get(bearer_token)?,
        };

        Some(identity.to_identity(None))
    }

    /// Resolve a cookie session at `now`, rotating the token pair when the
    /// access token is stale or missing and a known refresh token is present.
    ///
    /// Refresh tokens are single-use. A token rotated out less than
    /// `refresh_grace_secs` ago is answered with the current pair instead of
    /// rotating again, so parallel requests sharing stale cookies agree.
    ///
    /// # Errors
    ///
    /// - `NoCredential` when no cookie is present
    /// - `Expired` when a known access token is stale and cannot be refreshed
    /// - `InvalidCredential` when neither token is known
    pub fn resolve_session(
        &self,
        cookies: &SessionCookies,
        now: DateTime<Utc>,
    ) -> Result<SessionResolution, CredentialError> {
        if cookies.is_empty() {
            return Err(CredentialError::NoCredential);
        }

        let mut sessions = self.sessions.lock();
        let mut stale = false;

        if let Some(access) = cookies.access_token()
            && let Some(entry) = sessions.iter().find(|s| s.access_token == access)
        {
            if entry.expires_at > now {
                return Ok(SessionResolution::unchanged(
                    entry.identity.to_identity(Some(entry.expires_at)),
                ));
            }
            stale = true;
        }

        if let Some(refresh) = cookies.refresh_token() {
            if let Some(entry) = sessions.iter_mut().find(|s| s.refresh_token == refresh) {
                let previous =
                    std::mem::replace(&mut entry.refresh_token, Uuid::new_v4().to_string());
                entry.access_token = Uuid::new_v4().to_string();
                entry.expires_at = now + self.session_ttl;
                entry.rotated_out = Some((previous, now));

                tracing::debug!(email = %entry.identity.email, "Rotated static session");

                return Ok(SessionResolution {
                    identity: entry.identity.to_identity(Some(entry.expires_at)),
                    refreshed: Some(entry.refreshed()),
                });
            }

            if let Some(entry) = sessions
                .iter()
                .find(|s| s.in_grace(refresh, now, self.refresh_grace))
            {
                tracing::debug!(
                    email = %entry.identity.email,
                    "Refresh token replayed within grace window"
                );

                return Ok(SessionResolution {
                    identity: entry.identity.to_identity(Some(entry.expires_at)),
                    refreshed: Some(entry.refreshed()),
                });
            }
        }

        if stale {
            Err(CredentialError::Expired)
        } else {
            Err(CredentialError::InvalidCredential(
                "unknown session".to_owned(),
            ))
        }
    }

    fn live_session_identity(&self, access_token: &str, now: DateTime<Utc>) -> Option<Identity> {
        self.sessions
            .lock()
            .iter()
            .find(|s| s.access_token == access_token && s.expires_at > now)
            .map(|s| s.identity.to_identity(Some(s.expires_at)))
    }
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
}
