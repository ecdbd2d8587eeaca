//! Configuration for the static credential plugin.

use chrono::{DateTime, Utc};
use rio_security::Identity;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Well-known subject used by `accept_all` mode.
pub const DEFAULT_SUBJECT_ID: Uuid = Uuid::from_u128(0x1111_1111_6a88_4768_9dfc_6bcd_5187_d9ed);

fn redacted<T: ?Sized, S: Serializer>(_: &T, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str("[REDACTED]")
}

fn default_session_ttl_secs() -> u64 {
    3600
}

fn default_refresh_grace_secs() -> u64 {
    10
}

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticCredentialPluginConfig {
    /// Bearer authentication mode.
    pub mode: BearerMode,

    /// Default identity returned in `accept_all` mode.
    pub default_identity: IdentityConfig,

    /// Static token-to-identity mappings for `static_tokens` mode.
    pub tokens: Vec<TokenMapping>,

    /// Cookie sessions known to the plugin.
    pub sessions: Vec<SessionMapping>,

    /// Lifetime of access tokens issued by a refresh.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// How long a rotated-out refresh token still yields the current pair,
    /// so concurrent requests carrying the same stale cookies all converge.
    /// Zero makes refresh tokens strictly single-use.
    #[serde(default = "default_refresh_grace_secs")]
    pub refresh_grace_secs: u64,
}

impl Default for StaticCredentialPluginConfig {
    fn default() -> Self {
        Self {
            mode: BearerMode::AcceptAll,
            default_identity: IdentityConfig::default(),
            tokens: Vec::new(),
            sessions: Vec::new(),
            session_ttl_secs: default_session_ttl_secs(),
            refresh_grace_secs: default_refresh_grace_secs(),
        }
    }
}

/// Bearer authentication mode.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BearerMode {
    /// Accept any non-empty token and return the default identity.
    #[default]
    AcceptAll,
    /// Map specific tokens to specific identities.
    StaticTokens,
}

/// Identity configuration for a subject.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    pub id: Uuid,
    pub email: String,
    /// Role list stored under `metadata.roles`.
    pub roles: Vec<String>,
    /// Legacy admin flag stored under `metadata.is_admin`.
    pub is_admin: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_SUBJECT_ID,
            email: "dev@rio.local".to_owned(),
            roles: Vec::new(),
            is_admin: false,
        }
    }
}

impl IdentityConfig {
    /// Build the normalized identity, stamped with the backing expiry.
    #[must_use]
    pub fn to_identity(&self, expires_at: Option<DateTime<Utc>>) -> Identity {
        let mut metadata = Map::new();
        metadata.insert(
            "roles".to_owned(),
            Value::Array(self.roles.iter().cloned().map(Value::String).collect()),
        );
        if self.is_admin {
            metadata.insert("is_admin".to_owned(), Value::Bool(true));
        }

        let builder = Identity::builder()
            .id(self.id)
            .email(self.email.clone())
            .metadata(metadata);
        match expires_at {
            Some(exp) => builder.expires_at(exp).build(),
            None => builder.build(),
        }
    }
}

/// Maps a static token to a specific identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TokenMapping {
    /// The bearer token value to match.
    #[serde(serialize_with = "redacted")]
    pub token: String,
    /// The identity to return when this token is presented.
    pub identity: IdentityConfig,
}

/// A cookie session known to the plugin.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionMapping {
    #[serde(serialize_with = "redacted")]
    pub access_token: String,
    #[serde(serialize_with = "redacted")]
    pub refresh_token: String,
    /// Expiry of `access_token`.
    pub expires_at: DateTime<Utc>,
    pub identity: IdentityConfig,
}
