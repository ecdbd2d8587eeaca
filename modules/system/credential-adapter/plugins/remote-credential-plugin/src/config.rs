//! Configuration for the remote credential plugin.

use secrecy::SecretString;
use serde::{Deserialize, Serialize, Serializer};

fn default_refresh_margin_secs() -> u64 {
    60
}

fn default_request_timeout_ms() -> u64 {
    4000
}

fn redacted<T: ?Sized, S: Serializer>(_: &T, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str("[REDACTED]")
}

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteCredentialPluginConfig {
    /// Provider project URL, without the `/auth/v1` suffix.
    pub base_url: String,

    /// Public API key sent as the `apikey` header on every call.
    #[serde(serialize_with = "redacted")]
    pub api_key: SecretString,

    /// Access tokens expiring within this window are refreshed proactively.
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: u64,

    /// Per-request HTTP timeout. Keep it below the gate's validation timeout
    /// so that transport stalls surface as provider failures first.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl RemoteCredentialPluginConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: SecretString::from(api_key.into()),
            refresh_margin_secs: default_refresh_margin_secs(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}
