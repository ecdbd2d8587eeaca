//! Static credential plugin wiring.

use std::sync::Arc;

use credential_adapter_sdk::CredentialAdapter;
use tracing::info;

use crate::config::{BearerMode, StaticCredentialPluginConfig};
use crate::domain::Service;

/// Static credential plugin.
///
/// Provides token-to-identity and session mapping from configuration.
pub struct StaticCredentialPlugin;

impl StaticCredentialPlugin {
    /// Build the adapter from its configuration.
    #[must_use]
    pub fn init(cfg: &StaticCredentialPluginConfig) -> Arc<dyn CredentialAdapter> {
        info!("Initializing static_credential_plugin");

        if cfg.mode == BearerMode::AcceptAll {
            tracing::warn!(
                "Static credential plugin is running in `accept_all` mode: \
                 all bearer tokens will be accepted with a hardcoded identity. \
                 Do NOT use this mode in production."
            );
        }

        info!(
            mode = ?cfg.mode,
            token_count = cfg.tokens.len(),
            session_count = cfg.sessions.len(),
            session_ttl_secs = cfg.session_ttl_secs,
            refresh_grace_secs = cfg.refresh_grace_secs,
            "Loaded plugin configuration"
        );

        Arc::new(Service::from_config(cfg))
    }
}
