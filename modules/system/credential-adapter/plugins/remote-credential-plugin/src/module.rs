//! Remote credential plugin wiring.

use std::sync::Arc;

use credential_adapter_sdk::CredentialAdapter;
use tracing::info;

use crate::config::RemoteCredentialPluginConfig;
use crate::domain::Service;
use crate::error::RemotePluginError;

/// Remote credential plugin.
pub struct RemoteCredentialPlugin;

impl RemoteCredentialPlugin {
    /// Build the adapter from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider URL is invalid or the HTTP client
    /// cannot be built.
    pub fn init(
        cfg: &RemoteCredentialPluginConfig,
    ) -> Result<Arc<dyn CredentialAdapter>, RemotePluginError> {
        info!("Initializing remote_credential_plugin");

        let service = Service::from_config(cfg)?;

        info!(
            base_url = %cfg.base_url,
            refresh_margin_secs = cfg.refresh_margin_secs,
            request_timeout_ms = cfg.request_timeout_ms,
            "Remote credential plugin initialized"
        );
        Ok(Arc::new(service))
    }
}
