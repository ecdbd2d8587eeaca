//! Server configuration.
//!
//! Sources, later ones win: built-in defaults, the YAML file given with
//! `--config`, then `RIO__`-prefixed environment variables with `__` as the
//! nesting separator (`RIO__GATEWAY__BIND_ADDR=0.0.0.0:8080`).

use std::path::Path;

use access_gateway::{Environment, GatewayConfig};
use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use remote_credential_plugin::RemoteCredentialPluginConfig;
use serde::{Deserialize, Serialize};
use static_credential_plugin::config::StaticCredentialPluginConfig;

pub const ENV_PREFIX: &str = "RIO__";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub logging: LoggingConfig,
    pub credential_provider: CredentialProviderConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` overrides it.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Identity provider backing the credential adapter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CredentialProviderConfig {
    Static(StaticCredentialPluginConfig),
    Remote(RemoteCredentialPluginConfig),
}

impl Default for CredentialProviderConfig {
    fn default() -> Self {
        Self::Static(StaticCredentialPluginConfig::default())
    }
}

impl AppConfig {
    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist, a source cannot be parsed,
    /// or the merged configuration is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            anyhow::ensure!(
                path.exists(),
                "Configuration file not found: {}",
                path.display()
            );
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Self = figment
            .extract()
            .context("Failed to extract configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        let gw = &self.gateway;

        anyhow::ensure!(
            gw.login_path.starts_with('/'),
            "gateway.login_path must be an absolute path, got '{}'",
            gw.login_path
        );
        anyhow::ensure!(
            gw.api_prefix.starts_with('/'),
            "gateway.api_prefix must be an absolute path, got '{}'",
            gw.api_prefix
        );
        anyhow::ensure!(
            gw.validation_timeout_ms > 0,
            "gateway.validation_timeout_ms must be positive"
        );
        anyhow::ensure!(
            gw.request_timeout_secs > 0,
            "gateway.request_timeout_secs must be positive"
        );

        if gw.environment == Environment::Production
            && matches!(self.credential_provider, CredentialProviderConfig::Static(_))
        {
            anyhow::bail!("the static credential provider cannot be used in production");
        }
        Ok(())
    }
}
