mod config;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use access_gateway::AccessGateway;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use credential_adapter_sdk::CredentialAdapter;
use dashboard::{Dashboard, InMemoryMailLogRepository, ServiceConfig};
use remote_credential_plugin::RemoteCredentialPlugin;
use static_credential_plugin::StaticCredentialPlugin;
use tokio_util::sync::CancellationToken;

use crate::config::{AppConfig, CredentialProviderConfig};

#[derive(Debug, Parser)]
#[command(name = "rio-server", version, about = "Rio dashboard server")]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the effective configuration (secrets redacted) and exit.
    #[arg(long)]
    print_config: bool,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    logging::init(&config.logging, cli.verbose)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting rio-server");

    run(config).await
}

async fn run(config: AppConfig) -> Result<()> {
    let adapter = build_adapter(&config.credential_provider)?;
    let gateway = AccessGateway::new(config.gateway, adapter)?;

    let dashboard = Dashboard::new(
        Arc::new(InMemoryMailLogRepository::new()),
        ServiceConfig::default(),
    );
    let router = gateway.build_router(dashboard.router(&gateway.api_gate()));

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    gateway.serve(router, cancel).await?;
    tracing::info!("rio-server stopped");
    Ok(())
}

/// The adapter is built once here and handed to every gate.
fn build_adapter(cfg: &CredentialProviderConfig) -> Result<Arc<dyn CredentialAdapter>> {
    match cfg {
        CredentialProviderConfig::Static(c) => Ok(StaticCredentialPlugin::init(c)),
        CredentialProviderConfig::Remote(c) => {
            RemoteCredentialPlugin::init(c).context("Failed to initialize remote credential plugin")
        }
    }
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C; graceful shutdown disabled");
        return;
    }
    tracing::info!("Ctrl-C received, shutting down");
    cancel.cancel();
}
