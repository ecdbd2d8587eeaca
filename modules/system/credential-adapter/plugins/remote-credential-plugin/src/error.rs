use thiserror::Error;

/// Errors raised while constructing the remote adapter.
#[derive(Debug, Error)]
pub enum RemotePluginError {
    #[error("invalid provider base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
