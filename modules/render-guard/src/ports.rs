//! Seams to the identity provider's client SDK and the host application.

use async_trait::async_trait;
use rio_security::Identity;
use thiserror::Error;

/// Auth state transitions published by the client SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("session cache unavailable: {0}")]
pub struct SessionCacheError(pub String);

/// SDK-local session store. Reading it never makes a server round trip.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// The identity of the locally cached session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store cannot be read.
    async fn current_session(&self) -> Result<Option<Identity>, SessionCacheError>;
}

/// Client-side navigation without a full page reload.
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}
