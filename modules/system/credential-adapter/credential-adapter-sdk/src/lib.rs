//! Credential Adapter SDK
//!
//! This crate provides the contract between the gate layers and the external
//! identity provider:
//!
//! - [`CredentialAdapter`] - Adapter trait implemented by provider plugins
//! - [`Credential`] - Tagged credential dispatch (`Bearer | Cookie | None`)
//! - [`SessionCookies`], [`SessionResolution`], [`RefreshedSession`] - Cookie session models
//! - [`CredentialError`] - Error types
//!
//! ## Usage
//!
//! The hosting runtime constructs one adapter at startup and hands an
//! `Arc<dyn CredentialAdapter>` to every enforcement layer:
//!
//! ```ignore
//! use credential_adapter_sdk::{Credential, CookieNames};
//!
//! let credential = Credential::from_headers(req.headers(), &CookieNames::default());
//! let resolution = credential.resolve(adapter.as_ref()).await?;
//! let identity = resolution.identity;
//! ```

pub mod api;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::CredentialAdapter;
pub use error::CredentialError;
pub use models::{
    CookieNames, Credential, CredentialKind, RefreshedSession, SessionCookies, SessionResolution,
};
