#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Remote Credential Plugin
//!
//! Credential adapter that talks to the managed identity provider over its
//! REST auth API:
//!
//! - `GET {base_url}/auth/v1/user` verifies an access token
//! - `POST {base_url}/auth/v1/token?grant_type=refresh_token` rotates a session
//!
//! Every call goes to the provider; nothing is cached between calls.
//!
//! ## Configuration
//!
//! ```yaml
//! credential_provider:
//!   kind: remote
//!   base_url: "https://project.supabase.co"
//!   api_key: "anon-key"
//!   refresh_margin_secs: 60
//!   request_timeout_ms: 4000
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod module;

mod jwt;
mod wire;

pub use config::RemoteCredentialPluginConfig;
pub use error::RemotePluginError;
pub use module::RemoteCredentialPlugin;
