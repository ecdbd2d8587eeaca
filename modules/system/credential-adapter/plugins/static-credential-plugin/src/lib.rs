#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Credential Plugin
//!
//! In-process stand-in for the managed identity provider, for development
//! and testing.
//!
//! ## Bearer modes
//!
//! - **`accept_all`** (default): Accepts any non-empty bearer token and returns the
//!   configured default identity.
//!
//! - **`static_tokens`**: Maps specific tokens to specific identities. Useful for E2E tests
//!   with distinct users.
//!
//! ## Sessions
//!
//! Cookie sessions come from the `sessions` table. An expired access token is
//! transparently rotated when its refresh token is presented; refresh tokens
//! are single use.
//!
//! ## Configuration
//!
//! ```yaml
//! credential_provider:
//!   kind: static
//!   mode: static_tokens
//!   session_ttl_secs: 3600
//!   refresh_grace_secs: 10
//!   tokens:
//!     - token: "dev-admin"
//!       identity:
//!         id: "11111111-6a88-4768-9dfc-6bcd5187d9ed"
//!         email: "admin@rio.local"
//!         roles: ["admin"]
//!   sessions:
//!     - access_token: "acc-1"
//!       refresh_token: "ref-1"
//!       expires_at: "2030-01-01T00:00:00Z"
//!       identity:
//!         email: "viewer@rio.local"
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use module::StaticCredentialPlugin;
