#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Render guard for UI trees.
//!
//! Defense in depth only: the guard runs where the caller controls the
//! environment, so the edge and API gates stay the authoritative deciders.
//!
//! ```ignore
//! let guard = RenderGuard::mount(cache, sdk.subscribe(), navigator, GuardOptions::admin());
//! match guard.view() {
//!     View::Placeholder => render_spinner(),
//!     View::Content => render_dashboard(),
//!     View::LoginFallback => render_login_prompt(),
//!     View::InsufficientPrivilege => render_access_denied(),
//! }
//! ```

pub mod guard;
pub mod ports;
pub mod state;

pub use guard::{GuardOptions, RenderGuard};
pub use ports::{AuthEvent, Navigator, SessionCache, SessionCacheError};
pub use state::{GuardState, View};
