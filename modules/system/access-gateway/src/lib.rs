#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Access gateway for the Rio dashboard server.
//!
//! Two of the three enforcement layers live here:
//!
//! - [`edge`]: path-classified request interceptor (redirect or JSON 401)
//! - [`api_gate`]: per-handler requirement check with audit logging
//!
//! Both consult the injected [`credential_adapter_sdk::CredentialAdapter`]
//! independently and fail closed.

pub mod api_gate;
pub mod config;
pub mod cookies;
pub mod edge;
pub mod envelope;
pub mod middleware;
pub mod module;
pub mod route_policy;
pub mod validation;

pub use api_gate::{ApiGate, AuthContext, Authenticated, Denial, Grant};
pub use config::{CookieConfig, Environment, GatewayConfig};
pub use envelope::{ApiError, ApiResponse, ApiResult, ErrorCode};
pub use module::AccessGateway;
pub use route_policy::{RouteClass, RoutePolicy};
