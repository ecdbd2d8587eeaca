//! Edge gate: the request interceptor evaluated before any handler.
//!
//! Per request: `CLASSIFY -> (PUBLIC: ALLOW) | (PROTECTED: VALIDATE -> ALLOW | DENY)`.
//!
//! - Public, static-asset and auth-endpoint paths are forwarded without any
//!   adapter call.
//! - Protected paths are validated with a bounded adapter call. Uncertainty
//!   (timeout, panic, provider failure) is a denial.
//! - Denied API paths get a JSON 401 envelope; denied page paths get a 302 to
//!   the login path.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::header::{ACCESS_CONTROL_REQUEST_METHOD, LOCATION, ORIGIN};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use credential_adapter_sdk::{Credential, CredentialAdapter};
use tracing::{debug, info};

use crate::cookies::SessionCookieWriter;
use crate::envelope::ApiError;
use crate::route_policy::{RouteClass, RoutePolicy};
use crate::validation::resolve_first;

/// Diagnostic header stamped on allowed protected responses.
pub const AUTH_STATUS_HEADER: HeaderName = HeaderName::from_static("x-auth-status");

/// Shared state of the edge gate middleware.
#[derive(Clone)]
pub struct EdgeGateState {
    adapter: Arc<dyn CredentialAdapter>,
    policy: Arc<RoutePolicy>,
    cookies: Arc<SessionCookieWriter>,
    timeout: Duration,
    login_location: HeaderValue,
}

impl EdgeGateState {
    /// # Errors
    ///
    /// Returns an error if `login_path` is not a valid `Location` value.
    pub fn new(
        adapter: Arc<dyn CredentialAdapter>,
        policy: Arc<RoutePolicy>,
        cookies: Arc<SessionCookieWriter>,
        timeout: Duration,
        login_path: &str,
    ) -> anyhow::Result<Self> {
        let login_location = HeaderValue::from_str(login_path)
            .map_err(|e| anyhow::anyhow!("Invalid login path '{login_path}': {e}"))?;
        Ok(Self {
            adapter,
            policy,
            cookies,
            timeout,
            login_location,
        })
    }

    fn deny(&self, path: &str) -> Response {
        if self.policy.is_api_path(path) {
            ApiError::unauthorized().into_response()
        } else {
            (
                StatusCode::FOUND,
                [(LOCATION, self.login_location.clone())],
            )
                .into_response()
        }
    }
}

/// Edge gate middleware.
///
/// For each request:
/// 1. Skips CORS preflight requests
/// 2. Classifies the path; anything not protected is forwarded untouched
/// 3. Resolves the presented credential (bearer, then cookie session)
/// 4. On success forwards the request with refreshed cookies applied and
///    stamps `X-Auth-Status: validated`; otherwise denies
pub async fn edge_gate_middleware(
    State(state): State<EdgeGateState>,
    mut req: Request,
    next: Next,
) -> Response {
    if is_preflight_request(req.method(), req.headers()) {
        return next.run(req).await;
    }

    let path = req.uri().path().to_owned();
    let class = state.policy.classify(&path);
    if !class.requires_auth() {
        if class != RouteClass::StaticAsset {
            debug!(path = %path, class = ?class, "edge gate: pass-through");
        }
        return next.run(req).await;
    }

    let candidates = Credential::candidates(req.headers(), state.cookies.names());
    let resolved = match resolve_first(state.adapter.as_ref(), candidates, state.timeout).await {
        Ok(resolved) => resolved,
        Err(reason) => {
            info!(path = %path, reason = %reason, "edge gate: deny");
            return state.deny(&path);
        }
    };

    debug!(
        path = %path,
        via = resolved.via.as_str(),
        email = resolved.resolution.identity.email(),
        refreshed = resolved.resolution.refreshed.is_some(),
        "edge gate: allow"
    );

    let refreshed = resolved.resolution.refreshed;
    if let Some(refreshed) = &refreshed {
        state.cookies.rewrite_request(req.headers_mut(), refreshed);
    }

    let mut response = next.run(req).await;
    if let Some(refreshed) = &refreshed {
        state
            .cookies
            .append_set_cookies(response.headers_mut(), refreshed);
    }
    response
        .headers_mut()
        .insert(AUTH_STATUS_HEADER, HeaderValue::from_static("validated"));
    response
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(ORIGIN)
        && headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}
