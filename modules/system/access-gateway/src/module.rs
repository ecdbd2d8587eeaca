//! Access gateway assembly: owns the gate configuration and the adapter
//! handle, builds the middleware stack and serves the router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::{Json, Router};
use credential_adapter_sdk::CredentialAdapter;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;

use crate::api_gate::ApiGate;
use crate::config::{Environment, GatewayConfig};
use crate::cookies::SessionCookieWriter;
use crate::edge::{EdgeGateState, edge_gate_middleware};
use crate::middleware;
use crate::route_policy::RoutePolicy;

/// Main access gateway. Owns the HTTP server and the two server-side gates.
///
/// The adapter is injected by the hosting binary; the gateway never builds
/// one itself.
pub struct AccessGateway {
    config: GatewayConfig,
    edge: EdgeGateState,
    api_gate: ApiGate,
}

impl AccessGateway {
    /// # Errors
    ///
    /// Returns an error if the configured login path is not a valid
    /// `Location` header value.
    pub fn new(config: GatewayConfig, adapter: Arc<dyn CredentialAdapter>) -> Result<Self> {
        let policy = Arc::new(RoutePolicy::from_config(&config));
        let cookies = Arc::new(SessionCookieWriter::from_config(&config));
        let timeout = Duration::from_millis(config.validation_timeout_ms);

        let edge = EdgeGateState::new(
            Arc::clone(&adapter),
            policy,
            Arc::clone(&cookies),
            timeout,
            &config.login_path,
        )?;
        let api_gate = ApiGate::new(adapter, cookies, timeout);

        if config.environment == Environment::Development {
            tracing::warn!("Access gateway runs in development mode: session cookies are not Secure");
        }
        tracing::info!(
            login_path = %config.login_path,
            api_prefix = %config.api_prefix,
            validation_timeout_ms = config.validation_timeout_ms,
            public_paths = config.public_paths.len(),
            static_asset_paths = config.static_asset_paths.len(),
            auth_paths = config.auth_paths.len(),
            "Access gateway configured"
        );

        Ok(Self {
            config,
            edge,
            api_gate,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Handle used by API modules to guard their handlers.
    #[must_use]
    pub fn api_gate(&self) -> ApiGate {
        self.api_gate.clone()
    }

    /// Add the built-in health endpoint and wrap `routes` in the middleware
    /// stack.
    #[must_use]
    pub fn build_router(&self, routes: Router) -> Router {
        let router = routes.route("/health", get(health_check));
        self.apply_middleware_stack(router)
    }

    /// Apply all middleware layers to a router.
    ///
    /// `Router::layer` wraps: the last layer added runs first. Request order
    /// (outermost to innermost):
    /// `SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
    /// -> Timeout -> EdgeGate -> (route layers: ApiGate) -> handler`
    #[must_use]
    pub fn apply_middleware_stack(&self, mut router: Router) -> Router {
        // 5) Edge gate
        router = router.layer(from_fn_with_state(self.edge.clone(), edge_gate_middleware));

        // 4) Timeout
        router = router.layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(self.config.request_timeout_secs),
        ));

        // 3) Record request_id into span + extensions (must be inner to Trace)
        router = router.layer(from_fn(middleware::request_id::push_req_id_to_extensions));

        // 2) Trace
        router = router.layer({
            use tower_http::trace::TraceLayer;
            use tracing::field::Empty;

            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<axum::body::Body>| {
                    let rid = req
                        .headers()
                        .get(middleware::request_id::header())
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("n/a");

                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        version = ?req.version(),
                        request_id = %rid,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<axum::body::Body>,
                     latency: Duration,
                     span: &tracing::Span| {
                        span.record("status", res.status().as_u16());
                        span.record("latency_ms", latency.as_millis());
                    },
                )
        });

        // 1) Request ID handling
        let x_request_id = middleware::request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(
            x_request_id,
            middleware::request_id::MakeReqId,
        ));

        router
    }

    fn parse_bind_address(bind_addr: &str) -> Result<SocketAddr> {
        bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{bind_addr}': {e}"))
    }

    /// Bind and serve `router` until `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the bind address is invalid, the socket cannot be
    /// bound, or the server fails.
    pub async fn serve(&self, router: Router, cancel: CancellationToken) -> Result<()> {
        let addr = Self::parse_bind_address(&self.config.bind_addr)?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "HTTP server bound");

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn bind_address_must_be_a_socket_address() {
        assert!(AccessGateway::parse_bind_address("127.0.0.1:8080").is_ok());
        assert!(AccessGateway::parse_bind_address("localhost").is_err());
    }
}
