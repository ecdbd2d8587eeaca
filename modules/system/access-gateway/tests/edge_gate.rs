#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for the edge gate
//!
//! These tests verify that:
//! 1. Public, static and auth paths pass without any adapter call
//! 2. Denied page navigations redirect to the login path, API paths get a JSON 401
//! 3. Timeouts and adapter panics fail closed
//! 4. Refreshed sessions are written back to the request and the response

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use access_gateway::{AccessGateway, GatewayConfig};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use credential_adapter_sdk::{
    CredentialAdapter, CredentialError, RefreshedSession, SessionCookies, SessionResolution,
};
use rio_security::Identity;
use secrecy::SecretString;
use tower::ServiceExt;

/// Adapter with scripted credentials that counts every call.
#[derive(Default)]
struct CountingAdapter {
    calls: AtomicUsize,
}

impl CountingAdapter {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn viewer() -> Identity {
    Identity::builder()
        .email("viewer@rio.local")
        .roles(["viewer"])
        .build()
}

#[async_trait]
impl CredentialAdapter for CountingAdapter {
    async fn verify_bearer(&self, token: &str) -> Result<Identity, CredentialError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match token {
            "viewer-token" => Ok(viewer()),
            "hang-token" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(viewer())
            }
            "slow-reject-token" => {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Err(CredentialError::InvalidCredential("unknown".to_owned()))
            }
            _ => Err(CredentialError::InvalidCredential("unknown".to_owned())),
        }
    }

    async fn resolve_session(
        &self,
        cookies: &SessionCookies,
    ) -> Result<SessionResolution, CredentialError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match (cookies.access_token(), cookies.refresh_token()) {
            (Some("acc-live" | "acc-new"), _) => Ok(SessionResolution::unchanged(viewer())),
            (Some("acc-slow"), _) => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(SessionResolution::unchanged(viewer()))
            }
            (Some("acc-late"), _) => {
                tokio::time::sleep(Duration::from_millis(400)).await;
                Ok(SessionResolution::unchanged(viewer()))
            }
            (Some("acc-panic"), _) => panic!("adapter bug"),
            (_, Some("ref-1")) => Ok(SessionResolution {
                identity: viewer(),
                refreshed: Some(RefreshedSession {
                    access_token: SecretString::from("acc-new".to_owned()),
                    refresh_token: SecretString::from("ref-2".to_owned()),
                    expires_at: None,
                }),
            }),
            (Some("acc-expired"), None) => Err(CredentialError::Expired),
            _ => Err(CredentialError::InvalidCredential("unknown".to_owned())),
        }
    }
}

/// Fallback handler echoing the cookie header it received.
async fn echo_cookies(req: Request<Body>) -> String {
    req.headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_owned()
}

fn app(adapter: Arc<CountingAdapter>, cfg: GatewayConfig) -> Router {
    let gateway = AccessGateway::new(cfg, adapter).unwrap();
    gateway.build_router(Router::new().fallback(echo_cookies))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn public_paths_pass_without_adapter_call() {
    let adapter = Arc::new(CountingAdapter::default());
    let app = app(adapter.clone(), GatewayConfig::default());

    for uri in ["/", "/login", "/_next/static/app.js", "/favicon.ico", "/auth/callback", "/health"] {
        let res = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{uri}");
        assert!(res.headers().get("x-auth-status").is_none(), "{uri}");
    }
    assert_eq!(adapter.calls(), 0);
}

#[tokio::test]
async fn protected_page_without_credentials_redirects_to_login() {
    let adapter = Arc::new(CountingAdapter::default());
    let app = app(adapter.clone(), GatewayConfig::default());

    let res = app.oneshot(get("/rio/upload")).await.unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[header::LOCATION], "/");
    assert_eq!(adapter.calls(), 0, "no credential means no adapter call");
}

#[tokio::test]
async fn public_prefix_does_not_expose_siblings() {
    let adapter = Arc::new(CountingAdapter::default());
    let app = app(adapter, GatewayConfig::default());

    let res = app.oneshot(get("/loginx")).await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn protected_api_without_credentials_is_json_401() {
    let adapter = Arc::new(CountingAdapter::default());
    let app = app(adapter, GatewayConfig::default());

    let res = app.oneshot(get("/api/admin/mail-logs")).await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn custom_login_path_is_used_for_redirects() {
    let cfg = GatewayConfig {
        login_path: "/signin".to_owned(),
        public_paths: vec!["/signin".to_owned()],
        ..GatewayConfig::default()
    };
    let app = app(Arc::new(CountingAdapter::default()), cfg);

    let res = app.oneshot(get("/reports")).await.unwrap();
    assert_eq!(res.headers()[header::LOCATION], "/signin");
}

#[tokio::test]
async fn valid_session_is_forwarded_and_stamped() {
    let adapter = Arc::new(CountingAdapter::default());
    let app = app(adapter.clone(), GatewayConfig::default());

    let res = app
        .oneshot(get_with_cookie("/rio/upload", "sb-access-token=acc-live"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-auth-status"], "validated");
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(adapter.calls(), 1);
}

#[tokio::test]
async fn valid_bearer_passes_edge_on_api_paths() {
    let app = app(Arc::new(CountingAdapter::default()), GatewayConfig::default());

    let req = Request::builder()
        .uri("/api/reports")
        .header(header::AUTHORIZATION, "Bearer viewer-token")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-auth-status"], "validated");
}

#[tokio::test]
async fn expired_session_redirects_page_navigation() {
    let app = app(Arc::new(CountingAdapter::default()), GatewayConfig::default());

    let res = app
        .oneshot(get_with_cookie("/dashboard", "sb-access-token=acc-expired"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn slow_adapter_is_denied_after_timeout() {
    let cfg = GatewayConfig {
        validation_timeout_ms: 50,
        ..GatewayConfig::default()
    };
    let app = app(Arc::new(CountingAdapter::default()), cfg);

    let started = std::time::Instant::now();
    let res = app
        .oneshot(get_with_cookie("/api/reports", "sb-access-token=acc-slow"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(started.elapsed() < Duration::from_secs(2));
}

fn bearer_and_cookie(uri: &str, token: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn hanging_bearer_does_not_fall_back_to_late_cookie() {
    let cfg = GatewayConfig {
        validation_timeout_ms: 500,
        ..GatewayConfig::default()
    };
    let adapter = Arc::new(CountingAdapter::default());
    let app = app(adapter.clone(), cfg);

    let started = std::time::Instant::now();
    let res = app
        .oneshot(bearer_and_cookie(
            "/rio/upload",
            "hang-token",
            "sb-access-token=acc-late",
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert!(res.headers().get("x-auth-status").is_none());
    assert!(started.elapsed() < Duration::from_millis(900));
    assert_eq!(adapter.calls(), 1, "timed-out bearer ends validation");
}

#[tokio::test]
async fn validation_bound_covers_every_attempt() {
    let cfg = GatewayConfig {
        validation_timeout_ms: 500,
        ..GatewayConfig::default()
    };
    let app = app(Arc::new(CountingAdapter::default()), cfg);

    // 300ms bearer rejection plus a 400ms cookie lookup exceeds the bound.
    let res = app
        .oneshot(bearer_and_cookie(
            "/rio/upload",
            "slow-reject-token",
            "sb-access-token=acc-late",
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn adapter_panic_fails_closed() {
    let app = app(Arc::new(CountingAdapter::default()), GatewayConfig::default());

    let res = app
        .oneshot(get_with_cookie("/rio/upload", "sb-access-token=acc-panic"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn refreshed_session_is_propagated() {
    let app = app(Arc::new(CountingAdapter::default()), GatewayConfig::default());

    let res = app
        .oneshot(get_with_cookie(
            "/rio/upload",
            "theme=dark; sb-access-token=acc-old; sb-refresh-token=ref-1",
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let set_cookies: Vec<String> = res
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect();
    assert_eq!(set_cookies.len(), 2);
    assert!(set_cookies[0].starts_with("sb-access-token=acc-new"));
    assert!(set_cookies[0].contains("HttpOnly"));
    assert!(set_cookies[1].starts_with("sb-refresh-token=ref-2"));

    let forwarded = body_string(res).await;
    assert!(forwarded.contains("theme=dark"));
    assert!(forwarded.contains("sb-access-token=acc-new"));
    assert!(forwarded.contains("sb-refresh-token=ref-2"));
    assert!(!forwarded.contains("ref-1"));
}

#[tokio::test]
async fn repeated_validation_is_idempotent() {
    let app = app(Arc::new(CountingAdapter::default()), GatewayConfig::default());

    for _ in 0..3 {
        let res = app
            .clone()
            .oneshot(get_with_cookie("/rio/upload", "sb-access-token=acc-live"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["x-auth-status"], "validated");
    }
}

#[tokio::test]
async fn cors_preflight_is_forwarded_without_validation() {
    let adapter = Arc::new(CountingAdapter::default());
    let app = app(adapter.clone(), GatewayConfig::default());

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/admin/mail-logs")
        .header(header::ORIGIN, "https://rio.local")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(adapter.calls(), 0);
}

#[tokio::test]
async fn request_id_is_generated_and_echoed() {
    let app = app(Arc::new(CountingAdapter::default()), GatewayConfig::default());

    let res = app.clone().oneshot(get("/")).await.unwrap();
    assert!(res.headers().get("x-request-id").is_some());

    let req = Request::builder()
        .uri("/")
        .header("x-request-id", "fixed-req-1")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.headers()["x-request-id"], "fixed-req-1");
}
