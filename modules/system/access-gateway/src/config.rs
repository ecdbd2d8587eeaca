use credential_adapter_sdk::CookieNames;
use credential_adapter_sdk::models::{DEFAULT_ACCESS_COOKIE, DEFAULT_REFRESH_COOKIE};
use serde::{Deserialize, Serialize};

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_owned()
}

fn default_login_path() -> String {
    "/".to_owned()
}

fn default_validation_timeout_ms() -> u64 {
    5000
}

fn default_api_prefix() -> String {
    "/api".to_owned()
}

fn default_public_paths() -> Vec<String> {
    vec!["/".to_owned(), "/login".to_owned(), "/health".to_owned()]
}

fn default_static_asset_paths() -> Vec<String> {
    vec![
        "/_next".to_owned(),
        "/static".to_owned(),
        "/assets".to_owned(),
        "/favicon.ico".to_owned(),
    ]
}

fn default_auth_paths() -> Vec<String> {
    vec!["/auth".to_owned(), "/api/auth/callback".to_owned()]
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_cookie_max_age_secs() -> i64 {
    60 * 60 * 24 * 7
}

/// Deployment environment. Production forces `Secure` on written cookies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Access gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct GatewayConfig {
    pub bind_addr: String,

    pub environment: Environment,

    /// Where denied browser navigations are redirected.
    pub login_path: String,

    /// Upper bound for one credential validation call.
    pub validation_timeout_ms: u64,

    /// Paths under this prefix are API paths: denial is a JSON 401 instead
    /// of a redirect.
    pub api_prefix: String,

    /// Paths served without authentication. `/` matches only itself; every
    /// other entry matches itself and its sub-paths.
    pub public_paths: Vec<String>,

    /// Static asset prefixes, never gated.
    pub static_asset_paths: Vec<String>,

    /// Auth endpoints (login callbacks and the like), never gated.
    pub auth_paths: Vec<String>,

    /// Whole-request timeout applied outside the gates.
    pub request_timeout_secs: u64,

    pub cookies: CookieConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            environment: Environment::default(),
            login_path: default_login_path(),
            validation_timeout_ms: default_validation_timeout_ms(),
            api_prefix: default_api_prefix(),
            public_paths: default_public_paths(),
            static_asset_paths: default_static_asset_paths(),
            auth_paths: default_auth_paths(),
            request_timeout_secs: default_request_timeout_secs(),
            cookies: CookieConfig::default(),
        }
    }
}

/// Session cookie settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct CookieConfig {
    pub access_cookie: String,
    pub refresh_cookie: String,
    /// `Max-Age` of refreshed cookies, in seconds.
    pub max_age_secs: i64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_cookie: DEFAULT_ACCESS_COOKIE.to_owned(),
            refresh_cookie: DEFAULT_REFRESH_COOKIE.to_owned(),
            max_age_secs: default_cookie_max_age_secs(),
        }
    }
}

impl CookieConfig {
    #[must_use]
    pub fn names(&self) -> CookieNames {
        CookieNames {
            access: self.access_cookie.clone(),
            refresh: self.refresh_cookie.clone(),
        }
    }
}
