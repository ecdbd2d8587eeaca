//! Static route classification for the edge gate.

use crate::config::GatewayConfig;

/// Classification of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Served without authentication.
    Public,
    /// Static asset, never gated.
    StaticAsset,
    /// Authentication endpoint, never gated.
    AuthEndpoint,
    /// Requires a validated credential.
    Protected,
}

impl RouteClass {
    #[must_use]
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Protected)
    }
}

/// Immutable path classification table, built once at startup.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    public: Vec<String>,
    static_assets: Vec<String>,
    auth_paths: Vec<String>,
    api_prefix: String,
}

impl RoutePolicy {
    #[must_use]
    pub fn new(
        public: Vec<String>,
        static_assets: Vec<String>,
        auth_paths: Vec<String>,
        api_prefix: impl Into<String>,
    ) -> Self {
        Self {
            public: normalize_all(public),
            static_assets: normalize_all(static_assets),
            auth_paths: normalize_all(auth_paths),
            api_prefix: normalize(&api_prefix.into()),
        }
    }

    #[must_use]
    pub fn from_config(cfg: &GatewayConfig) -> Self {
        Self::new(
            cfg.public_paths.clone(),
            cfg.static_asset_paths.clone(),
            cfg.auth_paths.clone(),
            cfg.api_prefix.clone(),
        )
    }

    /// Classify `path`. Static assets and auth endpoints are checked before
    /// public routes; anything unmatched is protected.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        if matches_any(&self.static_assets, path) {
            RouteClass::StaticAsset
        } else if matches_any(&self.auth_paths, path) {
            RouteClass::AuthEndpoint
        } else if matches_any(&self.public, path) {
            RouteClass::Public
        } else {
            RouteClass::Protected
        }
    }

    /// Whether `path` is a programmatic API path (JSON denial) rather than a
    /// browser page (redirect on denial).
    #[must_use]
    pub fn is_api_path(&self, path: &str) -> bool {
        path_matches(&self.api_prefix, path)
    }
}

fn normalize_all(patterns: Vec<String>) -> Vec<String> {
    patterns.into_iter().map(|p| normalize(&p)).collect()
}

fn normalize(pattern: &str) -> String {
    let trimmed = pattern.trim();
    if trimmed.len() > 1 {
        trimmed.trim_end_matches('/').to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn matches_any(patterns: &[String], path: &str) -> bool {
    patterns.iter().any(|p| path_matches(p, path))
}

/// Exact match, or prefix match ending on a segment boundary.
///
/// `/` matches only `/`, so the login page never exposes the whole site, and
/// `/public` does not match `/publicity`.
fn path_matches(pattern: &str, path: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    if pattern == "/" {
        return path == "/";
    }
    path.strip_prefix(pattern)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn policy() -> RoutePolicy {
        RoutePolicy::from_config(&GatewayConfig::default())
    }

    #[test]
    fn root_matches_only_exactly() {
        let policy = policy();
        assert_eq!(policy.classify("/"), RouteClass::Public);
        assert_eq!(policy.classify("/rio/upload"), RouteClass::Protected);
        assert_eq!(policy.classify("/dashboard"), RouteClass::Protected);
    }

    #[test]
    fn prefix_match_respects_segment_boundaries() {
        let policy = RoutePolicy::new(vec!["/login".to_owned()], vec![], vec![], "/api");

        assert_eq!(policy.classify("/login"), RouteClass::Public);
        assert_eq!(policy.classify("/login/reset"), RouteClass::Public);
        assert_eq!(policy.classify("/loginx"), RouteClass::Protected);
        assert_eq!(policy.classify("/login-admin"), RouteClass::Protected);
    }

    #[test]
    fn trailing_slash_in_pattern_is_ignored() {
        let policy = RoutePolicy::new(vec!["/docs/".to_owned()], vec![], vec![], "/api/");

        assert_eq!(policy.classify("/docs"), RouteClass::Public);
        assert_eq!(policy.classify("/docs/intro"), RouteClass::Public);
        assert!(policy.is_api_path("/api/admin/mail-logs"));
    }

    #[test]
    fn static_assets_and_auth_endpoints_are_not_gated() {
        let policy = policy();

        assert_eq!(policy.classify("/_next/static/chunk.js"), RouteClass::StaticAsset);
        assert_eq!(policy.classify("/favicon.ico"), RouteClass::StaticAsset);
        assert_eq!(policy.classify("/auth/callback"), RouteClass::AuthEndpoint);
        assert!(!policy.classify("/auth/callback").requires_auth());
    }

    #[test]
    fn auth_endpoint_exclusion_does_not_leak_to_siblings() {
        let policy = policy();

        assert_eq!(policy.classify("/api/auth/callback"), RouteClass::AuthEndpoint);
        assert_eq!(policy.classify("/api/auth/me"), RouteClass::Protected);
    }

    #[test]
    fn api_paths_are_segment_exact() {
        let policy = policy();

        assert!(policy.is_api_path("/api"));
        assert!(policy.is_api_path("/api/admin/mail-logs"));
        assert!(!policy.is_api_path("/apiary"));
        assert!(!policy.is_api_path("/rio/upload"));
    }
}
