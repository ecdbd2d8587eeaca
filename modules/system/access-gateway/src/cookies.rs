//! Writing refreshed session cookies back onto requests and responses.

use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};
use credential_adapter_sdk::{CookieNames, RefreshedSession};
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;

use crate::config::{Environment, GatewayConfig};

/// Renders the session cookie pair with the gateway's cookie policy:
/// `HttpOnly`, `SameSite=Lax`, `Path=/`, `Secure` in production.
#[derive(Debug, Clone)]
pub struct SessionCookieWriter {
    names: CookieNames,
    secure: bool,
    max_age: CookieDuration,
}

impl SessionCookieWriter {
    #[must_use]
    pub fn new(names: CookieNames, secure: bool, max_age_secs: i64) -> Self {
        Self {
            names,
            secure,
            max_age: CookieDuration::seconds(max_age_secs),
        }
    }

    #[must_use]
    pub fn from_config(cfg: &GatewayConfig) -> Self {
        Self::new(
            cfg.cookies.names(),
            cfg.environment == Environment::Production,
            cfg.cookies.max_age_secs,
        )
    }

    #[must_use]
    pub fn names(&self) -> &CookieNames {
        &self.names
    }

    /// `Set-Cookie` header values for a refreshed session, access cookie first.
    ///
    /// A token that cannot be carried in a header is skipped; the client then
    /// keeps its previous cookie and revalidates on the next request.
    #[must_use]
    pub fn set_cookie_values(&self, refreshed: &RefreshedSession) -> Vec<HeaderValue> {
        [
            (&self.names.access, refreshed.access_token.expose_secret()),
            (&self.names.refresh, refreshed.refresh_token.expose_secret()),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            let cookie = Cookie::build((name.as_str(), value))
                .http_only(true)
                .same_site(SameSite::Lax)
                .path("/")
                .secure(self.secure)
                .max_age(self.max_age)
                .build();
            let rendered = HeaderValue::from_str(&cookie.to_string());
            if rendered.is_err() {
                tracing::warn!(cookie = %name, "Refreshed token is not a valid header value");
            }
            rendered.ok()
        })
        .collect()
    }

    /// Append the refreshed session's `Set-Cookie` headers to a response.
    pub fn append_set_cookies(&self, headers: &mut HeaderMap, refreshed: &RefreshedSession) {
        for value in self.set_cookie_values(refreshed) {
            headers.append(SET_COOKIE, value);
        }
    }

    /// Replace the session cookies of an in-flight request with the refreshed
    /// pair so that inner layers never replay a consumed refresh token.
    /// Unrelated cookies are kept.
    pub fn rewrite_request(&self, headers: &mut HeaderMap, refreshed: &RefreshedSession) {
        let mut pairs: Vec<String> = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .filter(|c| c.name() != self.names.access && c.name() != self.names.refresh)
            .map(|c| c.stripped().to_string())
            .collect();
        pairs.push(
            Cookie::new(self.names.access.as_str(), refreshed.access_token.expose_secret())
                .stripped()
                .to_string(),
        );
        pairs.push(
            Cookie::new(self.names.refresh.as_str(), refreshed.refresh_token.expose_secret())
                .stripped()
                .to_string(),
        );

        match HeaderValue::from_str(&pairs.join("; ")) {
            Ok(value) => {
                headers.remove(COOKIE);
                headers.insert(COOKIE, value);
            }
            Err(_) => tracing::warn!("Refreshed session cookies are not a valid header value"),
        }
    }
}
