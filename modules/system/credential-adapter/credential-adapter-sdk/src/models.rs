//! Credential and session models.

use chrono::{DateTime, Utc};
use cookie::Cookie;
use http::HeaderMap;
use http::header::{AUTHORIZATION, COOKIE};
use rio_security::Identity;
use secrecy::{ExposeSecret, SecretString};

use crate::api::CredentialAdapter;
use crate::error::CredentialError;

/// Default cookie carrying the provider access token.
pub const DEFAULT_ACCESS_COOKIE: &str = "sb-access-token";
/// Default cookie carrying the provider refresh token.
pub const DEFAULT_REFRESH_COOKIE: &str = "sb-refresh-token";

/// Names of the two session cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieNames {
    pub access: String,
    pub refresh: String,
}

impl Default for CookieNames {
    fn default() -> Self {
        Self {
            access: DEFAULT_ACCESS_COOKIE.to_owned(),
            refresh: DEFAULT_REFRESH_COOKIE.to_owned(),
        }
    }
}

/// Provider-issued token pair read from request cookies.
///
/// Presence of a cookie says nothing about its validity.
#[derive(Debug, Clone, Default)]
pub struct SessionCookies {
    access_token: Option<SecretString>,
    refresh_token: Option<SecretString>,
}

impl SessionCookies {
    #[must_use]
    pub fn new(access_token: Option<&str>, refresh_token: Option<&str>) -> Self {
        Self {
            access_token: non_empty(access_token).map(|v| SecretString::from(v.to_owned())),
            refresh_token: non_empty(refresh_token).map(|v| SecretString::from(v.to_owned())),
        }
    }

    /// Read the session cookies from all `Cookie` headers of a request.
    ///
    /// Unparseable cookie pairs and empty values are ignored.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, names: &CookieNames) -> Self {
        let mut access = None;
        let mut refresh = None;

        for cookie in request_cookies(headers) {
            if cookie.name() == names.access {
                access = Some(cookie.value().to_owned());
            } else if cookie.name() == names.refresh {
                refresh = Some(cookie.value().to_owned());
            }
        }

        Self::new(access.as_deref(), refresh.as_deref())
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_ref().map(ExposeSecret::expose_secret)
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(ExposeSecret::expose_secret)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// New token pair produced by a transparent session refresh.
#[derive(Debug, Clone)]
pub struct RefreshedSession {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of a successful credential resolution.
#[derive(Debug, Clone)]
pub struct SessionResolution {
    pub identity: Identity,
    /// Set when the adapter refreshed the session; the caller must attach the
    /// new cookies to its response.
    pub refreshed: Option<RefreshedSession>,
}

impl SessionResolution {
    #[must_use]
    pub fn unchanged(identity: Identity) -> Self {
        Self {
            identity,
            refreshed: None,
        }
    }
}

/// Which credential path produced an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Bearer,
    Cookie,
    None,
}

impl CredentialKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bearer => "bearer",
            Self::Cookie => "cookie",
            Self::None => "none",
        }
    }
}

/// A credential presented by a request.
#[derive(Debug, Clone)]
pub enum Credential {
    /// `Authorization: Bearer <token>` header.
    Bearer(SecretString),
    /// Session cookie jar.
    Cookie(SessionCookies),
    /// Nothing usable was presented.
    None,
}

impl Credential {
    /// Pick the preferred credential of a request: bearer first, then cookies.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, names: &CookieNames) -> Self {
        Self::candidates(headers, names)
            .into_iter()
            .next()
            .unwrap_or(Self::None)
    }

    /// All credentials presented by a request, in precedence order.
    ///
    /// A malformed `Authorization` header is ignored rather than rejected so
    /// that the cookie path is still considered.
    #[must_use]
    pub fn candidates(headers: &HeaderMap, names: &CookieNames) -> Vec<Self> {
        let mut out = Vec::with_capacity(2);
        if let Some(token) = extract_bearer_token(headers) {
            out.push(Self::Bearer(SecretString::from(token.to_owned())));
        }
        let cookies = SessionCookies::from_headers(headers, names);
        if !cookies.is_empty() {
            out.push(Self::Cookie(cookies));
        }
        out
    }

    #[must_use]
    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::Bearer(_) => CredentialKind::Bearer,
            Self::Cookie(_) => CredentialKind::Cookie,
            Self::None => CredentialKind::None,
        }
    }

    /// Resolve this credential through its variant's adapter operation.
    ///
    /// # Errors
    ///
    /// `NoCredential` for [`Credential::None`] without calling the adapter,
    /// otherwise whatever the adapter returns.
    pub async fn resolve(
        &self,
        adapter: &dyn CredentialAdapter,
    ) -> Result<SessionResolution, CredentialError> {
        match self {
            Self::Bearer(token) => adapter
                .verify_bearer(token.expose_secret())
                .await
                .map(SessionResolution::unchanged),
            Self::Cookie(cookies) => adapter.resolve_session(cookies).await,
            Self::None => Err(CredentialError::NoCredential),
        }
    }
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
        .filter(|t| !t.is_empty())
}

fn request_cookies(headers: &HeaderMap) -> impl Iterator<Item = Cookie<'_>> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw))
        .filter_map(Result::ok)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
