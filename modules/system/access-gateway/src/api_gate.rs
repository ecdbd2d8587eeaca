//! API gate: per-handler authentication and role enforcement.
//!
//! Handlers declare a [`Requirement`] through [`ApiGate::protect`]. The gate
//! resolves the caller (bearer token first, then cookie session), applies the
//! role requirement, logs an audit record for every decision and hands the
//! resolved [`AuthContext`] to the handler.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use credential_adapter_sdk::{Credential, CredentialAdapter, CredentialKind, RefreshedSession};
use rio_security::{AccessDecision, DenialReason, Identity, Requirement, RoleDecision, decide};

use crate::cookies::SessionCookieWriter;
use crate::envelope::ApiError;
use crate::validation::resolve_first;

/// Caller resolved by the API gate, available to handlers through the
/// request extensions or the [`Authenticated`] extractor.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
    pub role: RoleDecision,
    pub via: CredentialKind,
}

/// Successful gate decision.
#[derive(Debug, Clone)]
pub struct Grant {
    pub context: AuthContext,
    /// Set when the cookie session was refreshed during validation.
    pub refreshed: Option<RefreshedSession>,
}

/// Failed gate decision.
#[derive(Debug, Clone)]
pub struct Denial {
    pub reason: DenialReason,
    /// Email of the caller when the credential was valid but the role was not.
    pub email: Option<String>,
    /// Session refreshed before the role check failed. The rotated pair must
    /// still reach the client.
    pub refreshed: Option<RefreshedSession>,
}

impl From<DenialReason> for Denial {
    fn from(reason: DenialReason) -> Self {
        Self {
            reason,
            email: None,
            refreshed: None,
        }
    }
}

struct Inner {
    adapter: Arc<dyn CredentialAdapter>,
    cookies: Arc<SessionCookieWriter>,
    timeout: Duration,
}

/// Shared API gate handle. Cheap to clone.
#[derive(Clone)]
pub struct ApiGate {
    inner: Arc<Inner>,
}

impl ApiGate {
    #[must_use]
    pub fn new(
        adapter: Arc<dyn CredentialAdapter>,
        cookies: Arc<SessionCookieWriter>,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                adapter,
                cookies,
                timeout,
            }),
        }
    }

    /// Resolve the caller of a request from its headers.
    ///
    /// # Errors
    ///
    /// The internal denial reason when no presented credential resolves.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Grant, DenialReason> {
        let candidates = Credential::candidates(headers, self.inner.cookies.names());
        let resolved = resolve_first(self.inner.adapter.as_ref(), candidates, self.inner.timeout)
            .await?;

        let identity = resolved.resolution.identity;
        let role = rio_security::resolve_role(&identity);
        Ok(Grant {
            context: AuthContext {
                identity,
                role,
                via: resolved.via,
            },
            refreshed: resolved.resolution.refreshed,
        })
    }

    /// Authenticate the caller and apply `requirement`.
    ///
    /// # Errors
    ///
    /// A [`Denial`]: `Forbidden` (with the caller's email) for a valid
    /// identity lacking the required role, any other reason otherwise.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        requirement: Requirement,
    ) -> Result<Grant, Denial> {
        let Grant {
            context: AuthContext { identity, via, .. },
            refreshed,
        } = self.authenticate(headers).await?;
        let email = identity.email().to_owned();

        match decide(identity, requirement) {
            AccessDecision::Allow { identity, role } => Ok(Grant {
                context: AuthContext { identity, role, via },
                refreshed,
            }),
            AccessDecision::Deny(reason) => Err(Denial {
                reason,
                email: Some(email),
                refreshed,
            }),
        }
    }

    /// Guard every route of `router` with `requirement`.
    ///
    /// The guard is a route layer: unmatched paths still yield 404 rather
    /// than an authentication error.
    #[must_use]
    pub fn protect<S>(&self, router: Router<S>, requirement: Requirement) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.route_layer(from_fn_with_state(
            GuardState {
                gate: self.clone(),
                requirement,
            },
            api_gate_middleware,
        ))
    }
}

#[derive(Clone)]
struct GuardState {
    gate: ApiGate,
    requirement: Requirement,
}

async fn api_gate_middleware(
    State(guard): State<GuardState>,
    mut req: Request,
    next: Next,
) -> Response {
    let route = req.uri().path().to_owned();
    let method = req.method().clone();
    let requirement = guard.requirement;

    match guard.gate.authorize(req.headers(), requirement).await {
        Ok(grant) => {
            tracing::info!(
                target: "audit",
                route = %route,
                method = %method,
                email = grant.context.identity.email(),
                outcome = "allow",
                requirement = requirement.as_str(),
                via = grant.context.via.as_str(),
                "api gate decision"
            );

            if let Some(refreshed) = &grant.refreshed {
                guard
                    .gate
                    .inner
                    .cookies
                    .rewrite_request(req.headers_mut(), refreshed);
            }
            req.extensions_mut().insert(grant.context);

            let mut response = next.run(req).await;
            if let Some(refreshed) = &grant.refreshed {
                guard
                    .gate
                    .inner
                    .cookies
                    .append_set_cookies(response.headers_mut(), refreshed);
            }
            response
        }
        Err(denial) => {
            tracing::info!(
                target: "audit",
                route = %route,
                method = %method,
                email = denial.email.as_deref().unwrap_or("-"),
                outcome = "deny",
                requirement = requirement.as_str(),
                reason = denial.reason.as_str(),
                "api gate decision"
            );
            let mut response = ApiError::from_denial(denial.reason).into_response();
            if let Some(refreshed) = &denial.refreshed {
                guard
                    .gate
                    .inner
                    .cookies
                    .append_set_cookies(response.headers_mut(), refreshed);
            }
            response
        }
    }
}

/// Extractor for the caller resolved by the API gate.
///
/// Rejects with 401 when the handler is reached without passing the gate,
/// so a route mounted without [`ApiGate::protect`] fails closed.
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthContext);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Self)
            .ok_or_else(ApiError::unauthorized)
    }
}
