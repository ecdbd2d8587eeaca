//! Bounded, fail-closed credential resolution shared by the gate layers.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::Utc;
use credential_adapter_sdk::{Credential, CredentialAdapter, CredentialKind, SessionResolution};
use futures::FutureExt;
use rio_security::DenialReason;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Identity resolved from one of the presented credentials.
#[derive(Debug)]
pub struct Resolved {
    pub via: CredentialKind,
    pub resolution: SessionResolution,
}

/// Resolve one credential against the adapter, racing it against `timeout`.
///
/// The adapter is never called for [`Credential::None`]. A call that does not
/// settle in time, panics, or returns an identity already past its expiry is
/// a denial; the losing call is dropped without retry.
///
/// # Errors
///
/// The [`DenialReason`] of the failed resolution.
pub async fn resolve_bounded(
    adapter: &dyn CredentialAdapter,
    credential: &Credential,
    timeout: Duration,
) -> Result<SessionResolution, DenialReason> {
    if matches!(credential, Credential::None) {
        return Err(DenialReason::NoCredential);
    }
    let via = credential.kind().as_str();

    let call = AssertUnwindSafe(credential.resolve(adapter)).catch_unwind();
    let resolution = match tokio::time::timeout(timeout, call).await {
        Err(_) => {
            warn!(via, timeout_ms = timeout.as_millis(), "Credential validation timed out");
            return Err(DenialReason::Timeout);
        }
        Ok(Err(_)) => {
            error!(via, "Credential adapter panicked during validation");
            return Err(DenialReason::ProviderUnavailable);
        }
        Ok(Ok(Err(e))) => {
            debug!(via, error = %e, "Credential rejected");
            return Err(e.denial_reason());
        }
        Ok(Ok(Ok(resolution))) => resolution,
    };

    if resolution.refreshed.is_none() && resolution.identity.is_expired_at(Utc::now()) {
        debug!(via, "Adapter returned an identity past its expiry");
        return Err(DenialReason::Expired);
    }
    Ok(resolution)
}

/// Try every presented credential in precedence order (bearer, then cookie)
/// and return the first that resolves.
///
/// `timeout` bounds the whole validation, not each attempt: a fallback only
/// gets the time left by the attempts before it. An attempt that runs out of
/// time ends the validation with `Timeout` instead of falling back.
///
/// # Errors
///
/// `NoCredential` when nothing was presented, `Timeout` when the bound
/// elapsed, otherwise the reason of the last failed attempt.
pub async fn resolve_first(
    adapter: &dyn CredentialAdapter,
    candidates: Vec<Credential>,
    timeout: Duration,
) -> Result<Resolved, DenialReason> {
    let deadline = Instant::now() + timeout;
    let mut last = DenialReason::NoCredential;
    for credential in candidates {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            warn!(timeout_ms = timeout.as_millis(), "Validation bound elapsed before fallback");
            return Err(DenialReason::Timeout);
        }
        match resolve_bounded(adapter, &credential, remaining).await {
            Ok(resolution) => {
                return Ok(Resolved {
                    via: credential.kind(),
                    resolution,
                });
            }
            Err(DenialReason::Timeout) => return Err(DenialReason::Timeout),
            Err(reason) => last = reason,
        }
    }
    Err(last)
}
