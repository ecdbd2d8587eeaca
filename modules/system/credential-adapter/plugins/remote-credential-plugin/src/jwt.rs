//! Unverified reading of access token claims.
//!
//! Only the `exp` claim is read, to decide whether a session needs a refresh
//! before it is sent to the provider. Signature checks stay with the provider.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Expiry of a JWT access token, or `None` when the token is opaque or
/// carries no `exp` claim.
#[must_use]
pub fn expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn token(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn reads_exp_claim() {
        let exp = expiry(&token(r#"{"sub":"u1","exp":1900000000}"#)).unwrap();
        assert_eq!(exp.timestamp(), 1_900_000_000);
    }

    #[test]
    fn opaque_or_claimless_tokens_have_no_expiry() {
        assert!(expiry("opaque-token").is_none());
        assert!(expiry("a.!!!.c").is_none());
        assert!(expiry(&token(r#"{"sub":"u1"}"#)).is_none());
    }
}
