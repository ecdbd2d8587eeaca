//! Role resolution from identity metadata.
//!
//! Two conventions exist side by side: a `roles` list containing `"admin"`
//! and a boolean `is_admin` flag. Either one is sufficient on its own.

use serde_json::Value;

use crate::identity::Identity;

/// Role name granting administrative access.
pub const ADMIN_ROLE: &str = "admin";

const ROLES_KEY: &str = "roles";
const ADMIN_FLAG_KEY: &str = "is_admin";

/// Derived role classification of an identity. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct RoleDecision {
    pub is_admin: bool,
}

/// Resolve the role of `identity`.
///
/// Total: missing or malformed metadata yields a non-admin decision.
#[must_use]
pub fn resolve_role(identity: &Identity) -> RoleDecision {
    let metadata = identity.metadata();

    let in_role_list = match metadata.get(ROLES_KEY) {
        Some(Value::Array(roles)) => roles.iter().any(|r| r.as_str() == Some(ADMIN_ROLE)),
        Some(Value::String(role)) => role == ADMIN_ROLE,
        _ => false,
    };
    let flagged = matches!(metadata.get(ADMIN_FLAG_KEY), Some(Value::Bool(true)));

    RoleDecision {
        is_admin: in_role_list || flagged,
    }
}
