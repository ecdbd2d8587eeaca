//! The single access predicate applied by every enforcement layer.

use std::fmt;

use crate::denial::DenialReason;
use crate::identity::Identity;
use crate::role::{RoleDecision, resolve_role};

/// Requirement declared by a guarded route, handler or UI tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Requirement {
    /// Any authenticated identity.
    #[default]
    AuthRequired,
    /// Authenticated identity with the admin role.
    AdminRequired,
}

impl Requirement {
    #[must_use]
    pub fn admits(self, role: RoleDecision) -> bool {
        match self {
            Self::AuthRequired => true,
            Self::AdminRequired => role.is_admin,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::AdminRequired => "ADMIN_REQUIRED",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    Allow {
        identity: Identity,
        role: RoleDecision,
    },
    Deny(DenialReason),
}

impl AccessDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }
}

/// Apply `requirement` to a resolved identity.
#[must_use]
pub fn decide(identity: Identity, requirement: Requirement) -> AccessDecision {
    let role = resolve_role(&identity);
    if requirement.admits(role) {
        AccessDecision::Allow { identity, role }
    } else {
        AccessDecision::Deny(DenialReason::Forbidden)
    }
}
