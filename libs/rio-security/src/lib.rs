#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod decision;
pub mod denial;
pub mod identity;
pub mod role;

pub use decision::{AccessDecision, Requirement, decide};
pub use denial::{DenialReason, PublicOutcome};
pub use identity::{Identity, IdentityBuilder};
pub use role::{ADMIN_ROLE, RoleDecision, resolve_role};
