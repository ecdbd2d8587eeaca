#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Dashboard API: the caller's own identity and the admin-only mail log
//! views. Every route is mounted behind the API gate.

pub mod api;
pub mod domain;
pub mod infra;
pub mod module;

pub use domain::model::{MailLog, MailStatus, Page};
pub use domain::repo::MailLogRepository;
pub use domain::service::{Service, ServiceConfig};
pub use infra::memory_repo::InMemoryMailLogRepository;
pub use module::Dashboard;
