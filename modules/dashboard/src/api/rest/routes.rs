use std::sync::Arc;

use access_gateway::ApiGate;
use axum::routing::get;
use axum::{Extension, Router};
use rio_security::Requirement;

use super::handlers;
use crate::domain::service::Service;

pub const ME_PATH: &str = "/api/auth/me";
pub const MAIL_LOGS_PATH: &str = "/api/admin/mail-logs";

/// Dashboard routes, each behind the API gate with its requirement.
#[must_use]
pub fn router(service: Arc<Service>, gate: &ApiGate) -> Router {
    let user = Router::new().route(ME_PATH, get(handlers::me));

    let admin = Router::new().route(
        MAIL_LOGS_PATH,
        get(handlers::list_mail_logs).delete(handlers::cleanup_mail_logs),
    );

    gate.protect(user, Requirement::AuthRequired)
        .merge(gate.protect(admin, Requirement::AdminRequired))
        .layer(Extension(service))
}
