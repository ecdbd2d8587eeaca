use std::sync::Arc;

use access_gateway::{ApiResponse, ApiResult, Authenticated};
use axum::Extension;
use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use chrono::Utc;

use super::dto::{CleanupDto, CleanupQuery, ListMailLogsQuery, MeDto};
use crate::domain::model::{MailLog, Page};
use crate::domain::service::Service;

/// `GET /api/auth/me`
pub async fn me(Authenticated(ctx): Authenticated) -> ApiResponse<MeDto> {
    ApiResponse::ok(MeDto {
        id: ctx.identity.id(),
        email: ctx.identity.email().to_owned(),
        is_admin: ctx.role.is_admin,
    })
}

/// `GET /api/admin/mail-logs?status=&page=&page_size=`
///
/// # Errors
///
/// `BAD_REQUEST` for an unparsable query or out-of-range paging.
pub async fn list_mail_logs(
    Extension(svc): Extension<Arc<Service>>,
    query: Result<Query<ListMailLogsQuery>, QueryRejection>,
) -> ApiResult<Page<MailLog>> {
    let Query(query) = query?;
    let page = svc.list_mail_logs(query.into()).await?;
    Ok(ApiResponse::ok(page))
}

/// `DELETE /api/admin/mail-logs?older_than_days=`
///
/// # Errors
///
/// `BAD_REQUEST` for an unparsable query or a retention below one day.
pub async fn cleanup_mail_logs(
    Authenticated(ctx): Authenticated,
    Extension(svc): Extension<Arc<Service>>,
    query: Result<Query<CleanupQuery>, QueryRejection>,
) -> ApiResult<CleanupDto> {
    let Query(query) = query?;
    let deleted = svc.cleanup(query.older_than_days, Utc::now()).await?;

    tracing::info!(
        target: "audit",
        email = ctx.identity.email(),
        deleted,
        "mail log cleanup"
    );
    Ok(ApiResponse::ok(CleanupDto { deleted }).with_message(format!("Deleted {deleted} mail logs")))
}
