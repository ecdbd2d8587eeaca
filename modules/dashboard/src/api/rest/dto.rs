use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::model::MailStatus;
use crate::domain::service::ListRequest;

#[derive(Debug, Clone, Serialize)]
pub struct MeDto {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListMailLogsQuery {
    pub status: Option<MailStatus>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<ListMailLogsQuery> for ListRequest {
    fn from(q: ListMailLogsQuery) -> Self {
        Self {
            status: q.status,
            page: q.page,
            page_size: q.page_size,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleanupQuery {
    pub older_than_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupDto {
    pub deleted: u64,
}
