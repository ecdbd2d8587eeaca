//! In-process mail log store for development and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::error::DomainError;
use crate::domain::model::{MailLog, MailStatus};
use crate::domain::repo::MailLogRepository;

#[derive(Default)]
pub struct InMemoryMailLogRepository {
    logs: RwLock<Vec<MailLog>>,
}

impl InMemoryMailLogRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_logs(logs: Vec<MailLog>) -> Self {
        Self {
            logs: RwLock::new(logs),
        }
    }
}

#[async_trait]
impl MailLogRepository for InMemoryMailLogRepository {
    async fn list(
        &self,
        status: Option<MailStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<MailLog>, u64), DomainError> {
        let mut matching: Vec<MailLog> = self
            .logs
            .read()
            .iter()
            .filter(|log| status.is_none_or(|s| log.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(skip).take(take).collect();

        Ok((items, total))
    }

    async fn insert(&self, log: MailLog) -> Result<(), DomainError> {
        self.logs.write().push(log);
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut logs = self.logs.write();
        let before = logs.len();
        logs.retain(|log| log.created_at >= cutoff);
        Ok(u64::try_from(before - logs.len()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;

    fn log(status: MailStatus, created_at: DateTime<Utc>) -> MailLog {
        MailLog {
            id: Uuid::new_v4(),
            recipient: "ops@rio.local".to_owned(),
            subject: "weekly".to_owned(),
            status,
            error: None,
            created_at,
        }
    }

    #[tokio::test]
    async fn lists_newest_first_with_filter() {
        let now = Utc::now();
        let repo = InMemoryMailLogRepository::new();
        repo.insert(log(MailStatus::Failed, now - Duration::hours(2)))
            .await
            .unwrap();
        repo.insert(log(MailStatus::Sent, now - Duration::hours(1)))
            .await
            .unwrap();
        repo.insert(log(MailStatus::Failed, now)).await.unwrap();

        let (items, total) = repo.list(Some(MailStatus::Failed), 0, 10).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(items[0].created_at, now);
        assert!(items.iter().all(|l| l.status == MailStatus::Failed));

        let (items, total) = repo.list(None, 1, 1).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, MailStatus::Sent);
    }
}
