use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::error::DomainError;
use super::model::{MailLog, MailStatus, Page};
use super::repo::MailLogRepository;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub default_retention_days: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            default_retention_days: 30,
        }
    }
}

/// Listing request as received from the caller. Missing values take the
/// configured defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListRequest {
    pub status: Option<MailStatus>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub struct Service {
    repo: Arc<dyn MailLogRepository>,
    config: ServiceConfig,
}

impl Service {
    #[must_use]
    pub fn new(repo: Arc<dyn MailLogRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// # Errors
    ///
    /// `Validation` for a page below 1 or a page size outside
    /// `1..=max_page_size`; `Storage` from the repository.
    pub async fn list_mail_logs(&self, req: ListRequest) -> Result<Page<MailLog>, DomainError> {
        let page = req.page.unwrap_or(1);
        if page < 1 {
            return Err(DomainError::validation("page", "must be at least 1"));
        }

        let page_size = req.page_size.unwrap_or(self.config.default_page_size);
        if !(1..=self.config.max_page_size).contains(&page_size) {
            return Err(DomainError::validation(
                "page_size",
                format!("must be between 1 and {}", self.config.max_page_size),
            ));
        }

        let offset = u64::from(page - 1) * u64::from(page_size);
        let (items, total) = self.repo.list(req.status, offset, page_size).await?;

        Ok(Page::new(items, page, page_size, total))
    }

    /// Delete logs older than `older_than_days` (default from config) as of
    /// `now`.
    ///
    /// # Errors
    ///
    /// `Validation` when `older_than_days` is 0; `Storage` from the
    /// repository.
    pub async fn cleanup(
        &self,
        older_than_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let days = older_than_days.unwrap_or(self.config.default_retention_days);
        if days < 1 {
            return Err(DomainError::validation("older_than_days", "must be at least 1"));
        }

        let cutoff = now - Duration::days(i64::from(days));
        let deleted = self.repo.delete_older_than(cutoff).await?;

        tracing::info!(older_than_days = days, %cutoff, deleted, "Mail logs cleaned up");
        Ok(deleted)
    }

    /// # Errors
    ///
    /// `Storage` from the repository.
    pub async fn record(&self, log: MailLog) -> Result<(), DomainError> {
        self.repo.insert(log).await
    }
}
