use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::model::{MailLog, MailStatus};

/// Mail log storage. Listings are ordered newest first.
///
/// All methods fail with [`DomainError::Storage`] when the backing store
/// cannot be reached.
#[async_trait]
pub trait MailLogRepository: Send + Sync {
    /// One slice of the logs matching `status`, plus the total match count.
    ///
    /// # Errors
    ///
    /// Storage failures.
    async fn list(
        &self,
        status: Option<MailStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<MailLog>, u64), DomainError>;

    /// # Errors
    ///
    /// Storage failures.
    async fn insert(&self, log: MailLog) -> Result<(), DomainError>;

    /// Remove every log created strictly before `cutoff` and return how many
    /// were removed.
    ///
    /// # Errors
    ///
    /// Storage failures.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}
