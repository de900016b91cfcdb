//! Refresh record repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::StoredRefreshRecord;
use crate::errors::DomainError;

/// Result of a conditional replacement of a subject's refresh record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The stored hash matched and the replacement was written
    Swapped,
    /// A record exists but its hash no longer matches the expected one
    Mismatch,
    /// No record exists for the subject
    Missing,
}

/// Repository trait for the one-per-subject refresh record
///
/// This is the only mutable state shared between concurrent refreshes of a
/// subject. Implementations must make `compare_and_swap` a single atomic
/// step: the comparison and the write may not be separated by any other
/// writer.
#[async_trait]
pub trait RefreshRecordRepository: Send + Sync {
    /// Fetch the live record of a subject
    async fn find(&self, subject_id: Uuid) -> Result<Option<StoredRefreshRecord>, DomainError>;

    /// Unconditionally store a record, replacing any previous one
    async fn put(&self, record: StoredRefreshRecord) -> Result<(), DomainError>;

    /// Replace the record of `subject_id` only if its current hash is `expected_hash`
    ///
    /// # Example
    /// ```no_run
    /// # use hl_core::repositories::{CasOutcome, RefreshRecordRepository};
    /// # async fn example(repo: &dyn RefreshRecordRepository, subject: uuid::Uuid) -> Result<(), Box<dyn std::error::Error>> {
    /// let current = repo.find(subject).await?.expect("record");
    /// let next = current.rotate("new-hash".to_string());
    /// match repo.compare_and_swap(subject, &current.refresh_token_hash, next).await? {
    ///     CasOutcome::Swapped => println!("rotated"),
    ///     CasOutcome::Mismatch | CasOutcome::Missing => println!("lost the race"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn compare_and_swap(
        &self,
        subject_id: Uuid,
        expected_hash: &str,
        replacement: StoredRefreshRecord,
    ) -> Result<CasOutcome, DomainError>;

    /// Delete the record of a subject
    ///
    /// # Returns
    /// * `Ok(true)` - A record was deleted
    /// * `Ok(false)` - There was nothing to delete
    async fn delete(&self, subject_id: Uuid) -> Result<bool, DomainError>;

    /// Delete the record of a subject only while it belongs to `session_id`
    ///
    /// A record written by a newer login in the meantime is left alone.
    async fn delete_session(&self, subject_id: Uuid, session_id: Uuid) -> Result<bool, DomainError>;
}
