
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Barrier, Mutex};
use uuid::Uuid;

use crate::domain::entities::{Role, StoredRefreshRecord, TokenSubject};
use crate::errors::DomainError;
use crate::repositories::{CasOutcome, InMemoryRefreshRecordRepository, RefreshRecordRepository};
use crate::services::token::{TokenService, TokenServiceConfig};

pub(crate) fn test_config() -> TokenServiceConfig {
    TokenServiceConfig {
        access_secret: "test-access-secret".to_string(),
        refresh_secret: "test-refresh-secret".to_string(),
        ..TokenServiceConfig::default()
    }
}

pub(crate) fn service_with(records: Arc<dyn RefreshRecordRepository>) -> TokenService {
    TokenService::new(records, test_config()).unwrap()
}

pub(crate) fn subject() -> TokenSubject {
    TokenSubject {
        subject_id: Uuid::new_v4(),
        role: Role::User,
        email: Some("jane@example.com".to_string()),
    }
}

/// Holds every `find` until `parties` callers have read, forcing their
/// read-then-swap sequences to interleave.
pub(crate) struct GatedRecords {
    inner: InMemoryRefreshRecordRepository,
    barrier: Barrier,
}

impl GatedRecords {
    pub(crate) fn new(inner: InMemoryRefreshRecordRepository, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl RefreshRecordRepository for GatedRecords {
    async fn find(&self, subject_id: Uuid) -> Result<Option<StoredRefreshRecord>, DomainError> {
        let record = self.inner.find(subject_id).await;
        self.barrier.wait().await;
        record
    }

    async fn put(&self, record: StoredRefreshRecord) -> Result<(), DomainError> {
        self.inner.put(record).await
    }

    async fn compare_and_swap(
        &self,
        subject_id: Uuid,
        expected_hash: &str,
        replacement: StoredRefreshRecord,
    ) -> Result<CasOutcome, DomainError> {
        self.inner.compare_and_swap(subject_id, expected_hash, replacement).await
    }

    async fn delete(&self, subject_id: Uuid) -> Result<bool, DomainError> {
        self.inner.delete(subject_id).await
    }

    async fn delete_session(&self, subject_id: Uuid, session_id: Uuid) -> Result<bool, DomainError> {
        self.inner.delete_session(subject_id, session_id).await
    }
}

/// Writes a queued record right after the next `find` has read, as if a new
/// login committed between a refresh's read and its follow-up write.
pub(crate) struct LoginAfterRead {
    pub(crate) inner: InMemoryRefreshRecordRepository,
    pub(crate) landing: Mutex<Option<StoredRefreshRecord>>,
}

#[async_trait]
impl RefreshRecordRepository for LoginAfterRead {
    async fn find(&self, subject_id: Uuid) -> Result<Option<StoredRefreshRecord>, DomainError> {
        let record = self.inner.find(subject_id).await;
        let landing = self.landing.lock().await.take();
        if let Some(landing) = landing {
            self.inner.put(landing).await?;
        }
        record
    }

    async fn put(&self, record: StoredRefreshRecord) -> Result<(), DomainError> {
        self.inner.put(record).await
    }

    async fn compare_and_swap(
        &self,
        subject_id: Uuid,
        expected_hash: &str,
        replacement: StoredRefreshRecord,
    ) -> Result<CasOutcome, DomainError> {
        self.inner.compare_and_swap(subject_id, expected_hash, replacement).await
    }

    async fn delete(&self, subject_id: Uuid) -> Result<bool, DomainError> {
        self.inner.delete(subject_id).await
    }

    async fn delete_session(&self, subject_id: Uuid, session_id: Uuid) -> Result<bool, DomainError> {
        self.inner.delete_session(subject_id, session_id).await
    }
}
