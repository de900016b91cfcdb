//! In-memory refresh record store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::StoredRefreshRecord;
use crate::errors::DomainError;

use super::r#trait::{CasOutcome, RefreshRecordRepository};

#[derive(Clone, Default)]
pub struct InMemoryRefreshRecordRepository {
    records: Arc<RwLock<HashMap<Uuid, StoredRefreshRecord>>>,
}

impl InMemoryRefreshRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshRecordRepository for InMemoryRefreshRecordRepository {
    async fn find(&self, subject_id: Uuid) -> Result<Option<StoredRefreshRecord>, DomainError> {
        Ok(self.records.read().await.get(&subject_id).cloned())
    }

    async fn put(&self, record: StoredRefreshRecord) -> Result<(), DomainError> {
        self.records.write().await.insert(record.subject_id, record);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        subject_id: Uuid,
        expected_hash: &str,
        replacement: StoredRefreshRecord,
    ) -> Result<CasOutcome, DomainError> {
        let mut records = self.records.write().await;
        match records.get_mut(&subject_id) {
            None => Ok(CasOutcome::Missing),
            Some(current) if current.refresh_token_hash != expected_hash => Ok(CasOutcome::Mismatch),
            Some(current) => {
                *current = replacement;
                Ok(CasOutcome::Swapped)
            }
        }
    }

    async fn delete(&self, subject_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.records.write().await.remove(&subject_id).is_some())
    }

    async fn delete_session(&self, subject_id: Uuid, session_id: Uuid) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        match records.get(&subject_id) {
            Some(current) if current.session_id == session_id => {
                records.remove(&subject_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
