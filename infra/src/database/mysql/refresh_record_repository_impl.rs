//! MySQL implementation of the RefreshRecordRepository trait

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use hl_core::domain::entities::StoredRefreshRecord;
use hl_core::errors::DomainError;
use hl_core::repositories::{CasOutcome, RefreshRecordRepository};

use super::errors::{column, query_error, uuid_column};

/// MySQL implementation of RefreshRecordRepository
///
/// The compare-and-swap is a single conditional `UPDATE`; InnoDB's row lock
/// serializes concurrent rotations of the same subject.
pub struct MySqlRefreshRecordRepository {
    pool: MySqlPool,
}

impl MySqlRefreshRecordRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &MySqlRow) -> Result<StoredRefreshRecord, DomainError> {
        Ok(StoredRefreshRecord {
            subject_id: uuid_column(row, "subject_id")?,
            refresh_token_hash: column(row, "refresh_token_hash")?,
            session_id: uuid_column(row, "session_id")?,
            generation: column(row, "generation")?,
            rotated_at: column(row, "rotated_at")?,
        })
    }
}

#[async_trait]
impl RefreshRecordRepository for MySqlRefreshRecordRepository {
    async fn find(&self, subject_id: Uuid) -> Result<Option<StoredRefreshRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT subject_id, refresh_token_hash, session_id, generation, rotated_at
            FROM refresh_records
            WHERE subject_id = ?
            "#,
        )
        .bind(subject_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("Failed to query refresh record", e))?;

        row.map(|row| Self::row_to_record(&row)).transpose()
    }

    async fn put(&self, record: StoredRefreshRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_records (subject_id, refresh_token_hash, session_id, generation, rotated_at)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                refresh_token_hash = VALUES(refresh_token_hash),
                session_id = VALUES(session_id),
                generation = VALUES(generation),
                rotated_at = VALUES(rotated_at)
            "#,
        )
        .bind(record.subject_id.to_string())
        .bind(&record.refresh_token_hash)
        .bind(record.session_id.to_string())
        .bind(record.generation)
        .bind(record.rotated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("Failed to store refresh record", e))?;

        Ok(())
    }

    async fn compare_and_swap(
        &self,
        subject_id: Uuid,
        expected_hash: &str,
        replacement: StoredRefreshRecord,
    ) -> Result<CasOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_records
            SET refresh_token_hash = ?, session_id = ?, generation = ?, rotated_at = ?
            WHERE subject_id = ? AND refresh_token_hash = ?
            "#,
        )
        .bind(&replacement.refresh_token_hash)
        .bind(replacement.session_id.to_string())
        .bind(replacement.generation)
        .bind(replacement.rotated_at)
        .bind(subject_id.to_string())
        .bind(expected_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("Failed to rotate refresh record", e))?;

        if result.rows_affected() == 1 {
            return Ok(CasOutcome::Swapped);
        }

        // Lost the race or never had a record; tell the two apart
        match self.find(subject_id).await? {
            Some(_) => Ok(CasOutcome::Mismatch),
            None => Ok(CasOutcome::Missing),
        }
    }

    async fn delete(&self, subject_id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_records WHERE subject_id = ?")
            .bind(subject_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to delete refresh record", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_session(&self, subject_id: Uuid, session_id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_records WHERE subject_id = ? AND session_id = ?")
            .bind(subject_id.to_string())
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to delete refresh record", e))?;

        Ok(result.rows_affected() > 0)
    }
}
