//! MySQL implementation of the ResetTokenRepository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use hl_core::domain::entities::ResetToken;
use hl_core::errors::DomainError;
use hl_core::repositories::ResetTokenRepository;

use super::errors::{column, query_error, uuid_column};

/// MySQL implementation of ResetTokenRepository
pub struct MySqlResetTokenRepository {
    pool: MySqlPool,
}

impl MySqlResetTokenRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &MySqlRow) -> Result<ResetToken, DomainError> {
        Ok(ResetToken {
            account_id: uuid_column(row, "account_id")?,
            token_hash: column(row, "token_hash")?,
            expires_at: column(row, "expires_at")?,
            created_at: column(row, "created_at")?,
        })
    }
}

#[async_trait]
impl ResetTokenRepository for MySqlResetTokenRepository {
    async fn save(&self, token: ResetToken) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (token_hash, account_id, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&token.token_hash)
        .bind(token.account_id.to_string())
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("Failed to save reset token", e))?;

        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<ResetToken>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT token_hash, account_id, expires_at, created_at
            FROM password_reset_tokens
            WHERE token_hash = ?
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("Failed to query reset token", e))?;

        row.map(|row| Self::row_to_token(&row)).transpose()
    }

    async fn consume(&self, token_hash: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to consume reset token", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_for_account(&self, account_id: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE account_id = ?")
            .bind(account_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to delete reset tokens", e))?;

        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to purge reset tokens", e))?;

        Ok(result.rows_affected())
    }
}
