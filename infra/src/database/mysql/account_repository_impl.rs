//! MySQL implementation of the AccountRepository trait.
//!
//! Uniqueness of e-mail, phone and provider identities is enforced by unique
//! keys; duplicate-key errors surface as `DomainError::UniqueViolation`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use std::collections::BTreeSet;
use uuid::Uuid;

use hl_core::domain::entities::{Account, ProviderId, Role, SocialProvider};
use hl_core::errors::DomainError;
use hl_core::repositories::account::constraints;
use hl_core::repositories::AccountRepository;

use super::errors::{column, is_unique_violation, query_error, uuid_column, write_error};

const ACCOUNT_COLUMNS: &str = "a.id, a.email, a.phone, a.password_hash, a.name, a.role, \
     a.email_verified, a.phone_verified, a.created_at, a.updated_at";

/// MySQL implementation of AccountRepository
pub struct MySqlAccountRepository {
    pool: MySqlPool,
}

impl MySqlAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to Account entity, without linked providers
    fn row_to_account(row: &MySqlRow) -> Result<Account, DomainError> {
        let role: String = column(row, "role")?;
        Ok(Account {
            id: uuid_column(row, "id")?,
            email: column(row, "email")?,
            phone: column(row, "phone")?,
            password_hash: column(row, "password_hash")?,
            name: column(row, "name")?,
            role: role
                .parse::<Role>()
                .map_err(DomainError::internal)?,
            linked_providers: BTreeSet::new(),
            email_verified: column(row, "email_verified")?,
            phone_verified: column(row, "phone_verified")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }

    async fn load_providers(&self, account: &mut Account) -> Result<(), DomainError> {
        let rows = sqlx::query(
            "SELECT provider, provider_user_id FROM account_providers WHERE account_id = ?",
        )
        .bind(account.id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Failed to load linked providers", e))?;

        for row in rows {
            let provider: String = column(&row, "provider")?;
            let provider = provider
                .parse::<SocialProvider>()
                .map_err(DomainError::internal)?;
            account
                .linked_providers
                .insert(ProviderId::new(provider, column::<String>(&row, "provider_user_id")?));
        }
        Ok(())
    }

    async fn fetch_one_where(&self, condition: &str, value: String) -> Result<Option<Account>, DomainError> {
        let query = format!("SELECT {} FROM accounts a WHERE {} LIMIT 1", ACCOUNT_COLUMNS, condition);
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("Failed to query account", e))?;

        match row {
            Some(row) => {
                let mut account = Self::row_to_account(&row)?;
                self.load_providers(&mut account).await?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    async fn provider_owner(&self, provider_id: &ProviderId) -> Result<Option<Uuid>, DomainError> {
        let row = sqlx::query(
            "SELECT account_id FROM account_providers WHERE provider = ? AND provider_user_id = ?",
        )
        .bind(provider_id.provider.as_str())
        .bind(&provider_id.provider_user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("Failed to query provider link", e))?;

        row.map(|row| uuid_column(&row, "account_id")).transpose()
    }
}

#[async_trait]
impl AccountRepository for MySqlAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
        self.fetch_one_where("a.id = ?", id.to_string()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        self.fetch_one_where("a.email = ?", email.to_string()).await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>, DomainError> {
        self.fetch_one_where("a.phone = ?", phone.to_string()).await
    }

    async fn find_by_provider(&self, provider_id: &ProviderId) -> Result<Option<Account>, DomainError> {
        match self.provider_owner(provider_id).await? {
            Some(account_id) => self.find_by_id(account_id).await,
            None => Ok(None),
        }
    }

    async fn insert(&self, account: Account) -> Result<Account, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, email, phone, password_hash, name, role,
                email_verified, phone_verified, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.id.to_string())
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&account.password_hash)
        .bind(&account.name)
        .bind(account.role.as_str())
        .bind(account.email_verified)
        .bind(account.phone_verified)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error("Failed to insert account", e))?;

        for link in &account.linked_providers {
            sqlx::query(
                "INSERT INTO account_providers (provider, provider_user_id, account_id, linked_at) VALUES (?, ?, ?, ?)",
            )
            .bind(link.provider.as_str())
            .bind(&link.provider_user_id)
            .bind(account.id.to_string())
            .bind(account.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error("Failed to link provider", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| write_error("Failed to commit account", e))?;
        Ok(account)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE accounts SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to update password", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: format!("account {}", id),
            });
        }
        Ok(())
    }

    async fn link_provider(&self, id: Uuid, provider_id: &ProviderId) -> Result<(), DomainError> {
        let inserted = sqlx::query(
            "INSERT INTO account_providers (provider, provider_user_id, account_id, linked_at) VALUES (?, ?, ?, ?)",
        )
        .bind(provider_id.provider.as_str())
        .bind(&provider_id.provider_user_id)
        .bind(id.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => match self.provider_owner(provider_id).await? {
                Some(owner) if owner == id => Ok(()),
                _ => Err(DomainError::UniqueViolation {
                    constraint: constraints::PROVIDER.to_string(),
                }),
            },
            Err(e) => Err(query_error("Failed to link provider", e)),
        }
    }

    async fn mark_phone_verified(&self, id: Uuid) -> Result<(), DomainError> {
        sqlx::query("UPDATE accounts SET phone_verified = TRUE, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to mark phone verified", e))?;
        Ok(())
    }
}
