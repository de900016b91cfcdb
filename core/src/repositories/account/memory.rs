//! In-memory account store

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{Account, ProviderId};
use crate::errors::DomainError;

use super::constraints;
use super::r#trait::AccountRepository;

/// Account store backed by a map. Uniqueness checks and the write happen
/// under one write lock, which gives the same guarantee as a unique index.
#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    fn conflict(existing: &HashMap<Uuid, Account>, candidate: &Account) -> Option<&'static str> {
        existing.values().filter(|a| a.id != candidate.id).find_map(|other| {
            if candidate.email.is_some() && other.email == candidate.email {
                Some(constraints::EMAIL)
            } else if candidate.phone.is_some() && other.phone == candidate.phone {
                Some(constraints::PHONE)
            } else if candidate
                .linked_providers
                .iter()
                .any(|link| other.is_linked_to(link))
            {
                Some(constraints::PROVIDER)
            } else {
                None
            }
        })
    }

    fn violation(constraint: &str) -> DomainError {
        DomainError::UniqueViolation {
            constraint: constraint.to_string(),
        }
    }

    fn not_found(id: Uuid) -> DomainError {
        DomainError::NotFound {
            resource: format!("account {}", id),
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn find_by_provider(&self, provider_id: &ProviderId) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.is_linked_to(provider_id)).cloned())
    }

    async fn insert(&self, account: Account) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id) {
            return Err(Self::violation("primary"));
        }
        if let Some(constraint) = Self::conflict(&accounts, &account) {
            return Err(Self::violation(constraint));
        }
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        account.password_hash = Some(password_hash.to_string());
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn link_provider(&self, id: Uuid, provider_id: &ProviderId) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.id != id && a.is_linked_to(provider_id))
        {
            return Err(Self::violation(constraints::PROVIDER));
        }
        let account = accounts.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        if account.linked_providers.insert(provider_id.clone()) {
            account.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_phone_verified(&self, id: Uuid) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        account.phone_verified = true;
        account.updated_at = Utc::now();
        Ok(())
    }
}
