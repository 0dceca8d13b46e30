//! Mock implementation of CredentialStore for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::account::Account;
use crate::errors::{AuthError, DomainError};

use super::trait_::CredentialStore;

/// In-memory credential store for tests and examples
pub struct MockCredentialStore {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl MockCredentialStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a mock store pre-populated with one account
    pub async fn with_account(account: Account) -> Self {
        let store = Self::new();
        store
            .accounts
            .write()
            .await
            .insert(account.id, account);
        store
    }
}

impl Default for MockCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn save(&self, account: Account) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().await;

        // Enforce the unique-email constraint the real store would have
        if accounts
            .values()
            .any(|a| a.email == account.email && a.id != account.id)
        {
            return Err(DomainError::Auth(AuthError::EmailAlreadyRegistered));
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }
}
