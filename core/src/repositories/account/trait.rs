//! Credential store trait defining the persistence contract for accounts.
//!
//! This is the only read/write surface the authentication core uses. The
//! storage engine behind it is out of scope here; implementations must keep
//! each `save` atomic so concurrent login attempts can race on the
//! failed-attempt counter without corrupting the row (losing one increment
//! is an accepted outcome, losing the row is not).

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::account::Account;
use crate::errors::DomainError;

/// Persistence contract for [`Account`] entities
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find an account by its normalized email address
    ///
    /// Callers must normalize the email (see
    /// `vt_shared::utils::validation::normalize_email`) before looking it up.
    ///
    /// # Returns
    /// * `Ok(Some(Account))` - account found
    /// * `Ok(None)` - no account with that email
    /// * `Err(DomainError)` - storage failure
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Find an account by its unique identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError>;

    /// Persist the account, creating or replacing it atomically
    ///
    /// # Returns
    /// * `Ok(Account)` - the persisted account
    /// * `Err(DomainError)` - storage failure (e.g. duplicate email)
    async fn save(&self, account: Account) -> Result<Account, DomainError>;
}
