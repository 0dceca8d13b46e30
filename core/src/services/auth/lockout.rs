//! Account lockout policy for brute-force protection
//!
//! Unlike the rate limiter this state is persisted on the account row, so it
//! survives restarts and follows the account across client addresses. A lock
//! self-heals: the first query after `locked_until` clears both fields, no
//! background job involved.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::domain::entities::account::Account;
use crate::errors::DomainResult;
use crate::repositories::CredentialStore;
use vt_shared::config::security::LockoutConfig;

/// Persisted failed-attempt counter and timed lock
pub struct LockoutPolicy<S: CredentialStore> {
    store: Arc<S>,
    config: LockoutConfig,
}

impl<S: CredentialStore> LockoutPolicy<S> {
    /// Create a new lockout policy
    pub fn new(store: Arc<S>, config: LockoutConfig) -> Self {
        Self { store, config }
    }

    /// Remaining lock time in seconds, or `None` when not locked
    ///
    /// An expired lock is cleared and persisted on the spot, together with
    /// the failure counter.
    pub async fn remaining_lock_seconds(&self, account: &mut Account) -> DomainResult<Option<u64>> {
        let Some(locked_until) = account.locked_until else {
            return Ok(None);
        };

        let now = Utc::now();
        if locked_until <= now {
            account.clear_lock();
            *account = self.store.save(account.clone()).await?;
            info!(account_id = %account.id, "Expired account lock cleared");
            return Ok(None);
        }

        Ok(Some((locked_until - now).num_seconds().max(1) as u64))
    }

    /// Register a failed password attempt; returns whether it locked the account
    ///
    /// Reaching the configured maximum resets the counter to zero and starts
    /// the lock, so the next cycle counts from a clean slate.
    pub async fn register_failure(&self, account: &mut Account) -> DomainResult<bool> {
        let attempts = account.register_failed_login();
        let locked = attempts >= self.config.max_failed_attempts;

        if locked {
            let until = Utc::now() + Duration::seconds(self.config.lockout_duration_seconds as i64);
            account.apply_lock(until);
            warn!(
                account_id = %account.id,
                attempts,
                lock_seconds = self.config.lockout_duration_seconds,
                "Account locked after repeated failed logins"
            );
        }

        *account = self.store.save(account.clone()).await?;
        Ok(locked)
    }

    /// Clear counter and lock after a fully successful login or password reset
    pub async fn reset(&self, account: &mut Account) -> DomainResult<()> {
        if account.failed_login_attempts == 0 && account.locked_until.is_none() {
            return Ok(());
        }

        account.clear_lock();
        *account = self.store.save(account.clone()).await?;
        Ok(())
    }
}
