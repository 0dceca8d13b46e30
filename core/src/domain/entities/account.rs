//! Account entity representing a registered user of a workshop.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;
use vt_shared::utils::validation::normalize_email;

/// Role of an account within the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Workshop owner; manages one or more workshops
    Owner,
    /// Staff member of a workshop
    Staff,
    /// Platform operator; approves owners, no workshop of their own
    SuperAdmin,
}

/// Reference to a workshop the account belongs to
///
/// Only the identifiers are carried here; workshop data itself lives behind
/// its own store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkshopMembership {
    /// Workshop (tenant) id
    pub workshop_id: Uuid,
    /// Default store (branch) within the workshop, if any
    pub default_store_id: Option<Uuid>,
}

/// Account entity with credentials and security state
///
/// Invariants maintained by the mutators below:
/// - `failed_login_attempts` and `locked_until` are cleared together;
/// - `password_reset_token_hash` and `password_reset_expires_at` are set and
///   cleared together;
/// - `two_factor_secret` is present only while `two_factor_enabled` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: Uuid,

    /// Email address, unique on its normalized (trimmed, lowercased) form
    pub email: String,

    /// Display name
    pub full_name: String,

    /// bcrypt hash of the password
    pub password_hash: String,

    /// Role of the account
    pub role: Role,

    /// Whether the account may log in at all
    pub is_active: bool,

    /// Whether a platform operator has approved the account
    pub is_approved: bool,

    /// When the account was approved
    pub approved_at: Option<DateTime<Utc>>,

    /// Whether the email address has been confirmed
    pub email_confirmed: bool,

    /// When the email address was confirmed
    pub email_confirmed_at: Option<DateTime<Utc>>,

    /// When the last confirmation email was sent (resend cooldown anchor)
    pub confirmation_sent_at: Option<DateTime<Utc>>,

    /// Consecutive failed password attempts since the last success or lock
    pub failed_login_attempts: u32,

    /// Non-null only while a lockout is active
    pub locked_until: Option<DateTime<Utc>>,

    /// Whether TOTP two-factor authentication is enabled
    pub two_factor_enabled: bool,

    /// Base32 TOTP secret; present only after a confirmed enrollment
    pub two_factor_secret: Option<String>,

    /// SHA-256 hash of the outstanding password-reset token
    pub password_reset_token_hash: Option<String>,

    /// Absolute expiry of the outstanding password-reset token
    pub password_reset_expires_at: Option<DateTime<Utc>>,

    /// When the last password-reset email was sent
    pub password_reset_sent_at: Option<DateTime<Utc>>,

    /// Workshops the account belongs to
    pub memberships: Vec<WorkshopMembership>,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new Account with a normalized email and no password set
    pub fn new(email: &str, full_name: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            full_name: full_name.into(),
            password_hash: String::new(),
            role,
            is_active: true,
            is_approved: false,
            approved_at: None,
            email_confirmed: false,
            email_confirmed_at: None,
            confirmation_sent_at: None,
            failed_login_attempts: 0,
            locked_until: None,
            two_factor_enabled: false,
            two_factor_secret: None,
            password_reset_token_hash: None,
            password_reset_expires_at: None,
            password_reset_sent_at: None,
            memberships: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Hashes and stores a new password
    pub fn set_password(&mut self, password: &str) -> Result<(), DomainError> {
        self.password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| {
            DomainError::Internal {
                message: format!("Failed to hash password: {}", e),
            }
        })?;
        self.touch();
        Ok(())
    }

    /// Verifies a password against the stored hash
    pub fn check_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }

    /// Marks the email address as confirmed
    pub fn confirm_email(&mut self) {
        self.email_confirmed = true;
        self.email_confirmed_at = Some(Utc::now());
        self.touch();
    }

    /// Records that a confirmation email was just sent
    pub fn mark_confirmation_sent(&mut self) {
        self.confirmation_sent_at = Some(Utc::now());
        self.touch();
    }

    /// Checks whether enough time has passed to resend the confirmation email
    pub fn can_resend_confirmation(&self, cooldown_seconds: u64) -> bool {
        match self.confirmation_sent_at {
            None => true,
            Some(sent_at) => Utc::now() - sent_at > Duration::seconds(cooldown_seconds as i64),
        }
    }

    /// Approves the account
    pub fn approve(&mut self) {
        self.is_approved = true;
        self.approved_at = Some(Utc::now());
        self.touch();
    }

    /// Deactivates the account
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    /// Increments the failed-login counter and returns the new count
    pub fn register_failed_login(&mut self) -> u32 {
        self.failed_login_attempts += 1;
        self.touch();
        self.failed_login_attempts
    }

    /// Applies a lockout: the counter restarts at zero for the next cycle
    pub fn apply_lock(&mut self, until: DateTime<Utc>) {
        self.failed_login_attempts = 0;
        self.locked_until = Some(until);
        self.touch();
    }

    /// Clears the lock together with the failure counter
    pub fn clear_lock(&mut self) {
        self.failed_login_attempts = 0;
        self.locked_until = None;
        self.touch();
    }

    /// Persists a confirmed TOTP secret and enables two-factor auth
    pub fn enable_two_factor(&mut self, secret: impl Into<String>) {
        self.two_factor_secret = Some(secret.into());
        self.two_factor_enabled = true;
        self.touch();
    }

    /// Disables two-factor auth and discards the secret
    pub fn disable_two_factor(&mut self) {
        self.two_factor_enabled = false;
        self.two_factor_secret = None;
        self.touch();
    }

    /// Stores a password-reset token hash with its expiry and sent-at stamp
    pub fn set_reset_token(&mut self, token_hash: impl Into<String>, expires_at: DateTime<Utc>) {
        self.password_reset_token_hash = Some(token_hash.into());
        self.password_reset_expires_at = Some(expires_at);
        self.password_reset_sent_at = Some(Utc::now());
        self.touch();
    }

    /// Removes the reset token hash and expiry so a used token cannot replay
    pub fn clear_reset_token(&mut self) {
        self.password_reset_token_hash = None;
        self.password_reset_expires_at = None;
        self.touch();
    }

    /// Checks if this account operates the platform
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
