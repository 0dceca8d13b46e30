//! Login orchestration and account-security flows

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::account::{Account, Role};
use crate::domain::entities::session::AuthSession;
use crate::domain::value_objects::login::{LoginOutcome, PostLoginRedirect};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError, ValidationError};
use crate::repositories::CredentialStore;
use crate::services::notification::{Mailer, NotificationGateway};
use crate::services::token::TokenService;
use crate::services::two_factor::{is_valid_code_format, EnrollmentSetup, TwoFactorService};

use super::config::AuthServiceConfig;
use super::lockout::LockoutPolicy;
use super::rate_limiter::LoginRateLimiter;
use vt_shared::utils::validation::{
    has_required_character_classes, is_valid_email, is_valid_password_length, normalize_email,
    PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH,
};

/// Owner self-registration input
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Authentication service composing the security components into the
/// login, registration, confirmation, reset, and 2FA-settings flows
///
/// Every rejection is returned as a domain error carrying its user-facing
/// message; nothing propagates past this boundary, and no outcome reveals
/// whether an email address is registered.
pub struct AuthService<S, N>
where
    S: CredentialStore,
    N: NotificationGateway,
{
    /// Credential store for account persistence
    store: Arc<S>,
    /// Process-local login throttle
    rate_limiter: Arc<LoginRateLimiter>,
    /// Persisted lockout policy
    lockout: LockoutPolicy<S>,
    /// Confirmation and reset tokens
    tokens: TokenService,
    /// TOTP primitives
    two_factor: TwoFactorService,
    /// Security email composition
    mailer: Mailer<N>,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<S, N> AuthService<S, N>
where
    S: CredentialStore,
    N: NotificationGateway,
{
    /// Create a new authentication service
    pub fn new(
        store: Arc<S>,
        rate_limiter: Arc<LoginRateLimiter>,
        lockout: LockoutPolicy<S>,
        tokens: TokenService,
        two_factor: TwoFactorService,
        mailer: Mailer<N>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            store,
            rate_limiter,
            lockout,
            tokens,
            two_factor,
            mailer,
            config,
        }
    }

    /// Attempt a login with email and password
    ///
    /// Checks run in a fixed order and the first failing one wins:
    /// rate limit, account lookup, lockout, password, active, approved,
    /// email confirmed, second factor. A missing account takes the same
    /// failure path as a wrong password.
    pub async fn login(
        &self,
        session: &mut AuthSession,
        address: &str,
        email: &str,
        password: &str,
        remember: bool,
    ) -> DomainResult<LoginOutcome> {
        let normalized = normalize_email(email);
        let key = LoginRateLimiter::key(address, &normalized);

        // 1. Throttle before touching the store
        if self.rate_limiter.is_limited(&key) {
            warn!(address, "Login attempt rate limited");
            return Err(AuthError::RateLimited.into());
        }

        // 2. Lookup; absence follows the failed-credential path. No hash
        // comparison runs here, which keeps the two paths observably
        // similar but not timing-identical.
        let Some(mut account) = self.store.find_by_email(&normalized).await? else {
            self.rate_limiter.record_failure(&key);
            return Err(AuthError::InvalidCredentials.into());
        };

        // 3. Lock check; the password is not evaluated while locked
        if let Some(seconds) = self.lockout.remaining_lock_seconds(&mut account).await? {
            let minutes = (seconds + 59) / 60;
            return Err(AuthError::AccountLocked { minutes }.into());
        }

        // 4. Password verification feeds both brute-force controls
        if !account.check_password(password) {
            self.rate_limiter.record_failure(&key);
            self.lockout.register_failure(&mut account).await?;
            return Err(AuthError::InvalidCredentials.into());
        }

        // 5. Password success clears this key's bucket
        self.rate_limiter.record_success(&key);

        // 6.-8. Policy checks; none of these touch the lockout counters
        if !account.is_active {
            return Err(AuthError::AccountDisabled.into());
        }
        if !account.is_approved {
            return Err(AuthError::AccountNotApproved.into());
        }
        if !account.email_confirmed {
            if account.can_resend_confirmation(self.config.confirm_resend_cooldown_seconds) {
                self.send_confirmation(&mut account).await?;
            }
            return Err(AuthError::EmailNotConfirmed.into());
        }

        // 9. Second-factor branch: no authenticated session yet
        if account.two_factor_enabled {
            session.begin_second_factor(account.id, remember);
            info!(account_id = %account.id, "Password accepted, awaiting second factor");
            return Ok(LoginOutcome::TwoFactorRequired);
        }

        // 10. Full success
        self.establish(session, &mut account, remember).await
    }

    /// Complete a pending second-factor challenge
    ///
    /// A wrong code keeps the challenge alive for a retry; a policy
    /// rejection (account state changed since the password check) destroys
    /// it.
    pub async fn complete_two_factor(
        &self,
        session: &mut AuthSession,
        code: &str,
    ) -> DomainResult<LoginOutcome> {
        let Some(pending) = session.pending_second_factor else {
            return Err(AuthError::TwoFactorChallengeMissing.into());
        };

        let Some(mut account) = self.store.find_by_id(pending.account_id).await? else {
            session.clear();
            return Err(AuthError::TwoFactorChallengeMissing.into());
        };

        // Account state may have changed since the password stage
        if !account.is_active {
            session.clear();
            return Err(AuthError::AccountDisabled.into());
        }
        if !account.is_approved {
            session.clear();
            return Err(AuthError::AccountNotApproved.into());
        }
        if !account.email_confirmed {
            session.clear();
            return Err(AuthError::EmailNotConfirmed.into());
        }

        let Some(secret) = account.two_factor_secret.clone() else {
            // 2FA was disabled mid-challenge; nothing left to verify
            session.take_pending_second_factor();
            return self.establish(session, &mut account, pending.remember).await;
        };

        if !is_valid_code_format(code) {
            return Err(ValidationError::InvalidCodeFormat.into());
        }
        if !self.two_factor.verify(&secret, &account.email, code)? {
            warn!(account_id = %account.id, "Second-factor code rejected");
            return Err(AuthError::InvalidTwoFactorCode.into());
        }

        session.take_pending_second_factor();
        self.establish(session, &mut account, pending.remember).await
    }

    /// Clear the session, including any pending challenge or enrollment secret
    pub fn logout(&self, session: &mut AuthSession) {
        session.clear();
    }

    /// Register a new workshop owner
    ///
    /// The account starts unapproved and unconfirmed; a confirmation email
    /// goes out immediately.
    pub async fn register(&self, request: RegisterRequest) -> DomainResult<Account> {
        if request.full_name.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: String::from("full_name"),
            }
            .into());
        }
        if !is_valid_email(&request.email) {
            return Err(ValidationError::InvalidEmail.into());
        }
        if !is_valid_password_length(&request.password) {
            return Err(ValidationError::InvalidPasswordLength {
                min: PASSWORD_MIN_LENGTH,
                max: PASSWORD_MAX_LENGTH,
            }
            .into());
        }
        if !has_required_character_classes(&request.password) {
            return Err(ValidationError::PasswordMissingCharacterClasses.into());
        }
        if request.password != request.password_confirm {
            return Err(ValidationError::PasswordMismatch.into());
        }

        let normalized = normalize_email(&request.email);
        if self.store.find_by_email(&normalized).await?.is_some() {
            return Err(AuthError::EmailAlreadyRegistered.into());
        }

        let mut account = Account::new(&normalized, request.full_name.trim(), Role::Owner);
        account.set_password(&request.password)?;
        let mut account = self.store.save(account).await?;

        self.send_confirmation(&mut account).await?;
        info!(account_id = %account.id, "Owner registered, pending approval");
        Ok(account)
    }

    /// Confirm an email address from a signed token
    pub async fn confirm_email(&self, token: &str) -> DomainResult<()> {
        let Some(email) = self.tokens.verify_confirmation_token(token) else {
            return Err(TokenError::InvalidOrExpired.into());
        };

        let mut account = self
            .store
            .find_by_email(&normalize_email(&email))
            .await?
            .ok_or(DomainError::Auth(AuthError::AccountNotFound))?;

        if account.email_confirmed {
            return Ok(());
        }

        account.confirm_email();
        self.store.save(account).await?;
        Ok(())
    }

    /// Resend the confirmation email, subject to the cooldown
    ///
    /// The outcome is identical whether or not the account exists.
    pub async fn resend_confirmation(&self, email: &str) -> DomainResult<()> {
        let normalized = normalize_email(email);
        if let Some(mut account) = self.store.find_by_email(&normalized).await? {
            if !account.email_confirmed
                && account.can_resend_confirmation(self.config.confirm_resend_cooldown_seconds)
            {
                self.send_confirmation(&mut account).await?;
            }
        }
        Ok(())
    }

    /// Start a password reset
    ///
    /// If the account exists a single-use token is stored (hashed) and
    /// emailed; either way the caller sees the same success.
    pub async fn forgot_password(&self, email: &str) -> DomainResult<()> {
        let normalized = normalize_email(email);
        if let Some(mut account) = self.store.find_by_email(&normalized).await? {
            let token = self.tokens.issue_reset_token(&mut account);
            let account = self.store.save(account).await?;
            self.mailer.send_password_reset_email(&account, &token).await;
            info!(account_id = %account.id, "Password reset issued");
        }
        Ok(())
    }

    /// Complete a password reset with the emailed token
    ///
    /// Verification is single-use: the stored hash is cleared before the
    /// new password is persisted, so the same link cannot be replayed. A
    /// successful reset also clears the lockout state.
    pub async fn reset_password(
        &self,
        account_id: Uuid,
        token: &str,
        new_password: &str,
        password_confirm: &str,
    ) -> DomainResult<()> {
        if !is_valid_password_length(new_password) {
            return Err(ValidationError::InvalidPasswordLength {
                min: PASSWORD_MIN_LENGTH,
                max: PASSWORD_MAX_LENGTH,
            }
            .into());
        }
        if !has_required_character_classes(new_password) {
            return Err(ValidationError::PasswordMissingCharacterClasses.into());
        }
        if new_password != password_confirm {
            return Err(ValidationError::PasswordMismatch.into());
        }

        // An unknown id and a bad token are the same uniform outcome
        let Some(mut account) = self.store.find_by_id(account_id).await? else {
            return Err(TokenError::InvalidOrExpired.into());
        };
        if !self.tokens.verify_reset_token(&account, token) {
            return Err(TokenError::InvalidOrExpired.into());
        }

        self.tokens.clear_reset_token(&mut account);
        account.set_password(new_password)?;
        account.clear_lock();
        self.store.save(account).await?;

        info!(account_id = %account_id, "Password reset completed");
        Ok(())
    }

    /// State for the security-settings page
    ///
    /// Returns `None` when 2FA is already enabled (and discards any stale
    /// pending secret). Otherwise guarantees a pending enrollment secret in
    /// the session and returns it with its provisioning URI.
    pub async fn two_factor_setup(
        &self,
        session: &mut AuthSession,
        account_id: Uuid,
    ) -> DomainResult<Option<EnrollmentSetup>> {
        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::AccountNotFound))?;

        if account.two_factor_enabled {
            session.pending_enrollment_secret = None;
            return Ok(None);
        }

        if let Some(secret) = session.pending_enrollment_secret.clone() {
            let provisioning_uri = self.two_factor.provisioning_uri(&secret, &account.email)?;
            return Ok(Some(EnrollmentSetup {
                secret,
                provisioning_uri,
            }));
        }

        let setup = self.two_factor.begin_enrollment(&account.email)?;
        session.pending_enrollment_secret = Some(setup.secret.clone());
        Ok(Some(setup))
    }

    /// Confirm 2FA enrollment with a code from the pending secret
    ///
    /// Only now does the secret become account state.
    pub async fn confirm_two_factor_enrollment(
        &self,
        session: &mut AuthSession,
        account_id: Uuid,
        code: &str,
    ) -> DomainResult<()> {
        let mut account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::AccountNotFound))?;

        let Some(secret) = session.pending_enrollment_secret.clone() else {
            return Err(AuthError::EnrollmentSessionMissing.into());
        };

        if !is_valid_code_format(code) {
            return Err(ValidationError::InvalidCodeFormat.into());
        }
        if !self.two_factor.verify(&secret, &account.email, code)? {
            return Err(AuthError::InvalidTwoFactorCode.into());
        }

        account.enable_two_factor(secret);
        self.store.save(account).await?;
        session.pending_enrollment_secret = None;

        info!(account_id = %account_id, "Two-factor authentication enabled");
        Ok(())
    }

    /// Disable 2FA; requires re-entry of the current password
    pub async fn disable_two_factor(
        &self,
        account_id: Uuid,
        password: &str,
    ) -> DomainResult<()> {
        let mut account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::AccountNotFound))?;

        if !account.check_password(password) {
            return Err(AuthError::InvalidCredentials.into());
        }

        account.disable_two_factor();
        self.store.save(account).await?;

        info!(account_id = %account_id, "Two-factor authentication disabled");
        Ok(())
    }

    async fn establish(
        &self,
        session: &mut AuthSession,
        account: &mut Account,
        remember: bool,
    ) -> DomainResult<LoginOutcome> {
        self.lockout.reset(account).await?;
        let redirect = self.post_login_redirect(session, account);
        session.establish(account.id, remember);

        info!(account_id = %account.id, role = ?account.role, "Login successful");
        Ok(LoginOutcome::Authenticated { redirect })
    }

    fn post_login_redirect(
        &self,
        session: &mut AuthSession,
        account: &Account,
    ) -> PostLoginRedirect {
        if account.is_super_admin() {
            return PostLoginRedirect::AdminHome;
        }

        match account.memberships.first() {
            Some(membership) => {
                session.active_workshop_id = Some(membership.workshop_id);
                session.active_store_id = membership.default_store_id;
                PostLoginRedirect::Dashboard {
                    workshop_id: membership.workshop_id,
                    store_id: membership.default_store_id,
                }
            }
            None => PostLoginRedirect::Onboarding,
        }
    }

    async fn send_confirmation(&self, account: &mut Account) -> DomainResult<()> {
        let token = self.tokens.issue_confirmation_token(&account.email)?;
        // Delivery failures are logged by the mailer and do not fail the flow
        self.mailer.send_confirmation_email(account, &token).await;
        account.mark_confirmation_sent();
        *account = self.store.save(account.clone()).await?;
        Ok(())
    }
}
