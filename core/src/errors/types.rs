//! Error type definitions for authentication, token workflows, and input
//! validation.
//!
//! Every variant carries the user-facing message in its `Display` form; the
//! presentation layer turns these into flash messages and redirects. Nothing
//! here is allowed to reveal whether an account exists: credential failures
//! and token failures each collapse into a single generic variant.

use thiserror::Error;

/// Authentication-related errors
///
/// These are policy rejections, not faults: each one maps to a re-rendered
/// form or a redirect with a flash message.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Covers both "no such account" and "wrong password" so the two are
    /// indistinguishable to the caller.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Too many attempts. Please try again later")]
    RateLimited,

    #[error("Account temporarily locked. Try again in {minutes} minutes")]
    AccountLocked { minutes: u64 },

    #[error("Account disabled")]
    AccountDisabled,

    #[error("Account pending approval")]
    AccountNotApproved,

    #[error("Email not confirmed. Check your inbox for the confirmation link")]
    EmailNotConfirmed,

    #[error("Incorrect verification code")]
    InvalidTwoFactorCode,

    #[error("No login awaiting a second factor")]
    TwoFactorChallengeMissing,

    #[error("Enrollment session expired. Start again")]
    EnrollmentSessionMissing,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Account not found")]
    AccountNotFound,
}

/// Token-related errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// Expired, malformed, replayed, and forged tokens are deliberately
    /// merged into one outcome.
    #[error("Link invalid or expired")]
    InvalidOrExpired,
}

/// Input validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field required: {field}")]
    RequiredField { field: String },

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be between {min} and {max} characters")]
    InvalidPasswordLength { min: usize, max: usize },

    #[error("Password must include an uppercase letter, a lowercase letter and a digit")]
    PasswordMissingCharacterClasses,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Verification code must be 6 digits")]
    InvalidCodeFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        // The same Display output must serve missing-account and
        // wrong-password rejections alike.
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }

    #[test]
    fn test_locked_message_includes_minutes() {
        let error = AuthError::AccountLocked { minutes: 15 };
        assert!(error.to_string().contains("15 minutes"));
    }

    #[test]
    fn test_token_error_single_outcome() {
        assert_eq!(
            TokenError::InvalidOrExpired.to_string(),
            "Link invalid or expired"
        );
    }
}
