//! Configuration for the token service

use vt_shared::config::security::SecurityConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Signing secret for stateless tokens
    pub secret_key: String,
    /// Max age of an email-confirmation token in seconds
    pub email_confirm_expires_seconds: u64,
    /// Absolute lifetime of a password-reset token in seconds
    pub password_reset_expires_seconds: u64,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            secret_key: String::from("development-secret-please-change-in-production"),
            email_confirm_expires_seconds: 3600,
            password_reset_expires_seconds: 3600,
        }
    }
}

impl TokenServiceConfig {
    /// Derive the token configuration from the security configuration
    pub fn from_security(security: &SecurityConfig) -> Self {
        Self {
            secret_key: security.secret_key.clone(),
            email_confirm_expires_seconds: security.tokens.email_confirm_expires_seconds,
            password_reset_expires_seconds: security.tokens.password_reset_expires_seconds,
        }
    }
}
