//! Configuration for the authentication service

use vt_shared::config::security::SecurityConfig;

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Cooldown between confirmation-email resends in seconds
    pub confirm_resend_cooldown_seconds: u64,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            confirm_resend_cooldown_seconds: 300,
        }
    }
}

impl AuthServiceConfig {
    /// Derive the service configuration from the security configuration
    pub fn from_security(security: &SecurityConfig) -> Self {
        Self {
            confirm_resend_cooldown_seconds: security.tokens.confirm_resend_cooldown_seconds,
        }
    }
}
