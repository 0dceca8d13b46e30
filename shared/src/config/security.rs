//! Account security configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Sliding-window rate limiting for login attempts
///
/// Applied per (client address, email) key. This is a process-local,
/// best-effort throttle; the persisted lockout below is the authoritative
/// brute-force control.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRateLimitConfig {
    /// Window length in seconds
    #[serde(default = "default_rate_limit_window")]
    pub window_seconds: u64,

    /// Max failed attempts per key inside the window
    #[serde(default = "default_rate_limit_max")]
    pub max_attempts: u32,
}

impl Default for LoginRateLimitConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_rate_limit_window(),
            max_attempts: default_rate_limit_max(),
        }
    }
}

/// Persisted account lockout after repeated password failures
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockoutConfig {
    /// Failed attempts before the account is locked
    #[serde(default = "default_lockout_max")]
    pub max_failed_attempts: u32,

    /// Lock duration in seconds
    #[serde(default = "default_lockout_duration")]
    pub lockout_duration_seconds: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_lockout_max(),
            lockout_duration_seconds: default_lockout_duration(),
        }
    }
}

/// Expiry windows for the time-limited token workflows
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenExpiryConfig {
    /// Max age of an email-confirmation token in seconds
    #[serde(default = "default_confirm_expires")]
    pub email_confirm_expires_seconds: u64,

    /// Absolute lifetime of a password-reset token in seconds
    #[serde(default = "default_reset_expires")]
    pub password_reset_expires_seconds: u64,

    /// Cooldown between confirmation-email resends in seconds
    #[serde(default = "default_resend_cooldown")]
    pub confirm_resend_cooldown_seconds: u64,
}

impl Default for TokenExpiryConfig {
    fn default() -> Self {
        Self {
            email_confirm_expires_seconds: default_confirm_expires(),
            password_reset_expires_seconds: default_reset_expires(),
            confirm_resend_cooldown_seconds: default_resend_cooldown(),
        }
    }
}

/// TOTP two-factor authentication settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TwoFactorConfig {
    /// Issuer name embedded in provisioning URIs (shown by authenticator apps)
    #[serde(default = "default_two_factor_issuer")]
    pub issuer: String,
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self {
            issuer: default_two_factor_issuer(),
        }
    }
}

/// Complete account-security configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityConfig {
    /// Secret key used to sign stateless tokens
    pub secret_key: String,

    /// Login rate limiting
    #[serde(default)]
    pub rate_limit: LoginRateLimitConfig,

    /// Account lockout
    #[serde(default)]
    pub lockout: LockoutConfig,

    /// Token expiry windows
    #[serde(default)]
    pub tokens: TokenExpiryConfig,

    /// Two-factor authentication
    #[serde(default)]
    pub two_factor: TwoFactorConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_key: String::from(DEFAULT_SECRET_KEY),
            rate_limit: LoginRateLimitConfig::default(),
            lockout: LockoutConfig::default(),
            tokens: TokenExpiryConfig::default(),
            two_factor: TwoFactorConfig::default(),
        }
    }
}

const DEFAULT_SECRET_KEY: &str = "development-secret-please-change-in-production";

impl SecurityConfig {
    /// Load configuration from environment variables
    ///
    /// Recognized variables: `SECRET_KEY`, `LOGIN_RATE_LIMIT_WINDOW`,
    /// `LOGIN_RATE_LIMIT_MAX`, `LOGIN_LOCKOUT_MAX`, `LOGIN_LOCKOUT_DURATION`,
    /// `SECURITY_EMAIL_CONFIRM_EXPIRES`, `SECURITY_PASSWORD_RESET_EXPIRES`,
    /// `SECURITY_CONFIRM_RESEND_COOLDOWN`, `SECURITY_TWO_FACTOR_ISSUER`.
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            secret_key: env::var("SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET_KEY.to_string()),
            rate_limit: LoginRateLimitConfig {
                window_seconds: env_or("LOGIN_RATE_LIMIT_WINDOW", default_rate_limit_window()),
                max_attempts: env_or("LOGIN_RATE_LIMIT_MAX", default_rate_limit_max()),
            },
            lockout: LockoutConfig {
                max_failed_attempts: env_or("LOGIN_LOCKOUT_MAX", default_lockout_max()),
                lockout_duration_seconds: env_or(
                    "LOGIN_LOCKOUT_DURATION",
                    default_lockout_duration(),
                ),
            },
            tokens: TokenExpiryConfig {
                email_confirm_expires_seconds: env_or(
                    "SECURITY_EMAIL_CONFIRM_EXPIRES",
                    default_confirm_expires(),
                ),
                password_reset_expires_seconds: env_or(
                    "SECURITY_PASSWORD_RESET_EXPIRES",
                    default_reset_expires(),
                ),
                confirm_resend_cooldown_seconds: env_or(
                    "SECURITY_CONFIRM_RESEND_COOLDOWN",
                    default_resend_cooldown(),
                ),
            },
            two_factor: TwoFactorConfig {
                issuer: env::var("SECURITY_TWO_FACTOR_ISSUER")
                    .unwrap_or_else(|_| default_two_factor_issuer()),
            },
        }
    }

    /// Check if the default signing secret is still in use (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn default_rate_limit_window() -> u64 {
    300 // 5 minutes
}

fn default_rate_limit_max() -> u32 {
    5
}

fn default_lockout_max() -> u32 {
    5
}

fn default_lockout_duration() -> u64 {
    900 // 15 minutes
}

fn default_confirm_expires() -> u64 {
    3600 // 1 hour
}

fn default_reset_expires() -> u64 {
    3600 // 1 hour
}

fn default_resend_cooldown() -> u64 {
    300 // 5 minutes
}

fn default_two_factor_issuer() -> String {
    String::from("VeloTaller")
}
