//! Configuration module
//!
//! Account-security configuration for the authentication core. Every knob is
//! environment-driven with production-leaning defaults; see
//! [`SecurityConfig::from_env`] for the variable names.

pub mod security;

pub use security::{
    LockoutConfig, LoginRateLimitConfig, SecurityConfig, TokenExpiryConfig, TwoFactorConfig,
};
