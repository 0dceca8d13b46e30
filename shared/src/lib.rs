//! Shared utilities and common types for the VeloTaller server
//!
//! This crate provides functionality used across all server modules:
//! - Security configuration (rate limiting, lockout, token expiries, 2FA)
//! - Validation utilities (email normalization, password policy)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    LockoutConfig, LoginRateLimitConfig, SecurityConfig, TokenExpiryConfig, TwoFactorConfig,
};
pub use utils::validation;
