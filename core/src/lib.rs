//! # VeloTaller Core
//!
//! Core business logic and domain layer for the VeloTaller backend.
//! This crate contains the account entity and session records, the
//! authentication and account-security services (rate limiting, lockout,
//! token workflows, TOTP two-factor auth, login orchestration), the
//! repository interfaces they depend on, and the error types shared by all
//! of them.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
