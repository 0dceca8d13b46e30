//! TOTP two-factor authentication (RFC 6238)

mod service;

pub use service::{is_valid_code_format, EnrollmentSetup, TwoFactorService, CODE_DIGITS, STEP_SECONDS};
