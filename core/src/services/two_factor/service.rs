//! TOTP secret enrollment and code verification
//!
//! Codes follow RFC 6238: SHA-1, 6 digits, 30-second step, with a skew of
//! one step so codes from the previous and next step are accepted.

use totp_rs::{Algorithm, Secret, TOTP};

use crate::errors::{DomainError, DomainResult};

/// Number of digits in a TOTP code
pub const CODE_DIGITS: usize = 6;

/// TOTP time step in seconds
pub const STEP_SECONDS: u64 = 30;

/// Accepted clock drift in steps on either side
const STEP_SKEW: u8 = 1;

/// A freshly generated, not-yet-confirmed enrollment secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentSetup {
    /// Base32-encoded secret, stored in the session until confirmed
    pub secret: String,
    /// Issuer-qualified otpauth:// URI for QR rendering
    pub provisioning_uri: String,
}

/// Check that a submitted code has the expected 6-digit shape
pub fn is_valid_code_format(code: &str) -> bool {
    code.len() == CODE_DIGITS && code.chars().all(|c| c.is_ascii_digit())
}

/// TOTP service bound to a provisioning issuer
pub struct TwoFactorService {
    issuer: String,
}

impl TwoFactorService {
    /// Create a new service with the issuer shown by authenticator apps
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
        }
    }

    /// Generate a fresh random secret and its provisioning URI
    ///
    /// Nothing is persisted here; the secret only becomes account state
    /// after the user confirms a code derived from it.
    pub fn begin_enrollment(&self, account_email: &str) -> DomainResult<EnrollmentSetup> {
        let secret_bytes = Secret::generate_secret().to_bytes().map_err(|e| {
            DomainError::Internal {
                message: format!("Failed to generate TOTP secret: {:?}", e),
            }
        })?;
        let totp = self.build(secret_bytes, account_email)?;

        Ok(EnrollmentSetup {
            secret: totp.get_secret_base32(),
            provisioning_uri: totp.get_url(),
        })
    }

    /// Rebuild the provisioning URI for an existing pending secret
    pub fn provisioning_uri(
        &self,
        secret_base32: &str,
        account_email: &str,
    ) -> DomainResult<String> {
        Ok(self.totp(secret_base32, account_email)?.get_url())
    }

    /// Verify a code against a base32 secret at the current time
    pub fn verify(
        &self,
        secret_base32: &str,
        account_email: &str,
        code: &str,
    ) -> DomainResult<bool> {
        let totp = self.totp(secret_base32, account_email)?;
        totp.check_current(code).map_err(|e| DomainError::Internal {
            message: format!("System clock error: {}", e),
        })
    }

    fn totp(&self, secret_base32: &str, account_email: &str) -> DomainResult<TOTP> {
        let secret_bytes = Secret::Encoded(secret_base32.to_string())
            .to_bytes()
            .map_err(|e| DomainError::Internal {
                message: format!("Invalid TOTP secret: {:?}", e),
            })?;
        self.build(secret_bytes, account_email)
    }

    fn build(&self, secret_bytes: Vec<u8>, account_email: &str) -> DomainResult<TOTP> {
        TOTP::new(
            Algorithm::SHA1,
            CODE_DIGITS,
            STEP_SKEW,
            STEP_SECONDS,
            secret_bytes,
            Some(self.issuer.clone()),
            account_email.to_string(),
        )
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to build TOTP: {}", e),
        })
    }
}
