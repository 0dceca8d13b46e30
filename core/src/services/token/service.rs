//! Token issuance and verification

use chrono::{Duration, Utc};
use constant_time_eq::constant_time_eq;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::entities::account::Account;
use crate::errors::{DomainError, DomainResult};

use super::config::TokenServiceConfig;

/// Entropy of a password-reset token in bytes (hex-encoded to 64 chars)
pub const RESET_TOKEN_BYTES: usize = 32;

/// Claims of a signed email-confirmation token
///
/// `jti` is a per-issuance random salt so two tokens for the same email are
/// never byte-identical.
#[derive(Debug, Serialize, Deserialize)]
struct ConfirmationClaims {
    /// Email address being confirmed
    sub: String,
    /// Issuance salt
    jti: String,
    /// Issued-at, seconds since epoch
    iat: i64,
    /// Expiry, seconds since epoch
    exp: i64,
}

/// Issues and verifies confirmation and password-reset tokens
pub struct TokenService {
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Create a new token service
    pub fn new(config: TokenServiceConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a signed, stateless email-confirmation token
    pub fn issue_confirmation_token(&self, email: &str) -> DomainResult<String> {
        let now = Utc::now();
        let expires =
            now + Duration::seconds(self.config.email_confirm_expires_seconds as i64);
        let claims = ConfirmationClaims {
            sub: email.to_string(),
            jti: random_hex(8),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            DomainError::Internal {
                message: format!("Failed to sign confirmation token: {}", e),
            }
        })
    }

    /// Verify a confirmation token and return the embedded email
    ///
    /// Expired, malformed, and forged tokens are indistinguishable: all of
    /// them yield `None`.
    pub fn verify_confirmation_token(&self, token: &str) -> Option<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<ConfirmationClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(data.claims.sub),
            Err(error) => {
                debug!(%error, "Confirmation token rejected");
                None
            }
        }
    }

    /// Issue a password-reset token for the account
    ///
    /// The returned plaintext token goes into the reset email; only its
    /// SHA-256 hash and the expiry are stored on the account. The caller is
    /// responsible for persisting the account afterwards.
    pub fn issue_reset_token(&self, account: &mut Account) -> String {
        let mut bytes = [0u8; RESET_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let expires_at =
            Utc::now() + Duration::seconds(self.config.password_reset_expires_seconds as i64);
        account.set_reset_token(hash_reset_token(&token), expires_at);

        token
    }

    /// Verify a presented reset token against the account
    ///
    /// Hash comparison is constant-time; a missing token, a hash mismatch,
    /// and an expired token all produce the same `false`.
    pub fn verify_reset_token(&self, account: &Account, token: &str) -> bool {
        let (Some(stored_hash), Some(expires_at)) = (
            account.password_reset_token_hash.as_deref(),
            account.password_reset_expires_at,
        ) else {
            return false;
        };

        if Utc::now() >= expires_at {
            return false;
        }

        constant_time_eq(
            hash_reset_token(token).as_bytes(),
            stored_hash.as_bytes(),
        )
    }

    /// Invalidate the outstanding reset token so it cannot be replayed
    ///
    /// Must run right after a successful verification; the caller persists
    /// the account.
    pub fn clear_reset_token(&self, account: &mut Account) {
        account.clear_reset_token();
    }
}

fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn random_hex(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buffer);
    hex::encode(buffer)
}
