//! Session-scoped authentication state.
//!
//! `AuthSession` models what the cookie-backed session layer stores for one
//! browser session. The two pending records here are deliberately explicit
//! short-lived state: a login that passed the password check but still owes
//! a second factor, and a generated-but-unconfirmed TOTP enrollment secret.
//! Only the login orchestrator creates, consumes, or clears them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A login awaiting its second factor
///
/// Created only after the password check succeeded on an account with
/// two-factor auth enabled. No authenticated session exists while this is
/// pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSecondFactor {
    /// Account that passed the password check
    pub account_id: Uuid,
    /// "Remember me" choice carried over to session establishment
    pub remember: bool,
    /// When the challenge was created
    pub created_at: DateTime<Utc>,
}

/// Per-browser-session authentication state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Id of the authenticated account, if any
    pub account_id: Option<Uuid>,

    /// Whether the session should outlive the browser ("remember me")
    pub remember: bool,

    /// Marks the session cookie as long-lived (set while a second-factor
    /// challenge or a remembered login is in flight)
    pub long_lived: bool,

    /// Outstanding second-factor challenge
    pub pending_second_factor: Option<PendingSecondFactor>,

    /// Generated TOTP secret not yet confirmed by the user
    pub pending_enrollment_secret: Option<String>,

    /// Active workshop (tenant) selected at login
    pub active_workshop_id: Option<Uuid>,

    /// Active store (branch) within the workshop
    pub active_store_id: Option<Uuid>,
}

impl AuthSession {
    /// Creates an empty, anonymous session
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether an account is authenticated in this session
    pub fn is_authenticated(&self) -> bool {
        self.account_id.is_some()
    }

    /// Records a second-factor challenge; the session stays unauthenticated
    pub fn begin_second_factor(&mut self, account_id: Uuid, remember: bool) {
        self.pending_second_factor = Some(PendingSecondFactor {
            account_id,
            remember,
            created_at: Utc::now(),
        });
        self.long_lived = true;
    }

    /// Takes the pending challenge out of the session, if present
    pub fn take_pending_second_factor(&mut self) -> Option<PendingSecondFactor> {
        self.pending_second_factor.take()
    }

    /// Establishes an authenticated session for the given account
    pub fn establish(&mut self, account_id: Uuid, remember: bool) {
        self.account_id = Some(account_id);
        self.remember = remember;
        self.long_lived = remember;
        self.pending_second_factor = None;
    }

    /// Clears every piece of session state, pending records included
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_anonymous() {
        let session = AuthSession::new();
        assert!(!session.is_authenticated());
        assert!(session.pending_second_factor.is_none());
        assert!(session.pending_enrollment_secret.is_none());
    }

    #[test]
    fn test_second_factor_challenge_does_not_authenticate() {
        let mut session = AuthSession::new();
        let account_id = Uuid::new_v4();

        session.begin_second_factor(account_id, true);
        assert!(!session.is_authenticated());
        assert!(session.long_lived);

        let pending = session.take_pending_second_factor().unwrap();
        assert_eq!(pending.account_id, account_id);
        assert!(pending.remember);
        assert!(session.pending_second_factor.is_none());
    }

    #[test]
    fn test_establish_consumes_pending_state() {
        let mut session = AuthSession::new();
        let account_id = Uuid::new_v4();
        session.begin_second_factor(account_id, false);

        session.establish(account_id, false);
        assert!(session.is_authenticated());
        assert!(session.pending_second_factor.is_none());
        assert!(!session.long_lived);
    }

    #[test]
    fn test_clear_wipes_everything() {
        let mut session = AuthSession::new();
        session.establish(Uuid::new_v4(), true);
        session.pending_enrollment_secret = Some("JBSWY3DPEHPK3PXP".to_string());
        session.active_workshop_id = Some(Uuid::new_v4());

        session.clear();
        assert_eq!(session, AuthSession::default());
    }
}
