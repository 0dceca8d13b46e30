//! Login state-machine tests

use chrono::{Duration, Utc};

use super::mocks::{
    harness, harness_with_limits, ready_owner, super_admin, TEST_ADDRESS, TEST_PASSWORD,
};
use crate::domain::entities::session::AuthSession;
use crate::domain::value_objects::login::{LoginOutcome, PostLoginRedirect};
use crate::errors::{AuthError, DomainError};
use crate::repositories::account::CredentialStore;

#[tokio::test]
async fn test_missing_account_and_wrong_password_are_indistinguishable() {
    let harness = harness();
    harness
        .store
        .save(ready_owner("ana@example.com"))
        .await
        .unwrap();
    let mut session = AuthSession::new();

    let missing = harness
        .service
        .login(&mut session, TEST_ADDRESS, "nobody@example.com", "Password1", false)
        .await
        .unwrap_err();
    let wrong = harness
        .service
        .login(&mut session, TEST_ADDRESS, "ana@example.com", "WrongPassword1", false)
        .await
        .unwrap_err();

    assert!(matches!(
        missing,
        DomainError::Auth(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        wrong,
        DomainError::Auth(AuthError::InvalidCredentials)
    ));
    assert_eq!(missing.to_string(), wrong.to_string());
}

#[tokio::test]
async fn test_email_is_normalized_before_lookup() {
    let harness = harness();
    harness
        .store
        .save(ready_owner("ana@example.com"))
        .await
        .unwrap();
    let mut session = AuthSession::new();

    let outcome = harness
        .service
        .login(&mut session, TEST_ADDRESS, "  Ana@Example.COM ", TEST_PASSWORD, false)
        .await
        .unwrap();
    assert!(matches!(outcome, LoginOutcome::Authenticated { .. }));
}

#[tokio::test]
async fn test_rate_limit_rejects_before_account_lookup() {
    // Lockout max high enough that only the limiter can trigger here
    let harness = harness_with_limits(3, 100);
    harness
        .store
        .save(ready_owner("ana@example.com"))
        .await
        .unwrap();
    let mut session = AuthSession::new();

    for _ in 0..3 {
        let error = harness
            .service
            .login(&mut session, TEST_ADDRESS, "ana@example.com", "WrongPassword1", false)
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            DomainError::Auth(AuthError::InvalidCredentials)
        ));
    }

    // Correct password no longer matters for this key
    let error = harness
        .service
        .login(&mut session, TEST_ADDRESS, "ana@example.com", TEST_PASSWORD, false)
        .await
        .unwrap_err();
    assert!(matches!(error, DomainError::Auth(AuthError::RateLimited)));

    // Same email from a different address is unaffected
    let outcome = harness
        .service
        .login(&mut session, "198.51.100.9", "ana@example.com", TEST_PASSWORD, false)
        .await
        .unwrap();
    assert!(matches!(outcome, LoginOutcome::Authenticated { .. }));
}

#[tokio::test]
async fn test_rate_limiter_counts_attempts_on_missing_accounts() {
    let harness = harness_with_limits(3, 100);
    let mut session = AuthSession::new();

    for _ in 0..3 {
        harness
            .service
            .login(&mut session, TEST_ADDRESS, "ghost@example.com", "Password1", false)
            .await
            .unwrap_err();
    }

    let error = harness
        .service
        .login(&mut session, TEST_ADDRESS, "ghost@example.com", "Password1", false)
        .await
        .unwrap_err();
    assert!(matches!(error, DomainError::Auth(AuthError::RateLimited)));
}

#[tokio::test]
async fn test_lockout_after_max_failures_rejects_correct_password() {
    // Rate limit wide open so only the lockout can trigger
    let harness = harness_with_limits(100, 5);
    let account = ready_owner("ana@example.com");
    let account_id = account.id;
    harness.store.save(account).await.unwrap();
    let mut session = AuthSession::new();

    for _ in 0..5 {
        harness
            .service
            .login(&mut session, TEST_ADDRESS, "ana@example.com", "WrongPassword1", false)
            .await
            .unwrap_err();
    }

    let stored = harness.store.find_by_id(account_id).await.unwrap().unwrap();
    assert!(stored.locked_until.is_some());
    assert_eq!(stored.failed_login_attempts, 0);

    let error = harness
        .service
        .login(&mut session, TEST_ADDRESS, "ana@example.com", TEST_PASSWORD, false)
        .await
        .unwrap_err();
    match error {
        DomainError::Auth(AuthError::AccountLocked { minutes }) => {
            assert!(minutes >= 1 && minutes <= 15);
        }
        other => panic!("expected AccountLocked, got {:?}", other),
    }
}

#[tokio::test]
async fn test_expired_lock_clears_and_login_succeeds() {
    let harness = harness_with_limits(100, 5);
    let mut account = ready_owner("ana@example.com");
    let account_id = account.id;
    account.locked_until = Some(Utc::now() - Duration::seconds(1));
    harness.store.save(account).await.unwrap();
    let mut session = AuthSession::new();

    let outcome = harness
        .service
        .login(&mut session, TEST_ADDRESS, "ana@example.com", TEST_PASSWORD, false)
        .await
        .unwrap();
    assert!(matches!(outcome, LoginOutcome::Authenticated { .. }));

    let stored = harness.store.find_by_id(account_id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_attempts, 0);
    assert!(stored.locked_until.is_none());
}

#[tokio::test]
async fn test_success_resets_failure_counter() {
    let harness = harness_with_limits(100, 5);
    let account = ready_owner("ana@example.com");
    let account_id = account.id;
    harness.store.save(account).await.unwrap();
    let mut session = AuthSession::new();

    for _ in 0..3 {
        harness
            .service
            .login(&mut session, TEST_ADDRESS, "ana@example.com", "WrongPassword1", false)
            .await
            .unwrap_err();
    }
    let stored = harness.store.find_by_id(account_id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_attempts, 3);

    harness
        .service
        .login(&mut session, TEST_ADDRESS, "ana@example.com", TEST_PASSWORD, false)
        .await
        .unwrap();

    let stored = harness.store.find_by_id(account_id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_attempts, 0);
}

#[tokio::test]
async fn test_disabled_account_rejected_without_touching_lockout() {
    let harness = harness();
    let mut account = ready_owner("ana@example.com");
    let account_id = account.id;
    account.deactivate();
    harness.store.save(account).await.unwrap();
    let mut session = AuthSession::new();

    let error = harness
        .service
        .login(&mut session, TEST_ADDRESS, "ana@example.com", TEST_PASSWORD, false)
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        DomainError::Auth(AuthError::AccountDisabled)
    ));

    let stored = harness.store.find_by_id(account_id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_attempts, 0);
}

#[tokio::test]
async fn test_unapproved_account_rejected_before_confirmation_check() {
    let harness = harness();
    let mut account = ready_owner("ana@example.com");
    account.is_approved = false;
    account.email_confirmed = false;
    harness.store.save(account).await.unwrap();
    let mut session = AuthSession::new();

    let error = harness
        .service
        .login(&mut session, TEST_ADDRESS, "ana@example.com", TEST_PASSWORD, false)
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        DomainError::Auth(AuthError::AccountNotApproved)
    ));
    // No confirmation email was triggered by the earlier rejection
    assert_eq!(harness.gateway.sent_count(), 0);
}

#[tokio::test]
async fn test_unconfirmed_login_resends_with_cooldown() {
    let harness = harness();
    let mut account = ready_owner("ana@example.com");
    let account_id = account.id;
    account.email_confirmed = false;
    harness.store.save(account).await.unwrap();
    let mut session = AuthSession::new();

    let error = harness
        .service
        .login(&mut session, TEST_ADDRESS, "ana@example.com", TEST_PASSWORD, false)
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        DomainError::Auth(AuthError::EmailNotConfirmed)
    ));
    assert_eq!(harness.gateway.sent_count(), 1);

    let stored = harness.store.find_by_id(account_id).await.unwrap().unwrap();
    assert!(stored.confirmation_sent_at.is_some());

    // Within the cooldown the rejection repeats but nothing is resent
    harness
        .service
        .login(&mut session, TEST_ADDRESS, "ana@example.com", TEST_PASSWORD, false)
        .await
        .unwrap_err();
    assert_eq!(harness.gateway.sent_count(), 1);
}

#[tokio::test]
async fn test_redirects_by_role_and_membership() {
    let harness = harness();
    harness
        .store
        .save(super_admin("root@example.com"))
        .await
        .unwrap();
    let owner = ready_owner("ana@example.com");
    let workshop_id = owner.memberships[0].workshop_id;
    let store_id = owner.memberships[0].default_store_id;
    harness.store.save(owner).await.unwrap();
    let mut fresh = ready_owner("nuevo@example.com");
    fresh.memberships.clear();
    harness.store.save(fresh).await.unwrap();

    let mut session = AuthSession::new();
    let outcome = harness
        .service
        .login(&mut session, TEST_ADDRESS, "root@example.com", TEST_PASSWORD, false)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::Authenticated {
            redirect: PostLoginRedirect::AdminHome
        }
    );

    let mut session = AuthSession::new();
    let outcome = harness
        .service
        .login(&mut session, TEST_ADDRESS, "ana@example.com", TEST_PASSWORD, false)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::Authenticated {
            redirect: PostLoginRedirect::Dashboard {
                workshop_id,
                store_id,
            }
        }
    );
    assert_eq!(session.active_workshop_id, Some(workshop_id));
    assert_eq!(session.active_store_id, store_id);

    let mut session = AuthSession::new();
    let outcome = harness
        .service
        .login(&mut session, TEST_ADDRESS, "nuevo@example.com", TEST_PASSWORD, false)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::Authenticated {
            redirect: PostLoginRedirect::Onboarding
        }
    );
}

#[tokio::test]
async fn test_remember_me_marks_session_long_lived() {
    let harness = harness();
    harness
        .store
        .save(ready_owner("ana@example.com"))
        .await
        .unwrap();
    let mut session = AuthSession::new();

    harness
        .service
        .login(&mut session, TEST_ADDRESS, "ana@example.com", TEST_PASSWORD, true)
        .await
        .unwrap();
    assert!(session.is_authenticated());
    assert!(session.remember);
    assert!(session.long_lived);
}

#[tokio::test]
async fn test_logout_clears_session_state() {
    let harness = harness();
    harness
        .store
        .save(ready_owner("ana@example.com"))
        .await
        .unwrap();
    let mut session = AuthSession::new();
    harness
        .service
        .login(&mut session, TEST_ADDRESS, "ana@example.com", TEST_PASSWORD, true)
        .await
        .unwrap();
    session.pending_enrollment_secret = Some("JBSWY3DPEHPK3PXP".to_string());

    harness.service.logout(&mut session);
    assert_eq!(session, AuthSession::default());
}

#[tokio::test]
async fn test_register_creates_unapproved_unconfirmed_owner() {
    let harness = harness();
    let account = harness
        .service
        .register(crate::services::auth::RegisterRequest {
            full_name: "Nuevo Owner".to_string(),
            email: "nuevo-owner@example.com".to_string(),
            password: "Password1".to_string(),
            password_confirm: "Password1".to_string(),
        })
        .await
        .unwrap();

    assert!(!account.is_approved);
    assert!(account.approved_at.is_none());
    assert!(!account.email_confirmed);
    assert!(account.confirmation_sent_at.is_some());
    assert_eq!(harness.gateway.sent_count(), 1);

    // Immediate login with the correct password stops at the approval check
    let mut session = AuthSession::new();
    let error = harness
        .service
        .login(
            &mut session,
            TEST_ADDRESS,
            "nuevo-owner@example.com",
            "Password1",
            false,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        DomainError::Auth(AuthError::AccountNotApproved)
    ));
    assert!(session.pending_second_factor.is_none());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let harness = harness();
    harness
        .store
        .save(ready_owner("ana@example.com"))
        .await
        .unwrap();

    let error = harness
        .service
        .register(crate::services::auth::RegisterRequest {
            full_name: "Impostor".to_string(),
            email: "Ana@Example.com".to_string(),
            password: "Password1".to_string(),
            password_confirm: "Password1".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        DomainError::Auth(AuthError::EmailAlreadyRegistered)
    ));
}

#[tokio::test]
async fn test_register_enforces_password_policy() {
    let harness = harness();

    let weak = harness
        .service
        .register(crate::services::auth::RegisterRequest {
            full_name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "password1".to_string(),
            password_confirm: "password1".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(weak, DomainError::ValidationErr(_)));

    let mismatch = harness
        .service
        .register(crate::services::auth::RegisterRequest {
            full_name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "Password1".to_string(),
            password_confirm: "Password2".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(mismatch, DomainError::ValidationErr(_)));
}
