//! Outcomes of the login flow.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where to send the user after a fully successful login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostLoginRedirect {
    /// Platform operators land on the admin dashboard
    AdminHome,
    /// Regular users land on the main dashboard with a tenant selected
    Dashboard {
        workshop_id: Uuid,
        store_id: Option<Uuid>,
    },
    /// Approved account without any workshop yet
    Onboarding,
}

/// Result of a login attempt that was not rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Password accepted; a TOTP code is still required
    TwoFactorRequired,
    /// Session established
    Authenticated { redirect: PostLoginRedirect },
}
