//! Business services containing domain logic and use cases.

pub mod auth;
pub mod notification;
pub mod token;
pub mod two_factor;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig, LockoutPolicy, LoginRateLimiter, RegisterRequest};
pub use notification::{Mailer, MailerConfig, MockNotificationGateway, NotificationGateway};
pub use token::{TokenService, TokenServiceConfig};
pub use two_factor::{EnrollmentSetup, TwoFactorService};
