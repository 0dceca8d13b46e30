//! Email notification support
//!
//! The delivery channel is a collaborator behind [`NotificationGateway`];
//! [`Mailer`] composes the security emails (confirmation, password reset)
//! and enforces the "log, never raise" delivery policy.

mod mailer;
mod mock;
mod traits;

pub use mailer::{Mailer, MailerConfig};
pub use mock::{MockNotificationGateway, SentEmail};
pub use traits::NotificationGateway;
