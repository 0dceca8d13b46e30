//! Gateway trait for outbound email delivery

use async_trait::async_trait;

/// Email delivery gateway
///
/// Implementations talk to the actual mail infrastructure (SMTP relay,
/// provider API). A `false` return or an `Err` means the message was not
/// accepted for delivery; callers log that and carry on. No authentication
/// flow fails because an email could not be sent.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Deliver an email, returning whether it was accepted
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> Result<bool, String>;
}
