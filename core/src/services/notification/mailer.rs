//! Composition of the account-security emails

use std::sync::Arc;
use tracing::warn;

use crate::domain::entities::account::Account;

use super::traits::NotificationGateway;

/// Mailer configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// External base URL used to build links, without a trailing slash
    pub base_url: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:8080"),
        }
    }
}

/// Composes and dispatches the security emails
///
/// Delivery problems are logged and swallowed: from the caller's point of
/// view the flow always "succeeded", so responses cannot leak delivery
/// configuration or account existence.
pub struct Mailer<N: NotificationGateway> {
    gateway: Arc<N>,
    config: MailerConfig,
}

impl<N: NotificationGateway> Mailer<N> {
    pub fn new(gateway: Arc<N>, config: MailerConfig) -> Self {
        Self { gateway, config }
    }

    /// Send the email-confirmation link; returns whether delivery was accepted
    pub async fn send_confirmation_email(&self, account: &Account, token: &str) -> bool {
        let confirm_url = format!("{}/auth/confirm/{}", self.config.base_url, token);
        let text_body = format!(
            "Hola {},\n\nConfirma tu cuenta abriendo este enlace:\n{}\n\n\
             El enlace vence pronto. Si no creaste esta cuenta, ignora este correo.",
            account.full_name, confirm_url
        );
        let html_body = format!(
            "<p>Hola {},</p><p>Confirma tu cuenta haciendo clic en \
             <a href=\"{}\">este enlace</a>.</p>\
             <p>El enlace vence pronto. Si no creaste esta cuenta, ignora este correo.</p>",
            account.full_name, confirm_url
        );

        self.dispatch(
            &account.email,
            "Confirma tu cuenta",
            &text_body,
            Some(&html_body),
        )
        .await
    }

    /// Send the password-reset link; returns whether delivery was accepted
    pub async fn send_password_reset_email(&self, account: &Account, token: &str) -> bool {
        let reset_url = format!(
            "{}/reset-password/{}/{}",
            self.config.base_url, account.id, token
        );
        let text_body = format!(
            "Hola {},\n\nPara restablecer tu contrasena abre este enlace:\n{}\n\n\
             Si no solicitaste el cambio, ignora este correo.",
            account.full_name, reset_url
        );
        let html_body = format!(
            "<p>Hola {},</p><p>Para restablecer tu contrasena haz clic en \
             <a href=\"{}\">este enlace</a>.</p>\
             <p>Si no solicitaste el cambio, ignora este correo.</p>",
            account.full_name, reset_url
        );

        self.dispatch(
            &account.email,
            "Restablece tu contrasena",
            &text_body,
            Some(&html_body),
        )
        .await
    }

    async fn dispatch(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> bool {
        match self.gateway.send_email(to, subject, text_body, html_body).await {
            Ok(true) => true,
            Ok(false) => {
                warn!(subject, "Email was not accepted for delivery");
                false
            }
            Err(error) => {
                warn!(subject, error, "Email delivery failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::account::Role;
    use crate::services::notification::MockNotificationGateway;

    fn mailer_with_gateway() -> (Mailer<MockNotificationGateway>, Arc<MockNotificationGateway>) {
        let gateway = Arc::new(MockNotificationGateway::new());
        let mailer = Mailer::new(
            Arc::clone(&gateway),
            MailerConfig {
                base_url: String::from("https://app.velotaller.test"),
            },
        );
        (mailer, gateway)
    }

    #[tokio::test]
    async fn test_confirmation_email_contains_link() {
        let (mailer, gateway) = mailer_with_gateway();
        let account = Account::new("ana@example.com", "Ana", Role::Owner);

        let delivered = mailer.send_confirmation_email(&account, "tok123").await;
        assert!(delivered);

        let sent = gateway.last_sent().unwrap();
        assert_eq!(sent.to, "ana@example.com");
        assert!(sent
            .text_body
            .contains("https://app.velotaller.test/auth/confirm/tok123"));
        assert!(sent.html_body.is_some());
    }

    #[tokio::test]
    async fn test_reset_email_contains_id_and_token() {
        let (mailer, gateway) = mailer_with_gateway();
        let account = Account::new("ana@example.com", "Ana", Role::Owner);

        mailer.send_password_reset_email(&account, "tok456").await;

        let sent = gateway.last_sent().unwrap();
        assert!(sent
            .text_body
            .contains(&format!("/reset-password/{}/tok456", account.id)));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let gateway = Arc::new(MockNotificationGateway::failing());
        let mailer = Mailer::new(Arc::clone(&gateway), MailerConfig::default());
        let account = Account::new("ana@example.com", "Ana", Role::Owner);

        let delivered = mailer.send_confirmation_email(&account, "tok").await;
        assert!(!delivered);
        assert_eq!(gateway.sent_count(), 1);
    }
}
