//! Mock notification gateway for testing

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::traits::NotificationGateway;

/// A captured outbound email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
}

/// Recording gateway; optionally simulates delivery failure
pub struct MockNotificationGateway {
    pub sent: Arc<Mutex<Vec<SentEmail>>>,
    accept_delivery: bool,
}

impl MockNotificationGateway {
    /// Gateway that accepts everything
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            accept_delivery: true,
        }
    }

    /// Gateway that records sends but reports delivery failure
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            accept_delivery: false,
        }
    }

    /// Number of emails handed to the gateway so far
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Last email handed to the gateway, if any
    pub fn last_sent(&self) -> Option<SentEmail> {
        self.sent.lock().unwrap().last().cloned()
    }
}

impl Default for MockNotificationGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationGateway for MockNotificationGateway {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> Result<bool, String> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            text_body: text_body.to_string(),
            html_body: html_body.map(str::to_string),
        });
        Ok(self.accept_delivery)
    }
}
