//! Email delivery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::MailConfig;
use crate::{DriveError, Result};

/// Total timeout for one delivery request.
const SEND_TIMEOUT_SECS: u64 = 15;

/// A rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivers email messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Sends mail through a transactional email HTTP API.
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: String,
    from_address: String,
    from_name: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .map_err(|e| DriveError::Mail(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
        })
    }

    fn payload(&self, message: &EmailMessage) -> serde_json::Value {
        json!({
            "from": { "email": self.from_address, "name": self.from_name },
            "to": [{ "email": message.to }],
            "subject": message.subject,
            "html": message.html,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.payload(message))
            .send()
            .await
            .map_err(|e| DriveError::Mail(format!("failed to send email: {e}")))?;

        if !response.status().is_success() {
            return Err(DriveError::Mail(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        tracing::info!(to = %message.to, "Email sent");
        Ok(())
    }
}

/// Logs messages instead of delivering them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Mail delivery disabled, not sending email"
        );
        Ok(())
    }
}
