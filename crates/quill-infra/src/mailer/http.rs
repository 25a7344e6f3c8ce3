//! HTTP mail API delivery.
//!
//! Posts messages as JSON to a transactional mail provider's HTTP endpoint.
//! Delivery is fire-and-forget from the domain's point of view; a non-2xx
//! answer surfaces as a `MailError`.

use async_trait::async_trait;
use serde::Serialize;

use quill_core::ports::{Email, MailError, Mailer};

/// HTTP mail API configuration.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Mailer backed by an HTTP mail API.
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        let message = OutboundMessage {
            from: &self.config.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&message)
            .send()
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailError::Delivery(format!(
                "mail API returned {}",
                response.status()
            )));
        }

        tracing::debug!(subject = %email.subject, "Mail dispatched");
        Ok(())
    }
}
