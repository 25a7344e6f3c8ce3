//! Logging mailer - used when no mail API is configured.

use async_trait::async_trait;

use quill_core::ports::{Email, MailError, Mailer};

/// Mailer that only logs the message. Development fallback.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Mail API not configured - logging message instead of sending"
        );
        Ok(())
    }
}
