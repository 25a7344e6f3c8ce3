//! Outbound email port. Delivery is an external collaborator; the
//! application only hands over a recipient, a subject and an HTML body.

use async_trait::async_trait;

/// An outbound message.
#[derive(Debug, Clone)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Mailer trait - abstraction over delivery backends.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

/// Mail delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}
