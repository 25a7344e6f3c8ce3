//! In-memory mailer - records sent messages for inspection in tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use quill_core::ports::{Email, MailError, Mailer};

/// Mailer that stores every message it is asked to deliver.
#[derive(Clone, Default)]
pub struct InMemoryMailer {
    sent: Arc<RwLock<Vec<Email>>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far.
    pub async fn sent(&self) -> Vec<Email> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        self.sent.write().await.push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sent_messages() {
        let mailer = InMemoryMailer::new();
        mailer
            .send(Email {
                to: "a@example.com".to_string(),
                subject: "Hi".to_string(),
                html: "<p>Hello</p>".to_string(),
            })
            .await
            .unwrap();

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@example.com");
    }
}
