//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CommentRepository, Mailer, PasswordService, PostRepository, TokenService, UserRepository,
};
use quill_infra::{
    Argon2PasswordService, HttpMailer, InMemoryCommentRepository, InMemoryPostRepository,
    InMemoryUserRepository, JwtConfig, JwtTokenService, LogMailer,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub mailer: Arc<dyn Mailer>,
    /// Base URL for links embedded in outbound emails.
    pub frontend_url: String,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let mailer: Arc<dyn Mailer> = match &config.mail {
            Some(mail) => Arc::new(HttpMailer::new(mail.clone())),
            None => {
                tracing::warn!("MAIL_API_URL not set - outbound mail will only be logged");
                Arc::new(LogMailer)
            }
        };

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            match quill_infra::connect(db_config).await {
                Ok(conn) => {
                    let conn = Arc::new(conn);
                    return Self {
                        users: Arc::new(quill_infra::PostgresUserRepository::new(conn.clone())),
                        posts: Arc::new(quill_infra::PostgresPostRepository::new(conn.clone())),
                        comments: Arc::new(quill_infra::PostgresCommentRepository::new(conn)),
                        tokens,
                        passwords,
                        mailer,
                        frontend_url: config.frontend_url.clone(),
                    };
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            comments: Arc::new(InMemoryCommentRepository::new()),
            tokens,
            passwords,
            mailer,
            frontend_url: config.frontend_url.clone(),
        }
    }

    /// In-memory state for tests: memory repositories, a recording mailer
    /// and the given token configuration.
    pub fn in_memory(jwt: JwtConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            comments: Arc::new(InMemoryCommentRepository::new()),
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
            mailer,
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}
