//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! database repositories, token/password services, mail delivery and
//! rate limiting.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM. Without it
//!   the in-memory repositories are the only persistence backend.

pub mod auth;
pub mod database;
pub mod mailer;
pub mod rate_limit;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService, one_time_token};
pub use database::{InMemoryCommentRepository, InMemoryPostRepository, InMemoryUserRepository};
pub use mailer::{HttpMailer, InMemoryMailer, LogMailer, MailConfig};
pub use rate_limit::{KeyedRateLimiter, RateLimitConfig};

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
    connect,
};
