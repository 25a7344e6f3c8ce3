//! Central error boundary.
//!
//! Every handler failure converges here and is rendered as the
//! `{ success: false, message }` envelope. Internal detail is logged
//! server-side; in production the client only sees a generic message, and
//! outside production the detail is passed through a redactor first.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use quill_shared::ErrorResponse;
use std::fmt;
use std::sync::OnceLock;

use quill_core::error::RepoError;
use quill_core::ports::AuthError;

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// Login failure. Deliberately identical for unknown email and wrong
    /// password.
    InvalidCredentials,
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                if is_production() {
                    "Internal server error".to_string()
                } else {
                    redact(detail)
                }
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse::new(message))
    }
}

fn is_production() -> bool {
    static PRODUCTION: OnceLock<bool> = OnceLock::new();
    *PRODUCTION.get_or_init(|| {
        std::env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false)
    })
}

/// Mask sensitive substrings in non-production error detail.
fn redact(detail: &str) -> String {
    const SENSITIVE: &[&str] = &["password", "secret", "token", "bearer ", "key"];

    let mut out = detail.to_string();

    // Connection strings: blank out from the scheme to the next whitespace.
    for scheme in ["postgres://", "postgresql://"] {
        while let Some(start) = find_ignore_ascii_case(&out, scheme) {
            let end = out[start..]
                .find(char::is_whitespace)
                .map(|i| start + i)
                .unwrap_or(out.len());
            out.replace_range(start..end, "[REDACTED]");
        }
    }

    for word in SENSITIVE {
        while let Some(start) = find_ignore_ascii_case(&out, word) {
            out.replace_range(start..start + word.len(), "[REDACTED]");
        }
    }

    out
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
///
/// Windows are taken on char boundaries of `haystack` itself, so the offset
/// is always valid for slicing even when the surrounding text is non-ASCII.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack.char_indices().find_map(|(i, _)| {
        haystack
            .get(i..i + needle.len())
            .filter(|window| window.eq_ignore_ascii_case(needle))
            .map(|_| i)
    })
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuth => {
                AppError::Unauthorized("Not authorized, no token".to_string())
            }
            AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                AppError::Unauthorized("Not authorized, token failed".to_string())
            }
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::InsufficientPermissions => {
                AppError::Forbidden("Forbidden: insufficient role".to_string())
            }
            AuthError::HashingError(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
