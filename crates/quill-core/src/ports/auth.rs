//! Authentication ports: token issuance/verification and password hashing.

use uuid::Uuid;

use crate::domain::{Role, User};

/// Claims carried by a session token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub role: Role,
    pub verified: bool,
    pub exp: i64,
}

/// Token service for signed, time-limited session tokens.
pub trait TokenService: Send + Sync {
    /// Issue a token embedding the user's id, role and verification flag.
    fn generate_token(&self, user: &User) -> Result<String, AuthError>;

    /// Verify the signature and expiry, returning the embedded claims.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
