use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role for route authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Parse a role from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// User entity - a registered account.
///
/// The password is only ever stored hashed. Verification and reset tokens are
/// one-time values: cleared as soon as they are consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub reset_password_token: Option<String>,
    pub reset_password_expires: Option<DateTime<Utc>>,
    pub avatar: String,
    pub bio: String,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new unverified user with a pending verification token.
    pub fn new(name: String, email: String, password_hash: String, verification_token: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role: Role::User,
            is_verified: false,
            verification_token: Some(verification_token),
            reset_password_token: None,
            reset_password_expires: None,
            avatar: String::new(),
            bio: String::new(),
            joined_at: now,
            updated_at: now,
        }
    }

    /// Consume the verification token, marking the account verified.
    pub fn verify(&mut self) {
        self.is_verified = true;
        self.verification_token = None;
        self.updated_at = Utc::now();
    }

    /// Arm a password reset: single-use token with an expiry window.
    pub fn request_password_reset(&mut self, token: String, expires: DateTime<Utc>) {
        self.reset_password_token = Some(token);
        self.reset_password_expires = Some(expires);
        self.updated_at = Utc::now();
    }

    /// Whether the stored reset token is present and not yet expired.
    /// Expiry is strict: a token expiring exactly now is rejected.
    pub fn reset_token_valid(&self, now: DateTime<Utc>) -> bool {
        match (&self.reset_password_token, self.reset_password_expires) {
            (Some(_), Some(expires)) => expires > now,
            _ => false,
        }
    }

    /// Replace the password and clear the reset token state.
    pub fn consume_password_reset(&mut self, new_password_hash: String) {
        self.password_hash = new_password_hash;
        self.reset_password_token = None;
        self.reset_password_expires = None;
        self.updated_at = Utc::now();
    }
}
