//! Authentication implementations.

mod jwt;
mod password;
mod token;

pub use jwt::{JwtConfig, JwtTokenService};
pub use password::Argon2PasswordService;
pub use token::one_time_token;
