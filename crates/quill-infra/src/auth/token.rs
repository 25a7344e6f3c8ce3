//! One-time token generation for email verification and password resets.

use rand::{RngCore, rngs::OsRng};

/// Generate a 32-byte cryptographically secure random token, hex encoded.
pub fn one_time_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_hex() {
        let a = one_time_token();
        let b = one_time_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
