//! # Password Hashing
//!
//! Argon2id PHC strings for customer credentials and configured staff
//! accounts. Plain-text passwords are never stored or compared.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::{ShopError, ShopResult};

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str) -> ShopResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ShopError::Password(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verifies `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("solar123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("solar123", &hash));
        assert!(!verify_password("solar124", &hash));
    }

    #[test]
    fn test_same_password_different_salt() {
        let a = hash_password("solar123").unwrap();
        let b = hash_password("solar123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-hash"));
        assert!(!verify_password("", ""));
    }
}
