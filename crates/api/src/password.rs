//! Password hashing (Argon2id).
//!
//! A collaborator of the authorization core: the core never sees plaintext
//! or hashes, only this module's verdicts.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password")]
    Hash,
}

/// Stateless Argon2id hasher with library defaults.
#[derive(Default)]
pub struct Passwords {
    argon: Argon2<'static>,
}

impl Passwords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|_| PasswordError::Hash)?;
        Ok(hash.to_string())
    }

    /// Constant-time verification. An unparseable stored hash verifies as
    /// false rather than erroring; the caller cannot distinguish it from a
    /// wrong password, which is the point.
    pub fn verify(&self, plain: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        self.argon.verify_password(plain.as_bytes(), &parsed).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let passwords = Passwords::new();
        let hash = passwords.hash("s3cret-password").unwrap();

        assert!(passwords.verify("s3cret-password", &hash));
        assert!(!passwords.verify("wrong-password", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let passwords = Passwords::new();
        let a = passwords.hash("same").unwrap();
        let b = passwords.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_stored_hash_never_verifies() {
        let passwords = Passwords::new();
        assert!(!passwords.verify("anything", "not-a-phc-string"));
    }
}
