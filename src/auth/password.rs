//! Password Hashing
//! Salted bcrypt hashing with a fixed work factor

use crate::config::BCRYPT_COST;
use anyhow::{Context, Result};
use bcrypt::{hash, verify};

/// bcrypt hasher bound to one work factor for its whole lifetime.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    /// Hasher using the production work factor.
    pub fn new() -> Self {
        Self { cost: BCRYPT_COST }
    }

    /// Hasher with an explicit work factor (tests use the bcrypt minimum of 4).
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash with a freshly generated salt.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        hash(plaintext, self.cost).context("Failed to hash password")
    }

    /// Check a plaintext against a stored hash using bcrypt's own verify.
    pub fn verify(&self, plaintext: &str, password_hash: &str) -> Result<bool> {
        verify(plaintext, password_hash).context("Failed to verify password")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::with_cost(4);
        let hashed = hasher.hash("correct horse").unwrap();

        assert!(hashed.starts_with("$2"));
        assert!(hasher.verify("correct horse", &hashed).unwrap());
        assert!(!hasher.verify("battery staple", &hashed).unwrap());
    }

    #[test]
    fn test_fresh_salt_per_hash() {
        let hasher = PasswordHasher::with_cost(4);
        let a = hasher.hash("same-password").unwrap();
        let b = hasher.hash("same-password").unwrap();

        assert_ne!(a, b);
        assert!(hasher.verify("same-password", &a).unwrap());
        assert!(hasher.verify("same-password", &b).unwrap());
    }

    #[test]
    fn test_production_cost() {
        assert_eq!(PasswordHasher::new().cost(), BCRYPT_COST);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hasher = PasswordHasher::with_cost(4);
        assert!(hasher.verify("anything", "not-a-bcrypt-hash").is_err());
    }
}
