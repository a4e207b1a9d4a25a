//! Bearer Token Gate
//! Stateless check of the static admin token carried in `Authorization`

use sha2::{Digest, Sha256};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Compares presented bearer tokens against the configured secret.
/// Only the SHA-256 digest of the secret is kept; digests are compared so
/// the comparison time does not depend on how much of the token matched.
#[derive(Clone)]
pub struct BearerTokenGate {
    secret_digest: [u8; 32],
}

impl BearerTokenGate {
    pub fn new(secret: &str) -> Self {
        Self {
            secret_digest: Sha256::digest(secret.as_bytes()).into(),
        }
    }

    /// Allow or reject based on the raw `Authorization` header value.
    pub fn check(&self, auth_header: Option<&str>) -> Result<(), GateError> {
        let token = auth_header
            .and_then(|h| h.strip_prefix(BEARER_PREFIX))
            .ok_or(GateError::Unauthenticated)?;

        let presented: [u8; 32] = Sha256::digest(token.as_bytes()).into();
        if presented != self.secret_digest {
            return Err(GateError::Forbidden);
        }

        Ok(())
    }
}

/// Gate rejections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// Header missing or not using the Bearer scheme
    Unauthenticated,
    /// Bearer token present but wrong
    Forbidden,
}

impl std::fmt::Display for GateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateError::Unauthenticated => write!(f, "Missing or malformed Authorization header"),
            GateError::Forbidden => write!(f, "Invalid admin token"),
        }
    }
}

impl std::error::Error for GateError {}
