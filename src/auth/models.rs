//! Authentication Models
//! The single admin credential and the admin API payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed username of the one administrator.
pub const ADMIN_USERNAME: &str = "admin";

/// Stored admin credential. At most one row exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminCredential {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of the admin credential.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialState {
    /// No credential stored yet; the configured initial password applies.
    Uninitialized,
    Active(AdminCredential),
}

impl CredentialState {
    pub fn from_record(record: Option<AdminCredential>) -> Self {
        match record {
            Some(credential) => CredentialState::Active(credential),
            None => CredentialState::Uninitialized,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, CredentialState::Active(_))
    }
}

/// Successful outcome of a password change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordChange {
    /// First credential created directly with the new password.
    Set,
    /// Existing credential rotated.
    Changed,
}

impl PasswordChange {
    pub fn message(&self) -> &'static str {
        match self {
            PasswordChange::Set => "Password set successfully",
            PasswordChange::Changed => "Password changed successfully",
        }
    }
}

/// Credential lifecycle failures
#[derive(Debug)]
pub enum CredentialError {
    IncorrectCurrentPassword,
    PasswordUnchanged,
    Persistence(anyhow::Error),
}

impl CredentialError {
    /// Message safe to show the caller. Persistence detail stays in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            CredentialError::IncorrectCurrentPassword => "Current password is incorrect",
            CredentialError::PasswordUnchanged => {
                "New password must be different from current password"
            }
            CredentialError::Persistence(_) => "Failed to change password",
        }
    }
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::Persistence(err) => write!(f, "credential persistence failed: {err:#}"),
            other => write!(f, "{}", other.public_message()),
        }
    }
}

impl std::error::Error for CredentialError {}

impl From<anyhow::Error> for CredentialError {
    fn from(err: anyhow::Error) -> Self {
        CredentialError::Persistence(err)
    }
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// Password change request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Login / password change response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// Admin credential health report
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminHealthResponse {
    pub status: &'static str,
    pub admin_users_count: i64,
    pub timestamp: DateTime<Utc>,
}
