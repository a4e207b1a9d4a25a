//! Authentication Module
//! Admin credential lifecycle, password hashing and the bearer token gate

pub mod api;
pub mod credential;
pub mod middleware;
pub mod models;
pub mod password;
pub mod store;
pub mod token_gate;

pub use api::admin_router;
pub use credential::CredentialService;
pub use middleware::admin_token_middleware;
pub use models::{AdminCredential, CredentialError, CredentialState, PasswordChange};
pub use password::PasswordHasher;
pub use store::{CredentialStore, MemoryCredentialStore, SqliteCredentialStore};
pub use token_gate::{BearerTokenGate, GateError};
