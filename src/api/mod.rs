pub mod error;
pub mod extract;
pub mod routes;

pub use error::{ApiError, FieldError};
pub use extract::ApiJson;
pub use routes::{cors_layer, create_router};

use crate::auth::{BearerTokenGate, CredentialService};
use crate::config::Config;
use crate::content::ContentStore;
use crate::middleware::{AttemptLimitConfig, AttemptLimiter};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialService>,
    pub content: Arc<ContentStore>,
    pub gate: Arc<BearerTokenGate>,
    pub attempt_limiter: Arc<AttemptLimiter>,
    pub environment: String,
}

impl AppState {
    pub fn new(
        config: &Config,
        credentials: Arc<CredentialService>,
        content: Arc<ContentStore>,
    ) -> Self {
        Self {
            credentials,
            content,
            gate: Arc::new(BearerTokenGate::new(&config.admin_token)),
            attempt_limiter: Arc::new(AttemptLimiter::new(AttemptLimitConfig::per_minute(
                config.login_rate_limit,
            ))),
            environment: config.environment.clone(),
        }
    }
}
