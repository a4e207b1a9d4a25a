//! Process Configuration
//! Loaded once at startup (flags or environment) and handed to constructors.

use anyhow::{bail, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::warn;

/// bcrypt work factor for every stored admin hash.
pub const BCRYPT_COST: u32 = 10;

/// Bootstrap password used when `INITIAL_ADMIN_PASSWORD` is not configured.
/// Known weak; refused when running in production.
pub const DEFAULT_INITIAL_ADMIN_PASSWORD: &str = "150703";

/// Minimum length accepted for a new admin password.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Parser, Debug, Clone)]
#[command(name = "folio")]
#[command(about = "Portfolio backend - public content API and operator admin surface")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "FOLIO_BIND_ADDR", default_value = "0.0.0.0:3001")]
    pub bind_addr: SocketAddr,

    /// SQLite database file (relative paths resolve against the crate root)
    #[arg(long, env = "FOLIO_DB_PATH", default_value = "folio.db")]
    pub db_path: String,

    /// Static bearer secret protecting administrative routes
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: String,

    /// Password that bootstraps the admin credential on first use
    #[arg(long, env = "INITIAL_ADMIN_PASSWORD", hide_env_values = true)]
    pub initial_admin_password: Option<String>,

    /// Deployment environment ("development", "production", ...)
    #[arg(long, env = "FOLIO_ENV", default_value = "development")]
    pub environment: String,

    /// Allowed CORS origin; permissive CORS when unset
    #[arg(long, env = "FRONTEND_URL")]
    pub frontend_url: Option<String>,

    /// Password attempts allowed per client IP per minute
    #[arg(long, env = "FOLIO_LOGIN_RATE_LIMIT", default_value = "10")]
    pub login_rate_limit: u32,
}

impl Config {
    /// Build a config with defaults for everything except the admin token.
    pub fn new(admin_token: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            db_path: "folio.db".to_string(),
            admin_token: admin_token.into(),
            initial_admin_password: None,
            environment: "development".to_string(),
            frontend_url: None,
            login_rate_limit: 10,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Reject configurations that would start an insecure or unusable server.
    pub fn validate(&self) -> Result<()> {
        if self.admin_token.trim().is_empty() {
            bail!("ADMIN_TOKEN must not be empty");
        }

        match self.initial_admin_password.as_deref() {
            Some(p) if p.len() < MIN_PASSWORD_LEN => {
                bail!(
                    "INITIAL_ADMIN_PASSWORD must be at least {} characters",
                    MIN_PASSWORD_LEN
                );
            }
            None if self.is_production() => {
                bail!("INITIAL_ADMIN_PASSWORD must be set when FOLIO_ENV=production");
            }
            _ => {}
        }

        if self.login_rate_limit == 0 {
            bail!("FOLIO_LOGIN_RATE_LIMIT must be greater than zero");
        }

        Ok(())
    }

    /// Password used to bootstrap the admin credential.
    pub fn initial_password(&self) -> String {
        match self.initial_admin_password.as_deref() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => {
                warn!("INITIAL_ADMIN_PASSWORD not set, falling back to the built-in default");
                DEFAULT_INITIAL_ADMIN_PASSWORD.to_string()
            }
        }
    }

    /// Absolute database path. Relative paths are taken relative to the
    /// crate root rather than the caller's cwd.
    pub fn resolved_db_path(&self) -> String {
        let p = PathBuf::from(self.db_path.trim());
        if p.is_absolute() {
            return p.to_string_lossy().to_string();
        }

        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join(p)
            .to_string_lossy()
            .to_string()
    }
}
