//! Folio - portfolio backend
//! Serves the public portfolio content and the operator admin surface

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_backend::{
    api::{cors_layer, create_router, AppState},
    auth::{CredentialService, SqliteCredentialStore},
    config::Config,
    content::ContentStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::parse();
    config.validate()?;

    info!(
        "🚀 Folio backend starting (environment: {})",
        config.environment
    );

    let db_path = config.resolved_db_path();
    let credential_store = Arc::new(SqliteCredentialStore::new(&db_path)?);
    let content = Arc::new(ContentStore::new(&db_path)?);
    info!("🗄️ Database ready at: {}", db_path);

    let credentials = Arc::new(CredentialService::from_config(&config, credential_store));
    {
        let credentials = credentials.clone();
        tokio::task::spawn_blocking(move || credentials.initialize_admin())
            .await
            .context("Admin initialization task failed")?;
    }

    let state = AppState::new(&config, credentials, content);

    // Forget idle clients so the limiter map stays small.
    let limiter = state.attempt_limiter.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            limiter.prune();
        }
    });

    if config.frontend_url.is_none() {
        warn!("FRONTEND_URL not set, CORS is permissive");
    }
    let app = create_router(state).layer(cors_layer(config.frontend_url.as_deref())?);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("👋 Server stopped");
    Ok(())
}

/// Initialize tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_backend=debug,folio=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate-root .env when launched from elsewhere
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let candidates = [manifest_dir.join(".env"), manifest_dir.join("../.env")];

    for p in candidates {
        if p.exists() {
            let _ = dotenv::from_path(&p);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
