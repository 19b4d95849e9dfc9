use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use marketing_cms::config::{self, AppConfig};
use marketing_cms::database::DatabaseManager;
use marketing_cms::services::AccountService;
use marketing_cms::store::{MemoryStore, PgStore};
use marketing_cms::{app, is_production, AppState};

const DEV_ADMIN_EMAIL: &str = "admin@example.com";
const DEV_ADMIN_PASSWORD: &str = "change-me-please";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();
    tracing::info!("Starting Marketing CMS in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        anyhow::bail!("JWT_SECRET is empty; set it in the environment or .env");
    }

    let in_memory = std::env::args().any(|a| a == "--memory")
        || std::env::var("CMS_STORE").map(|v| v.eq_ignore_ascii_case("memory")).unwrap_or(false);

    let state = if in_memory {
        memory_state(config).await?
    } else {
        postgres_state(config).await?
    };

    let port = state.config.api.port;
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Marketing CMS listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn postgres_state(config: AppConfig) -> anyhow::Result<AppState> {
    let pool = DatabaseManager::connect(&config.database).await?;

    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }

    Ok(AppState::new(config, PgStore::new(pool)))
}

/// Non-persistent store seeded with an administrator, for local development
async fn memory_state(config: AppConfig) -> anyhow::Result<AppState> {
    if is_production!() {
        anyhow::bail!("The in-memory store is not available in production");
    }

    let state = AppState::new(config, MemoryStore::new());

    let email = std::env::var("CMS_DEV_ADMIN_EMAIL").unwrap_or_else(|_| DEV_ADMIN_EMAIL.to_string());
    let password = std::env::var("CMS_DEV_ADMIN_PASSWORD").unwrap_or_else(|_| DEV_ADMIN_PASSWORD.to_string());

    AccountService::new(Arc::clone(&state.accounts), state.config.security.min_password_length)
        .bootstrap_admin("Administrator", &email, &password)
        .await?;

    tracing::warn!("Using the in-memory store; data is lost on exit. Admin login: {}", email);
    Ok(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
