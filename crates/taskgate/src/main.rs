//! Taskgate - task tracking API with role-based access control

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod bootstrap;
mod config;

use config::Config;
use taskgate_api::{AppState, cors_layer, create_router};
use taskgate_auth::JwtManager;
use taskgate_db::{Database, Store};

/// Taskgate - task tracking API with role-based access control
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "TASKGATE_CONFIG", default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "TASKGATE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "TASKGATE_PORT")]
    port: Option<u16>,

    /// Database URL
    #[arg(long, env = "TASKGATE_DATABASE_URL")]
    database_url: Option<String>,

    /// Token signing secret
    #[arg(long, env = "TASKGATE_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Password for the initial admin account
    #[arg(long, env = "TASKGATE_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

impl Args {
    /// Command line and environment values take precedence over the file
    fn apply(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.server.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(secret) = self.jwt_secret {
            config.auth.jwt_secret = Some(secret);
        }
        if let Some(password) = self.admin_password {
            config.bootstrap.admin_password = Some(password);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.clone();
    let loaded = Config::load(&config_path)?;
    let from_file = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    args.apply(&mut config);

    // Initialize logging
    init_logging(&config.logging.level, &config.logging.format);

    if from_file {
        info!("Loaded configuration from {}", config_path);
    } else {
        info!("Config file not found at {}, using defaults", config_path);
    }

    config.validate()?;

    info!("Starting Taskgate v{}", env!("CARGO_PKG_VERSION"));

    // Create data directory for file-backed SQLite
    if let Some(parent) = sqlite_parent_dir(&config.database.url) {
        tokio::fs::create_dir_all(&parent)
            .await
            .with_context(|| format!("Failed to create data directory: {}", parent))?;
    }

    // Initialize database
    let db = Database::new(&config.database.url).await?;

    bootstrap::ensure_admin(&db, &config.bootstrap).await?;

    // Install metrics recorder
    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install metrics recorder")?;
        Some(Arc::new(handle))
    } else {
        None
    };

    // Initialize JWT manager
    let jwt = Arc::new(JwtManager::new(
        config.jwt_secret()?,
        config.auth.token_expiry_hours,
    ));

    // Create application state
    let store: Arc<dyn Store> = Arc::new(db);
    let state = AppState::new(store, jwt);

    // Create router
    let cors = cors_layer(&config.cors.allowed_origins)?;
    let app = create_router(state, metrics_handle, cors).layer(TraceLayer::new_for_http());

    // Determine bind address
    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address: {}:{}",
                config.server.bind_address, config.server.port
            )
        })?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Directory holding the database file, if the URL names one
fn sqlite_parent_dir(url: &str) -> Option<String> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path == ":memory:" {
        return None;
    }

    let parent = std::path::Path::new(path).parent()?;
    let parent = parent.to_str()?;
    if parent.is_empty() {
        None
    } else {
        Some(parent.to_string())
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
