//! crmsync Daemon - HTTP service
//!
//! Loads configuration, opens the SQLite store, builds the Drive client and
//! serves the sync trigger and call-event webhook until SIGTERM/SIGINT.
//!
//! Configuration is read from `$CRMSYNC_CONFIG` when set, otherwise from
//! the platform default path. `CRMSYNC_*` environment variables override
//! file values; `RUST_LOG` overrides `logging.level`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use crmsync_core::config::{Config, LogFormat};
use crmsync_core::usecases::{HandleCallEventUseCase, ReconcileFolderUseCase};
use crmsync_drive::{DriveClient, GoogleDriveTreeSource};
use crmsync_store::{DatabasePool, SqliteLeadRepository, SqliteRecordStore};
use crmsync_webhook::{AppState, WebhookServer};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable naming an explicit config file
const ENV_CONFIG: &str = "CRMSYNC_CONFIG";

// ============================================================================
// Configuration
// ============================================================================

fn config_path() -> PathBuf {
    std::env::var_os(ENV_CONFIG)
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path)
}

/// Loads, overrides and validates the configuration
///
/// A missing file yields defaults; an unreadable or invalid one is an error.
fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        Config::load(path).with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        Config::default()
    };
    config.apply_env_overrides();

    config.ensure_valid()?;
    Ok(config)
}

fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

// ============================================================================
// Wiring
// ============================================================================

/// Builds the shared request state from configuration and an open pool
fn build_state(config: &Config, pool: &DatabasePool) -> Result<Arc<AppState>> {
    let client = DriveClient::from_config(&config.drive, config.sync.page_size)?;
    let tree_source = Arc::new(GoogleDriveTreeSource::new(client));
    let records = Arc::new(SqliteRecordStore::new(pool.pool().clone()));
    let leads = Arc::new(SqliteLeadRepository::new(pool.pool().clone()));

    let reconcile =
        ReconcileFolderUseCase::new(tree_source, records).with_batch_size(config.sync.batch_size);
    let call_events = HandleCallEventUseCase::new(leads);

    Ok(AppState::new(reconcile, call_events))
}

// ============================================================================
// Graceful shutdown
// ============================================================================

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let path = config_path();
    let config = load_config(&path)?;
    init_tracing(&config);

    info!(config = %path.display(), "crmsync daemon starting (crmsyncd)");

    let pool = DatabasePool::new(&config.store.database_path)
        .await
        .with_context(|| {
            format!(
                "Failed to open database {}",
                config.store.database_path.display()
            )
        })?;
    let state = build_state(&config, &pool)?;

    let server = WebhookServer::bind(state, config.listen_addr()?).await?;

    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let result = server.run(shutdown_token).await;

    match &result {
        Ok(()) => info!("crmsync daemon shut down gracefully"),
        Err(e) => error!(error = %e, "crmsync daemon exiting with error"),
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
