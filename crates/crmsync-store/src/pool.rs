//! SQLite pool for the record and lead tables
//!
//! File databases run in WAL mode with a busy timeout. The in-memory
//! database lives in its single connection, so that connection is never
//! idled out or recycled.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::StoreError;

/// Schema scripts applied in order at open; each must be idempotent
const MIGRATIONS: &[(&str, &str)] = &[(
    "20260301_initial",
    include_str!("migrations/20260301_initial.sql"),
)];

const FILE_MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handle to the crmsync database
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Opens the database file at `db_path`, creating it and its directory
    /// if needed, and applies the schema
    pub async fn new(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(dir) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| {
                StoreError::ConnectionFailed(format!("cannot create {}: {e}", dir.display()))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(FILE_MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::ConnectionFailed(format!("cannot open {}: {e}", db_path.display()))
            })?;

        let db = Self::with_schema(pool).await?;
        tracing::info!(path = %db_path.display(), "Opened database");
        Ok(db)
    }

    /// Private in-memory database, used by tests
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::ConnectionFailed(format!("cannot open in-memory db: {e}")))?;

        Self::with_schema(pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn with_schema(pool: SqlitePool) -> Result<Self, StoreError> {
        for (name, sql) in MIGRATIONS {
            sqlx::raw_sql(sql)
                .execute(&pool)
                .await
                .map_err(|e| StoreError::MigrationFailed(format!("{name}: {e}")))?;
            tracing::debug!(migration = name, "Applied migration");
        }
        Ok(Self { pool })
    }
}
