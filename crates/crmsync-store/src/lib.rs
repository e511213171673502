//! crmsync Store - SQLite persistence
//!
//! SQLite-backed storage for:
//! - Synced records (one per owner and remote id)
//! - Leads and their call state
//!
//! ## Architecture
//!
//! This crate implements the `IRecordStore` and `ILeadRepository` ports from
//! `crmsync-core`. It is a driven (secondary) adapter in the hexagonal
//! architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteRecordStore`] - `IRecordStore` implementation
//! - [`SqliteLeadRepository`] - `ILeadRepository` implementation
//! - [`StoreError`] - Error types for store operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use crmsync_store::{DatabasePool, SqliteRecordStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/var/lib/crmsync/crmsync.db")).await?;
//! let store = SqliteRecordStore::new(pool.pool().clone());
//! // Use store as IRecordStore...
//! # Ok(())
//! # }
//! ```

pub mod leads;
pub mod pool;
pub mod records;
mod rows;

pub use leads::SqliteLeadRepository;
pub use pool::DatabasePool;
pub use records::SqliteRecordStore;

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization or deserialization of domain types failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An update targeted a row that does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
