//! Record store port (driven/secondary port)
//!
//! Persistence gateway for synced records, keyed by `(owner, external_id)`.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific.
//! - Lookups are by id set so a whole chunk can be classified with one call.
//! - There is no batched update primitive; updates are applied one record
//!   at a time.

use std::collections::HashMap;

use crate::domain::{
    newtypes::{ExternalId, OwnerId, RecordId},
    NewRecord, PersistedRecord, RecordUpdate,
};

/// Filter criteria for listing records
///
/// `path_prefix` matches a record whose path starts with the given segments
/// (the prefix item itself included).
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub path_prefix: Option<Vec<String>>,
    pub containers_only: bool,
}

impl RecordFilter {
    /// Creates a new empty filter (matches all of an owner's records)
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path prefix filter
    pub fn with_path_prefix(mut self, segments: Vec<String>) -> Self {
        self.path_prefix = Some(segments);
        self
    }

    /// Only return container records
    pub fn containers_only(mut self) -> Self {
        self.containers_only = true;
        self
    }
}

/// Port trait for synced-record persistence
///
/// ## Implementation Notes
///
/// - Implementations must enforce at most one record per
///   `(owner, external_id)`.
/// - `insert_records` should be atomic per call.
#[async_trait::async_trait]
pub trait IRecordStore: Send + Sync {
    /// Returns the record id of every existing record of `owner` whose
    /// external id is in `external_ids`
    async fn find_record_ids(
        &self,
        owner: &OwnerId,
        external_ids: &[ExternalId],
    ) -> anyhow::Result<HashMap<ExternalId, RecordId>>;

    /// Inserts all records in one call
    ///
    /// A record whose `(owner, external_id)` already exists (for example,
    /// written by an overlapping run since the lookup) is updated in place
    /// and keeps its original record id and creation time.
    async fn insert_records(&self, records: &[NewRecord]) -> anyhow::Result<()>;

    /// Updates one record in place
    async fn update_record(&self, update: &RecordUpdate) -> anyhow::Result<()>;

    /// Retrieves a record by its dedup key
    async fn get_record(
        &self,
        owner: &OwnerId,
        external_id: &ExternalId,
    ) -> anyhow::Result<Option<PersistedRecord>>;

    /// Lists an owner's records ordered by path
    async fn list_records(
        &self,
        owner: &OwnerId,
        filter: &RecordFilter,
    ) -> anyhow::Result<Vec<PersistedRecord>>;
}
