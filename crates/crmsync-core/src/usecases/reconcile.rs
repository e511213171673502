//! Folder reconciliation use case
//!
//! Walks a remote folder tree, flattens it into [`SyncedItem`]s tagged with
//! their full path, and upserts them into the record store keyed by
//! `(owner, external_id)`.
//!
//! ## Walk
//!
//! Depth-first pre-order: a container's entry precedes all of its
//! descendants, and a container's subfolders (with their subtrees) precede
//! its own files. Per container the folder and file listings are requested
//! concurrently. A failed listing skips that container's children only.
//!
//! ## Persistence
//!
//! The flat list is processed in fixed-size chunks: one bulk lookup, one
//! update call per existing record, one bulk insert. The first failing
//! chunk aborts the run; earlier chunks stay committed.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        newtypes::{DriveId, ExternalId, ItemPath, OwnerId},
        DomainError, NewRecord, RecordUpdate, SyncedItem,
    },
    ports::{IRecordStore, IRemoteTreeSource, RemoteEntry},
};

/// Default number of items per persistence chunk
pub const DEFAULT_BATCH_SIZE: usize = 50;

// ============================================================================
// Request / result types
// ============================================================================

/// What to reconcile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    /// Remote id of the folder to walk (never emitted itself)
    pub root_container_id: ExternalId,
    /// Drive the folder lives in
    pub drive_id: DriveId,
    /// First path segment of every produced item
    pub root_label: String,
}

impl ReconcileRequest {
    pub fn new(
        root_container_id: ExternalId,
        drive_id: DriveId,
        root_label: impl Into<String>,
    ) -> Self {
        Self {
            root_container_id,
            drive_id,
            root_label: root_label.into(),
        }
    }
}

/// Summary of a completed reconciliation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    /// Items discovered (inserted + updated)
    pub synced_count: usize,
    /// Items that created a new record
    pub inserted: usize,
    /// Items that updated an existing record
    pub updated: usize,
}

/// Errors that abort a reconciliation run
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The request itself is unusable (e.g. blank root label)
    #[error("invalid reconcile request: {0}")]
    InvalidRequest(#[from] DomainError),

    /// A chunk lookup or write failed; later chunks were not attempted
    #[error(
        "persistence failed after {committed_chunks} chunk(s) ({discovered} item(s) discovered): {source}"
    )]
    Persistence {
        discovered: usize,
        committed_chunks: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl ReconcileError {
    /// Number of items the walk discovered before the run was aborted
    pub fn discovered(&self) -> usize {
        match self {
            ReconcileError::InvalidRequest(_) => 0,
            ReconcileError::Persistence { discovered, .. } => *discovered,
        }
    }
}

// ============================================================================
// Walk frames
// ============================================================================

/// Pending work on the explicit walk stack
enum Frame {
    /// List the children of a container without emitting it (the root)
    Expand { id: ExternalId, path: ItemPath },
    /// Emit a child container, then expand it
    Container { entry: RemoteEntry, parent: ItemPath },
    /// Emit a container's files once its subfolders are done
    Leaves {
        entries: Vec<RemoteEntry>,
        parent: ItemPath,
    },
}

// ============================================================================
// ReconcileFolderUseCase
// ============================================================================

/// Use case that mirrors a remote folder tree into the record store
pub struct ReconcileFolderUseCase {
    tree_source: Arc<dyn IRemoteTreeSource + Send + Sync>,
    record_store: Arc<dyn IRecordStore + Send + Sync>,
    batch_size: usize,
}

impl ReconcileFolderUseCase {
    /// Creates the use case with the default chunk size
    pub fn new(
        tree_source: Arc<dyn IRemoteTreeSource + Send + Sync>,
        record_store: Arc<dyn IRecordStore + Send + Sync>,
    ) -> Self {
        Self {
            tree_source,
            record_store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Overrides the chunk size (values below 1 are treated as 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Walks the tree and persists every discovered item
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Persistence` if a chunk lookup or write
    /// fails. Listing failures are logged and never returned.
    pub async fn execute(
        &self,
        request: &ReconcileRequest,
        owner: &OwnerId,
    ) -> Result<SyncResult, ReconcileError> {
        let root_path = ItemPath::root(request.root_label.clone())?;

        info!(
            root = %request.root_container_id,
            drive = %request.drive_id,
            owner = %owner,
            "Starting folder reconciliation"
        );

        let items = self
            .collect_items(&request.root_container_id, &request.drive_id, root_path, owner)
            .await;

        let result = self.persist(&items, &request.drive_id, owner).await?;

        info!(
            synced = result.synced_count,
            inserted = result.inserted,
            updated = result.updated,
            "Folder reconciliation complete"
        );

        Ok(result)
    }

    /// Walks the remote tree and returns the flat item list in pre-order
    ///
    /// The root is never part of the output. Ids already seen in this run
    /// are skipped, which also breaks cycles.
    pub async fn collect_items(
        &self,
        root_id: &ExternalId,
        drive_id: &DriveId,
        root_path: ItemPath,
        owner: &OwnerId,
    ) -> Vec<SyncedItem> {
        let mut visited: HashSet<ExternalId> = HashSet::new();
        visited.insert(root_id.clone());

        let mut items = Vec::new();
        let mut stack = vec![Frame::Expand {
            id: root_id.clone(),
            path: root_path,
        }];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Expand { id, path } => {
                    self.expand(&id, drive_id, path, &mut stack).await;
                }
                Frame::Container { entry, parent } => {
                    if !visited.insert(entry.id.clone()) {
                        debug!(id = %entry.id, "Skipping already visited folder");
                        continue;
                    }
                    let item = SyncedItem::container(
                        entry.id.clone(),
                        &entry.name,
                        entry.media_type,
                        &parent,
                        owner,
                    );
                    let path = item.path.clone();
                    items.push(item);
                    stack.push(Frame::Expand { id: entry.id, path });
                }
                Frame::Leaves { entries, parent } => {
                    for entry in entries {
                        if !visited.insert(entry.id.clone()) {
                            debug!(id = %entry.id, "Skipping already visited file");
                            continue;
                        }
                        items.push(SyncedItem::leaf(
                            entry.id,
                            &entry.name,
                            entry.media_type,
                            &parent,
                            owner,
                        ));
                    }
                }
            }
        }

        items
    }

    /// Lists one container and schedules its children on the stack
    async fn expand(
        &self,
        id: &ExternalId,
        drive_id: &DriveId,
        path: ItemPath,
        stack: &mut Vec<Frame>,
    ) {
        let (containers, leaves) = tokio::join!(
            self.tree_source.list_child_containers(id, drive_id),
            self.tree_source.list_child_leaves(id, drive_id),
        );

        let (containers, leaves) = match (containers, leaves) {
            (Ok(c), Ok(l)) => (c, l),
            (Err(e), _) | (_, Err(e)) => {
                warn!(
                    container = %id,
                    path = %path,
                    error = %format!("{e:#}"),
                    "Failed to list folder, skipping branch"
                );
                return;
            }
        };

        // Stack is LIFO: files go in first so they come out after every
        // subfolder subtree; subfolders are pushed in reverse to keep
        // sibling order.
        if !leaves.is_empty() {
            stack.push(Frame::Leaves {
                entries: leaves,
                parent: path.clone(),
            });
        }
        for entry in containers.into_iter().rev() {
            stack.push(Frame::Container {
                entry,
                parent: path.clone(),
            });
        }
    }

    /// Upserts `items` chunk by chunk
    async fn persist(
        &self,
        items: &[SyncedItem],
        drive_id: &DriveId,
        owner: &OwnerId,
    ) -> Result<SyncResult, ReconcileError> {
        let mut result = SyncResult {
            synced_count: items.len(),
            ..SyncResult::default()
        };

        for (index, chunk) in items.chunks(self.batch_size).enumerate() {
            let (inserted, updated) = self
                .persist_chunk(chunk, drive_id, owner)
                .await
                .map_err(|source| ReconcileError::Persistence {
                    discovered: items.len(),
                    committed_chunks: index,
                    source,
                })?;

            debug!(chunk = index, inserted, updated, "Persisted chunk");
            result.inserted += inserted;
            result.updated += updated;
        }

        Ok(result)
    }

    /// Classifies and writes one chunk, returning `(inserted, updated)`
    async fn persist_chunk(
        &self,
        chunk: &[SyncedItem],
        drive_id: &DriveId,
        owner: &OwnerId,
    ) -> anyhow::Result<(usize, usize)> {
        use anyhow::Context;

        let ids: Vec<ExternalId> = chunk.iter().map(|i| i.external_id.clone()).collect();
        let existing = self
            .record_store
            .find_record_ids(owner, &ids)
            .await
            .context("Failed to look up existing records")?;

        let now = Utc::now();
        let mut inserts = Vec::new();
        let mut updates = Vec::new();
        for item in chunk {
            match existing.get(&item.external_id) {
                Some(record_id) => updates.push(RecordUpdate::from_item(*record_id, item, now)),
                None => inserts.push(NewRecord::from_item(item.clone(), drive_id, now)),
            }
        }

        for update in &updates {
            self.record_store
                .update_record(update)
                .await
                .with_context(|| format!("Failed to update record {}", update.record_id))?;
        }

        if !inserts.is_empty() {
            self.record_store
                .insert_records(&inserts)
                .await
                .context("Failed to insert records")?;
        }

        Ok((inserts.len(), updates.len()))
    }
}

// ============================================================================
// Tests
// ============================================================================
