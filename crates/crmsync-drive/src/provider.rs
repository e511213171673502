//! GoogleDriveTreeSource - IRemoteTreeSource implementation for Google Drive
//!
//! Wraps a [`DriveClient`] and maps Drive listings onto the port's
//! [`RemoteEntry`] DTO. Entries with an empty id are dropped with a warning.

use anyhow::{Context, Result};
use tracing::warn;

use crmsync_core::domain::newtypes::{DriveId, ExternalId};
use crmsync_core::ports::{IRemoteTreeSource, RemoteEntry};

use crate::client::DriveClient;
use crate::listing::{self, ChildKind, DriveFile};

/// Google Drive adapter for the remote tree port
pub struct GoogleDriveTreeSource {
    client: DriveClient,
}

impl GoogleDriveTreeSource {
    /// Creates a new tree source backed by `client`
    pub fn new(client: DriveClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client
    pub fn client(&self) -> &DriveClient {
        &self.client
    }

    async fn list(
        &self,
        container_id: &ExternalId,
        drive_id: &DriveId,
        kind: ChildKind,
    ) -> Result<Vec<RemoteEntry>> {
        let files = listing::list_children(&self.client, container_id, drive_id, kind)
            .await
            .with_context(|| format!("Failed to list {kind:?} of folder {container_id}"))?;

        Ok(files.into_iter().filter_map(to_remote_entry).collect())
    }
}

fn to_remote_entry(file: DriveFile) -> Option<RemoteEntry> {
    match ExternalId::new(file.id) {
        Ok(id) => Some(RemoteEntry::new(id, file.name, file.mime_type)),
        Err(e) => {
            warn!(name = %file.name, error = %e, "Skipping Drive entry without id");
            None
        }
    }
}

#[async_trait::async_trait]
impl IRemoteTreeSource for GoogleDriveTreeSource {
    async fn list_child_containers(
        &self,
        container_id: &ExternalId,
        drive_id: &DriveId,
    ) -> Result<Vec<RemoteEntry>> {
        self.list(container_id, drive_id, ChildKind::Containers).await
    }

    async fn list_child_leaves(
        &self,
        container_id: &ExternalId,
        drive_id: &DriveId,
    ) -> Result<Vec<RemoteEntry>> {
        self.list(container_id, drive_id, ChildKind::Leaves).await
    }
}
