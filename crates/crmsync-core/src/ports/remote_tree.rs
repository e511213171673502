//! Remote tree source port (driven/secondary port)
//!
//! Interface for listing the children of a folder in a remote drive. The
//! primary implementation targets Google Drive, but the trait only assumes
//! a folder/file hierarchy with opaque ids.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific.
//! - Pagination is the adapter's job; each method returns the complete list.
//! - Containers and leaves are listed separately so callers can issue both
//!   requests concurrently. The two result sets are disjoint.

use serde::{Deserialize, Serialize};

use crate::domain::newtypes::{DriveId, ExternalId};

/// One child entry returned by the remote source
///
/// Port-level DTO; the reconciliation use case maps it to a `SyncedItem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Remote identifier of the child
    pub id: ExternalId,
    /// File or folder name
    pub name: String,
    /// Content type reported by the source
    pub media_type: String,
}

impl RemoteEntry {
    pub fn new(id: ExternalId, name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            media_type: media_type.into(),
        }
    }
}

/// Port trait for listing a remote folder hierarchy
///
/// ## Implementation Notes
///
/// - The source is not trusted to be cycle-free or duplicate-free; callers
///   deduplicate by id.
/// - No retry is expected. A failed listing is reported as an error and the
///   caller decides whether to skip the branch.
#[async_trait::async_trait]
pub trait IRemoteTreeSource: Send + Sync {
    /// Lists the immediate child folders of `container_id`
    async fn list_child_containers(
        &self,
        container_id: &ExternalId,
        drive_id: &DriveId,
    ) -> anyhow::Result<Vec<RemoteEntry>>;

    /// Lists the immediate child files of `container_id`
    async fn list_child_leaves(
        &self,
        container_id: &ExternalId,
        drive_id: &DriveId,
    ) -> anyhow::Result<Vec<RemoteEntry>>;
}
