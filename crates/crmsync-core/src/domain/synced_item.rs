//! Synced item and persisted record entities
//!
//! A [`SyncedItem`] is produced by the folder walk and only lives for the
//! duration of one reconciliation run. A [`PersistedRecord`] is its durable
//! counterpart in the record store, unique per `(owner, external_id)`.
//!
//! ## Lifecycle
//!
//! ```text
//!   walk ──► SyncedItem ──► lookup(owner, external_id)
//!                               │
//!                 ┌─────────────┴─────────────┐
//!                 ▼                           ▼
//!            not found                      found
//!         NewRecord (insert)       RecordUpdate (update in place)
//! ```
//!
//! Records are never deleted by a sync run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{DriveId, ExternalId, ItemPath, OwnerId, RecordId};

// ============================================================================
// MediaGlyph
// ============================================================================

/// Display glyph derived from an item's media type
///
/// Rules are checked in declaration order against the lower-cased media
/// type and the first match wins. `Generic` is the fallback, which makes
/// the mapping total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaGlyph {
    Folder,
    Audio,
    Video,
    Pdf,
    Image,
    Spreadsheet,
    Presentation,
    Document,
    Generic,
}

/// Ordered substring rules for leaf items. Order is significant.
const LEAF_RULES: &[(&[&str], MediaGlyph)] = &[
    (&["audio"], MediaGlyph::Audio),
    (&["video"], MediaGlyph::Video),
    (&["pdf"], MediaGlyph::Pdf),
    (&["image"], MediaGlyph::Image),
    (&["spreadsheet", "excel"], MediaGlyph::Spreadsheet),
    (&["presentation", "powerpoint"], MediaGlyph::Presentation),
    (&["document", "word"], MediaGlyph::Document),
];

impl MediaGlyph {
    /// Classify a leaf item by its media type
    pub fn for_media_type(media_type: &str) -> Self {
        let lowered = media_type.to_ascii_lowercase();
        LEAF_RULES
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| lowered.contains(n)))
            .map(|(_, glyph)| *glyph)
            .unwrap_or(MediaGlyph::Generic)
    }

    /// The glyph character(s)
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaGlyph::Folder => "📁",
            MediaGlyph::Audio => "🎵",
            MediaGlyph::Video => "🎬",
            MediaGlyph::Pdf => "📕",
            MediaGlyph::Image => "🖼️",
            MediaGlyph::Spreadsheet => "📊",
            MediaGlyph::Presentation => "📽️",
            MediaGlyph::Document => "📝",
            MediaGlyph::Generic => "📄",
        }
    }

    /// Prefix `name` with this glyph
    pub fn label(&self, name: &str) -> String {
        format!("{} {}", self.as_str(), name)
    }
}

impl std::fmt::Display for MediaGlyph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SyncedItem
// ============================================================================

/// An entry discovered while walking a remote tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncedItem {
    /// Identifier assigned by the remote source
    pub external_id: ExternalId,
    /// Human-readable name prefixed with its glyph
    pub display_label: String,
    /// Content type reported by the remote source (display only)
    pub media_type: String,
    /// True if the item is a folder
    pub is_container: bool,
    /// Segments from the synced root to this item, inclusive
    pub path: ItemPath,
    /// Identity that initiated the sync
    pub owner: OwnerId,
}

impl SyncedItem {
    /// Creates the entry for a child container of `parent`
    pub fn container(
        external_id: ExternalId,
        name: &str,
        media_type: impl Into<String>,
        parent: &ItemPath,
        owner: &OwnerId,
    ) -> Self {
        Self {
            external_id,
            display_label: MediaGlyph::Folder.label(name),
            media_type: media_type.into(),
            is_container: true,
            path: parent.child(name),
            owner: owner.clone(),
        }
    }

    /// Creates the entry for a child leaf item of `parent`
    pub fn leaf(
        external_id: ExternalId,
        name: &str,
        media_type: impl Into<String>,
        parent: &ItemPath,
        owner: &OwnerId,
    ) -> Self {
        let media_type = media_type.into();
        Self {
            external_id,
            display_label: MediaGlyph::for_media_type(&media_type).label(name),
            media_type,
            is_container: false,
            path: parent.child(name),
            owner: owner.clone(),
        }
    }

    /// The item's own name (last path segment, without glyph)
    pub fn name(&self) -> &str {
        self.path.name()
    }
}

// ============================================================================
// PersistedRecord and write models
// ============================================================================

/// Durable record in the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    /// Store-assigned primary key
    pub record_id: RecordId,
    pub owner: OwnerId,
    pub external_id: ExternalId,
    /// Drive the item was synced from
    pub drive_id: DriveId,
    pub display_label: String,
    pub media_type: String,
    pub is_container: bool,
    pub path: ItemPath,
    pub created_at: DateTime<Utc>,
    /// Set on every create or update
    pub last_modified_at: DateTime<Utc>,
}

/// A record to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub record_id: RecordId,
    pub drive_id: DriveId,
    pub item: SyncedItem,
    pub created_at: DateTime<Utc>,
}

impl NewRecord {
    /// Builds an insert for `item` with a fresh record id
    pub fn from_item(item: SyncedItem, drive_id: &DriveId, now: DateTime<Utc>) -> Self {
        Self {
            record_id: RecordId::new(),
            drive_id: drive_id.clone(),
            item,
            created_at: now,
        }
    }
}

/// In-place update of an existing record
///
/// Only the fields a rename or move can change are carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdate {
    pub record_id: RecordId,
    pub display_label: String,
    pub media_type: String,
    pub path: ItemPath,
    pub last_modified_at: DateTime<Utc>,
}

impl RecordUpdate {
    /// Builds an update of `record_id` from a freshly walked item
    pub fn from_item(record_id: RecordId, item: &SyncedItem, now: DateTime<Utc>) -> Self {
        Self {
            record_id,
            display_label: item.display_label.clone(),
            media_type: item.media_type.clone(),
            path: item.path.clone(),
            last_modified_at: now,
        }
    }
}
