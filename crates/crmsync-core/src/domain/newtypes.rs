//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for identifiers and paths. Each newtype checks
//! its invariants at construction time so the rest of the crate can rely
//! on them.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// UUID-based ID types
// ============================================================================

/// Store-assigned primary key of a persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new random RecordId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a RecordId from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid RecordId: {e}")))
    }
}

/// Identifier for Lead entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(Uuid);

impl LeadId {
    /// Create a new random LeadId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a LeadId from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LeadId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for LeadId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LeadId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid LeadId: {e}")))
    }
}

// ============================================================================
// Remote-source identifiers
// ============================================================================

/// Identifier assigned by the remote tree source
///
/// Opaque and stable across syncs. Unique within a drive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalId(String);

impl ExternalId {
    /// Create a new ExternalId
    ///
    /// # Errors
    /// Returns `DomainError::InvalidExternalId` if the id is empty or blank
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidExternalId(
                "External ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ExternalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExternalId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ExternalId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ExternalId> for String {
    fn from(id: ExternalId) -> Self {
        id.0
    }
}

/// Identifier of the drive a tree lives in
///
/// Google Drive uses the literal `root` for "My Drive"; shared drives carry
/// their own opaque id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DriveId(String);

impl DriveId {
    /// The user's own drive
    pub const MY_DRIVE: &'static str = "root";

    /// Create a new DriveId
    ///
    /// # Errors
    /// Returns `DomainError::InvalidDriveId` if the id is blank
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidDriveId(
                "Drive ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// The DriveId of the user's own drive
    #[must_use]
    pub fn my_drive() -> Self {
        Self(Self::MY_DRIVE.to_string())
    }

    /// Returns true when this id names a shared drive
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.0 != Self::MY_DRIVE
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DriveId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DriveId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DriveId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DriveId> for String {
    fn from(id: DriveId) -> Self {
        id.0
    }
}

/// Identity that initiated a sync
///
/// Supplied by the hosting platform's authentication layer; treated as an
/// opaque, trimmed string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Create a new OwnerId
    ///
    /// # Errors
    /// Returns `DomainError::InvalidOwner` if the identity is blank
    pub fn new(owner: impl Into<String>) -> Result<Self, DomainError> {
        let owner = owner.into();
        let trimmed = owner.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidOwner(
                "Owner cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<OwnerId> for String {
    fn from(owner: OwnerId) -> Self {
        owner.0
    }
}

// ============================================================================
// ItemPath
// ============================================================================

/// Ordered segment names from the synced root to an item, inclusive
///
/// The first segment is always the root label. A container's children
/// extend its path by exactly one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ItemPath(Vec<String>);

impl ItemPath {
    /// Separator used by [`ItemPath::to_key`]
    pub const SEPARATOR: char = '/';

    /// Create a single-segment path for a sync root
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the label is blank
    pub fn root(label: impl Into<String>) -> Result<Self, DomainError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(DomainError::InvalidPath(
                "Root label cannot be empty".to_string(),
            ));
        }
        Ok(Self(vec![label]))
    }

    /// Create a path from a list of segments
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the list is empty
    pub fn from_segments(segments: Vec<String>) -> Result<Self, DomainError> {
        if segments.is_empty() {
            return Err(DomainError::InvalidPath(
                "Path must have at least one segment".to_string(),
            ));
        }
        Ok(Self(segments))
    }

    /// Returns a new path extended by one segment
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    /// Number of segments
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; an ItemPath holds at least the root label
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Depth relative to the root (root children are at depth 1)
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len() - 1
    }

    /// Last segment (the item's own name)
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// Segment slice
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns true if `prefix` is this path or one of its ancestors
    #[must_use]
    pub fn starts_with(&self, prefix: &[String]) -> bool {
        self.0.starts_with(prefix)
    }

    /// Flat '/'-joined form used for prefix indexing in the store
    #[must_use]
    pub fn to_key(&self) -> String {
        let mut key = String::new();
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                key.push(Self::SEPARATOR);
            }
            key.push_str(segment);
        }
        key
    }
}

impl Display for ItemPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_key())
    }
}

impl TryFrom<Vec<String>> for ItemPath {
    type Error = DomainError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_segments(segments)
    }
}

impl From<ItemPath> for Vec<String> {
    fn from(path: ItemPath) -> Self {
        path.0
    }
}

// ============================================================================
// Tests
// ============================================================================
