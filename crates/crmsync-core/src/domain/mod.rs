//! Domain entities and business logic
//!
//! This module contains the core domain types for crmsync:
//! - Newtypes for identifiers and item paths
//! - Synced items and persisted records produced by folder reconciliation
//! - Leads and the call-status state machine
//! - Domain-specific error types

pub mod errors;
pub mod lead;
pub mod newtypes;
pub mod synced_item;

// Re-export commonly used types
pub use errors::DomainError;
pub use lead::{normalize_phone, CallEvent, CallStateUpdate, CallStatus, Lead, PhoneLookup};
pub use newtypes::*;
pub use synced_item::{MediaGlyph, NewRecord, PersistedRecord, RecordUpdate, SyncedItem};
