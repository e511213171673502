//! Port definitions (hexagonal architecture interfaces)
//!
//! Traits the use cases depend on; implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteTreeSource`] - Folder listings from a cloud drive
//! - [`IRecordStore`] - Persistent synced records
//! - [`ILeadRepository`] - Leads and their call state

pub mod lead_repository;
pub mod record_store;
pub mod remote_tree;

pub use lead_repository::ILeadRepository;
pub use record_store::{IRecordStore, RecordFilter};
pub use remote_tree::{IRemoteTreeSource, RemoteEntry};
