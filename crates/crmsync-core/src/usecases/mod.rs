//! Use cases (interactors) for crmsync
//!
//! Thin coordinators: business rules live on the domain types, I/O goes
//! through the ports.
//!
//! ## Use Cases
//!
//! - [`ReconcileFolderUseCase`] - Mirror a remote folder tree into the record store
//! - [`HandleCallEventUseCase`] - Drive a lead's call status from PBX events

pub mod call_event;
pub mod reconcile;

pub use call_event::{CallEventError, CallEventOutcome, CallEventSummary, HandleCallEventUseCase};
pub use reconcile::{ReconcileError, ReconcileFolderUseCase, ReconcileRequest, SyncResult};
