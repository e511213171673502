//! crmsync Webhook - HTTP surface
//!
//! A small hyper 1.x server exposing:
//!
//! | Method | Path                   | Purpose                                  |
//! |--------|------------------------|------------------------------------------|
//! | POST   | `/sync/drive`          | Reconcile a Drive folder for an owner    |
//! | POST   | `/webhooks/call-event` | Apply a PBX call event to a lead         |
//! | GET    | `/health`              | Liveness probe                           |
//! | OPTIONS| any of the above       | CORS preflight                           |
//!
//! Every response carries `access-control-allow-origin: *`. Errors are
//! reported as `{"error": "..."}`.

pub mod handlers;
pub mod server;

use std::sync::Arc;

use crmsync_core::usecases::{HandleCallEventUseCase, ReconcileFolderUseCase};

pub use server::WebhookServer;

/// Header carrying the caller identity, set by the hosting platform
pub const OWNER_HEADER: &str = "x-owner-id";

/// Use cases shared by every request
pub struct AppState {
    pub reconcile: ReconcileFolderUseCase,
    pub call_events: HandleCallEventUseCase,
}

impl AppState {
    pub fn new(reconcile: ReconcileFolderUseCase, call_events: HandleCallEventUseCase) -> Arc<Self> {
        Arc::new(Self {
            reconcile,
            call_events,
        })
    }
}
