//! Integration tests for crmsync-webhook
//!
//! Each test starts a real server on an ephemeral port, backed by an
//! in-memory SQLite store and a wiremock stand-in for the Drive API.

mod common;
mod test_call_event;
mod test_routing;
mod test_sync_drive;
