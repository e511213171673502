//! Integration tests for crmsync-drive
//!
//! Uses wiremock to simulate the Google Drive v3 API and verifies the
//! listing pagination, error classification, and the tree source adapter.

mod common;

mod test_listing;
mod test_tree_source;
