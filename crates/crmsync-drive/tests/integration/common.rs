//! Shared test helpers for Drive API integration tests
//!
//! Each helper mounts mock endpoints on a wiremock server that stands in
//! for `https://www.googleapis.com/drive/v3`.

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crmsync_drive::DriveClient;

pub const TEST_TOKEN: &str = "test-access-token";
pub const FOLDER: &str = "application/vnd.google-apps.folder";

/// Starts a mock server and returns a client pointing at it
pub async fn setup_drive_mock() -> (MockServer, DriveClient) {
    let server = MockServer::start().await;
    let client = DriveClient::with_base_url(TEST_TOKEN, server.uri());
    (server, client)
}

/// The `q` filter the client sends for a folder's sub-folders
pub fn folders_query(parent: &str) -> String {
    format!("'{parent}' in parents and trashed = false and mimeType = '{FOLDER}'")
}

/// The `q` filter the client sends for a folder's files
pub fn files_query(parent: &str) -> String {
    format!("'{parent}' in parents and trashed = false and mimeType != '{FOLDER}'")
}

/// Mounts a single-page listing response for `q`
pub async fn mount_listing(server: &MockServer, q: &str, files: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", q))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": files
        })))
        .mount(server)
        .await;
}

/// Mounts a two-page listing for `q`
///
/// The second-page mock is mounted first so it takes precedence for the
/// request that carries `pageToken`.
pub async fn mount_listing_paginated(
    server: &MockServer,
    q: &str,
    page1: serde_json::Value,
    page2: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", q))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": page2
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", q))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nextPageToken": "page-2",
            "files": page1
        })))
        .mount(server)
        .await;
}

/// Builds a Drive file JSON object
pub fn drive_file(id: &str, name: &str, mime_type: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "name": name, "mimeType": mime_type })
}
