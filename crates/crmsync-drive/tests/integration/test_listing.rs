//! Integration tests for paginated folder listing

use std::time::Duration;

use crmsync_core::domain::newtypes::{DriveId, ExternalId};
use crmsync_drive::{listing, ChildKind, DriveError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, drive_file, FOLDER};

fn folder_id(id: &str) -> ExternalId {
    ExternalId::new(id).unwrap()
}

#[tokio::test]
async fn test_list_folders_single_page() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_listing(
        &server,
        &common::folders_query("root-folder"),
        serde_json::json!([
            drive_file("d1", "2024", FOLDER),
            drive_file("d2", "Archive", FOLDER),
        ]),
    )
    .await;

    let folders = listing::list_children(
        &client,
        &folder_id("root-folder"),
        &DriveId::my_drive(),
        ChildKind::Containers,
    )
    .await
    .expect("listing failed");

    let names: Vec<&str> = folders.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["2024", "Archive"]);
}

#[tokio::test]
async fn test_list_follows_next_page_token() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_listing_paginated(
        &server,
        &common::files_query("root-folder"),
        serde_json::json!([drive_file("f1", "a.pdf", "application/pdf")]),
        serde_json::json!([
            drive_file("f2", "b.png", "image/png"),
            drive_file("f3", "c.mp3", "audio/mpeg"),
        ]),
    )
    .await;

    let files = listing::list_children(
        &client,
        &folder_id("root-folder"),
        &DriveId::my_drive(),
        ChildKind::Leaves,
    )
    .await
    .expect("listing failed");

    let ids: Vec<&str> = files.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["f1", "f2", "f3"]);
}

#[tokio::test]
async fn test_list_sends_page_size() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("pageSize", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"files": []})))
        .expect(1)
        .mount(&server)
        .await;

    let files = listing::list_children(
        &client.with_page_size(25),
        &folder_id("p"),
        &DriveId::my_drive(),
        ChildKind::Leaves,
    )
    .await
    .unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn test_shared_drive_parameters() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("corpora", "drive"))
        .and(query_param("driveId", "0ASharedDrive"))
        .and(query_param("supportsAllDrives", "true"))
        .and(query_param("includeItemsFromAllDrives", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [drive_file("f1", "shared.docx", "application/msword")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let files = listing::list_children(
        &client,
        &folder_id("team-folder"),
        &DriveId::new("0ASharedDrive").unwrap(),
        ChildKind::Leaves,
    )
    .await
    .unwrap();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn test_my_drive_omits_shared_drive_parameters() {
    let (server, client) = common::setup_drive_mock().await;
    // Only matches if corpora is present; an unmatched request gets a 404
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("corpora", "drive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"files": []})))
        .expect(0)
        .mount(&server)
        .await;

    let result = listing::list_children(
        &client,
        &folder_id("p"),
        &DriveId::my_drive(),
        ChildKind::Leaves,
    )
    .await;
    assert!(matches!(result, Err(DriveError::NotFound(_))));
}

#[tokio::test]
async fn test_unauthorized_is_classified() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Credentials"))
        .mount(&server)
        .await;

    let err = listing::list_children(
        &client,
        &folder_id("p"),
        &DriveId::my_drive(),
        ChildKind::Containers,
    )
    .await
    .unwrap_err();
    match err {
        DriveError::Unauthorized(body) => assert!(body.contains("Invalid Credentials")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_carries_retry_after() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "12"))
        .mount(&server)
        .await;

    let err = listing::list_children(
        &client,
        &folder_id("p"),
        &DriveId::my_drive(),
        ChildKind::Leaves,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        DriveError::TooManyRequests { retry_after: Some(d) } if d == Duration::from_secs(12)
    ));
}

#[tokio::test]
async fn test_server_error_is_classified() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = listing::list_children(
        &client,
        &folder_id("p"),
        &DriveId::my_drive(),
        ChildKind::Leaves,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DriveError::ServerError(_)));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = listing::list_children(
        &client,
        &folder_id("p"),
        &DriveId::my_drive(),
        ChildKind::Leaves,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DriveError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_repeated_page_token_stops_pagination() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nextPageToken": "same",
            "files": [drive_file("f1", "a.pdf", "application/pdf")]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let files = listing::list_children(
        &client,
        &folder_id("p"),
        &DriveId::my_drive(),
        ChildKind::Leaves,
    )
    .await
    .unwrap();
    assert_eq!(files.len(), 2);
}
