//! Integration tests for the GoogleDriveTreeSource port adapter

use crmsync_core::domain::newtypes::{DriveId, ExternalId};
use crmsync_core::ports::IRemoteTreeSource;
use crmsync_drive::{DriveError, GoogleDriveTreeSource};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, drive_file, FOLDER};

#[tokio::test]
async fn test_containers_and_leaves_are_listed_separately() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_listing(
        &server,
        &common::folders_query("p1"),
        serde_json::json!([drive_file("d1", "Invoices", FOLDER)]),
    )
    .await;
    common::mount_listing(
        &server,
        &common::files_query("p1"),
        serde_json::json!([
            drive_file("f1", "q1.xlsx", "application/vnd.ms-excel"),
            drive_file("f2", "logo.png", "image/png"),
        ]),
    )
    .await;

    let source = GoogleDriveTreeSource::new(client);
    let parent = ExternalId::new("p1").unwrap();
    let drive = DriveId::my_drive();

    let (containers, leaves) = tokio::join!(
        source.list_child_containers(&parent, &drive),
        source.list_child_leaves(&parent, &drive),
    );
    let containers = containers.unwrap();
    let leaves = leaves.unwrap();

    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].id.as_str(), "d1");
    assert_eq!(containers[0].media_type, FOLDER);

    let names: Vec<&str> = leaves.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["q1.xlsx", "logo.png"]);
}

#[tokio::test]
async fn test_entries_without_id_are_skipped() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_listing(
        &server,
        &common::files_query("p1"),
        serde_json::json!([
            drive_file("", "broken", "text/plain"),
            drive_file("f1", "ok.txt", "text/plain"),
        ]),
    )
    .await;

    let source = GoogleDriveTreeSource::new(client);
    let leaves = source
        .list_child_leaves(&ExternalId::new("p1").unwrap(), &DriveId::my_drive())
        .await
        .unwrap();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].id.as_str(), "f1");
}

#[tokio::test]
async fn test_listing_error_keeps_drive_error_as_source() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(403).set_body_string("insufficientFilePermissions"))
        .mount(&server)
        .await;

    let source = GoogleDriveTreeSource::new(client);
    let err = source
        .list_child_containers(&ExternalId::new("locked").unwrap(), &DriveId::my_drive())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("locked"));
    assert!(matches!(
        err.downcast_ref::<DriveError>(),
        Some(DriveError::Forbidden(_))
    ));
}
