//! POST /sync/drive end to end: Drive mock -> walk -> SQLite

use crmsync_core::domain::newtypes::{ExternalId, OwnerId};
use crmsync_core::ports::{IRecordStore, RecordFilter};
use serde_json::{json, Value};

use crate::common::{self, drive_file, mount_children};

const FOLDER: &str = crmsync_drive::FOLDER_MIME_TYPE;

async fn mount_small_tree(server: &wiremock::MockServer) {
    mount_children(server, "root1", true, json!([drive_file("d1", "Invoices", FOLDER)])).await;
    mount_children(
        server,
        "root1",
        false,
        json!([drive_file("f1", "contract.pdf", "application/pdf")]),
    )
    .await;
    mount_children(server, "d1", true, json!([])).await;
    mount_children(
        server,
        "d1",
        false,
        json!([drive_file("f2", "march.png", "image/png")]),
    )
    .await;
}

fn sync_body() -> Value {
    json!({ "rootContainerId": "root1", "driveId": "root", "rootLabel": "Acme" })
}

#[tokio::test]
async fn test_sync_persists_tree_and_reports_count() {
    let app = common::spawn_app().await;
    mount_small_tree(&app.drive).await;

    let response = app
        .http
        .post(app.url("/sync/drive"))
        .header("x-owner-id", "user-1")
        .json(&sync_body())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "synced": 3 }));

    let owner = OwnerId::new("user-1").unwrap();
    let records = app
        .records
        .list_records(&owner, &RecordFilter::new())
        .await
        .unwrap();
    let paths: Vec<String> = records.iter().map(|r| r.path.to_key()).collect();
    assert_eq!(
        paths,
        vec!["Acme/Invoices", "Acme/Invoices/march.png", "Acme/contract.pdf"]
    );

    let pdf = app
        .records
        .get_record(&owner, &ExternalId::new("f1").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pdf.display_label, "📕 contract.pdf");
    assert!(!pdf.is_container);
}

#[tokio::test]
async fn test_second_sync_updates_instead_of_duplicating() {
    let app = common::spawn_app_with_batch_size(2).await;
    mount_small_tree(&app.drive).await;

    for _ in 0..2 {
        let response = app
            .http
            .post(app.url("/sync/drive"))
            .header("x-owner-id", "user-1")
            .json(&sync_body())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let records = app
        .records
        .list_records(&OwnerId::new("user-1").unwrap(), &RecordFilter::new())
        .await
        .unwrap();
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_unreachable_drive_syncs_nothing() {
    let app = common::spawn_app().await;

    let response = app
        .http
        .post(app.url("/sync/drive"))
        .header("x-owner-id", "user-1")
        .json(&sync_body())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["synced"], 0);
}

#[tokio::test]
async fn test_missing_owner_header_is_rejected() {
    let app = common::spawn_app().await;

    let response = app
        .http
        .post(app.url("/sync/drive"))
        .json(&sync_body())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("x-owner-id"));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = common::spawn_app().await;

    let response = app
        .http
        .post(app.url("/sync/drive"))
        .header("x-owner-id", "user-1")
        .json(&json!({ "rootContainerId": "root1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_blank_root_label_is_rejected() {
    let app = common::spawn_app().await;

    let response = app
        .http
        .post(app.url("/sync/drive"))
        .header("x-owner-id", "user-1")
        .json(&json!({ "rootContainerId": "root1", "driveId": "root", "rootLabel": "  " }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let app = common::spawn_app().await;
    mount_small_tree(&app.drive).await;
    app.drop_table("synced_records").await;

    let response = app
        .http
        .post(app.url("/sync/drive"))
        .header("x-owner-id", "user-1")
        .json(&sync_body())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    let body: Value = response.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("3 item(s) discovered"), "{message}");
}
