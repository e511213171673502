//! Method handling, CORS preflight and health

use serde_json::Value;

use crate::common;

#[tokio::test]
async fn test_health() {
    let app = common::spawn_app().await;

    let response = app.http.get(app.url("/health")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_preflight_returns_no_content_with_cors_headers() {
    let app = common::spawn_app().await;

    let response = app
        .http
        .request(reqwest::Method::OPTIONS, app.url("/webhooks/call-event"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 204);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers.contains_key("access-control-allow-headers"));
    assert!(headers["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .contains("POST"));
    assert!(response.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_on_webhook_is_method_not_allowed() {
    let app = common::spawn_app().await;

    let response = app
        .http
        .get(app.url("/webhooks/call-event"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 405);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_put_on_sync_is_method_not_allowed() {
    let app = common::spawn_app().await;

    let response = app
        .http
        .put(app.url("/sync/drive"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 405);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = common::spawn_app().await;

    let response = app.http.get(app.url("/nope")).send().await.unwrap();

    assert_eq!(response.status(), 404);
}
