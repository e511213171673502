//! POST /webhooks/call-event against the SQLite lead repository

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crmsync_core::domain::{newtypes::LeadId, CallStatus, Lead};
use crmsync_core::ports::ILeadRepository;

use crate::common::{self, TestApp};

async fn post_event(app: &TestApp, body: Value) -> (u16, Value) {
    let response = app
        .http
        .post(app.url("/webhooks/call-event"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_ringing_matches_formatted_phone_by_suffix() {
    let app = common::spawn_app().await;
    let lead = Lead::new("Grace Hopper", "5551234567");
    app.leads.save_lead(&lead).await.unwrap();

    let (status, body) =
        post_event(&app, json!({ "event": "ringing", "phone": "+1 (555) 123-4567" })).await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["lead_id"], lead.id().to_string());
    assert_eq!(body["lead_name"], "Grace Hopper");
    assert_eq!(body["event"], "ringing");
    assert_eq!(body["call_status"], "ringing");
    assert!(body["call_started_at"].is_null());
    assert!(body.get("last_call_at").is_none());

    let stored = app.leads.get_lead(lead.id()).await.unwrap().unwrap();
    assert_eq!(stored.call_status(), CallStatus::Ringing);
}

#[tokio::test]
async fn test_hangup_records_duration() {
    let app = common::spawn_app().await;
    let started = Utc::now() - Duration::seconds(42);
    let lead = Lead::from_parts(
        LeadId::new(),
        "Ada".to_string(),
        "5551234567".to_string(),
        CallStatus::InCall,
        Some(started),
        None,
        None,
        Utc::now() - Duration::days(1),
    );
    app.leads.save_lead(&lead).await.unwrap();

    let (status, body) =
        post_event(&app, json!({ "event": "hangup", "phone": "555 123 4567" })).await;

    assert_eq!(status, 200);
    assert_eq!(body["call_status"], "call_done");
    let duration = body["last_call_duration"].as_i64().unwrap();
    assert!((42..=44).contains(&duration), "duration was {duration}");
    assert!(body["call_started_at"].is_null());
    assert!(body["last_call_at"].is_string());

    let stored = app.leads.get_lead(lead.id()).await.unwrap().unwrap();
    assert_eq!(stored.call_status(), CallStatus::CallDone);
    assert_eq!(stored.last_call_duration(), Some(duration));
    assert!(stored.call_started_at().is_none());
}

#[tokio::test]
async fn test_answered_sets_start_time() {
    let app = common::spawn_app().await;
    let lead = Lead::new("Alan", "07700900123");
    app.leads.save_lead(&lead).await.unwrap();

    let (status, body) =
        post_event(&app, json!({ "event": "answered", "phone": "07700900123" })).await;

    assert_eq!(status, 200);
    assert_eq!(body["call_status"], "in_call");
    assert!(body["call_started_at"].is_string());
}

#[tokio::test]
async fn test_unknown_event_names_valid_events() {
    let app = common::spawn_app().await;

    let (status, body) = post_event(&app, json!({ "event": "busy", "phone": "123" })).await;

    assert_eq!(status, 400);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("ringing, answered, hangup"), "{message}");
}

#[tokio::test]
async fn test_missing_phone_is_rejected() {
    let app = common::spawn_app().await;

    let (status, body) = post_event(&app, json!({ "event": "ringing" })).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing required field: phone");
}

#[tokio::test]
async fn test_invalid_json_is_rejected() {
    let app = common::spawn_app().await;

    let response = app
        .http
        .post(app.url("/webhooks/call-event"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid JSON body");
}

#[tokio::test]
async fn test_unknown_phone_is_not_found() {
    let app = common::spawn_app().await;

    let (status, body) =
        post_event(&app, json!({ "event": "ringing", "phone": "+4915112345678" })).await;

    assert_eq!(status, 404);
    assert!(body["error"].as_str().unwrap().contains("+4915112345678"));
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let app = common::spawn_app().await;
    app.drop_table("leads").await;

    let (status, body) =
        post_event(&app, json!({ "event": "ringing", "phone": "5551234567" })).await;

    assert_eq!(status, 500);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("look up lead"), "{message}");
}
