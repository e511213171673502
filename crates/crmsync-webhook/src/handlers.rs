//! Request routing and handlers
//!
//! [`route`] works on an already-collected body so it can be exercised
//! without a socket; [`handle`] is the hyper entry point.

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crmsync_core::domain::newtypes::OwnerId;
use crmsync_core::usecases::{CallEventError, CallEventOutcome, ReconcileError, ReconcileRequest};

use crate::{AppState, OWNER_HEADER};

/// Largest request body accepted
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type, x-owner-id";
const ALLOW_METHODS: &str = "POST, GET, OPTIONS";

type HttpResponse = Response<Full<Bytes>>;

/// hyper service entry point
pub async fn handle(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<HttpResponse, Infallible> {
    let (parts, body) = req.into_parts();

    let body = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(path = %parts.uri.path(), error = %e, "Failed to read request body");
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                "Request body could not be read",
            ));
        }
    };

    Ok(route(&state, &parts.method, parts.uri.path(), &parts.headers, body).await)
}

/// Dispatches a request with a fully-read body
pub async fn route(
    state: &AppState,
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> HttpResponse {
    debug!(%method, path, "Incoming request");

    let allowed = match path {
        "/sync/drive" | "/webhooks/call-event" => Method::POST,
        "/health" => Method::GET,
        _ => return error_response(StatusCode::NOT_FOUND, "Not found"),
    };

    if *method == Method::OPTIONS {
        return preflight_response();
    }
    if *method != allowed {
        return error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    match path {
        "/sync/drive" => sync_drive(state, headers, &body).await,
        "/webhooks/call-event" => call_event(state, &body).await,
        _ => json_response(StatusCode::OK, &json!({ "status": "ok" })),
    }
}

// ============================================================================
// POST /sync/drive
// ============================================================================

async fn sync_drive(state: &AppState, headers: &HeaderMap, body: &[u8]) -> HttpResponse {
    let owner = match headers
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(OwnerId::new)
    {
        Some(Ok(owner)) => owner,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Missing {OWNER_HEADER} header"),
            )
        }
    };

    let request: ReconcileRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid request body: {e}"),
            )
        }
    };

    match state.reconcile.execute(&request, &owner).await {
        Ok(result) => {
            info!(
                owner = %owner,
                root = %request.root_container_id,
                synced = result.synced_count,
                "Drive sync request completed"
            );
            json_response(
                StatusCode::OK,
                &json!({ "success": true, "synced": result.synced_count }),
            )
        }
        Err(e @ ReconcileError::InvalidRequest(_)) => {
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e) => {
            error!(owner = %owner, discovered = e.discovered(), error = %e, "Drive sync failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

// ============================================================================
// POST /webhooks/call-event
// ============================================================================

async fn call_event(state: &AppState, body: &[u8]) -> HttpResponse {
    let payload: Value = match serde_json::from_slice(body) {
        Ok(payload @ Value::Object(_)) => payload,
        Ok(_) | Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid JSON body"),
    };

    let event = string_field(&payload, "event");
    let phone = string_field(&payload, "phone");

    match state.call_events.execute(&event, &phone).await {
        Ok(outcome) => match outcome_body(&outcome) {
            Ok(body) => json_response(StatusCode::OK, &body),
            Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        },
        Err(e) => {
            if let CallEventError::Internal(ref source) = e {
                error!(error = ?source, "Call event failed");
            }
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_response(status, &e.to_string())
        }
    }
}

/// Reads a field as text; numbers are accepted for phone-like values
fn string_field(payload: &Value, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn outcome_body(outcome: &CallEventOutcome) -> serde_json::Result<Value> {
    serde_json::to_value(outcome.summary())
}

// ============================================================================
// Responses
// ============================================================================

fn with_cors(mut response: HttpResponse) -> HttpResponse {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

fn json_response(status: StatusCode, body: &Value) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    with_cors(response)
}

fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    json_response(status, &json!({ "error": message }))
}

fn preflight_response() -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    with_cors(response)
}
