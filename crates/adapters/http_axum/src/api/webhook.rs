//! GitHub webhook receiver.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use gitautomata_domain::dispatch::DispatchSummary;

use crate::signature::{self, SIGNATURE_HEADER};
use crate::state::AppState;

/// Header carrying the event type (`push`, `pull_request`, …).
pub const EVENT_HEADER: &str = "x-github-event";
/// Header carrying the unique delivery id.
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// Possible responses from the webhook endpoint.
pub enum WebhookResponse {
    Accepted,
    InvalidSignature,
    MissingEventType,
    InvalidPayload,
}

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted => Json(json!({ "success": true })).into_response(),
            Self::InvalidSignature => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "invalid signature" })),
            )
                .into_response(),
            Self::MissingEventType => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "missing event type" })),
            )
                .into_response(),
            Self::InvalidPayload => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid payload" })),
            )
                .into_response(),
        }
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// `POST <webhook path>` — verify, decode and dispatch a GitHub delivery.
///
/// Answers `200` once the payload has been dispatched, whatever the
/// individual automations returned.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResponse {
    let delivery = header(&headers, DELIVERY_HEADER).unwrap_or_default();

    let verified = match state.webhook.secret() {
        Some(secret) => signature::verify(
            secret.as_bytes(),
            &body,
            header(&headers, SIGNATURE_HEADER),
        ),
        None => Ok(()),
    };
    if let Err(err) = verified {
        tracing::warn!(delivery, error = %err, "rejected webhook signature");
        return WebhookResponse::InvalidSignature;
    }

    let Some(event_type) = header(&headers, EVENT_HEADER).filter(|value| !value.is_empty()) else {
        tracing::warn!(delivery, "webhook without event type header");
        return WebhookResponse::MissingEventType;
    };

    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(payload @ Value::Object(_)) => payload,
        Ok(_) | Err(_) => {
            tracing::warn!(delivery, event = event_type, "webhook payload is not a JSON object");
            return WebhookResponse::InvalidPayload;
        }
    };

    tracing::info!(
        delivery,
        event = event_type,
        action = payload.get("action").and_then(serde_json::Value::as_str),
        repository = payload
            .pointer("/repository/full_name")
            .and_then(serde_json::Value::as_str),
        "webhook received"
    );

    let results = state
        .runner
        .dispatch(event_type, payload, state.client.clone())
        .await;

    let summary = DispatchSummary::of(&results);
    tracing::info!(
        delivery,
        event = event_type,
        results = summary.total,
        successful = summary.successful,
        failed = summary.failed,
        "webhook processed"
    );

    WebhookResponse::Accepted
}
