//! JSON handlers for listing and manually running automations.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use gitautomata_domain::error::{GitAutomataError, ValidationError};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for a manual run. The body itself is optional.
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub args: Vec<Value>,
}

/// One entry of the listing.
#[derive(Debug, Serialize)]
pub struct AutomationSummary {
    pub name: String,
    pub description: Option<String>,
    pub has_run: bool,
    pub events: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AutomationList {
    pub automations: Vec<AutomationSummary>,
}

#[derive(Debug, Serialize)]
pub struct RunSucceeded {
    pub success: bool,
    pub message: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct RunFailed {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<AutomationList>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the run endpoint.
pub enum RunResponse {
    Ok(Json<RunSucceeded>),
    Failed(Json<RunFailed>),
}

impl IntoResponse for RunResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Failed(json) => (StatusCode::BAD_REQUEST, json).into_response(),
        }
    }
}

/// `GET /automations` — list registered automations.
pub async fn list(State(state): State<AppState>) -> ListResponse {
    let automations = state
        .runner
        .registry()
        .list()
        .iter()
        .map(|automation| AutomationSummary {
            name: automation.name().to_string(),
            description: automation.description().map(str::to_string),
            has_run: automation.supports_manual_run(),
            events: automation.subscribed_events(),
        })
        .collect();
    ListResponse::Ok(Json(AutomationList { automations }))
}

/// `POST /automations/{name}/run` — run an automation's manual entry point.
///
/// An empty body runs it without arguments.
pub async fn run(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<RunResponse, ApiError> {
    let request = parse_run_request(&body)?;
    let result = state
        .runner
        .run_manual(&name, state.client.clone(), request.args)
        .await;

    if result.success {
        Ok(RunResponse::Ok(Json(RunSucceeded {
            success: true,
            duration_ms: result.duration_millis(),
            message: result.message,
        })))
    } else {
        Ok(RunResponse::Failed(Json(RunFailed {
            success: false,
            error: result.error_message(),
            message: result.message,
        })))
    }
}

fn parse_run_request(body: &[u8]) -> Result<RunRequest, GitAutomataError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RunRequest::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        ValidationError::InvalidArgument {
            name: "args",
            reason: err.to_string(),
        }
        .into()
    })
}
