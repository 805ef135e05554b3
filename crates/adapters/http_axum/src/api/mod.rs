//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod automations;
pub mod webhook;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the automation sub-router. The webhook route is mounted by
/// [`crate::router::build`] because its path is configurable.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/automations", get(automations::list))
        .route("/automations/{name}/run", post(automations::run))
}
