//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use gitautomata_domain::error::GitAutomataError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`GitAutomataError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(GitAutomataError);

impl From<GitAutomataError> for ApiError {
    fn from(err: GitAutomataError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            GitAutomataError::NotFound(_) => StatusCode::NOT_FOUND,
            GitAutomataError::UnsupportedOperation(_) | GitAutomataError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            GitAutomataError::HandlerFailure(_) | GitAutomataError::Client(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, "internal error");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitautomata_domain::error::{
        HandlerFailure, NotFoundError, UnsupportedOperationError, ValidationError,
    };

    #[test]
    fn should_map_not_found_to_404() {
        let err = ApiError::from(GitAutomataError::from(NotFoundError {
            entity: "automation",
            name: "ghost".to_string(),
        }));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn should_map_unsupported_and_validation_to_400() {
        let unsupported = ApiError::from(GitAutomataError::from(UnsupportedOperationError {
            name: "x".to_string(),
            operation: "manual execution",
        }));
        let invalid = ApiError::from(GitAutomataError::from(ValidationError::EmptyName));
        assert_eq!(unsupported.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn should_map_handler_failure_to_500() {
        let err = ApiError::from(GitAutomataError::from(HandlerFailure::new("boom")));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
