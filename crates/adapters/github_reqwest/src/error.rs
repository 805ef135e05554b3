//! GitHub adapter error types.

use gitautomata_domain::error::GitAutomataError;

/// Maximum number of response-body characters kept in a status error.
const MAX_BODY_CHARS: usize = 800;

/// Errors specific to the GitHub REST adapter.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    /// The configured API base URL is not usable.
    #[error("invalid github api url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A configured value could not be used as an HTTP header.
    #[error("invalid value for header {name}")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to create github api client")]
    Build(#[source] reqwest::Error),

    /// The request never produced a response.
    #[error("github api {operation} request failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// GitHub answered with a non-success status.
    #[error("github api {operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("failed to decode github {operation} response")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl GitHubError {
    /// Build a [`GitHubError::Status`], truncating long bodies.
    #[must_use]
    pub fn status(operation: &'static str, status: u16, body: &str) -> Self {
        let body = if body.chars().count() > MAX_BODY_CHARS {
            let mut truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
            truncated.push_str("...");
            truncated
        } else {
            body.to_string()
        };
        Self::Status {
            operation,
            status,
            body,
        }
    }

    /// Convert into a [`GitAutomataError::Client`] for propagation across
    /// port boundaries.
    pub fn into_domain(self) -> GitAutomataError {
        GitAutomataError::client(self)
    }
}

impl From<GitHubError> for GitAutomataError {
    fn from(err: GitHubError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_status_error_with_body() {
        let err = GitHubError::status("get issue", 404, r#"{"message":"Not Found"}"#);
        assert_eq!(
            err.to_string(),
            r#"github api get issue failed with status 404: {"message":"Not Found"}"#
        );
    }

    #[test]
    fn should_truncate_long_status_body() {
        let body = "x".repeat(MAX_BODY_CHARS + 50);
        let GitHubError::Status { body, .. } = GitHubError::status("add labels", 500, &body) else {
            panic!("expected status error");
        };
        assert_eq!(body.len(), MAX_BODY_CHARS + 3);
        assert!(body.ends_with("..."));
    }

    #[test]
    fn should_convert_into_client_error() {
        let err: GitAutomataError = GitHubError::status("get repo", 401, "").into();
        assert!(matches!(err, GitAutomataError::Client(_)));
        assert!(err.to_string().contains("status 401"));
    }

    #[test]
    fn should_display_invalid_header_error() {
        let source = reqwest::header::HeaderValue::from_str("bad\nvalue").unwrap_err();
        let err = GitHubError::InvalidHeader {
            name: "authorization",
            source,
        };
        assert_eq!(err.to_string(), "invalid value for header authorization");
    }
}
