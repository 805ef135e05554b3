//! Webhook and CORS configuration for the HTTP adapter.

use serde::Deserialize;

/// Default route GitHub delivers webhooks to.
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook/github";

/// Routes mounted by the router itself.
const BUILTIN_ROUTES: [&str; 2] = ["/health", "/automations"];

/// A webhook path that cannot be mounted next to the built-in routes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookPathError {
    #[error("webhook path must start with '/', got '{0}'")]
    MissingLeadingSlash(String),

    #[error("webhook path '{path}' must not contain '{found}'")]
    RouteSyntax { path: String, found: char },

    #[error("webhook path '{path}' collides with the built-in route '{route}'")]
    Reserved { path: String, route: &'static str },
}

/// Webhook endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Shared secret configured on the GitHub side. When absent, signatures
    /// are not checked.
    pub secret: Option<String>,
    /// Route the webhook endpoint is mounted on.
    pub path: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            path: DEFAULT_WEBHOOK_PATH.to_string(),
        }
    }
}

impl WebhookConfig {
    /// Secret, ignoring an empty value.
    #[must_use]
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|secret| !secret.is_empty())
    }

    /// Check that [`path`](Self::path) can be mounted as a plain route: it
    /// starts with `/`, holds no axum route syntax (`{`, `}`, `*`, `:`) nor
    /// query or fragment markers, and does not overlap `/health` or the
    /// `/automations` API.
    ///
    /// # Errors
    ///
    /// Returns the first [`WebhookPathError`] found.
    pub fn validate_path(&self) -> Result<(), WebhookPathError> {
        let path = self.path.as_str();
        if !path.starts_with('/') {
            return Err(WebhookPathError::MissingLeadingSlash(path.to_string()));
        }
        if let Some(found) = path
            .chars()
            .find(|c| matches!(c, '{' | '}' | '*' | ':' | '?' | '#'))
        {
            return Err(WebhookPathError::RouteSyntax {
                path: path.to_string(),
                found,
            });
        }
        let collides = |route: &str| {
            path == route || path.strip_prefix(route).is_some_and(|rest| rest.starts_with('/'))
        };
        if let Some(route) = BUILTIN_ROUTES.into_iter().find(|route| collides(route)) {
            return Err(WebhookPathError::Reserved {
                path: path.to_string(),
                route,
            });
        }
        Ok(())
    }

    /// Path usable as an axum route (always starts with `/`).
    #[must_use]
    pub fn route_path(&self) -> String {
        if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        }
    }
}

/// Cross-origin settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origin; `*` allows any.
    pub origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origin: "*".to_string(),
        }
    }
}
