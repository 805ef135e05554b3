//! GitHub API client configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default public API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version sent in `X-GitHub-Api-Version`.
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Configuration for the GitHub REST client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Personal access token or app installation token.
    pub token: Option<String>,
    /// API base URL. A trailing slash is accepted.
    pub api_url: String,
    /// Value of the `X-GitHub-Api-Version` header.
    pub api_version: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: 30,
        }
    }
}

impl GitHubConfig {
    /// Request timeout, never zero.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Token with surrounding whitespace removed; `None` when absent or blank.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}
