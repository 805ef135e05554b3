//! Shared application state for axum handlers.

use std::sync::Arc;

use gitautomata_app::ports::GitHubClient;
use gitautomata_app::runner::AutomationRunner;

use crate::config::WebhookConfig;

/// Application state shared across all axum handlers.
///
/// Everything sits behind an `Arc`, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Dispatcher holding the automation registry.
    pub runner: Arc<AutomationRunner>,
    /// Client handed to every automation.
    pub client: Arc<dyn GitHubClient>,
    /// Webhook secret and route.
    pub webhook: Arc<WebhookConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        runner: Arc<AutomationRunner>,
        client: Arc<dyn GitHubClient>,
        webhook: WebhookConfig,
    ) -> Self {
        Self {
            runner,
            client,
            webhook: Arc::new(webhook),
        }
    }
}
