//! `auto-merge` — example automation describing the checks an auto-merger
//! would run before merging a pull request.
//!
//! Nothing is verified or merged: every entry point logs the plan it would
//! follow for the pull request at hand.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use gitautomata_app::automation::Automation;
use gitautomata_domain::error::GitAutomataError;
use gitautomata_domain::event::{EventKind, WebhookEvent};

use crate::payload::{self, CheckRun, IssueRef, Item, Repository};

pub const NAME: &str = "auto-merge";

const PULL_REQUEST_ACTIONS: [&str; 4] = ["opened", "synchronize", "labeled", "unlabeled"];

/// Conditions a pull request must meet before being merged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AutoMergeConfig {
    pub required_checks: Vec<String>,
    pub required_reviews: u32,
    pub allowed_users: Vec<String>,
    pub blocking_labels: Vec<String>,
    pub required_labels: Vec<String>,
}

impl Default for AutoMergeConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> {
            items.iter().map(|item| (*item).to_string()).collect()
        };
        Self {
            required_checks: owned(&["ci", "tests", "build"]),
            required_reviews: 1,
            allowed_users: owned(&["dependabot[bot]", "renovate[bot]"]),
            blocking_labels: owned(&["do-not-merge", "wip", "needs-changes"]),
            required_labels: owned(&["auto-merge"]),
        }
    }
}

impl AutoMergeConfig {
    /// Human-readable steps that would be taken, in order.
    #[must_use]
    pub fn plan(&self) -> Vec<String> {
        vec![
            format!("require labels: {}", self.required_labels.join(", ")),
            format!("reject labels: {}", self.blocking_labels.join(", ")),
            format!("allow authors: {}", self.allowed_users.join(", ")),
            format!("require checks: {}", self.required_checks.join(", ")),
            format!("require approving reviews: {}", self.required_reviews),
            "merge when every condition holds".to_string(),
        ]
    }

    fn log_plan(&self, repository: &str, number: u64) {
        tracing::info!(repository, number, "auto-merge would evaluate pull request");
        for (index, step) in self.plan().iter().enumerate() {
            tracing::info!(repository, number, order = index + 1, "{step}");
        }
    }
}

/// Build the automation with the default conditions.
///
/// # Errors
///
/// Propagates builder validation errors.
pub fn automation() -> Result<Automation, GitAutomataError> {
    automation_with(AutoMergeConfig::default())
}

/// # Errors
///
/// Propagates builder validation errors.
pub fn automation_with(config: AutoMergeConfig) -> Result<Automation, GitAutomataError> {
    let config = Arc::new(config);
    let on_pr = Arc::clone(&config);
    let manual = config;

    Automation::builder()
        .name(NAME)
        .description("Merges pull requests automatically once every condition is met")
        .on(EventKind::PullRequest, move |event: Arc<WebhookEvent>, _client| {
            let config = Arc::clone(&on_pr);
            async move {
                on_pull_request(&config, &event.payload);
                Ok(())
            }
        })
        .on(EventKind::CheckRun, |event: Arc<WebhookEvent>, _client| async move {
            on_check_run(&event.payload);
            Ok(())
        })
        .manual(move |_client, args| {
            let config = Arc::clone(&manual);
            async move {
                let target = IssueRef::from_args(&args)?;
                config.log_plan(&target.full_name(), target.number);
                Ok(())
            }
        })
        .build()
}

/// The pull request and repository of an event worth evaluating.
fn eligible(payload: &Value) -> Option<(Item, Repository)> {
    let action = payload.get("action").and_then(Value::as_str)?;
    if !PULL_REQUEST_ACTIONS.contains(&action) {
        return None;
    }
    let pr = payload::field::<Item>(payload, "pull_request")?;
    let repository = payload::field::<Repository>(payload, "repository")?;
    if pr.draft {
        return None;
    }
    Some((pr, repository))
}

fn on_pull_request(config: &AutoMergeConfig, payload: &Value) {
    if let Some((pr, repository)) = eligible(payload) {
        config.log_plan(&repository.full_name(), pr.number);
    }
}

fn on_check_run(payload: &Value) {
    if payload.get("action").and_then(Value::as_str) != Some("completed") {
        return;
    }
    let (Some(check), Some(repository)) = (
        payload::field::<CheckRun>(payload, "check_run"),
        payload::field::<Repository>(payload, "repository"),
    ) else {
        return;
    };
    tracing::info!(
        repository = %repository.full_name(),
        check = %check.name,
        conclusion = check.conclusion.as_deref().unwrap_or("none"),
        sha = check.head_sha.as_deref(),
        "check completed; open pull requests would be re-evaluated"
    );
}
