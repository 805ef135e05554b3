//! Webhook events — the kind of event GitHub delivered plus its payload.
//!
//! The payload is kept as opaque JSON: routing only needs the [`EventKind`],
//! and each automation digs into the sub-objects (`pull_request`, `issue`,
//! `repository`, …) it cares about.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The type of a GitHub webhook event (`X-GitHub-Event` header value).
///
/// Well-known types get their own variant; anything else is carried in
/// [`EventKind::Other`] so new GitHub event types still route without a code
/// change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    Push,
    PullRequest,
    Issues,
    Release,
    WorkflowRun,
    CheckRun,
    Star,
    Fork,
    /// Any other event type, holding its wire name (e.g. `"deployment"`).
    Other(String),
}

impl EventKind {
    /// All well-known kinds, in declaration order.
    pub const KNOWN: [EventKind; 8] = [
        Self::Push,
        Self::PullRequest,
        Self::Issues,
        Self::Release,
        Self::WorkflowRun,
        Self::CheckRun,
        Self::Star,
        Self::Fork,
    ];

    /// Parse a wire-level event type. Never fails.
    #[must_use]
    pub fn from_wire(event_type: &str) -> Self {
        match event_type {
            "push" => Self::Push,
            "pull_request" => Self::PullRequest,
            "issues" => Self::Issues,
            "release" => Self::Release,
            "workflow_run" => Self::WorkflowRun,
            "check_run" => Self::CheckRun,
            "star" => Self::Star,
            "fork" => Self::Fork,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire-level name of this kind.
    #[must_use]
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
            Self::Issues => "issues",
            Self::Release => "release",
            Self::WorkflowRun => "workflow_run",
            Self::CheckRun => "check_run",
            Self::Star => "star",
            Self::Fork => "fork",
            Self::Other(name) => name,
        }
    }

    /// Canonical handler key (`onPush`, `onPullRequest`, …).
    ///
    /// Unknown kinds derive their key by upper-casing the first character of
    /// the wire name and prefixing `on`, so `deployment` becomes
    /// `onDeployment`.
    #[must_use]
    pub fn handler_key(&self) -> String {
        match self {
            Self::Push => "onPush".to_string(),
            Self::PullRequest => "onPullRequest".to_string(),
            Self::Issues => "onIssues".to_string(),
            Self::Release => "onRelease".to_string(),
            Self::WorkflowRun => "onWorkflowRun".to_string(),
            Self::CheckRun => "onCheckRun".to_string(),
            Self::Star => "onStar".to_string(),
            Self::Fork => "onFork".to_string(),
            Self::Other(name) => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => format!("on{}{}", first.to_uppercase(), chars.as_str()),
                    None => "on".to_string(),
                }
            }
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        Self::from_wire(&value)
    }
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        Self::from_wire(value)
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(name) => name,
            known => known.as_wire().to_string(),
        }
    }
}

/// A webhook event as handed to automations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub kind: EventKind,
    pub payload: Value,
}

impl WebhookEvent {
    #[must_use]
    pub fn new(kind: impl Into<EventKind>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// The payload's `action` field (`opened`, `edited`, …), if any.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.payload.get("action").and_then(Value::as_str)
    }

    /// `repository.full_name` from the payload, if present.
    #[must_use]
    pub fn repository_full_name(&self) -> Option<&str> {
        self.payload
            .get("repository")
            .and_then(|repo| repo.get("full_name"))
            .and_then(Value::as_str)
    }

    /// Build a synthetic payload for local testing.
    ///
    /// Starts from a minimal `test/repo` repository and `test-user` sender,
    /// then overlays the top-level keys of `data` (which win on conflict).
    /// Non-object `data` is ignored.
    #[must_use]
    pub fn test_payload(kind: impl Into<EventKind>, data: Value) -> Self {
        let mut payload = serde_json::json!({
            "action": "test",
            "repository": {
                "id": 1,
                "full_name": "test/repo",
                "name": "repo",
                "owner": { "login": "test", "id": 1 },
            },
            "sender": { "login": "test-user", "id": 1 },
        });
        if let (Some(base), Value::Object(overlay)) = (payload.as_object_mut(), data) {
            base.extend(overlay);
        }
        Self::new(kind, payload)
    }
}
