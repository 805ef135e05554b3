//! `slack-notifier` — example automation that formats Slack messages for
//! newly opened issues and pull requests. Messages are logged, not sent.

use std::sync::Arc;

use serde_json::{Value, json};

use gitautomata_app::automation::Automation;
use gitautomata_domain::error::GitAutomataError;
use gitautomata_domain::event::{EventKind, WebhookEvent};

use crate::payload::{self, Item, Repository};

pub const NAME: &str = "slack-notifier";

const EXCERPT_CHARS: usize = 200;

/// What was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opened {
    Issue,
    PullRequest,
}

impl Opened {
    fn payload_key(self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::PullRequest => "pull_request",
        }
    }
}

/// First [`EXCERPT_CHARS`] characters of `body`, with `...` when cut.
#[must_use]
pub fn excerpt(body: &str) -> String {
    if body.chars().count() > EXCERPT_CHARS {
        let mut cut: String = body.chars().take(EXCERPT_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        body.to_string()
    }
}

/// Slack block-kit message announcing `item`.
#[must_use]
pub fn message(opened: Opened, repository: &str, item: &Item) -> Value {
    let (headline, section, link) = match opened {
        Opened::Issue => ("New issue opened", "New issue in", "View issue"),
        Opened::PullRequest => ("New pull request", "New pull request in", "View pull request"),
    };
    let url = item.html_url.as_deref().unwrap_or_default();
    json!({
        "text": headline,
        "blocks": [
            {
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "*{section} {repository}*\n\n*{}*\n\n{}",
                        item.title(),
                        excerpt(item.body()),
                    ),
                },
            },
            {
                "type": "context",
                "elements": [
                    {
                        "type": "mrkdwn",
                        "text": format!("Opened by *{}* | <{url}|{link}>", item.author()),
                    }
                ],
            },
        ],
    })
}

/// # Errors
///
/// Propagates builder validation errors.
pub fn automation() -> Result<Automation, GitAutomataError> {
    Automation::builder()
        .name(NAME)
        .description("Posts Slack notifications when issues or pull requests are opened")
        .on(EventKind::Issues, |event: Arc<WebhookEvent>, _client| async move {
            notify(Opened::Issue, &event.payload);
            Ok(())
        })
        .on(EventKind::PullRequest, |event: Arc<WebhookEvent>, _client| async move {
            notify(Opened::PullRequest, &event.payload);
            Ok(())
        })
        .build()
}

/// The message for an `opened` event, or `None` for anything else.
fn render(opened: Opened, payload: &Value) -> Option<Value> {
    if payload.get("action").and_then(Value::as_str) != Some("opened") {
        return None;
    }
    let item = payload::field::<Item>(payload, opened.payload_key())?;
    let repository = payload::field::<Repository>(payload, "repository")?;
    Some(message(opened, &repository.full_name(), &item))
}

fn notify(opened: Opened, payload: &Value) {
    if let Some(message) = render(opened, payload) {
        tracing::info!(message = %message, "slack message prepared");
    }
}
