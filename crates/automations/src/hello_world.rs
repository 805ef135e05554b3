//! `hello-world` — demonstrates the shape of an automation.

use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;

use gitautomata_app::automation::Automation;
use gitautomata_app::ports::GitHubClient;
use gitautomata_domain::error::GitAutomataError;
use gitautomata_domain::event::{EventKind, WebhookEvent};

use crate::payload::{self, Account, Item, Repository};

pub const NAME: &str = "hello-world";

/// Comment posted on newly opened pull requests.
#[must_use]
pub fn welcome_message(author: &str, repository: &str) -> String {
    format!(
        "Hi @{author}!\n\nThanks for contributing to {repository}!\n\nThis PR will be reviewed soon."
    )
}

/// # Errors
///
/// Propagates builder validation errors.
pub fn automation() -> Result<Automation, GitAutomataError> {
    Automation::builder()
        .name(NAME)
        .description("Example automation demonstrating the basic structure")
        .on(EventKind::Push, |event: Arc<WebhookEvent>, _client| async move {
            on_push(&event.payload);
            Ok(())
        })
        .on(EventKind::PullRequest, |event: Arc<WebhookEvent>, client| async move {
            on_pull_request(&event.payload, client.as_ref()).await
        })
        .on(EventKind::Issues, |event: Arc<WebhookEvent>, _client| async move {
            on_issue(&event.payload);
            Ok(())
        })
        .manual(|client, args| async move {
            greet(client.as_ref(), &args).await;
            Ok(())
        })
        .build()
}

fn repository_name(payload: &Value) -> String {
    payload::field::<Repository>(payload, "repository")
        .map(|repository| repository.full_name())
        .unwrap_or_default()
}

fn on_push(payload: &Value) {
    let pusher = payload
        .pointer("/pusher/name")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    tracing::info!(
        repository = %repository_name(payload),
        git_ref = payload.get("ref").and_then(serde_json::Value::as_str).unwrap_or_default(),
        pusher,
        commit = payload.pointer("/head_commit/message").and_then(serde_json::Value::as_str),
        "push received"
    );
}

async fn on_pull_request(payload: &Value, client: &dyn GitHubClient) -> anyhow::Result<()> {
    let action = payload.get("action").and_then(Value::as_str).unwrap_or_default();
    let pr = payload::field::<Item>(payload, "pull_request");
    tracing::info!(
        action,
        repository = %repository_name(payload),
        number = pr.as_ref().map(|pr| pr.number),
        title = pr.as_ref().map(Item::title),
        author = pr.as_ref().map(Item::author),
        "pull request received"
    );

    let (Some(pr), Some(repository)) = (pr, payload::field::<Repository>(payload, "repository"))
    else {
        return Ok(());
    };
    if action != "opened" {
        return Ok(());
    }

    let body = welcome_message(pr.author(), &repository.name);
    client
        .add_comment(&repository.owner.login, &repository.name, pr.number, &body)
        .await
        .with_context(|| format!("posting welcome comment on pull request #{}", pr.number))?;
    tracing::info!(number = pr.number, "welcome comment posted");
    Ok(())
}

fn on_issue(payload: &Value) {
    let issue = payload::field::<Item>(payload, "issue");
    tracing::info!(
        action = payload.get("action").and_then(serde_json::Value::as_str),
        repository = %repository_name(payload),
        number = issue.as_ref().map(|issue| issue.number),
        title = issue.as_ref().map(Item::title),
        author = issue.as_ref().map(Item::author),
        "issue received"
    );
}

/// Manual run: `[message?]`.
async fn greet(client: &dyn GitHubClient, args: &[Value]) {
    tracing::info!("hello from gitautomata");
    if let Some(message) = args.first().and_then(Value::as_str) {
        tracing::info!(message, "message received");
    }

    match client.get_authenticated_user().await {
        Ok(user) => match serde_json::from_value::<Account>(user) {
            Ok(account) => tracing::info!(login = %account.login, "authenticated user"),
            Err(err) => tracing::warn!(error = %err, "unexpected user payload"),
        },
        Err(err) => tracing::warn!(error = %err, "could not fetch authenticated user"),
    }
}
