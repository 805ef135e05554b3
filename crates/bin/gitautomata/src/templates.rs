//! Source templates emitted by `gitautomata init`.

use std::fmt;

use clap::ValueEnum;

/// Name used when `init` is given nothing usable.
pub const DEFAULT_NAME: &str = "new-automation";

/// Starting point for a new automation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Template {
    /// Manual entry point only.
    #[default]
    Basic,
    /// Push, pull request and issue handlers.
    Webhook,
    /// Manual entry point taking `owner` and `repo` and calling the API.
    Manual,
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Basic => "basic",
            Self::Webhook => "webhook",
            Self::Manual => "manual",
        })
    }
}

/// Normalise a user-supplied automation name.
///
/// Lower-cases the input and replaces every character outside `[a-z0-9-]`
/// with `-`. Blank input yields [`DEFAULT_NAME`].
#[must_use]
pub fn sanitize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_NAME.to_string();
    }
    trimmed
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// File name the template is written to (`my-bot` → `my_bot.rs`).
#[must_use]
pub fn file_name(name: &str) -> String {
    format!("{}.rs", module_name(name))
}

fn module_name(name: &str) -> String {
    let module = name.replace('-', "_");
    if module.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{module}")
    } else {
        module
    }
}

/// Render the Rust source of `template` for the automation `name`.
#[must_use]
pub fn render(template: Template, name: &str) -> String {
    let (imports, body) = match template {
        Template::Basic => (BASIC_IMPORTS, BASIC),
        Template::Webhook => (WEBHOOK_IMPORTS, WEBHOOK),
        Template::Manual => (MANUAL_IMPORTS, MANUAL),
    };
    format!("{HEADER}{imports}{NAME_DECL}{body}").replace("{{name}}", name)
}

const HEADER: &str = r#"//! `{{name}}` automation.

"#;

const NAME_DECL: &str = r#"
pub const NAME: &str = "{{name}}";

"#;

const BASIC_IMPORTS: &str = "\
use gitautomata_app::automation::Automation;
use gitautomata_domain::error::GitAutomataError;
use serde_json::Value;
";

const WEBHOOK_IMPORTS: &str = "\
use std::sync::Arc;

use gitautomata_app::automation::Automation;
use gitautomata_domain::error::GitAutomataError;
use gitautomata_domain::event::{EventKind, WebhookEvent};
use serde_json::Value;
";

const MANUAL_IMPORTS: &str = "\
use anyhow::Context;
use gitautomata_app::automation::Automation;
use gitautomata_domain::error::GitAutomataError;
use serde_json::Value;
";

const BASIC: &str = r#"/// # Errors
///
/// Propagates builder validation errors.
pub fn automation() -> Result<Automation, GitAutomataError> {
    Automation::builder()
        .name(NAME)
        .description("Describe what {{name}} does")
        .manual(|_client, _args: Vec<Value>| async move {
            tracing::info!(automation = NAME, "running");
            // Do the work here.
            tracing::info!(automation = NAME, "done");
            Ok(())
        })
        .build()
}
"#;

const WEBHOOK: &str = r#"/// # Errors
///
/// Propagates builder validation errors.
pub fn automation() -> Result<Automation, GitAutomataError> {
    Automation::builder()
        .name(NAME)
        .description("Reacts to GitHub webhook events")
        .on(EventKind::Push, |event: Arc<WebhookEvent>, _client| async move {
            tracing::info!(repository = event.repository_full_name(), "push received");
            Ok(())
        })
        .on(EventKind::PullRequest, |event: Arc<WebhookEvent>, _client| async move {
            tracing::info!(
                action = event.action(),
                number = event.payload.pointer("/pull_request/number").and_then(Value::as_u64),
                "pull request received"
            );
            Ok(())
        })
        .on(EventKind::Issues, |event: Arc<WebhookEvent>, _client| async move {
            tracing::info!(
                action = event.action(),
                number = event.payload.pointer("/issue/number").and_then(Value::as_u64),
                "issue received"
            );
            Ok(())
        })
        .build()
}
"#;

const MANUAL: &str = r#"/// Manual run: `[owner, repo]`.
///
/// # Errors
///
/// Propagates builder validation errors.
pub fn automation() -> Result<Automation, GitAutomataError> {
    Automation::builder()
        .name(NAME)
        .description("Inspects a repository on demand")
        .manual(|client, args: Vec<Value>| async move {
            let owner = args.first().and_then(Value::as_str).context("missing owner argument")?;
            let repo = args.get(1).and_then(Value::as_str).context("missing repo argument")?;

            let info = client
                .get_repo(owner, repo)
                .await
                .with_context(|| format!("fetching {owner}/{repo}"))?;
            tracing::info!(
                repository = info.get("full_name").and_then(Value::as_str),
                stars = info.get("stargazers_count").and_then(Value::as_u64),
                "repository inspected"
            );
            Ok(())
        })
        .build()
}
"#;
