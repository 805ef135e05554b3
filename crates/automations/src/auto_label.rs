//! `auto-label` — labels issues and pull requests from their text.
//!
//! Each rule is a case-insensitive regex applied to one field (title, body,
//! or the pull request's source branch). The labels of every matching rule
//! are merged and applied in a single `add_labels` call.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context;
use regex::{Regex, RegexBuilder};
use serde_json::{Value, json};

use gitautomata_app::automation::Automation;
use gitautomata_app::ports::GitHubClient;
use gitautomata_domain::error::{GitAutomataError, ValidationError};
use gitautomata_domain::event::{EventKind, WebhookEvent};

use crate::payload::{self, IssueRef, Item, Repository};

pub const NAME: &str = "auto-label";

const PULL_REQUEST_ACTIONS: [&str; 3] = ["opened", "synchronize", "edited"];
const ISSUE_ACTIONS: [&str; 2] = ["opened", "edited"];

/// Which text a [`LabelRule`] is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    Title,
    Body,
    Branch,
}

/// Pattern → labels mapping.
#[derive(Debug, Clone)]
pub struct LabelRule {
    pattern: Regex,
    labels: Vec<String>,
    field: RuleField,
}

impl LabelRule {
    /// Compile a case-insensitive rule.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] if `pattern` is not a
    /// valid regex.
    pub fn new(pattern: &str, labels: &[&str], field: RuleField) -> Result<Self, ValidationError> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| ValidationError::InvalidArgument {
                name: "pattern",
                reason: err.to_string(),
            })?;
        Ok(Self {
            pattern,
            labels: labels.iter().map(|label| (*label).to_string()).collect(),
            field,
        })
    }

    #[must_use]
    pub fn field(&self) -> RuleField {
        self.field
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Text a rule set is evaluated against. Issues have no branch.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub branch: Option<&'a str>,
}

impl<'a> Subject<'a> {
    fn text(&self, field: RuleField) -> Option<&'a str> {
        match field {
            RuleField::Title => Some(self.title),
            RuleField::Body => Some(self.body),
            RuleField::Branch => self.branch,
        }
    }
}

/// Union of the labels of every rule matching `subject`.
#[must_use]
pub fn labels_for(rules: &[LabelRule], subject: &Subject<'_>) -> BTreeSet<String> {
    rules
        .iter()
        .filter(|rule| {
            subject
                .text(rule.field)
                .is_some_and(|text| rule.pattern.is_match(&text.to_lowercase()))
        })
        .flat_map(|rule| rule.labels.iter().cloned())
        .collect()
}

/// Rule sets for pull requests and issues.
#[derive(Debug, Clone)]
pub struct AutoLabelConfig {
    pub pull_request: Vec<LabelRule>,
    pub issues: Vec<LabelRule>,
}

impl AutoLabelConfig {
    /// The stock rules.
    ///
    /// # Errors
    ///
    /// Only fails if a stock pattern does not compile.
    pub fn standard() -> Result<Self, ValidationError> {
        use RuleField::{Body, Title};

        let pull_request = vec![
            LabelRule::new("fix|bug|hotfix", &["bug"], Title)?,
            LabelRule::new("feat|feature", &["enhancement"], Title)?,
            LabelRule::new("docs|documentation", &["documentation"], Title)?,
            LabelRule::new("test|testing", &["tests"], Title)?,
            LabelRule::new("refactor|cleanup", &["refactor"], Title)?,
            LabelRule::new("chore|maintenance", &["chore"], Title)?,
            LabelRule::new("breaking change", &["breaking change"], Body)?,
            LabelRule::new("urgent|critical", &["priority: high"], Body)?,
        ];
        let issues = vec![
            LabelRule::new("bug|error|broken|not working", &["bug"], Title)?,
            LabelRule::new("feature|enhancement|improvement", &["enhancement"], Title)?,
            LabelRule::new("question|help|how to", &["question"], Title)?,
            LabelRule::new("documentation|docs", &["documentation"], Title)?,
            LabelRule::new("good first issue|beginner", &["good first issue"], Body)?,
            LabelRule::new("urgent|critical|important", &["priority: high"], Body)?,
        ];
        Ok(Self {
            pull_request,
            issues,
        })
    }
}

/// Build the automation with the stock rules.
///
/// # Errors
///
/// Propagates rule compilation and builder validation errors.
pub fn automation() -> Result<Automation, GitAutomataError> {
    automation_with(AutoLabelConfig::standard()?)
}

/// Build the automation with custom rules.
///
/// # Errors
///
/// Propagates builder validation errors.
pub fn automation_with(config: AutoLabelConfig) -> Result<Automation, GitAutomataError> {
    let config = Arc::new(config);
    let on_pr = Arc::clone(&config);
    let on_issue = Arc::clone(&config);
    let manual = config;

    Automation::builder()
        .name(NAME)
        .description("Adds labels to issues and pull requests based on configured rules")
        .on(EventKind::PullRequest, move |event: Arc<WebhookEvent>, client| {
            let config = Arc::clone(&on_pr);
            async move { label_pull_request(&config, &event.payload, client.as_ref()).await }
        })
        .on(EventKind::Issues, move |event: Arc<WebhookEvent>, client| {
            let config = Arc::clone(&on_issue);
            async move { label_issue(&config, &event.payload, client.as_ref()).await }
        })
        .manual(move |client, args| {
            let config = Arc::clone(&manual);
            async move { replay(&config, client.as_ref(), &args).await }
        })
        .build()
}

fn action_in(payload: &Value, allowed: &[&str]) -> bool {
    payload
        .get("action")
        .and_then(Value::as_str)
        .is_some_and(|action| allowed.contains(&action))
}

async fn apply(
    client: &dyn GitHubClient,
    repository: &Repository,
    number: u64,
    labels: BTreeSet<String>,
    kind: &str,
) -> anyhow::Result<()> {
    if labels.is_empty() {
        tracing::debug!(kind, number, "no label rule matched");
        return Ok(());
    }
    let labels: Vec<String> = labels.into_iter().collect();
    client
        .add_labels(&repository.owner.login, &repository.name, number, &labels)
        .await
        .with_context(|| format!("adding labels to {kind} #{number}"))?;
    tracing::info!(
        kind,
        number,
        repository = %repository.full_name(),
        labels = %labels.join(", "),
        "labels added"
    );
    Ok(())
}

async fn label_pull_request(
    config: &AutoLabelConfig,
    payload: &Value,
    client: &dyn GitHubClient,
) -> anyhow::Result<()> {
    if !action_in(payload, &PULL_REQUEST_ACTIONS) {
        return Ok(());
    }
    let (Some(pr), Some(repository)) = (
        payload::field::<Item>(payload, "pull_request"),
        payload::field::<Repository>(payload, "repository"),
    ) else {
        return Ok(());
    };

    let subject = Subject {
        title: pr.title(),
        body: pr.body(),
        branch: Some(pr.branch().unwrap_or_default()),
    };
    let labels = labels_for(&config.pull_request, &subject);
    apply(client, &repository, pr.number, labels, "pull request").await
}

async fn label_issue(
    config: &AutoLabelConfig,
    payload: &Value,
    client: &dyn GitHubClient,
) -> anyhow::Result<()> {
    if !action_in(payload, &ISSUE_ACTIONS) {
        return Ok(());
    }
    let (Some(issue), Some(repository)) = (
        payload::field::<Item>(payload, "issue"),
        payload::field::<Repository>(payload, "repository"),
    ) else {
        return Ok(());
    };

    let subject = Subject {
        title: issue.title(),
        body: issue.body(),
        branch: None,
    };
    let labels = labels_for(&config.issues, &subject);
    apply(client, &repository, issue.number, labels, "issue").await
}

/// Manual run: `[owner, repo, number]`. Fetches the item and runs it through
/// the pull request or issue rules as if it had just been opened.
async fn replay(
    config: &AutoLabelConfig,
    client: &dyn GitHubClient,
    args: &[Value],
) -> anyhow::Result<()> {
    let target = IssueRef::from_args(args)?;
    tracing::info!(
        repository = %target.full_name(),
        number = target.number,
        "running auto-label"
    );

    let item = client
        .get_issue(&target.owner, &target.repo, target.number)
        .await
        .with_context(|| format!("fetching {}#{}", target.full_name(), target.number))?;

    let repository = json!({
        "owner": { "login": target.owner },
        "name": target.repo,
        "full_name": target.full_name(),
    });

    if item.get("pull_request").is_some() {
        let payload = json!({ "action": "opened", "pull_request": item, "repository": repository });
        label_pull_request(config, &payload, client).await
    } else {
        let payload = json!({ "action": "opened", "issue": item, "repository": repository });
        label_issue(config, &payload, client).await
    }
}
