//! Automation — a named unit of logic reacting to GitHub events and/or
//! invocable manually.
//!
//! An automation declares, per [`EventKind`], an optional handler, plus an
//! optional manual entry point. Automations are immutable once built: the
//! registry replaces them wholesale, it never patches their handler set.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use gitautomata_domain::error::{GitAutomataError, ValidationError};
use gitautomata_domain::event::{EventKind, WebhookEvent};

use crate::ports::GitHubClient;

/// Callback invoked for one webhook event.
pub type EventHandler = Arc<
    dyn Fn(Arc<WebhookEvent>, Arc<dyn GitHubClient>) -> BoxFuture<'static, anyhow::Result<()>>
        + Send
        + Sync,
>;

/// Manual entry point, invoked with caller-supplied positional arguments.
pub type ManualRun = Arc<
    dyn Fn(Arc<dyn GitHubClient>, Vec<Value>) -> BoxFuture<'static, anyhow::Result<()>>
        + Send
        + Sync,
>;

/// Per-kind handler table.
///
/// One slot per well-known [`EventKind`] plus a map for
/// [`EventKind::Other`]. Lookups are an exhaustive `match`, so adding a
/// variant to `EventKind` forces this table to be updated.
#[derive(Clone, Default)]
pub struct Handlers {
    push: Option<EventHandler>,
    pull_request: Option<EventHandler>,
    issues: Option<EventHandler>,
    release: Option<EventHandler>,
    workflow_run: Option<EventHandler>,
    check_run: Option<EventHandler>,
    star: Option<EventHandler>,
    fork: Option<EventHandler>,
    other: BTreeMap<String, EventHandler>,
}

impl Handlers {
    /// Handler registered for `kind`, if any.
    #[must_use]
    pub fn get(&self, kind: &EventKind) -> Option<&EventHandler> {
        match kind {
            EventKind::Push => self.push.as_ref(),
            EventKind::PullRequest => self.pull_request.as_ref(),
            EventKind::Issues => self.issues.as_ref(),
            EventKind::Release => self.release.as_ref(),
            EventKind::WorkflowRun => self.workflow_run.as_ref(),
            EventKind::CheckRun => self.check_run.as_ref(),
            EventKind::Star => self.star.as_ref(),
            EventKind::Fork => self.fork.as_ref(),
            EventKind::Other(name) => self.other.get(name),
        }
    }

    fn set(&mut self, kind: EventKind, handler: EventHandler) {
        let slot = match kind {
            EventKind::Push => &mut self.push,
            EventKind::PullRequest => &mut self.pull_request,
            EventKind::Issues => &mut self.issues,
            EventKind::Release => &mut self.release,
            EventKind::WorkflowRun => &mut self.workflow_run,
            EventKind::CheckRun => &mut self.check_run,
            EventKind::Star => &mut self.star,
            EventKind::Fork => &mut self.fork,
            EventKind::Other(name) => {
                self.other.insert(name, handler);
                return;
            }
        };
        *slot = Some(handler);
    }

    /// Kinds with a handler: well-known kinds in declaration order, then
    /// other kinds sorted by name.
    #[must_use]
    pub fn kinds(&self) -> Vec<EventKind> {
        EventKind::KNOWN
            .into_iter()
            .filter(|kind| self.get(kind).is_some())
            .chain(self.other.keys().cloned().map(EventKind::Other))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

/// A named set of event handlers and an optional manual entry point.
#[derive(Clone)]
pub struct Automation {
    name: String,
    description: Option<String>,
    handlers: Handlers,
    manual_run: Option<ManualRun>,
}

impl Automation {
    /// Create a builder for constructing an [`Automation`].
    #[must_use]
    pub fn builder() -> AutomationBuilder {
        AutomationBuilder::default()
    }

    /// Unique registry key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Handler for `kind`, if this automation subscribes to it.
    #[must_use]
    pub fn handler(&self, kind: &EventKind) -> Option<&EventHandler> {
        self.handlers.get(kind)
    }

    #[must_use]
    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    #[must_use]
    pub fn manual_run(&self) -> Option<&ManualRun> {
        self.manual_run.as_ref()
    }

    /// Whether this automation can be run manually.
    #[must_use]
    pub fn supports_manual_run(&self) -> bool {
        self.manual_run.is_some()
    }

    /// Wire names of the event types this automation handles.
    #[must_use]
    pub fn subscribed_events(&self) -> Vec<String> {
        self.handlers
            .kinds()
            .into_iter()
            .map(String::from)
            .collect()
    }
}

impl fmt::Debug for Automation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automation")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("handlers", &self.handlers)
            .field("manual_run", &self.manual_run.is_some())
            .finish()
    }
}

/// Step-by-step builder for [`Automation`].
#[derive(Default)]
pub struct AutomationBuilder {
    name: Option<String>,
    description: Option<String>,
    handlers: Handlers,
    manual_run: Option<ManualRun>,
}

impl AutomationBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Subscribe to `kind`. A second call for the same kind replaces the
    /// first handler.
    #[must_use]
    pub fn on<F, Fut>(mut self, kind: impl Into<EventKind>, handler: F) -> Self
    where
        F: Fn(Arc<WebhookEvent>, Arc<dyn GitHubClient>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handler: EventHandler =
            Arc::new(move |event: Arc<WebhookEvent>, client: Arc<dyn GitHubClient>| {
                handler(event, client).boxed()
            });
        self.handlers.set(kind.into(), handler);
        self
    }

    /// Provide a manual entry point.
    #[must_use]
    pub fn manual<F, Fut>(mut self, run: F) -> Self
    where
        F: Fn(Arc<dyn GitHubClient>, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let run: ManualRun = Arc::new(move |client: Arc<dyn GitHubClient>, args: Vec<Value>| {
            run(client, args).boxed()
        });
        self.manual_run = Some(run);
        self
    }

    /// Consume the builder, validate, and return an [`Automation`].
    ///
    /// # Errors
    ///
    /// Returns [`GitAutomataError::Validation`] if the name is missing or
    /// blank.
    pub fn build(self) -> Result<Automation, GitAutomataError> {
        let name = self.name.unwrap_or_default();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Automation {
            name,
            description: self.description,
            handlers: self.handlers,
            manual_run: self.manual_run,
        })
    }
}
