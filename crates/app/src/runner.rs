//! Automation runner — dispatches webhook events and manual runs.
//!
//! For each incoming event the runner walks a snapshot of the registry and
//! invokes every automation that subscribes to the event's kind, one after
//! another. A failure (returned error or panic) inside one automation is
//! captured into its [`DispatchResult`] and never stops the others.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use gitautomata_domain::dispatch::{DispatchResult, DispatchSummary};
use gitautomata_domain::error::{HandlerFailure, NotFoundError, UnsupportedOperationError};
use gitautomata_domain::event::{EventKind, WebhookEvent};

use crate::automation::Automation;
use crate::ports::GitHubClient;
use crate::registry::AutomationRegistry;

/// Dispatches events and manual runs against an [`AutomationRegistry`].
#[derive(Debug, Default)]
pub struct AutomationRunner {
    registry: AutomationRegistry,
}

impl AutomationRunner {
    /// Create a runner with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner over an existing registry.
    #[must_use]
    pub fn with_registry(registry: AutomationRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &AutomationRegistry {
        &self.registry
    }

    /// Shorthand for `registry().register(..)`.
    pub fn register(&self, automation: Automation) {
        self.registry.register(automation);
    }

    /// Resolve `event_type` and dispatch `payload` to every subscriber.
    pub async fn dispatch(
        &self,
        event_type: &str,
        payload: Value,
        client: Arc<dyn GitHubClient>,
    ) -> Vec<DispatchResult> {
        let event = WebhookEvent::new(EventKind::from_wire(event_type), payload);
        self.run_webhook_event(event, client).await
    }

    /// Invoke every registered automation that handles `event.kind`.
    ///
    /// Automations without a matching handler are skipped and produce no
    /// result. Results come back in registry order.
    #[tracing::instrument(skip_all, fields(event = %event.kind, handler = %event.kind.handler_key()))]
    pub async fn run_webhook_event(
        &self,
        event: WebhookEvent,
        client: Arc<dyn GitHubClient>,
    ) -> Vec<DispatchResult> {
        let event = Arc::new(event);
        let mut results = Vec::new();

        for automation in self.registry.list() {
            let Some(handler) = automation.handler(&event.kind) else {
                continue;
            };

            tracing::info!(automation = automation.name(), "running automation");
            let started = Instant::now();
            let outcome = invoke(|| handler(Arc::clone(&event), Arc::clone(&client))).await;
            results.push(finish(automation.name(), outcome, started));
        }

        let summary = DispatchSummary::of(&results);
        tracing::debug!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            "event dispatched"
        );
        results
    }

    /// Run the manual entry point of the automation called `name`.
    ///
    /// Always returns exactly one result. Unknown names and automations
    /// without a manual entry point are reported as failed results; nothing
    /// is invoked in either case.
    #[tracing::instrument(skip(self, client, args), fields(args = args.len()))]
    pub async fn run_manual(
        &self,
        name: &str,
        client: Arc<dyn GitHubClient>,
        args: Vec<Value>,
    ) -> DispatchResult {
        let Some(automation) = self.registry.get(name) else {
            tracing::warn!("automation not found");
            return DispatchResult::rejected(
                name,
                NotFoundError {
                    entity: "automation",
                    name: name.to_string(),
                }
                .into(),
            );
        };

        let Some(run) = automation.manual_run() else {
            tracing::warn!("automation has no manual entry point");
            return DispatchResult::rejected(
                name,
                UnsupportedOperationError {
                    name: name.to_string(),
                    operation: "manual execution",
                }
                .into(),
            );
        };

        tracing::info!("running automation manually");
        let started = Instant::now();
        let outcome = invoke(move || run(client, args)).await;
        finish(automation.name(), outcome, started)
    }
}

/// Call a handler and drive its future, turning both returned errors and
/// panics into a [`HandlerFailure`]. A panic raised while the handler builds
/// its future is caught the same way as one raised while it is polled.
async fn invoke<F>(start: F) -> Result<(), HandlerFailure>
where
    F: FnOnce() -> BoxFuture<'static, anyhow::Result<()>>,
{
    let future = match panic::catch_unwind(AssertUnwindSafe(start)) {
        Ok(future) => future,
        Err(payload) => return Err(HandlerFailure::new(panic_message(&*payload))),
    };
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(HandlerFailure::new(format!("{err:#}"))),
        Err(payload) => Err(HandlerFailure::new(panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "automation panicked".to_string()
    }
}

/// Build the result for a finished run. The duration is measured here, on
/// both the success and the failure path.
fn finish(
    name: &str,
    outcome: Result<(), HandlerFailure>,
    started: Instant,
) -> DispatchResult {
    let duration = started.elapsed();
    let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    match outcome {
        Ok(()) => {
            tracing::info!(automation = name, duration_ms, "automation completed");
            DispatchResult::succeeded(name, duration)
        }
        Err(failure) => {
            tracing::error!(automation = name, duration_ms, error = %failure, "automation failed");
            DispatchResult::failed(name, failure.into(), duration)
        }
    }
}
