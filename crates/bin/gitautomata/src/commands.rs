//! Subcommand implementations.
//!
//! Each command returns the process [`ExitCode`]: `SUCCESS` when everything
//! ran, `FAILURE` when an automation reported an error. Setup problems
//! (bad configuration, unparsable arguments, I/O) surface as `Err`.

use std::fmt::Write as _;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use serde_json::Value;

use gitautomata_adapter_github_reqwest::RestGitHubClient;
use gitautomata_adapter_http_axum::router;
use gitautomata_adapter_http_axum::state::AppState;
use gitautomata_app::dry_run::{DryRunClient, RecordedCall};
use gitautomata_app::ports::GitHubClient;
use gitautomata_app::runner::AutomationRunner;
use gitautomata_domain::dispatch::{DispatchResult, DispatchSummary};
use gitautomata_domain::event::WebhookEvent;

use crate::config::Config;
use crate::templates::{self, Template};

/// Runner holding the built-in automations named in `enabled`.
pub fn build_runner(enabled: &[String]) -> anyhow::Result<AutomationRunner> {
    let runner = AutomationRunner::new();
    gitautomata_automations::register(&runner, enabled).context("registering automations")?;
    tracing::debug!(count = runner.registry().len(), "automations registered");
    Ok(runner)
}

fn rest_client(config: &Config) -> anyhow::Result<Arc<dyn GitHubClient>> {
    config.require_token()?;
    let client = RestGitHubClient::new(&config.github).context("building GitHub client")?;
    Ok(Arc::new(client))
}

/// `serve`: bind the HTTP server and run until Ctrl-C or SIGTERM.
pub async fn serve(config: &Config) -> anyhow::Result<ExitCode> {
    let client = rest_client(config)?;
    let runner = Arc::new(build_runner(&config.automations.enabled)?);
    let state = AppState::new(runner, client, config.webhook.clone());
    let app = router::build(state, &config.cors);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "gitautomata listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;
    tracing::info!("server stopped");
    Ok(ExitCode::SUCCESS)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

/// Parse `--args`: absent means no arguments, otherwise a JSON array.
pub fn parse_args(raw: Option<&str>) -> anyhow::Result<Vec<Value>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(raw).context("--args is not valid JSON")? {
        Value::Array(args) => Ok(args),
        _ => bail!("--args must be a JSON array"),
    }
}

/// Parse `--data`: absent means `{}`, otherwise a JSON object.
pub fn parse_data(raw: Option<&str>) -> anyhow::Result<Value> {
    let Some(raw) = raw else {
        return Ok(Value::Object(serde_json::Map::new()));
    };
    let data: Value = serde_json::from_str(raw).context("--data is not valid JSON")?;
    if !data.is_object() {
        bail!("--data must be a JSON object");
    }
    Ok(data)
}

/// `run`: execute one automation's manual entry point against GitHub.
pub async fn run(
    config: &Config,
    name: &str,
    raw_args: Option<&str>,
) -> anyhow::Result<ExitCode> {
    let args = parse_args(raw_args)?;
    let client = rest_client(config)?;
    let runner = build_runner(&config.automations.enabled)?;

    let result = runner.run_manual(name, client, args).await;
    if result.success {
        println!("{}", result.message.as_deref().unwrap_or_default());
        Ok(ExitCode::SUCCESS)
    } else {
        let error = result.error_message().or(result.message).unwrap_or_default();
        eprintln!("{error}");
        Ok(ExitCode::FAILURE)
    }
}

/// `list`: describe every registered automation.
pub fn list(config: &Config) -> anyhow::Result<ExitCode> {
    let runner = build_runner(&config.automations.enabled)?;
    print!("{}", describe(&runner));
    Ok(ExitCode::SUCCESS)
}

/// Human-readable listing of the automations registered with `runner`.
#[must_use]
pub fn describe(runner: &AutomationRunner) -> String {
    let automations = runner.registry().list();
    if automations.is_empty() {
        return "no automations registered\n".to_string();
    }

    let mut out = String::from("available automations:\n");
    for automation in automations {
        let _ = writeln!(out, "\n  {}", automation.name());
        if let Some(description) = automation.description() {
            let _ = writeln!(out, "    {description}");
        }
        let events = automation.subscribed_events();
        if !events.is_empty() {
            let _ = writeln!(out, "    events: {}", events.join(", "));
        }
        if automation.supports_manual_run() {
            let _ = writeln!(out, "    manual run: yes");
        }
    }
    out
}

/// `init`: print or write a source template for a new automation.
pub fn init(
    name: Option<&str>,
    template: Template,
    output: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let name = templates::sanitize_name(name.unwrap_or_default());
    let source = templates::render(template, &name);
    let file_name = templates::file_name(&name);

    match output {
        Some(dir) => {
            let path = dir.join(&file_name);
            std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
            std::fs::write(&path, source).with_context(|| format!("writing {}", path.display()))?;
            println!("created {} ({template} template)", path.display());
        }
        None => {
            println!("// {file_name} ({template} template for '{name}')\n");
            print!("{source}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Outcome of a dry-run dispatch.
#[derive(Debug)]
pub struct DryRun {
    pub results: Vec<DispatchResult>,
    pub calls: Vec<RecordedCall>,
}

/// Dispatch a synthetic `event_type` payload built from `data` through
/// `runner`, recording client calls instead of sending them.
pub async fn dry_run(runner: &AutomationRunner, event_type: &str, data: Value) -> DryRun {
    let client = Arc::new(DryRunClient::new());
    let event = WebhookEvent::test_payload(event_type.to_string(), data);
    let results = runner
        .run_webhook_event(event, Arc::clone(&client) as Arc<dyn GitHubClient>)
        .await;
    DryRun {
        results,
        calls: client.calls(),
    }
}

/// `test`: dry-run a synthetic event and report each automation's result.
pub async fn test(
    config: &Config,
    event_type: &str,
    raw_data: Option<&str>,
) -> anyhow::Result<ExitCode> {
    let data = parse_data(raw_data)?;
    let runner = build_runner(&config.automations.enabled)?;

    let outcome = dry_run(&runner, event_type, data).await;
    print!("{}", report(event_type, &outcome));

    if DispatchSummary::of(&outcome.results).failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Human-readable report of a dry run.
#[must_use]
pub fn report(event_type: &str, outcome: &DryRun) -> String {
    let summary = DispatchSummary::of(&outcome.results);
    let mut out = format!(
        "event '{event_type}': {} ran, {} succeeded, {} failed\n",
        summary.total, summary.successful, summary.failed
    );
    for result in &outcome.results {
        let status = if result.success { "ok" } else { "FAILED" };
        let _ = write!(
            out,
            "  [{status}] {} ({} ms)",
            result.automation_name,
            result.duration_millis()
        );
        match result.error_message() {
            Some(error) => {
                let _ = writeln!(out, ": {error}");
            }
            None => out.push('\n'),
        }
    }
    if !outcome.calls.is_empty() {
        out.push_str("github calls (not sent):\n");
        for call in &outcome.calls {
            let _ = writeln!(out, "  {} {}", call.operation, call.args);
        }
    }
    out
}
