//! # gitautomata-automations
//!
//! Pre-built automations, addressable by name.
//!
//! - [`auto_label`] — labels issues and pull requests from rule matches
//! - [`hello_world`] — logs events and welcomes new pull requests
//! - [`auto_merge`] — example: logs the checks an auto-merger would run
//! - [`slack_notifier`] — example: formats Slack messages for new items
//!
//! ## Dependency rule
//! Depends on `gitautomata-app` (automation builder, client port) and
//! `gitautomata-domain`. Automations talk to GitHub only through the port.

pub mod auto_label;
pub mod auto_merge;
pub mod hello_world;
pub mod payload;
pub mod slack_notifier;

use gitautomata_app::automation::Automation;
use gitautomata_app::runner::AutomationRunner;
use gitautomata_domain::error::{GitAutomataError, NotFoundError};

/// Names of every built-in automation.
pub const BUILTIN: [&str; 4] = [
    hello_world::NAME,
    auto_label::NAME,
    auto_merge::NAME,
    slack_notifier::NAME,
];

/// Build the built-in automation called `name`.
///
/// # Errors
///
/// Returns [`GitAutomataError::NotFound`] for unknown names.
pub fn builtin(name: &str) -> Result<Automation, GitAutomataError> {
    match name {
        hello_world::NAME => hello_world::automation(),
        auto_label::NAME => auto_label::automation(),
        auto_merge::NAME => auto_merge::automation(),
        slack_notifier::NAME => slack_notifier::automation(),
        other => Err(NotFoundError {
            entity: "built-in automation",
            name: other.to_string(),
        }
        .into()),
    }
}

/// Register every automation in `names` with `runner`.
///
/// # Errors
///
/// Stops at the first unknown name.
pub fn register<S: AsRef<str>>(runner: &AutomationRunner, names: &[S]) -> Result<(), GitAutomataError> {
    for name in names {
        runner.register(builtin(name.as_ref())?);
    }
    Ok(())
}
