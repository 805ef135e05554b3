//! # gitautomata-app
//!
//! Application layer — the automation registry, the event dispatcher and
//! **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **client port** automations use to talk to GitHub
//!   (`GitHubClient`), implemented by the reqwest adapter
//! - Define [`Automation`](automation::Automation): a named set of optional
//!   per-event handlers plus an optional manual entry point
//! - Keep the in-memory [`AutomationRegistry`](registry::AutomationRegistry)
//! - Dispatch webhook events and manual runs through
//!   [`AutomationRunner`](runner::AutomationRunner), isolating failures per
//!   automation and reporting one result per run
//! - Provide a recording [`DryRunClient`](dry_run::DryRunClient) for
//!   offline test runs
//!
//! ## Dependency rule
//! Depends on `gitautomata-domain` only. Never imports adapter crates.
//! Adapters depend on *this* crate, not the reverse.

pub mod automation;
pub mod dry_run;
pub mod ports;
pub mod registry;
pub mod runner;
