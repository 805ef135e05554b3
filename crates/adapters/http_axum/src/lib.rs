//! # gitautomata-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Receive **GitHub webhooks**: verify the `X-Hub-Signature-256` HMAC over
//!   the raw body, read the event type from `X-GitHub-Event`, and hand the
//!   payload to the [`AutomationRunner`](gitautomata_app::runner::AutomationRunner)
//! - Serve a small JSON API: `/health`, `/automations`,
//!   `/automations/{name}/run`
//! - Map application results into HTTP responses
//!
//! ## Dependency rule
//! Depends on `gitautomata-app` (runner, registry, client port) and
//! `gitautomata-domain`. Never leaks axum types into the domain.

pub mod api;
pub mod config;
pub mod error;
pub mod router;
pub mod signature;
pub mod state;
