//! # gitautomata-adapter-github-reqwest
//!
//! GitHub REST adapter — the production implementation of the
//! [`GitHubClient`](gitautomata_app::ports::GitHubClient) port.
//!
//! ## Modules
//! - [`config`] — API base URL, token, API version and request timeout
//! - [`client`] — [`RestGitHubClient`], one method per port operation
//! - [`error`] — transport and status errors, convertible into the domain error
//!
//! ## Dependency rule
//! Depends on `gitautomata-domain` and `gitautomata-app` (for the port trait).
//! Nothing depends on this crate except the binary.

pub mod client;
pub mod config;
pub mod error;

pub use client::RestGitHubClient;
pub use config::GitHubConfig;
pub use error::GitHubError;
