//! # gitautomata-domain
//!
//! Pure domain model for the gitautomata GitHub automation framework.
//!
//! ## Responsibilities
//! - Define **event kinds** (`push`, `pull_request`, …) as a tagged variant
//!   so routing is an exhaustive `match` rather than a string lookup
//! - Define the **webhook envelope** (event kind + opaque JSON payload)
//! - Define **dispatch results** (one outcome record per automation run)
//! - Define the shared **error taxonomy** (`NotFound`, `UnsupportedOperation`,
//!   `HandlerFailure`, …)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod dispatch;
pub mod error;
pub mod event;
