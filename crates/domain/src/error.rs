//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`GitAutomataError`] via `#[from]` when crossing a port boundary.

/// Top-level error for gitautomata operations.
#[derive(Debug, thiserror::Error)]
pub enum GitAutomataError {
    /// The named automation is not registered.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The automation exists but lacks the requested entry point.
    #[error(transparent)]
    UnsupportedOperation(#[from] UnsupportedOperationError),

    /// An automation handler returned an error or panicked.
    #[error(transparent)]
    HandlerFailure(#[from] HandlerFailure),

    /// A value violated a domain invariant.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The remote GitHub API (or the transport to it) failed.
    #[error("client error: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Lookup of a named item that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} '{name}' not found")]
pub struct NotFoundError {
    /// Kind of item that was looked up (e.g. `"automation"`).
    pub entity: &'static str,
    /// Name that was looked up.
    pub name: String,
}

/// An automation was asked to do something it does not implement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("automation '{name}' does not support {operation}")]
pub struct UnsupportedOperationError {
    pub name: String,
    /// Human-readable operation name (e.g. `"manual execution"`).
    pub operation: &'static str,
}

/// Failure captured at the per-automation boundary.
///
/// The display form is the captured message verbatim, so callers see the
/// handler's own wording.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerFailure {
    pub message: String,
}

impl HandlerFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },
}

impl GitAutomataError {
    /// Wrap any transport/API error as [`GitAutomataError::Client`].
    pub fn client(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Client(Box::new(err))
    }
}
