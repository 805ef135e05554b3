//! Dispatch results — the outcome of running one automation once.

use std::time::Duration;

use crate::error::GitAutomataError;

/// Outcome record for a single automation invocation.
///
/// Produced once per (automation, event) pair that actually ran, and once per
/// manual run.
#[derive(Debug)]
pub struct DispatchResult {
    pub automation_name: String,
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<GitAutomataError>,
    pub duration: Duration,
}

impl DispatchResult {
    /// A successful run.
    #[must_use]
    pub fn succeeded(automation_name: impl Into<String>, duration: Duration) -> Self {
        let automation_name = automation_name.into();
        Self {
            message: Some(format!("automation '{automation_name}' executed successfully")),
            automation_name,
            success: true,
            error: None,
            duration,
        }
    }

    /// A run that failed while executing the automation.
    #[must_use]
    pub fn failed(
        automation_name: impl Into<String>,
        error: GitAutomataError,
        duration: Duration,
    ) -> Self {
        let automation_name = automation_name.into();
        Self {
            message: Some(format!("error in automation '{automation_name}': {error}")),
            automation_name,
            success: false,
            error: Some(error),
            duration,
        }
    }

    /// A run that was refused before anything executed (unknown name,
    /// missing entry point, …). The message is the error's own text.
    #[must_use]
    pub fn rejected(automation_name: impl Into<String>, error: GitAutomataError) -> Self {
        Self {
            automation_name: automation_name.into(),
            success: false,
            message: Some(error.to_string()),
            error: Some(error),
            duration: Duration::ZERO,
        }
    }

    /// Elapsed time in whole milliseconds (saturating).
    #[must_use]
    pub fn duration_millis(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }

    /// Message of the wrapped error, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

/// Aggregate counts over a batch of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl DispatchSummary {
    #[must_use]
    pub fn of(results: &[DispatchResult]) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            successful,
            failed: results.len() - successful,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HandlerFailure, NotFoundError};

    #[test]
    fn should_build_success_message_with_name() {
        let result = DispatchResult::succeeded("hello", Duration::from_millis(12));
        assert!(result.success);
        assert_eq!(
            result.message.as_deref(),
            Some("automation 'hello' executed successfully")
        );
        assert_eq!(result.duration_millis(), 12);
        assert!(result.error.is_none());
    }

    #[test]
    fn should_keep_handler_message_verbatim_on_failure() {
        let result = DispatchResult::failed(
            "broken",
            HandlerFailure::new("Test error").into(),
            Duration::from_millis(3),
        );
        assert!(!result.success);
        assert_eq!(result.error_message().as_deref(), Some("Test error"));
        assert_eq!(
            result.message.as_deref(),
            Some("error in automation 'broken': Test error")
        );
        assert_eq!(result.duration_millis(), 3);
    }

    #[test]
    fn should_report_zero_duration_when_rejected() {
        let result = DispatchResult::rejected(
            "ghost",
            NotFoundError {
                entity: "automation",
                name: "ghost".to_string(),
            }
            .into(),
        );
        assert!(!result.success);
        assert_eq!(result.duration, Duration::ZERO);
        assert_eq!(result.message.as_deref(), Some("automation 'ghost' not found"));
    }

    #[test]
    fn should_count_successes_and_failures() {
        let results = vec![
            DispatchResult::succeeded("a", Duration::ZERO),
            DispatchResult::failed("b", HandlerFailure::new("boom").into(), Duration::ZERO),
            DispatchResult::succeeded("c", Duration::ZERO),
        ];
        let summary = DispatchSummary::of(&results);
        assert_eq!(
            summary,
            DispatchSummary {
                total: 3,
                successful: 2,
                failed: 1,
            }
        );
    }
}
