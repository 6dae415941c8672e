//! The standard result envelope returned by every calculation stage.

use std::time::Duration;

use serde_json::{Map, Value};

/// Lifecycle status of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Not yet scheduled.
    Pending,
    /// Currently executing.
    InProgress,
    /// Finished and produced trustworthy data.
    Completed,
    /// Ran and failed; `errors` describes why.
    Failed,
    /// Never ran (unsatisfied dependencies or declined input).
    Skipped,
}

impl StageStatus {
    /// Lowercase tag used in reports and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Result of one coordinator invocation.
///
/// `data` is trustworthy only when `status == Completed`; the constructors
/// maintain the invariant that a completed result carries no errors.
#[derive(Debug, Clone)]
pub struct CalculationResult {
    /// Name of the stage that produced this result.
    pub stage: String,
    /// Terminal status.
    pub status: StageStatus,
    /// Output mapping (empty unless completed).
    pub data: Value,
    /// Ordered error messages.
    pub errors: Vec<String>,
    /// Ordered warning messages (defaults applied, values clamped, ...).
    pub warnings: Vec<String>,
    /// Wall-clock duration of the coordinator call.
    pub execution_time: Duration,
    /// Free-form extras (diagnostics, debug detail).
    pub metadata: Map<String, Value>,
}

impl CalculationResult {
    /// A successful result carrying `data`.
    #[must_use]
    pub fn completed(stage: impl Into<String>, data: Value) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Completed,
            data,
            errors: Vec::new(),
            warnings: Vec::new(),
            execution_time: Duration::ZERO,
            metadata: Map::new(),
        }
    }

    /// A failed result; `errors` must name what went wrong.
    #[must_use]
    pub fn failed(stage: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Failed,
            data: Value::Object(Map::new()),
            errors,
            warnings: Vec::new(),
            execution_time: Duration::ZERO,
            metadata: Map::new(),
        }
    }

    /// A skipped result with the reason recorded as its only error.
    #[must_use]
    pub fn skipped(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Skipped,
            data: Value::Object(Map::new()),
            errors: vec![reason.into()],
            warnings: Vec::new(),
            execution_time: Duration::ZERO,
            metadata: Map::new(),
        }
    }

    /// Append a warning, preserving order.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Whether the result is trustworthy.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == StageStatus::Completed
    }

    /// Joined error text for bookkeeping, or `None` when error-free.
    #[must_use]
    pub fn error_summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_tags() {
        assert_eq!(StageStatus::Completed.as_str(), "completed");
        assert_eq!(StageStatus::Failed.as_str(), "failed");
        assert_eq!(StageStatus::Skipped.as_str(), "skipped");
    }

    #[test]
    fn completed_has_no_errors() {
        let result = CalculationResult::completed("abilities", json!({ "x": 1 }));
        assert!(result.is_completed());
        assert!(result.errors.is_empty());
        assert_eq!(result.data, json!({ "x": 1 }));
        assert!(result.error_summary().is_none());
    }

    #[test]
    fn failed_carries_errors() {
        let result =
            CalculationResult::failed("combat", vec!["bad".into(), "worse".into()]);
        assert_eq!(result.status, StageStatus::Failed);
        assert_eq!(result.error_summary().as_deref(), Some("bad; worse"));
        assert_eq!(result.data, json!({}));
    }

    #[test]
    fn skipped_records_reason() {
        let result = CalculationResult::skipped("combat", "dependencies not satisfied");
        assert_eq!(result.status, StageStatus::Skipped);
        assert_eq!(result.errors, vec!["dependencies not satisfied"]);
    }

    #[test]
    fn warnings_preserve_order() {
        let mut result = CalculationResult::completed("abilities", json!({}));
        result.warn("first");
        result.warn("second");
        assert_eq!(result.warnings, vec!["first", "second"]);
        assert!(result.is_completed());
    }
}
