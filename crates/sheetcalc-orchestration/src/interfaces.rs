//! Orchestration interfaces: run reports and presentation.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

/// Reserved key carrying run metadata in the flattened report map.
pub const PIPELINE_METADATA_KEY: &str = "_pipeline";

/// Aggregate metadata for one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    /// Number of registered stages.
    pub total_stages: usize,
    /// Stages whose coordinator ran to completion.
    pub executed_stages: usize,
    /// Stages whose coordinator ran and did not complete.
    pub failed_stages: usize,
    /// Stages never invoked (unsatisfied dependencies or declined input).
    pub skipped_stages: usize,
    /// The execution order used for this run.
    pub execution_order: Vec<String>,
    /// Seconds spent in each invoked coordinator.
    pub stage_times: BTreeMap<String, f64>,
}

/// Result of one pipeline run: completed stage outputs plus metadata.
///
/// A key is present in `results` exactly when that stage completed; absence
/// means failed or skipped (consult `metadata` and the stage bookkeeping).
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Stage name → completed output data.
    pub results: BTreeMap<String, Value>,
    /// Run-level aggregates.
    pub metadata: RunMetadata,
}

impl RunReport {
    /// Output of a completed stage, if present.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&Value> {
        self.results.get(name)
    }

    /// Flatten into the external map shape: one entry per completed stage
    /// plus the reserved [`PIPELINE_METADATA_KEY`] entry.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (name, data) in &self.results {
            map.insert(name.clone(), data.clone());
        }
        map.insert(
            PIPELINE_METADATA_KEY.to_string(),
            serde_json::to_value(&self.metadata).unwrap_or_else(|_| json!({})),
        );
        Value::Object(map)
    }
}

/// Trait for presenting run reports to the user.
pub trait ReportPresenter: Send + Sync {
    /// Present one run's report.
    fn present_report(&self, report: &RunReport, details: bool);

    /// Present an error.
    fn present_error(&self, error: &str);
}

/// Null presenter (does nothing).
pub struct NullReportPresenter;

impl ReportPresenter for NullReportPresenter {
    fn present_report(&self, _report: &RunReport, _details: bool) {}
    fn present_error(&self, _error: &str) {}
}
