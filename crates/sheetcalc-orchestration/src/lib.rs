//! # sheetcalc-orchestration
//!
//! Dependency-ordered pipeline execution, run reports, performance
//! aggregation, and parallel batch runs.

pub mod batch;
pub mod graph;
pub mod interfaces;
pub mod monitor;
pub mod pipeline;
pub mod wiring;

pub use batch::execute_batch;
pub use interfaces::{ReportPresenter, RunMetadata, RunReport, PIPELINE_METADATA_KEY};
pub use monitor::{OperationSummary, PerformanceMonitor};
pub use pipeline::{CalculationPipeline, PipelineStage, DEPENDENCIES_NOT_SATISFIED};
pub use wiring::{build_pipeline, default_pipeline, select_coordinators};

use serde_json::Value;

use sheetcalc_core::{CalcError, CalculationContext};

/// Run the full default pipeline over one raw document.
///
/// This is a convenience function for simple use cases. For coordinator
/// selection, shared monitors, or batch runs, build the pipeline explicitly.
///
/// # Example
/// ```
/// let raw = serde_json::json!({ "name": "Mira", "class": "wizard", "level": 5 });
/// let report = sheetcalc_orchestration::calculate(&raw).unwrap();
/// assert!(report.stage("abilities").is_some());
/// ```
pub fn calculate(raw: &Value) -> Result<RunReport, CalcError> {
    let mut pipeline = default_pipeline()?;
    let mut ctx = CalculationContext::for_raw(raw);
    pipeline.execute(raw, &mut ctx)
}
