//! Parallel execution over multiple character records.
//!
//! Each record gets its own pipeline and context — instances share nothing
//! but the performance monitor, whose aggregates are lock-protected.

use std::sync::Arc;

use serde_json::Value;

use sheetcalc_core::{CalcError, CalculationContext, Coordinator};

use crate::interfaces::RunReport;
use crate::monitor::PerformanceMonitor;
use crate::wiring::build_pipeline;

/// Execute one record through a freshly built pipeline.
fn execute_one(
    record: &Value,
    coordinators: &[Arc<dyn Coordinator>],
    monitor: &Arc<PerformanceMonitor>,
) -> Result<RunReport, CalcError> {
    let mut pipeline = build_pipeline(coordinators, Arc::clone(monitor))?;
    let mut ctx = CalculationContext::for_raw(record);
    pipeline.execute(record, &mut ctx)
}

/// Execute every record, in parallel for more than one.
///
/// Results keep the input order. A configuration error in one record's
/// pipeline surfaces in that record's slot without affecting the others.
pub fn execute_batch(
    records: &[Value],
    coordinators: &[Arc<dyn Coordinator>],
    monitor: &Arc<PerformanceMonitor>,
) -> Vec<Result<RunReport, CalcError>> {
    if records.len() == 1 {
        // Single record: run directly
        return vec![execute_one(&records[0], coordinators, monitor)];
    }

    use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

    records
        .par_iter()
        .map(|record| execute_one(record, coordinators, monitor))
        .collect()
}
