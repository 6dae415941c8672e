//! Coordinator selection and pipeline construction.

use std::sync::Arc;

use sheetcalc_core::registry::default_coordinators;
use sheetcalc_core::{CalcError, Coordinator};

use crate::monitor::PerformanceMonitor;
use crate::pipeline::CalculationPipeline;

/// Pick coordinators by selection string: `"all"` or a comma-separated list
/// of stage names.
pub fn select_coordinators(selection: &str) -> Result<Vec<Arc<dyn Coordinator>>, CalcError> {
    let all = default_coordinators();
    if selection.trim() == "all" {
        return Ok(all);
    }

    let mut picked = Vec::new();
    for name in selection.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let coordinator = all
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| CalcError::Config(format!("unknown coordinator: {name}")))?;
        picked.push(Arc::clone(coordinator));
    }
    if picked.is_empty() {
        return Err(CalcError::Config("empty coordinator selection".to_string()));
    }
    Ok(picked)
}

/// Build a pipeline from the given coordinators, registering each under its
/// own name with its own declared dependencies.
pub fn build_pipeline(
    coordinators: &[Arc<dyn Coordinator>],
    monitor: Arc<PerformanceMonitor>,
) -> Result<CalculationPipeline, CalcError> {
    let mut pipeline = CalculationPipeline::with_monitor(monitor);
    for coordinator in coordinators {
        pipeline.register_stage(coordinator.name(), Arc::clone(coordinator), &[])?;
    }
    Ok(pipeline)
}

/// Build the default full pipeline with its own monitor.
pub fn default_pipeline() -> Result<CalculationPipeline, CalcError> {
    build_pipeline(
        &default_coordinators(),
        Arc::new(PerformanceMonitor::new()),
    )
}
