//! The calculation pipeline: stage registration and dependency-ordered
//! execution.
//!
//! Stage-level problems are contained: a failed, declined, or panicking
//! coordinator marks its own stage (and, transitively, its dependents as
//! unsatisfied) while independent stages still complete. Only configuration
//! problems — a dependency cycle or a reference to a never-registered stage —
//! abort a call, and both are detected before any coordinator runs.

use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, warn};

use sheetcalc_core::{CalcError, CalculationContext, CalculationResult, Coordinator};

use crate::graph::{self, GraphNode};
use crate::interfaces::{RunMetadata, RunReport};
use crate::monitor::PerformanceMonitor;

/// Fixed error message recorded on stages whose dependencies did not
/// execute successfully.
pub const DEPENDENCIES_NOT_SATISFIED: &str = "dependencies not satisfied";

/// Error message recorded on stages declined by their input gate.
pub const INPUT_DECLINED: &str = "coordinator declined the input document";

/// Operation name the monitor uses for whole-run spans.
pub const EXECUTE_OPERATION: &str = "pipeline.execute";

/// Registration record for one coordinator plus its per-run bookkeeping.
pub struct PipelineStage {
    /// Unique stage name.
    pub name: String,
    coordinator: Arc<dyn Coordinator>,
    /// Effective dependencies: the coordinator's own declarations extended
    /// by any names supplied at registration.
    pub dependencies: Vec<String>,
    /// Whether the coordinator was invoked this run.
    pub executed: bool,
    /// The result envelope, once the stage has been processed.
    pub result: Option<CalculationResult>,
    /// Wall-clock time of the coordinator call, when invoked.
    pub execution_time: Option<Duration>,
    /// Error summary recorded on this stage, if any.
    pub error: Option<String>,
}

impl PipelineStage {
    fn new(name: &str, coordinator: Arc<dyn Coordinator>, extra_deps: &[&str]) -> Self {
        let mut dependencies: Vec<String> = coordinator
            .dependencies()
            .iter()
            .map(|d| (*d).to_string())
            .collect();
        for dep in extra_deps {
            if !dependencies.iter().any(|d| d == dep) {
                dependencies.push((*dep).to_string());
            }
        }
        Self {
            name: name.to_string(),
            coordinator,
            dependencies,
            executed: false,
            result: None,
            execution_time: None,
            error: None,
        }
    }

    fn reset(&mut self) {
        self.executed = false;
        self.result = None;
        self.execution_time = None;
        self.error = None;
    }

    /// The registered coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &Arc<dyn Coordinator> {
        &self.coordinator
    }

    /// Whether this stage executed and completed.
    fn satisfied(&self) -> bool {
        self.executed && self.error.is_none()
    }
}

/// The orchestrator: owns the registered stages, their execution order, and
/// the performance monitor.
///
/// `execute` takes `&mut self`, so a second call on the same instance while
/// one is in progress is unrepresentable — distinct pipelines are fully
/// independent and may share only the monitor.
pub struct CalculationPipeline {
    stages: HashMap<String, PipelineStage>,
    execution_order: Vec<String>,
    monitor: Arc<PerformanceMonitor>,
}

impl CalculationPipeline {
    /// Create an empty pipeline with its own enabled monitor.
    #[must_use]
    pub fn new() -> Self {
        Self::with_monitor(Arc::new(PerformanceMonitor::new()))
    }

    /// Create an empty pipeline sharing the given monitor.
    #[must_use]
    pub fn with_monitor(monitor: Arc<PerformanceMonitor>) -> Self {
        Self {
            stages: HashMap::new(),
            execution_order: Vec::new(),
            monitor,
        }
    }

    /// The shared performance monitor.
    #[must_use]
    pub fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.monitor
    }

    /// Register (or replace) a stage and rebuild the execution order.
    ///
    /// `dependencies` extends the coordinator's own declared dependencies.
    /// If the new registration would create a dependency cycle, it is rolled
    /// back and the pipeline keeps its previous valid configuration.
    pub fn register_stage(
        &mut self,
        name: &str,
        coordinator: Arc<dyn Coordinator>,
        dependencies: &[&str],
    ) -> Result<(), CalcError> {
        let stage = PipelineStage::new(name, coordinator, dependencies);
        let previous = self.stages.insert(name.to_string(), stage);
        if let Err(err) = self.rebuild_order() {
            match previous {
                Some(previous) => {
                    self.stages.insert(name.to_string(), previous);
                }
                None => {
                    self.stages.remove(name);
                }
            }
            self.rebuild_order()
                .expect("rollback to a previously valid configuration cannot fail");
            return Err(err);
        }
        debug!(stage = name, "registered stage");
        Ok(())
    }

    /// Remove a stage and rebuild the execution order. Returns whether the
    /// stage existed.
    pub fn unregister_stage(&mut self, name: &str) -> bool {
        if self.stages.remove(name).is_none() {
            return false;
        }
        self.rebuild_order()
            .expect("removing a stage cannot introduce a cycle");
        true
    }

    /// The current execution order.
    #[must_use]
    pub fn execution_order(&self) -> &[String] {
        &self.execution_order
    }

    /// Bookkeeping for a registered stage.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&PipelineStage> {
        self.stages.get(name)
    }

    /// Number of registered stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether no stages are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    fn rebuild_order(&mut self) -> Result<(), CalcError> {
        let nodes: Vec<GraphNode> = self
            .stages
            .values()
            .map(|stage| GraphNode {
                name: stage.name.clone(),
                priority: stage.coordinator.priority(),
                dependencies: stage.dependencies.clone(),
            })
            .collect();
        self.execution_order = graph::execution_order(&nodes)?;
        Ok(())
    }

    /// Run every registered stage against `raw`, in dependency order.
    ///
    /// The context is reset first; each completed stage's output is written
    /// back into it so later stages can read it. Stage-level problems never
    /// surface as `Err` — the report is best-effort.
    #[allow(clippy::too_many_lines)]
    pub fn execute(
        &mut self,
        raw: &Value,
        ctx: &mut CalculationContext,
    ) -> Result<RunReport, CalcError> {
        let run_start = Instant::now();
        ctx.reset();
        for stage in self.stages.values_mut() {
            stage.reset();
        }

        // Fail fast on configuration before any coordinator runs.
        for stage in self.stages.values() {
            for dep in &stage.dependencies {
                if !self.stages.contains_key(dep) {
                    return Err(CalcError::UnknownDependency {
                        stage: stage.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let order = self.execution_order.clone();
        let mut results = BTreeMap::new();
        let mut stage_times = BTreeMap::new();
        let mut executed_stages = 0;
        let mut failed_stages = 0;
        let mut skipped_stages = 0;

        for name in &order {
            let Some(stage) = self.stages.get(name) else {
                continue;
            };
            let coordinator = Arc::clone(&stage.coordinator);

            // Defensive union: registration-time dependencies plus whatever
            // the coordinator declares right now.
            let mut deps = stage.dependencies.clone();
            for dep in coordinator.dependencies() {
                if !deps.iter().any(|d| d == dep) {
                    deps.push((*dep).to_string());
                }
            }

            let unsatisfied = deps
                .iter()
                .find(|dep| !self.stages.get(dep.as_str()).is_some_and(PipelineStage::satisfied));
            if let Some(dep) = unsatisfied {
                debug!(stage = name.as_str(), dependency = dep.as_str(), "skipping stage");
                skipped_stages += 1;
                if let Some(stage) = self.stages.get_mut(name) {
                    stage.error = Some(DEPENDENCIES_NOT_SATISFIED.to_string());
                    stage.result =
                        Some(CalculationResult::skipped(name.clone(), DEPENDENCIES_NOT_SATISFIED));
                }
                continue;
            }

            if ctx.validation_enabled && !coordinator.can_coordinate(raw) {
                debug!(stage = name.as_str(), "input gate declined");
                skipped_stages += 1;
                if let Some(stage) = self.stages.get_mut(name) {
                    stage.error = Some(INPUT_DECLINED.to_string());
                    stage.result = Some(CalculationResult::skipped(name.clone(), INPUT_DECLINED));
                }
                continue;
            }

            let stage_start = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| coordinator.coordinate(raw, ctx)));
            let elapsed = stage_start.elapsed();
            stage_times.insert(name.clone(), elapsed.as_secs_f64());

            let result = match outcome {
                Ok(mut result) => {
                    result.execution_time = elapsed;
                    result
                }
                Err(payload) => {
                    let message = panic_message(&payload);
                    warn!(stage = name.as_str(), message = message.as_str(), "coordinator panicked");
                    let mut result = CalculationResult::failed(
                        name.clone(),
                        vec![format!("coordinator panicked: {message}")],
                    );
                    result.execution_time = elapsed;
                    result
                }
            };

            let completed = result.is_completed();
            if ctx.performance_mode {
                self.monitor.record(name, elapsed, completed);
            }
            if ctx.debug_mode {
                debug!(
                    stage = name.as_str(),
                    status = result.status.as_str(),
                    warnings = result.warnings.len(),
                    "stage finished"
                );
            }
            if completed {
                executed_stages += 1;
                results.insert(name.clone(), result.data.clone());
                ctx.record_stage_output(name.clone(), result.data.clone());
            } else {
                failed_stages += 1;
            }
            if let Some(stage) = self.stages.get_mut(name) {
                stage.executed = true;
                stage.execution_time = Some(elapsed);
                stage.error = if completed {
                    None
                } else {
                    result.error_summary()
                };
                stage.result = Some(result);
            }
        }

        let total = run_start.elapsed();
        self.monitor.record(EXECUTE_OPERATION, total, true);
        info!(
            character = ctx.character_id.as_str(),
            executed = executed_stages,
            failed = failed_stages,
            skipped = skipped_stages,
            elapsed = ?total,
            "pipeline run finished"
        );

        Ok(RunReport {
            results,
            metadata: RunMetadata {
                total_stages: self.stages.len(),
                executed_stages,
                failed_stages,
                skipped_stages,
                execution_order: order,
                stage_times,
            },
        })
    }
}

impl Default for CalculationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable text from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
