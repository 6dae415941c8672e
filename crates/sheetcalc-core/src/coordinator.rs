//! The coordinator contract and configuration error type.
//!
//! `Coordinator` is the capability implemented by every calculation unit;
//! the pipeline consumes it as a trait object. Recoverable problems inside
//! `coordinate` must be converted into a `Failed` result — a panic is
//! reserved for genuine programming defects (and is still contained at the
//! pipeline boundary).

use serde_json::{json, Value};

use crate::context::CalculationContext;
use crate::result::CalculationResult;

/// Error type for pipeline configuration problems.
///
/// These are fatal and detected before any coordinator runs; per-stage data
/// problems never surface here.
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    /// The registered stages form a dependency cycle.
    #[error("dependency cycle detected at stage '{0}'")]
    DependencyCycle(String),

    /// A stage references a dependency that is not registered.
    #[error("stage '{stage}' depends on unregistered stage '{dependency}'")]
    UnknownDependency {
        /// The stage declaring the dependency.
        stage: String,
        /// The missing dependency name.
        dependency: String,
    },

    /// Invalid configuration (unknown coordinator selection, bad wiring).
    #[error("configuration error: {0}")]
    Config(String),
}

/// A pluggable calculation unit responsible for one domain of derived
/// attributes.
pub trait Coordinator: Send + Sync {
    /// Stage name this coordinator registers under.
    fn name(&self) -> &'static str;

    /// Names of stages whose output this coordinator reads from the context.
    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    /// Scheduling priority; lower runs earlier among stages whose
    /// dependencies are equally satisfied.
    fn priority(&self) -> u32;

    /// Cheap structural check on the raw document. Must never panic.
    fn validate_input(&self, raw: &Value) -> bool;

    /// Gate called just before `coordinate`. Defaults to `validate_input`;
    /// exists so stricter gating can evolve independently.
    fn can_coordinate(&self, raw: &Value) -> bool {
        self.validate_input(raw)
    }

    /// Perform the calculation. Recoverable problems become a `Failed`
    /// result with human-readable errors; `raw` is read-only.
    fn coordinate(&self, raw: &Value, ctx: &CalculationContext) -> CalculationResult;

    /// Declarative description of the produced data. Documentation only —
    /// never enforced by the pipeline.
    fn output_schema(&self) -> Value {
        json!({ "type": "object" })
    }
}
