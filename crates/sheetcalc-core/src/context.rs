//! Per-run calculation context: the shared blackboard.

use std::collections::HashMap;

use serde_json::Value;

use crate::constants::DEFAULT_RULE_VERSION;
use crate::raw;

/// Shared mutable state for one pipeline run.
///
/// The pipeline writes each completed stage's output into `metadata`; later
/// stages read prior outputs through [`CalculationContext::stage_output`].
/// The `Option` return is deliberate — a stage must handle absence explicitly
/// instead of relying on default-valued lookups.
#[derive(Debug, Clone)]
pub struct CalculationContext {
    /// Identifier of the character being calculated.
    pub character_id: String,
    /// Rule-version tag (informational, recorded in reports).
    pub rule_version: String,
    /// Record per-stage spans into the shared performance monitor.
    pub performance_mode: bool,
    /// Whether coordinators should run their input gates.
    pub validation_enabled: bool,
    /// Verbose diagnostics from coordinators.
    pub debug_mode: bool,
    /// Stage name → that stage's completed output.
    pub metadata: HashMap<String, Value>,
}

impl CalculationContext {
    /// Create a context for the given character id with default flags.
    #[must_use]
    pub fn new(character_id: impl Into<String>) -> Self {
        Self {
            character_id: character_id.into(),
            rule_version: DEFAULT_RULE_VERSION.to_string(),
            performance_mode: true,
            validation_enabled: true,
            debug_mode: false,
            metadata: HashMap::new(),
        }
    }

    /// Create a context, pulling the character id out of the raw document
    /// (current schema first, then legacy, then `"unknown"`).
    #[must_use]
    pub fn for_raw(raw: &Value) -> Self {
        let id = raw::first_str(raw, &["character.id", "id"])
            .or_else(|| raw::first_str(raw, &["character.name", "name"]))
            .unwrap_or("unknown");
        Self::new(id)
    }

    /// Output of a previously completed stage, if present.
    #[must_use]
    pub fn stage_output(&self, stage: &str) -> Option<&Value> {
        self.metadata.get(stage)
    }

    /// Record a stage's output on the blackboard.
    pub fn record_stage_output(&mut self, stage: impl Into<String>, data: Value) {
        self.metadata.insert(stage.into(), data);
    }

    /// Clear all accumulated stage outputs. Must be called (or a fresh
    /// context constructed) before every run.
    pub fn reset(&mut self) {
        self.metadata.clear();
    }
}
