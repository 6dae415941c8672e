//! # sheetcalc-core
//!
//! Contracts and calculation units for the character-sheet pipeline:
//! the per-run context, the stage result envelope, the `Coordinator`
//! capability, raw-document access across both schema generations, and the
//! default coordinator set.

pub mod constants;
pub mod context;
pub mod coordinator;
pub mod coordinators;
pub mod raw;
pub mod registry;
pub mod result;

// Re-exports
pub use constants::{exit_codes, DEFAULT_RULE_VERSION, MAX_LEVEL};
pub use context::CalculationContext;
pub use coordinator::{CalcError, Coordinator};
pub use coordinators::{ability_modifier, proficiency_bonus};
pub use registry::default_coordinators;
pub use result::{CalculationResult, StageStatus};
