//! Default coordinator set: one unit per domain of derived attributes.
//!
//! Each coordinator prefers current-generation key paths and falls back to
//! the legacy flat schema (see [`crate::raw`]). Missing optional inputs
//! degrade to documented defaults with a warning on the result; only the
//! complete absence of usable identity data fails a stage outright.

pub mod abilities;
pub mod character_info;
pub mod combat;
pub mod equipment;
pub mod features;
pub mod proficiencies;
pub mod resources;
pub mod spellcasting;

pub use abilities::AbilitiesCoordinator;
pub use character_info::CharacterInfoCoordinator;
pub use combat::CombatCoordinator;
pub use equipment::EquipmentCoordinator;
pub use features::FeaturesCoordinator;
pub use proficiencies::ProficienciesCoordinator;
pub use resources::ResourcesCoordinator;
pub use spellcasting::SpellcastingCoordinator;

use serde_json::Value;

use crate::constants::{MAX_LEVEL, PROFICIENCY_TABLE};
use crate::context::CalculationContext;
use crate::raw;

/// Ability modifier for a score: `(score - 10) / 2`, rounded toward
/// negative infinity.
#[must_use]
pub fn ability_modifier(score: i64) -> i64 {
    (score - 10).div_euclid(2)
}

/// Proficiency bonus for a character level (levels clamped to 1..=20).
#[must_use]
pub fn proficiency_bonus(level: i64) -> i64 {
    let level = level.clamp(1, i64::from(MAX_LEVEL));
    PROFICIENCY_TABLE[usize::try_from(level).unwrap_or(1)]
}

/// Read an integer out of a previously completed stage's output.
pub(crate) fn upstream_i64(ctx: &CalculationContext, stage: &str, path: &str) -> Option<i64> {
    raw::lookup(ctx.stage_output(stage)?, path)?.as_i64()
}

/// The (score, modifier) pair published by the abilities stage.
pub(crate) fn upstream_ability(ctx: &CalculationContext, ability: &str) -> Option<(i64, i64)> {
    let out = ctx.stage_output("abilities")?;
    let score = raw::lookup(out, &format!("{ability}.score"))?.as_i64()?;
    let modifier = raw::lookup(out, &format!("{ability}.modifier"))?.as_i64()?;
    Some((score, modifier))
}

/// Structural gate shared by every default coordinator.
pub(crate) fn is_document(raw: &Value) -> bool {
    raw.is_object()
}
