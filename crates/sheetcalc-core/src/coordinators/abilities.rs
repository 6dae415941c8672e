//! Ability scores and modifiers.

use serde_json::{json, Map, Value};

use crate::constants::{ABILITIES, ABILITY_ABBREVS, DEFAULT_ABILITY_SCORE};
use crate::context::CalculationContext;
use crate::coordinator::Coordinator;
use crate::raw;
use crate::result::CalculationResult;

use super::{ability_modifier, is_document};

/// Coordinator for the `abilities` stage.
///
/// Scores come from `character.abilities.<name>.score` (with an optional
/// `bonus` field for racial increases) or the legacy `stats.<abbr>` layout.
/// A missing score degrades to 10 with a warning; totals are clamped to
/// 1..=30.
pub struct AbilitiesCoordinator;

impl AbilitiesCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for AbilitiesCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator for AbilitiesCoordinator {
    fn name(&self) -> &'static str {
        "abilities"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["character_info"]
    }

    fn priority(&self) -> u32 {
        20
    }

    fn validate_input(&self, raw: &Value) -> bool {
        is_document(raw)
    }

    fn coordinate(&self, raw: &Value, _ctx: &CalculationContext) -> CalculationResult {
        let mut data = Map::new();
        let mut warnings = Vec::new();

        for (ability, abbrev) in ABILITIES.iter().zip(ABILITY_ABBREVS) {
            let score_paths = [
                format!("character.abilities.{ability}.score"),
                format!("character.abilities.{ability}"),
                format!("stats.{abbrev}"),
            ];
            let score_paths: Vec<&str> = score_paths.iter().map(String::as_str).collect();
            let base = raw::first_i64(raw, &score_paths).unwrap_or_else(|| {
                warnings.push(format!("missing {ability} score, assuming {DEFAULT_ABILITY_SCORE}"));
                DEFAULT_ABILITY_SCORE
            });

            let bonus_path = format!("character.abilities.{ability}.bonus");
            let bonus = raw::first_i64(raw, &[&bonus_path]).unwrap_or(0);

            let total = base + bonus;
            let clamped = total.clamp(1, 30);
            if clamped != total {
                warnings.push(format!("{ability} score {total} out of range, clamped to {clamped}"));
            }

            data.insert(
                (*ability).to_string(),
                json!({ "score": clamped, "modifier": ability_modifier(clamped) }),
            );
        }

        let mut result = CalculationResult::completed(self.name(), Value::Object(data));
        result.warnings = warnings;
        result
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": ABILITIES.iter().map(|a| {
                ((*a).to_string(), json!({
                    "type": "object",
                    "properties": {
                        "score": { "type": "integer" },
                        "modifier": { "type": "integer" },
                    },
                }))
            }).collect::<Map<String, Value>>(),
        })
    }
}
