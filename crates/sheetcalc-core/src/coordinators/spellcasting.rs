//! Spell save DC, spell attack bonus, and slot progression.

use serde_json::{json, Map, Value};

use crate::constants::{FULL_CASTER_SLOTS, MAX_LEVEL};
use crate::context::CalculationContext;
use crate::coordinator::Coordinator;
use crate::result::CalculationResult;

use super::{is_document, upstream_ability, upstream_i64};

/// Caster progression for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CasterKind {
    Full,
    Half,
}

/// Casting ability and progression for the standard classes.
fn casting_profile(class: &str) -> Option<(&'static str, CasterKind)> {
    match class.to_ascii_lowercase().as_str() {
        "wizard" => Some(("intelligence", CasterKind::Full)),
        "cleric" | "druid" => Some(("wisdom", CasterKind::Full)),
        "bard" | "sorcerer" | "warlock" => Some(("charisma", CasterKind::Full)),
        "paladin" => Some(("charisma", CasterKind::Half)),
        "ranger" => Some(("wisdom", CasterKind::Half)),
        _ => None,
    }
}

/// Coordinator for the `spellcasting` stage.
///
/// Non-casters are not a failure: they complete with
/// `{"spellcaster": false}`. The casting ability declared on a class entry
/// takes precedence over the built-in class table. Half-casters index the
/// full-caster slot table at `(level + 1) / 2`.
pub struct SpellcastingCoordinator;

impl SpellcastingCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn slots_for(kind: CasterKind, class_level: i64) -> Map<String, Value> {
        let effective = match kind {
            CasterKind::Full => class_level,
            CasterKind::Half => (class_level + 1) / 2,
        }
        .clamp(0, i64::from(MAX_LEVEL));
        let row = FULL_CASTER_SLOTS[usize::try_from(effective).unwrap_or(0)];
        row.iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(idx, count)| (format!("level_{}", idx + 1), json!(count)))
            .collect()
    }
}

impl Default for SpellcastingCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator for SpellcastingCoordinator {
    fn name(&self) -> &'static str {
        "spellcasting"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["character_info", "abilities"]
    }

    fn priority(&self) -> u32 {
        60
    }

    fn validate_input(&self, raw: &Value) -> bool {
        is_document(raw)
    }

    fn coordinate(&self, _raw: &Value, ctx: &CalculationContext) -> CalculationResult {
        let Some(prof) = upstream_i64(ctx, "character_info", "proficiency_bonus") else {
            return CalculationResult::failed(
                self.name(),
                vec!["character_info output is missing a proficiency bonus".to_string()],
            );
        };

        let classes: Vec<Value> = ctx
            .stage_output("character_info")
            .and_then(|info| info.get("classes"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        // First spellcasting class wins; multiclass slot stacking is out of
        // scope for the default rules.
        let caster = classes.iter().find_map(|class| {
            let name = class.get("name")?.as_str()?;
            let level = class.get("level").and_then(Value::as_i64).unwrap_or(1);
            let declared = class.get("spellcasting_ability").and_then(Value::as_str);
            match (declared, casting_profile(name)) {
                (Some(ability), profile) => Some((
                    name.to_string(),
                    ability.to_string(),
                    profile.map_or(CasterKind::Full, |(_, kind)| kind),
                    level,
                )),
                (None, Some((ability, kind))) => {
                    Some((name.to_string(), ability.to_string(), kind, level))
                }
                (None, None) => None,
            }
        });

        let Some((class, ability, kind, class_level)) = caster else {
            return CalculationResult::completed(self.name(), json!({ "spellcaster": false }));
        };

        let Some((_, modifier)) = upstream_ability(ctx, &ability) else {
            return CalculationResult::failed(
                self.name(),
                vec![format!("abilities output is missing {ability}")],
            );
        };

        let data = json!({
            "spellcaster": true,
            "class": class,
            "ability": ability,
            "spell_save_dc": 8 + prof + modifier,
            "spell_attack_bonus": prof + modifier,
            "slots": Self::slots_for(kind, class_level),
        });
        CalculationResult::completed(self.name(), data)
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "spellcaster": { "type": "boolean" },
                "ability": { "type": "string" },
                "spell_save_dc": { "type": "integer" },
                "spell_attack_bonus": { "type": "integer" },
                "slots": { "type": "object" },
            },
        })
    }
}
