//! Identity, classes, level, and proficiency bonus.

use serde_json::{json, Value};
use tracing::debug;

use crate::constants::MAX_LEVEL;
use crate::context::CalculationContext;
use crate::coordinator::Coordinator;
use crate::raw;
use crate::result::CalculationResult;

use super::{is_document, proficiency_bonus};

/// Hit die for a class name, per the standard class list.
fn hit_die_for_class(class: &str) -> Option<u8> {
    match class.to_ascii_lowercase().as_str() {
        "barbarian" => Some(12),
        "fighter" | "paladin" | "ranger" => Some(10),
        "bard" | "cleric" | "druid" | "monk" | "rogue" | "warlock" => Some(8),
        "sorcerer" | "wizard" => Some(6),
        _ => None,
    }
}

/// Coordinator for the `character_info` stage.
///
/// The only stage allowed to fail on missing data: a document with neither an
/// id nor a name has no usable identity, and everything downstream depends on
/// this stage.
pub struct CharacterInfoCoordinator;

impl CharacterInfoCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Normalize class entries from either schema generation.
    fn parse_classes(raw: &Value, warnings: &mut Vec<String>) -> Vec<Value> {
        if let Some(entries) = raw::first_array(raw, &["character.classes", "classes"]) {
            return entries
                .iter()
                .filter_map(|entry| {
                    let name = entry.as_str().map(str::to_owned).or_else(|| {
                        entry.get("name").and_then(Value::as_str).map(str::to_owned)
                    })?;
                    let level = entry
                        .get("level")
                        .and_then(Value::as_i64)
                        .unwrap_or_else(|| {
                            warnings.push(format!("class '{name}' missing level, assuming 1"));
                            1
                        })
                        .clamp(1, i64::from(MAX_LEVEL));
                    let hit_die = entry
                        .get("hit_die")
                        .and_then(Value::as_u64)
                        .and_then(|d| u8::try_from(d).ok())
                        .or_else(|| hit_die_for_class(&name))
                        .unwrap_or_else(|| {
                            warnings.push(format!("class '{name}' has unknown hit die, assuming d8"));
                            8
                        });
                    let mut class = json!({ "name": name, "level": level, "hit_die": hit_die });
                    if let Some(ability) =
                        entry.get("spellcasting_ability").and_then(Value::as_str)
                    {
                        class["spellcasting_ability"] = json!(ability);
                    }
                    Some(class)
                })
                .collect();
        }

        // Legacy schema: single "class" string with a top-level "level".
        if let Some(class) = raw::first_str(raw, &["class"]) {
            let level = raw::first_i64(raw, &["level"])
                .unwrap_or_else(|| {
                    warnings.push("missing level, assuming 1".to_string());
                    1
                })
                .clamp(1, i64::from(MAX_LEVEL));
            let hit_die = hit_die_for_class(class).unwrap_or_else(|| {
                warnings.push(format!("class '{class}' has unknown hit die, assuming d8"));
                8
            });
            return vec![json!({ "name": class, "level": level, "hit_die": hit_die })];
        }

        Vec::new()
    }
}

impl Default for CharacterInfoCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator for CharacterInfoCoordinator {
    fn name(&self) -> &'static str {
        "character_info"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn validate_input(&self, raw: &Value) -> bool {
        is_document(raw)
    }

    fn coordinate(&self, raw: &Value, ctx: &CalculationContext) -> CalculationResult {
        let id = raw::first_str(raw, &["character.id", "id"]);
        let name = raw::first_str(raw, &["character.name", "name"]);

        let (Some(id), name) = (id.or(name), name.or(id)) else {
            return CalculationResult::failed(
                self.name(),
                vec!["no usable identity data: both id and name are missing".to_string()],
            );
        };
        let name = name.unwrap_or(id);

        let mut warnings = Vec::new();
        let classes = Self::parse_classes(raw, &mut warnings);

        let level = if classes.is_empty() {
            raw::first_i64(raw, &["character.level", "level"]).unwrap_or_else(|| {
                warnings.push("no classes and no level, assuming level 1".to_string());
                1
            })
        } else {
            classes
                .iter()
                .filter_map(|c| c.get("level").and_then(Value::as_i64))
                .sum()
        };
        let clamped = level.clamp(1, i64::from(MAX_LEVEL));
        if clamped != level {
            warnings.push(format!("level {level} out of range, clamped to {clamped}"));
        }

        debug!(character = ctx.character_id.as_str(), level = clamped, "resolved identity");

        let data = json!({
            "id": id,
            "name": name,
            "level": clamped,
            "classes": classes,
            "race": raw::first_str(raw, &["character.race.name", "character.race", "race"]),
            "background": raw::first_str(raw, &["character.background", "background"]),
            "alignment": raw::first_str(raw, &["character.alignment", "alignment"]),
            "proficiency_bonus": proficiency_bonus(clamped),
            "experience": raw::first_u64(
                raw,
                &["character.xp", "character.experience", "xp", "experience"],
            )
            .unwrap_or(0),
        });

        let mut result = CalculationResult::completed(self.name(), data);
        result.warnings = warnings;
        result
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "name": { "type": "string" },
                "level": { "type": "integer" },
                "classes": { "type": "array" },
                "proficiency_bonus": { "type": "integer" },
            },
        })
    }
}
