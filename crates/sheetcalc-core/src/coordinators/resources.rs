//! Expendable resources: hit dice, spell slots, and feature uses.

use serde_json::{json, Value};

use crate::context::CalculationContext;
use crate::coordinator::Coordinator;
use crate::result::CalculationResult;

use super::{is_document, upstream_i64};

/// Coordinator for the `resources` stage.
///
/// Aggregates everything the character spends and recovers: hit dice pools
/// per class, spell slots published by `spellcasting`, and limited-use
/// features published by `features`.
pub struct ResourcesCoordinator;

impl ResourcesCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResourcesCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator for ResourcesCoordinator {
    fn name(&self) -> &'static str {
        "resources"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["character_info", "features", "spellcasting"]
    }

    fn priority(&self) -> u32 {
        80
    }

    fn validate_input(&self, raw: &Value) -> bool {
        is_document(raw)
    }

    fn coordinate(&self, _raw: &Value, ctx: &CalculationContext) -> CalculationResult {
        if upstream_i64(ctx, "character_info", "level").is_none() {
            return CalculationResult::failed(
                self.name(),
                vec!["character_info output is missing a level".to_string()],
            );
        }

        let mut resources: Vec<Value> = Vec::new();

        // Hit dice: one pool per class, size = class level.
        let classes: Vec<Value> = ctx
            .stage_output("character_info")
            .and_then(|info| info.get("classes"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for class in &classes {
            let die = class.get("hit_die").and_then(Value::as_i64).unwrap_or(8);
            let levels = class.get("level").and_then(Value::as_i64).unwrap_or(1);
            resources.push(json!({
                "name": format!("hit_dice_d{die}"),
                "max": levels,
                "refresh": "long_rest",
            }));
        }

        // Spell slots from the spellcasting stage, when the character casts.
        if let Some(slots) = ctx
            .stage_output("spellcasting")
            .filter(|s| s.get("spellcaster") == Some(&json!(true)))
            .and_then(|s| s.get("slots"))
            .and_then(Value::as_object)
        {
            for (slot_level, count) in slots {
                resources.push(json!({
                    "name": format!("spell_slot_{slot_level}"),
                    "max": count,
                    "refresh": "long_rest",
                }));
            }
        }

        // Limited-use features.
        if let Some(features) = ctx
            .stage_output("features")
            .and_then(|f| f.get("features"))
            .and_then(Value::as_array)
        {
            for feature in features {
                let Some(uses) = feature.get("uses").and_then(Value::as_i64) else {
                    continue;
                };
                resources.push(json!({
                    "name": feature.get("name").and_then(Value::as_str).unwrap_or("?"),
                    "max": uses,
                    "refresh": feature
                        .get("refresh")
                        .and_then(Value::as_str)
                        .unwrap_or("long_rest"),
                }));
            }
        }

        let data = json!({ "count": resources.len(), "resources": resources });
        CalculationResult::completed(self.name(), data)
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "count": { "type": "integer" },
                "resources": { "type": "array" },
            },
        })
    }
}
