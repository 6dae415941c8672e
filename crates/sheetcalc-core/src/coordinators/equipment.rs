//! Weapons, armor, inventory, and carrying capacity.

use serde_json::{json, Value};

use crate::constants::CARRY_CAPACITY_PER_STR;
use crate::context::CalculationContext;
use crate::coordinator::Coordinator;
use crate::raw;
use crate::result::CalculationResult;

use super::{is_document, upstream_ability};

/// Coordinator for the `equipment` stage.
///
/// Normalizes weapons, armor, and loose items from either schema generation
/// and derives carrying capacity from the Strength score. Legacy documents
/// carry a single flat `items` list of strings; the current schema splits
/// `character.equipment` into `weapons`/`armor`/`items`.
pub struct EquipmentCoordinator;

impl EquipmentCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn normalize_weapon(entry: &Value) -> Option<Value> {
        if let Some(name) = entry.as_str() {
            return Some(json!({ "name": name, "damage": "1d6", "properties": [] }));
        }
        let object = entry.as_object()?;
        let name = object.get("name")?.as_str()?;
        Some(json!({
            "name": name,
            "damage": object.get("damage").and_then(Value::as_str).unwrap_or("1d6"),
            "properties": object.get("properties").cloned().unwrap_or_else(|| json!([])),
            "equipped": object.get("equipped").and_then(Value::as_bool).unwrap_or(true),
        }))
    }

    fn item_weight(entry: &Value) -> f64 {
        entry
            .get("weight")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }
}

impl Default for EquipmentCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator for EquipmentCoordinator {
    fn name(&self) -> &'static str {
        "equipment"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["abilities"]
    }

    fn priority(&self) -> u32 {
        40
    }

    fn validate_input(&self, raw: &Value) -> bool {
        is_document(raw)
    }

    fn coordinate(&self, raw: &Value, ctx: &CalculationContext) -> CalculationResult {
        let Some((strength, _)) = upstream_ability(ctx, "strength") else {
            return CalculationResult::failed(
                self.name(),
                vec!["abilities output is missing strength".to_string()],
            );
        };

        let mut warnings = Vec::new();

        let weapons: Vec<Value> = raw::first_array(raw, &["character.equipment.weapons", "weapons"])
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Self::normalize_weapon)
                    .collect()
            })
            .unwrap_or_default();

        let armor = raw::first_object(raw, &["character.equipment.armor", "armor"]).map(|a| {
            json!({
                "name": a.get("name").and_then(Value::as_str).unwrap_or("unknown"),
                "base": a.get("base").and_then(Value::as_i64).unwrap_or_else(|| {
                    warnings.push("armor missing base AC, assuming 11".to_string());
                    11
                }),
                "kind": a.get("kind").and_then(Value::as_str)
                    .or_else(|| a.get("type").and_then(Value::as_str))
                    .unwrap_or("light"),
            })
        });

        let shield =
            raw::first_bool(raw, &["character.equipment.shield", "shield"]).unwrap_or(false);

        let items: Vec<Value> = raw::first_array(raw, &["character.equipment.items", "items"])
            .cloned()
            .unwrap_or_default();

        let total_weight: f64 = items.iter().map(Self::item_weight).sum();
        let capacity = strength * CARRY_CAPACITY_PER_STR;
        #[allow(clippy::cast_precision_loss)]
        let encumbered = total_weight > capacity as f64;

        let data = json!({
            "weapons": weapons,
            "armor": armor,
            "shield": shield,
            "items": items,
            "total_weight": total_weight,
            "carrying_capacity": capacity,
            "encumbered": encumbered,
        });

        let mut result = CalculationResult::completed(self.name(), data);
        result.warnings = warnings;
        result
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "weapons": { "type": "array" },
                "armor": { "type": ["object", "null"] },
                "shield": { "type": "boolean" },
                "items": { "type": "array" },
                "carrying_capacity": { "type": "integer" },
                "encumbered": { "type": "boolean" },
            },
        })
    }
}
