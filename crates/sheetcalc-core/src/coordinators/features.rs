//! Class and racial features.

use serde_json::{json, Value};

use crate::context::CalculationContext;
use crate::coordinator::Coordinator;
use crate::raw;
use crate::result::CalculationResult;

use super::{is_document, upstream_i64};

/// Coordinator for the `features` stage.
///
/// Normalizes feature entries (strings or objects) from either schema
/// generation, drops features gated above the character's level, and sorts
/// the survivors by (level, name).
pub struct FeaturesCoordinator;

impl FeaturesCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn normalize(entry: &Value) -> Option<Value> {
        if let Some(name) = entry.as_str() {
            return Some(json!({ "name": name, "source": "unknown", "level": 1 }));
        }
        let object = entry.as_object()?;
        let name = object.get("name")?.as_str()?;
        let mut feature = json!({
            "name": name,
            "source": object.get("source").and_then(Value::as_str).unwrap_or("unknown"),
            "level": object.get("level").and_then(Value::as_i64).unwrap_or(1),
        });
        if let Some(uses) = object.get("uses").and_then(Value::as_i64) {
            feature["uses"] = json!(uses);
        }
        if let Some(refresh) = object.get("refresh").and_then(Value::as_str) {
            feature["refresh"] = json!(refresh);
        }
        Some(feature)
    }
}

impl Default for FeaturesCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator for FeaturesCoordinator {
    fn name(&self) -> &'static str {
        "features"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["character_info"]
    }

    fn priority(&self) -> u32 {
        70
    }

    fn validate_input(&self, raw: &Value) -> bool {
        is_document(raw)
    }

    fn coordinate(&self, raw: &Value, ctx: &CalculationContext) -> CalculationResult {
        let Some(level) = upstream_i64(ctx, "character_info", "level") else {
            return CalculationResult::failed(
                self.name(),
                vec!["character_info output is missing a level".to_string()],
            );
        };

        let entries = raw::first_array(raw, &["character.features", "features", "feats"])
            .cloned()
            .unwrap_or_default();

        let mut warnings = Vec::new();
        let mut features: Vec<Value> = Vec::new();
        for entry in &entries {
            let Some(feature) = Self::normalize(entry) else {
                warnings.push("dropped malformed feature entry".to_string());
                continue;
            };
            let gate = feature.get("level").and_then(Value::as_i64).unwrap_or(1);
            if gate > level {
                warnings.push(format!(
                    "feature '{}' requires level {gate}, character is level {level}",
                    feature["name"].as_str().unwrap_or("?"),
                ));
                continue;
            }
            features.push(feature);
        }

        features.sort_by(|a, b| {
            let key = |f: &Value| {
                (
                    f.get("level").and_then(Value::as_i64).unwrap_or(1),
                    f.get("name").and_then(Value::as_str).unwrap_or("").to_string(),
                )
            };
            key(a).cmp(&key(b))
        });

        let data = json!({ "count": features.len(), "features": features });
        let mut result = CalculationResult::completed(self.name(), data);
        result.warnings = warnings;
        result
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "count": { "type": "integer" },
                "features": { "type": "array" },
            },
        })
    }
}
