//! Armor class, hit points, initiative, speed, and attacks.

use serde_json::{json, Value};

use crate::constants::DEFAULT_SPEED;
use crate::context::CalculationContext;
use crate::coordinator::Coordinator;
use crate::raw;
use crate::result::CalculationResult;

use super::{is_document, upstream_ability, upstream_i64};

/// Coordinator for the `combat` stage.
///
/// Consumes four upstream stages: level and proficiency from
/// `character_info`, modifiers from `abilities`, and the equipped armor and
/// weapons from `equipment` (`proficiencies` is declared so initiative-style
/// house rules keyed off skills stay possible without reordering).
pub struct CombatCoordinator;

impl CombatCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// AC from armor kind: light adds full Dex, medium caps it at +2,
    /// heavy ignores it. Unarmored is 10 + Dex.
    fn armor_class(armor: Option<&Value>, shield: bool, dex_mod: i64) -> i64 {
        let base = match armor {
            Some(armor) => {
                let base = armor.get("base").and_then(Value::as_i64).unwrap_or(11);
                match armor.get("kind").and_then(Value::as_str).unwrap_or("light") {
                    "heavy" => base,
                    "medium" => base + dex_mod.min(2),
                    _ => base + dex_mod,
                }
            }
            None => 10 + dex_mod,
        };
        base + i64::from(shield) * 2
    }

    /// Maximum hit points: max die at first level, average (die/2 + 1) for
    /// each level after, plus Con modifier per level. Never below 1/level.
    fn hit_points(classes: &[Value], total_level: i64, con_mod: i64) -> i64 {
        let mut hp = 0;
        let mut first = true;
        for class in classes {
            let die = class.get("hit_die").and_then(Value::as_i64).unwrap_or(8);
            let levels = class.get("level").and_then(Value::as_i64).unwrap_or(1);
            for _ in 0..levels {
                hp += if first { die } else { die / 2 + 1 };
                first = false;
            }
        }
        if hp == 0 {
            // No class data: d8 average per level.
            hp = 8 + (total_level - 1) * 5;
        }
        (hp + con_mod * total_level).max(total_level)
    }

    fn attacks(weapons: &[Value], str_mod: i64, dex_mod: i64, prof: i64) -> Vec<Value> {
        weapons
            .iter()
            .filter_map(|weapon| {
                let name = weapon.get("name")?.as_str()?;
                let properties: Vec<&str> = weapon
                    .get("properties")
                    .and_then(Value::as_array)
                    .map(|p| p.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                let finesse = properties.contains(&"finesse");
                let ranged = properties.contains(&"ammunition") || properties.contains(&"thrown");
                let modifier = if finesse {
                    str_mod.max(dex_mod)
                } else if ranged {
                    dex_mod
                } else {
                    str_mod
                };
                Some(json!({
                    "name": name,
                    "attack_bonus": modifier + prof,
                    "damage": format!(
                        "{}{:+}",
                        weapon.get("damage").and_then(Value::as_str).unwrap_or("1d6"),
                        modifier,
                    ),
                }))
            })
            .collect()
    }
}

impl Default for CombatCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator for CombatCoordinator {
    fn name(&self) -> &'static str {
        "combat"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["character_info", "abilities", "proficiencies", "equipment"]
    }

    fn priority(&self) -> u32 {
        50
    }

    fn validate_input(&self, raw: &Value) -> bool {
        is_document(raw)
    }

    fn coordinate(&self, raw: &Value, ctx: &CalculationContext) -> CalculationResult {
        let mut errors = Vec::new();
        let dex = upstream_ability(ctx, "dexterity");
        let str_ = upstream_ability(ctx, "strength");
        let con = upstream_ability(ctx, "constitution");
        let level = upstream_i64(ctx, "character_info", "level");
        let prof = upstream_i64(ctx, "character_info", "proficiency_bonus");
        if dex.is_none() || str_.is_none() || con.is_none() {
            errors.push("abilities output is incomplete".to_string());
        }
        if level.is_none() || prof.is_none() {
            errors.push("character_info output is incomplete".to_string());
        }
        if !errors.is_empty() {
            return CalculationResult::failed(self.name(), errors);
        }
        let (dex_mod, str_mod, con_mod) = (dex.unwrap().1, str_.unwrap().1, con.unwrap().1);
        let (level, prof) = (level.unwrap(), prof.unwrap());

        let equipment = ctx.stage_output("equipment");
        let armor = equipment.and_then(|e| {
            let armor = e.get("armor")?;
            armor.is_object().then_some(armor)
        });
        let shield = equipment
            .and_then(|e| e.get("shield"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let weapons: Vec<Value> = equipment
            .and_then(|e| e.get("weapons"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let classes: Vec<Value> = ctx
            .stage_output("character_info")
            .and_then(|info| info.get("classes"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let data = json!({
            "armor_class": Self::armor_class(armor, shield, dex_mod),
            "initiative": dex_mod,
            "speed": raw::first_u64(
                raw,
                &["character.race.speed", "character.speed", "speed"],
            )
            .unwrap_or(DEFAULT_SPEED),
            "hit_points": Self::hit_points(&classes, level, con_mod),
            "hit_dice": classes.iter().map(|c| {
                format!(
                    "{}d{}",
                    c.get("level").and_then(Value::as_i64).unwrap_or(1),
                    c.get("hit_die").and_then(Value::as_i64).unwrap_or(8),
                )
            }).collect::<Vec<_>>(),
            "attacks": Self::attacks(&weapons, str_mod, dex_mod, prof),
        });
        CalculationResult::completed(self.name(), data)
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "armor_class": { "type": "integer" },
                "initiative": { "type": "integer" },
                "speed": { "type": "integer" },
                "hit_points": { "type": "integer" },
                "attacks": { "type": "array" },
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_context() -> CalculationContext {
        let mut ctx = CalculationContext::new("t");
        ctx.record_stage_output(
            "character_info",
            json!({
                "level": 5,
                "proficiency_bonus": 3,
                "classes": [{ "name": "fighter", "level": 5, "hit_die": 10 }],
            }),
        );
        ctx.record_stage_output(
            "abilities",
            json!({
                "strength": { "score": 16, "modifier": 3 },
                "dexterity": { "score": 14, "modifier": 2 },
                "constitution": { "score": 14, "modifier": 2 },
            }),
        );
        ctx.record_stage_output("proficiencies", json!({ "skills": {} }));
        ctx.record_stage_output(
            "equipment",
            json!({
                "armor": { "name": "chain shirt", "base": 13, "kind": "medium" },
                "shield": true,
                "weapons": [
                    { "name": "longsword", "damage": "1d8", "properties": [] },
                    { "name": "rapier", "damage": "1d8", "properties": ["finesse"] },
                    { "name": "longbow", "damage": "1d8", "properties": ["ammunition"] },
                ],
            }),
        );
        ctx
    }

    #[test]
    fn armor_class_medium_with_shield() {
        let ctx = seeded_context();
        let result = CombatCoordinator::new().coordinate(&json!({}), &ctx);
        assert!(result.is_completed());
        // 13 base + min(2, dex 2) + shield 2
        assert_eq!(result.data["armor_class"], json!(17));
    }

    #[test]
    fn unarmored_ac() {
        assert_eq!(CombatCoordinator::armor_class(None, false, 3), 13);
        let heavy = json!({ "base": 16, "kind": "heavy" });
        assert_eq!(CombatCoordinator::armor_class(Some(&heavy), false, 3), 16);
        let light = json!({ "base": 12, "kind": "light" });
        assert_eq!(CombatCoordinator::armor_class(Some(&light), true, 3), 17);
    }

    #[test]
    fn hit_points_fighter_five() {
        let ctx = seeded_context();
        let result = CombatCoordinator::new().coordinate(&json!({}), &ctx);
        // 10 + 4*6 average + 2 con * 5 levels
        assert_eq!(result.data["hit_points"], json!(44));
        assert_eq!(result.data["hit_dice"], json!(["5d10"]));
    }

    #[test]
    fn attack_modifier_selection() {
        let ctx = seeded_context();
        let result = CombatCoordinator::new().coordinate(&json!({}), &ctx);
        let attacks = result.data["attacks"].as_array().unwrap();
        // longsword: str 3 + prof 3
        assert_eq!(attacks[0]["attack_bonus"], json!(6));
        assert_eq!(attacks[0]["damage"], json!("1d8+3"));
        // rapier: finesse max(str, dex) = 3
        assert_eq!(attacks[1]["attack_bonus"], json!(6));
        // longbow: dex 2 + prof 3
        assert_eq!(attacks[2]["attack_bonus"], json!(5));
        assert_eq!(attacks[2]["damage"], json!("1d8+2"));
    }

    #[test]
    fn speed_from_raw_with_default() {
        let ctx = seeded_context();
        let result = CombatCoordinator::new()
            .coordinate(&json!({ "character": { "race": { "speed": 25 } } }), &ctx);
        assert_eq!(result.data["speed"], json!(25));

        let result = CombatCoordinator::new().coordinate(&json!({}), &ctx);
        assert_eq!(result.data["speed"], json!(30));
    }

    #[test]
    fn initiative_is_dex_modifier() {
        let ctx = seeded_context();
        let result = CombatCoordinator::new().coordinate(&json!({}), &ctx);
        assert_eq!(result.data["initiative"], json!(2));
    }

    #[test]
    fn missing_upstream_fails() {
        let ctx = CalculationContext::new("t");
        let result = CombatCoordinator::new().coordinate(&json!({}), &ctx);
        assert_eq!(result.status, crate::result::StageStatus::Failed);
        assert_eq!(result.errors.len(), 2);
    }
}
