//! Skill and saving-throw proficiencies.

use serde_json::{json, Map, Value};

use crate::constants::{ABILITIES, SKILLS};
use crate::context::CalculationContext;
use crate::coordinator::Coordinator;
use crate::raw;
use crate::result::CalculationResult;

use super::{is_document, upstream_ability, upstream_i64};

/// Names listed under a proficiency array in either schema generation.
fn listed_names(raw: &Value, paths: &[&str]) -> Vec<String> {
    raw::first_array(raw, paths)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.to_ascii_lowercase().replace([' ', '-'], "_"))
                .collect()
        })
        .unwrap_or_default()
}

/// Coordinator for the `proficiencies` stage.
///
/// Reads the proficiency bonus from `character_info` and ability modifiers
/// from `abilities`, then derives a bonus for all eighteen skills and six
/// saving throws. Expertise doubles the proficiency contribution.
pub struct ProficienciesCoordinator;

impl ProficienciesCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProficienciesCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator for ProficienciesCoordinator {
    fn name(&self) -> &'static str {
        "proficiencies"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["character_info", "abilities"]
    }

    fn priority(&self) -> u32 {
        30
    }

    fn validate_input(&self, raw: &Value) -> bool {
        is_document(raw)
    }

    fn coordinate(&self, raw: &Value, ctx: &CalculationContext) -> CalculationResult {
        let Some(prof_bonus) = upstream_i64(ctx, "character_info", "proficiency_bonus") else {
            return CalculationResult::failed(
                self.name(),
                vec!["character_info output is missing a proficiency bonus".to_string()],
            );
        };

        let skill_profs = listed_names(
            raw,
            &["character.proficiencies.skills", "proficiencies.skills", "skills"],
        );
        let expertise = listed_names(
            raw,
            &["character.proficiencies.expertise", "expertise"],
        );
        let save_profs = listed_names(
            raw,
            &["character.proficiencies.saving_throws", "saving_throws", "saves"],
        );

        let mut errors = Vec::new();
        let mut skills = Map::new();
        for (skill, ability) in SKILLS {
            let Some((_, modifier)) = upstream_ability(ctx, ability) else {
                errors.push(format!("abilities output is missing {ability}"));
                continue;
            };
            let proficient = skill_profs.iter().any(|s| s == skill);
            let expert = expertise.iter().any(|s| s == skill);
            let bonus = modifier
                + if expert {
                    prof_bonus * 2
                } else if proficient {
                    prof_bonus
                } else {
                    0
                };
            skills.insert(
                skill.to_string(),
                json!({
                    "ability": ability,
                    "proficient": proficient || expert,
                    "expertise": expert,
                    "bonus": bonus,
                }),
            );
        }

        let mut saves = Map::new();
        for ability in ABILITIES {
            let Some((_, modifier)) = upstream_ability(ctx, ability) else {
                errors.push(format!("abilities output is missing {ability}"));
                continue;
            };
            let proficient = save_profs.iter().any(|s| s == ability);
            saves.insert(
                ability.to_string(),
                json!({
                    "proficient": proficient,
                    "bonus": modifier + if proficient { prof_bonus } else { 0 },
                }),
            );
        }

        if !errors.is_empty() {
            return CalculationResult::failed(self.name(), errors);
        }

        let passive_perception = 10
            + skills
                .get("perception")
                .and_then(|s| s.get("bonus"))
                .and_then(Value::as_i64)
                .unwrap_or(0);

        let data = json!({
            "skills": skills,
            "saving_throws": saves,
            "passive_perception": passive_perception,
        });
        CalculationResult::completed(self.name(), data)
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "skills": { "type": "object" },
                "saving_throws": { "type": "object" },
                "passive_perception": { "type": "integer" },
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_context() -> CalculationContext {
        let mut ctx = CalculationContext::new("t");
        ctx.record_stage_output("character_info", json!({ "proficiency_bonus": 3 }));
        let mut abilities = Map::new();
        for (ability, modifier) in [
            ("strength", 1),
            ("dexterity", 4),
            ("constitution", 2),
            ("intelligence", 0),
            ("wisdom", 3),
            ("charisma", -1),
        ] {
            abilities.insert(
                ability.to_string(),
                json!({ "score": 10 + modifier * 2, "modifier": modifier }),
            );
        }
        ctx.record_stage_output("abilities", Value::Object(abilities));
        ctx
    }

    #[test]
    fn skill_bonuses_with_proficiency_and_expertise() {
        let ctx = seeded_context();
        let raw = json!({
            "character": {
                "proficiencies": {
                    "skills": ["stealth", "perception"],
                    "expertise": ["stealth"],
                }
            }
        });
        let result = ProficienciesCoordinator::new().coordinate(&raw, &ctx);
        assert!(result.is_completed());
        // dex 4 + 2*3 expertise
        assert_eq!(result.data["skills"]["stealth"]["bonus"], json!(10));
        // wis 3 + 3 proficiency
        assert_eq!(result.data["skills"]["perception"]["bonus"], json!(6));
        // unproficient: bare modifier
        assert_eq!(result.data["skills"]["athletics"]["bonus"], json!(1));
        assert_eq!(result.data["passive_perception"], json!(16));
    }

    #[test]
    fn saving_throws() {
        let ctx = seeded_context();
        let raw = json!({ "saves": ["dexterity", "intelligence"] });
        let result = ProficienciesCoordinator::new().coordinate(&raw, &ctx);
        assert_eq!(result.data["saving_throws"]["dexterity"]["bonus"], json!(7));
        assert_eq!(result.data["saving_throws"]["intelligence"]["bonus"], json!(3));
        assert_eq!(result.data["saving_throws"]["charisma"]["bonus"], json!(-1));
        assert_eq!(
            result.data["saving_throws"]["charisma"]["proficient"],
            json!(false)
        );
    }

    #[test]
    fn skill_names_normalized() {
        let ctx = seeded_context();
        let raw = json!({ "skills": ["Sleight of Hand"] });
        let result = ProficienciesCoordinator::new().coordinate(&raw, &ctx);
        assert_eq!(
            result.data["skills"]["sleight_of_hand"]["proficient"],
            json!(true)
        );
    }

    #[test]
    fn missing_upstream_fails() {
        let ctx = CalculationContext::new("t");
        let result = ProficienciesCoordinator::new().coordinate(&json!({}), &ctx);
        assert_eq!(result.status, crate::result::StageStatus::Failed);
    }
}
