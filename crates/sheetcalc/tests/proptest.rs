//! Property-based tests for rule arithmetic and execution ordering.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Value};

use sheetcalc_core::{
    ability_modifier, proficiency_bonus, CalculationContext, CalculationResult, Coordinator,
};
use sheetcalc_orchestration::CalculationPipeline;

/// Minimal coordinator for graph-shape properties.
struct NamedStage {
    name: &'static str,
    priority: u32,
}

impl Coordinator for NamedStage {
    fn name(&self) -> &'static str {
        self.name
    }
    fn priority(&self) -> u32 {
        self.priority
    }
    fn validate_input(&self, raw: &Value) -> bool {
        raw.is_object()
    }
    fn coordinate(&self, _raw: &Value, _ctx: &CalculationContext) -> CalculationResult {
        CalculationResult::completed(self.name, json!({}))
    }
}

const STAGE_NAMES: [&str; 8] = ["s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7"];

proptest! {
    #[test]
    fn modifier_matches_reference_formula(score in -10i64..=40) {
        let expected = ((score - 10) as f64 / 2.0).floor() as i64;
        prop_assert_eq!(ability_modifier(score), expected);
    }

    #[test]
    fn modifier_is_monotonic(a in 1i64..=30, b in 1i64..=30) {
        if a <= b {
            prop_assert!(ability_modifier(a) <= ability_modifier(b));
        }
    }

    #[test]
    fn proficiency_bonus_in_range(level in -5i64..=40) {
        let bonus = proficiency_bonus(level);
        prop_assert!((2..=6).contains(&bonus));
    }

    #[test]
    fn proficiency_bonus_is_monotonic(a in 1i64..=20, b in 1i64..=20) {
        if a <= b {
            prop_assert!(proficiency_bonus(a) <= proficiency_bonus(b));
        }
    }

    /// For any DAG (dependencies only point to earlier-indexed stages, so
    /// cycles are impossible), every stage lands after all of its
    /// dependencies, whatever the priorities and registration order.
    #[test]
    fn execution_order_respects_arbitrary_dags(
        edges in proptest::collection::vec((1usize..8, 0usize..8), 0..16),
        priorities in proptest::collection::vec(0u32..100, 8),
        registration_order in Just((0usize..8).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        // deps[i] may only name stages with a smaller index.
        let mut deps: Vec<Vec<&'static str>> = vec![Vec::new(); 8];
        for (target, source) in edges {
            if source < target && !deps[target].contains(&STAGE_NAMES[source]) {
                deps[target].push(STAGE_NAMES[source]);
            }
        }

        let mut pipeline = CalculationPipeline::new();
        for &idx in &registration_order {
            let coordinator: Arc<dyn Coordinator> = Arc::new(NamedStage {
                name: STAGE_NAMES[idx],
                priority: priorities[idx],
            });
            pipeline
                .register_stage(STAGE_NAMES[idx], coordinator, &deps[idx])
                .expect("acyclic registration must succeed");
        }

        let order = pipeline.execution_order().to_vec();
        prop_assert_eq!(order.len(), 8);
        let position = |name: &str| order.iter().position(|n| n == name).unwrap();
        for (target, target_deps) in deps.iter().enumerate() {
            for dep in target_deps {
                prop_assert!(
                    position(dep) < position(STAGE_NAMES[target]),
                    "{} must precede {}",
                    dep,
                    STAGE_NAMES[target],
                );
            }
        }
    }

    /// Two runs over the same random scores produce identical data.
    #[test]
    fn pipeline_runs_are_deterministic(
        scores in proptest::collection::vec(1i64..=30, 6),
    ) {
        let raw = json!({
            "name": "prop",
            "class": "wizard",
            "level": 5,
            "stats": {
                "str": scores[0],
                "dex": scores[1],
                "con": scores[2],
                "int": scores[3],
                "wis": scores[4],
                "cha": scores[5],
            },
        });
        let first = sheetcalc_orchestration::calculate(&raw).unwrap();
        let second = sheetcalc_orchestration::calculate(&raw).unwrap();
        prop_assert_eq!(first.results, second.results);
    }
}
