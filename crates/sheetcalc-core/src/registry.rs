//! Default coordinator construction.
//!
//! All coordinators are built up front and handed to the pipeline builder —
//! explicit dependency injection, no lazily populated cache behind the API.

use std::sync::Arc;

use crate::coordinator::Coordinator;
use crate::coordinators::{
    AbilitiesCoordinator, CharacterInfoCoordinator, CombatCoordinator, EquipmentCoordinator,
    FeaturesCoordinator, ProficienciesCoordinator, ResourcesCoordinator, SpellcastingCoordinator,
};

/// Construct the full default coordinator set, in priority order.
#[must_use]
pub fn default_coordinators() -> Vec<Arc<dyn Coordinator>> {
    vec![
        Arc::new(CharacterInfoCoordinator::new()),
        Arc::new(AbilitiesCoordinator::new()),
        Arc::new(ProficienciesCoordinator::new()),
        Arc::new(EquipmentCoordinator::new()),
        Arc::new(CombatCoordinator::new()),
        Arc::new(SpellcastingCoordinator::new()),
        Arc::new(FeaturesCoordinator::new()),
        Arc::new(ResourcesCoordinator::new()),
    ]
}

/// Names of the default coordinators, in priority order.
#[must_use]
pub fn available() -> Vec<&'static str> {
    default_coordinators().iter().map(|c| c.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_is_complete() {
        let names = available();
        assert_eq!(
            names,
            vec![
                "character_info",
                "abilities",
                "proficiencies",
                "equipment",
                "combat",
                "spellcasting",
                "features",
                "resources",
            ]
        );
    }

    #[test]
    fn priorities_strictly_increase() {
        let coordinators = default_coordinators();
        for pair in coordinators.windows(2) {
            assert!(pair[0].priority() < pair[1].priority());
        }
    }

    #[test]
    fn dependencies_reference_default_names() {
        let names = available();
        for coordinator in default_coordinators() {
            for dep in coordinator.dependencies() {
                assert!(names.contains(dep), "{} -> {dep}", coordinator.name());
            }
        }
    }

    #[test]
    fn construction_is_fresh_each_call() {
        // Explicit DI: two calls build independent instances.
        let a = default_coordinators();
        let b = default_coordinators();
        assert!(!Arc::ptr_eq(&a[0], &b[0]));
    }
}
