//! Execution-order construction: priority-seeded topological sort.

use std::collections::HashMap;

use sheetcalc_core::CalcError;

/// One registered stage as seen by the sorter.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Stage name.
    pub name: String,
    /// Coordinator priority (lower visits earlier among ties).
    pub priority: u32,
    /// Declared dependency names.
    pub dependencies: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Compute a dependency-respecting execution order.
///
/// Traversal order is fixed by sorting names on (priority, name) so ties are
/// deterministic. Dependencies naming unregistered stages are silently
/// skipped here — the pipeline rejects them at run time, before any
/// coordinator executes. A node revisited while still on the visiting stack
/// is a dependency cycle: a fatal configuration error, not a per-run data
/// failure.
pub fn execution_order(nodes: &[GraphNode]) -> Result<Vec<String>, CalcError> {
    let by_name: HashMap<&str, &GraphNode> =
        nodes.iter().map(|node| (node.name.as_str(), node)).collect();

    let mut seeds: Vec<&GraphNode> = nodes.iter().collect();
    seeds.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));

    let mut marks: HashMap<&str, Mark> =
        nodes.iter().map(|node| (node.name.as_str(), Mark::Unvisited)).collect();
    let mut order = Vec::with_capacity(nodes.len());

    fn visit<'a>(
        node: &'a GraphNode,
        by_name: &HashMap<&'a str, &'a GraphNode>,
        marks: &mut HashMap<&'a str, Mark>,
        order: &mut Vec<String>,
    ) -> Result<(), CalcError> {
        match marks[node.name.as_str()] {
            Mark::Done => return Ok(()),
            Mark::Visiting => return Err(CalcError::DependencyCycle(node.name.clone())),
            Mark::Unvisited => {}
        }
        marks.insert(node.name.as_str(), Mark::Visiting);
        for dep in &node.dependencies {
            if let Some(dep_node) = by_name.get(dep.as_str()) {
                visit(dep_node, by_name, marks, order)?;
            }
        }
        marks.insert(node.name.as_str(), Mark::Done);
        order.push(node.name.clone());
        Ok(())
    }

    for seed in seeds {
        visit(seed, &by_name, &mut marks, &mut order)?;
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, priority: u32, deps: &[&str]) -> GraphNode {
        GraphNode {
            name: name.to_string(),
            priority,
            dependencies: deps.iter().map(|d| (*d).to_string()).collect(),
        }
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn empty_graph() {
        assert_eq!(execution_order(&[]).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn chain_respects_dependencies() {
        let order = execution_order(&[
            node("c", 30, &["b"]),
            node("b", 20, &["a"]),
            node("a", 10, &[]),
        ])
        .unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn dependency_overrides_priority() {
        // "late" has the lowest priority but depends on "early".
        let order = execution_order(&[
            node("late", 1, &["early"]),
            node("early", 99, &[]),
        ])
        .unwrap();
        assert_eq!(order, vec!["early", "late"]);
    }

    #[test]
    fn ties_broken_by_name() {
        let order = execution_order(&[
            node("zeta", 10, &[]),
            node("alpha", 10, &[]),
            node("mid", 10, &[]),
        ])
        .unwrap();
        assert_eq!(order, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn diamond_dependencies() {
        let order = execution_order(&[
            node("d", 40, &["b", "c"]),
            node("b", 20, &["a"]),
            node("c", 30, &["a"]),
            node("a", 10, &[]),
        ])
        .unwrap();
        assert!(position(&order, "a") < position(&order, "b"));
        assert!(position(&order, "a") < position(&order, "c"));
        assert!(position(&order, "b") < position(&order, "d"));
        assert!(position(&order, "c") < position(&order, "d"));
    }

    #[test]
    fn unregistered_dependencies_skipped() {
        let order = execution_order(&[node("a", 10, &["ghost"])]).unwrap();
        assert_eq!(order, vec!["a"]);
    }

    #[test]
    fn two_node_cycle_rejected() {
        let err = execution_order(&[
            node("a", 10, &["b"]),
            node("b", 20, &["a"]),
        ])
        .unwrap_err();
        assert!(matches!(err, CalcError::DependencyCycle(_)));
    }

    #[test]
    fn self_cycle_rejected() {
        let err = execution_order(&[node("a", 10, &["a"])]).unwrap_err();
        assert!(matches!(err, CalcError::DependencyCycle(name) if name == "a"));
    }

    #[test]
    fn longer_cycle_rejected() {
        let err = execution_order(&[
            node("a", 10, &["c"]),
            node("b", 20, &["a"]),
            node("c", 30, &["b"]),
        ])
        .unwrap_err();
        assert!(matches!(err, CalcError::DependencyCycle(_)));
    }

    #[test]
    fn every_stage_appears_exactly_once() {
        let order = execution_order(&[
            node("d", 40, &["b", "c"]),
            node("b", 20, &["a"]),
            node("c", 30, &["a", "b"]),
            node("a", 10, &[]),
        ])
        .unwrap();
        assert_eq!(order.len(), 4);
        let mut sorted = order.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 4);
    }
}
