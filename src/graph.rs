//! Dependency graph construction, cycle detection, and transitive
//! reachability.
//!
//! Edges point `prerequisite → dependent`: an edge from A to B means B
//! declared A in its `dependsOn` and A must be satisfied first. Cycles in
//! this graph mean no valid apply order exists. The graph is adjacency-by-
//! name rather than linked node objects, looked up by key at traversal time.

use std::collections::{BTreeMap, BTreeSet};

use crate::kustomization::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Directed dependency graph over kustomization names.
///
/// Nodes include every name referenced as a dependency, even when no
/// kustomization defines it. A dangling prerequisite stays visible as a node
/// instead of being silently dropped.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// prerequisite → kustomizations that declared it in `dependsOn`.
    dependents: BTreeMap<String, Vec<String>>,
    /// kustomization → its declared prerequisites, in declaration order.
    dependencies: BTreeMap<String, Vec<String>>,
    nodes: BTreeSet<String>,
}

impl DependencyGraph {
    /// Build the graph from a registry: one edge per `(kustomization,
    /// dependsOn entry)` pair. Duplicate declarations produce duplicate
    /// edges, which is harmless for both cycle detection and reachability.
    pub fn build(registry: &Registry) -> Self {
        let mut graph = Self::default();

        for (name, spec) in registry {
            graph.nodes.insert(name.clone());
            let declared = graph.dependencies.entry(name.clone()).or_default();

            for dep in &spec.depends_on {
                graph.nodes.insert(dep.name.clone());
                graph
                    .dependents
                    .entry(dep.name.clone())
                    .or_default()
                    .push(name.clone());
                declared.push(dep.name.clone());
            }
        }

        graph
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains(name)
    }

    /// Kustomizations that declared `name` as a prerequisite.
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.dependents.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find every cycle reachable from any node, using white/gray/black DFS.
    ///
    /// Each cycle is reported as a closed walk: the sub-path from the
    /// repeated node's first occurrence through the repeat, with the first
    /// element appearing again as the last. Self-loops are cycles of length
    /// one. The search continues until every node is black, so all disjoint
    /// cycles surface in one run. Cycle membership is deterministic; the
    /// order and rotation point of reported cycles is not part of the
    /// contract.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut color: BTreeMap<&str, Color> = self
            .nodes
            .iter()
            .map(|node| (node.as_str(), Color::White))
            .collect();
        let mut path: Vec<&str> = Vec::new();
        let mut cycles = Vec::new();

        for node in &self.nodes {
            if color[node.as_str()] == Color::White {
                self.visit(node, &mut color, &mut path, &mut cycles);
            }
        }

        cycles
    }

    fn visit<'a>(
        &'a self,
        node: &'a str,
        color: &mut BTreeMap<&'a str, Color>,
        path: &mut Vec<&'a str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        match color.get(node).copied().unwrap_or(Color::White) {
            Color::Gray => {
                // Gray nodes are exactly the ones on the current path, so
                // the first occurrence marks where the closed walk starts.
                let start = path.iter().position(|n| *n == node).unwrap_or(0);
                let mut cycle: Vec<String> =
                    path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(node.to_string());
                cycles.push(cycle);
                return;
            }
            Color::Black => return,
            Color::White => {}
        }

        color.insert(node, Color::Gray);
        path.push(node);

        for dependent in self.dependents_of(node) {
            self.visit(dependent, color, path, cycles);
        }

        path.pop();
        color.insert(node, Color::Black);
    }

    /// Whether `prerequisite` appears in the transitive dependency closure
    /// of `dependent`, walking declared `dependsOn` lists backward from
    /// `dependent`.
    pub fn depends_transitively(&self, dependent: &str, prerequisite: &str) -> bool {
        has_dependency_path(&self.dependencies, prerequisite, dependent)
    }
}

/// Per-kustomization dependency name lists, the registry view consumed by
/// reachability and the rule checker.
pub fn dependency_lists(registry: &Registry) -> BTreeMap<String, Vec<String>> {
    registry
        .iter()
        .map(|(name, spec)| {
            let deps = spec.depends_on.iter().map(|d| d.name.clone()).collect();
            (name.clone(), deps)
        })
        .collect()
}

/// Whether a dependency path leads from `dependent` back to `prerequisite`.
///
/// Reflexive: a name trivially reaches itself. The walk keeps a visited set
/// over expanded nodes so it terminates with an answer even when the input
/// contains cycles; cyclic inputs are reported separately by
/// [`DependencyGraph::find_cycles`].
pub fn has_dependency_path(
    dependencies: &BTreeMap<String, Vec<String>>,
    prerequisite: &str,
    dependent: &str,
) -> bool {
    let mut visited = BTreeSet::new();
    walk(dependencies, prerequisite, dependent, &mut visited)
}

fn walk(
    dependencies: &BTreeMap<String, Vec<String>>,
    prerequisite: &str,
    dependent: &str,
    visited: &mut BTreeSet<String>,
) -> bool {
    if prerequisite == dependent {
        return true;
    }

    if !visited.insert(dependent.to_string()) {
        return false;
    }

    let declared = dependencies
        .get(dependent)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    declared
        .iter()
        .any(|dep| walk(dependencies, prerequisite, dep, visited))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kustomization::{DependsOnRef, KustomizationSpec};

    fn registry(entries: &[(&str, &[&str])]) -> Registry {
        entries
            .iter()
            .map(|(name, deps)| {
                let spec = KustomizationSpec {
                    path: format!("./k8s/{}", name),
                    depends_on: deps
                        .iter()
                        .map(|dep| DependsOnRef {
                            name: dep.to_string(),
                            namespace: None,
                        })
                        .collect(),
                };
                (name.to_string(), spec)
            })
            .collect()
    }

    /// Every (from, to) pair of consecutive cycle elements, across all
    /// reported cycles. Cycle rotation and report order are unspecified, so
    /// tests assert on the edge set.
    fn cycle_edges(cycles: &[Vec<String>]) -> BTreeSet<(String, String)> {
        cycles
            .iter()
            .flat_map(|cycle| {
                cycle
                    .windows(2)
                    .map(|pair| (pair[0].clone(), pair[1].clone()))
            })
            .collect()
    }

    #[test]
    fn test_build_includes_undefined_prerequisites_as_nodes() {
        let registry = registry(&[("app", &["missing-infra"])]);
        let graph = DependencyGraph::build(&registry);

        assert_eq!(graph.node_count(), 2);
        assert!(graph.contains("missing-infra"));
        assert_eq!(graph.dependents_of("missing-infra"), ["app".to_string()]);
    }

    #[test]
    fn test_no_cycles_in_dag() {
        let registry = registry(&[
            ("base", &[]),
            ("mid", &["base"]),
            ("app", &["mid", "base"]),
        ]);
        let graph = DependencyGraph::build(&registry);
        assert!(graph.find_cycles().is_empty());
    }

    #[test]
    fn test_two_node_cycle() {
        let registry = registry(&[("a", &["b"]), ("b", &["a"])]);
        let cycles = DependencyGraph::build(&registry).find_cycles();

        assert!(!cycles.is_empty());
        let edges = cycle_edges(&cycles);
        assert!(edges.contains(&("a".to_string(), "b".to_string())));
        assert!(edges.contains(&("b".to_string(), "a".to_string())));
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let registry = registry(&[("loner", &["loner"])]);
        let cycles = DependencyGraph::build(&registry).find_cycles();

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec!["loner".to_string(), "loner".to_string()]);
    }

    #[test]
    fn test_cycle_reported_as_closed_walk() {
        let registry = registry(&[("a", &["c"]), ("b", &["a"]), ("c", &["b"])]);
        let cycles = DependencyGraph::build(&registry).find_cycles();

        assert_eq!(cycles.len(), 1);
        let cycle = &cycles[0];
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 4);

        let edges = cycle_edges(&cycles);
        // dependsOn edges reversed: a→b, b→c, c→a
        assert!(edges.contains(&("a".to_string(), "b".to_string())));
        assert!(edges.contains(&("b".to_string(), "c".to_string())));
        assert!(edges.contains(&("c".to_string(), "a".to_string())));
    }

    #[test]
    fn test_disjoint_cycles_all_reported() {
        let registry = registry(&[
            ("a", &["b"]),
            ("b", &["a"]),
            ("x", &["y"]),
            ("y", &["x"]),
            ("standalone", &[]),
        ]);
        let cycles = DependencyGraph::build(&registry).find_cycles();

        let edges = cycle_edges(&cycles);
        assert!(edges.contains(&("a".to_string(), "b".to_string())));
        assert!(edges.contains(&("x".to_string(), "y".to_string())));
        assert!(cycles.len() >= 2);
    }

    #[test]
    fn test_shared_prefix_does_not_report_spurious_cycle() {
        // Diamond: base → {left, right} → app. A DAG with converging paths
        // must not be mistaken for a cycle.
        let registry = registry(&[
            ("base", &[]),
            ("left", &["base"]),
            ("right", &["base"]),
            ("app", &["left", "right"]),
        ]);
        let graph = DependencyGraph::build(&registry);
        assert!(graph.find_cycles().is_empty());
    }

    #[test]
    fn test_reachability_is_reflexive() {
        let registry = registry(&[("a", &[])]);
        let deps = dependency_lists(&registry);
        assert!(has_dependency_path(&deps, "a", "a"));
        assert!(has_dependency_path(&deps, "not-even-defined", "not-even-defined"));
    }

    #[test]
    fn test_reachability_follows_chain() {
        let registry = registry(&[("a", &[]), ("b", &["a"]), ("c", &["b"])]);
        let deps = dependency_lists(&registry);

        assert!(has_dependency_path(&deps, "a", "c"));
        assert!(has_dependency_path(&deps, "a", "b"));
        assert!(has_dependency_path(&deps, "b", "c"));
        // prerequisites do not reach their dependents
        assert!(!has_dependency_path(&deps, "c", "a"));
        assert!(!has_dependency_path(&deps, "b", "a"));
    }

    #[test]
    fn test_reachability_terminates_on_cyclic_input() {
        let registry = registry(&[("a", &["b"]), ("b", &["a"])]);
        let deps = dependency_lists(&registry);

        assert!(has_dependency_path(&deps, "a", "b"));
        assert!(!has_dependency_path(&deps, "unrelated", "a"));
    }

    #[test]
    fn test_graph_view_matches_registry_view() {
        let registry = registry(&[("a", &[]), ("b", &["a"]), ("c", &["b"])]);
        let graph = DependencyGraph::build(&registry);
        let deps = dependency_lists(&registry);

        for (prereq, dependent) in [("a", "c"), ("c", "a"), ("b", "b"), ("a", "b")] {
            assert_eq!(
                graph.depends_transitively(dependent, prereq),
                has_dependency_path(&deps, prereq, dependent),
                "views disagree for ({}, {})",
                prereq,
                dependent
            );
        }
    }
}
