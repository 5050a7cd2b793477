//! Dependency validation entry points.
//!
//! Pure computation over an immutable registry snapshot: builds the graph,
//! finds cycles, evaluates ordering rules, and assembles the report. No I/O
//! and no shared state, so concurrent runs over independent registries need
//! no coordination.

use std::collections::BTreeSet;

use crate::graph::DependencyGraph;
use crate::kustomization::Registry;
use crate::report::Report;
use crate::rules::{self, OrderingRule};

/// Validate a registry against the ordering rule table.
pub fn validate(registry: &Registry, rules: &[OrderingRule]) -> Report {
    validate_with_secret_consumers(registry, rules, &BTreeSet::new())
}

/// Validate a registry, additionally requiring every name in `consumers`
/// (kustomizations that ship ExternalSecret resources, as found by the
/// resource scanner) to declare the secrets prerequisite directly.
pub fn validate_with_secret_consumers(
    registry: &Registry,
    rules: &[OrderingRule],
    consumers: &BTreeSet<String>,
) -> Report {
    let graph = DependencyGraph::build(registry);
    let cycles = graph.find_cycles();

    let mut violations = rules::check_ordering_rules(rules, registry);
    violations.extend(rules::check_secret_consumers(consumers, registry));

    Report { cycles, violations }
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
                    path: String::new(),
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

    fn chain_rule() -> Vec<OrderingRule> {
        vec![OrderingRule {
            prerequisite: "a".to_string(),
            must_precede: vec!["d".to_string()],
            reason: "a is the base layer".to_string(),
        }]
    }

    #[test]
    fn test_well_ordered_registry_passes() {
        let registry = registry(&[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["b"]),
            ("d", &["c", "a"]),
        ]);
        let report = validate(&registry, &chain_rule());

        assert!(report.pass());
        assert!(report.cycles.is_empty());
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_dropped_edge_is_still_satisfied_transitively() {
        // d depends only on c, but c reaches a through b.
        let registry = registry(&[("a", &[]), ("b", &["a"]), ("c", &["b"]), ("d", &["c"])]);
        let report = validate(&registry, &chain_rule());
        assert!(report.pass());
    }

    #[test]
    fn test_missing_prerequisite_edge_violates() {
        let registry = registry(&[("a", &[]), ("b", &[]), ("c", &["b"]), ("d", &["c"])]);
        let report = validate(&registry, &chain_rule());

        assert!(!report.pass());
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].dependent, "d");
        assert_eq!(report.violations[0].prerequisite, "a");
        assert_eq!(
            report.violations[0].to_string(),
            "d should depend on a (a is the base layer)"
        );
    }

    #[test]
    fn test_cycle_fails_validation() {
        let registry = registry(&[("a", &["b"]), ("b", &["a"])]);
        let report = validate(&registry, &[]);

        assert!(!report.pass());
        assert_eq!(report.cycles.len(), 1);
        let cycle = &report.cycles[0];
        assert_eq!(cycle.first(), cycle.last());
        assert!(cycle.contains(&"a".to_string()));
        assert!(cycle.contains(&"b".to_string()));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let registry = registry(&[("a", &["b"]), ("b", &["a"]), ("c", &[])]);
        let rules = vec![OrderingRule {
            prerequisite: "a".to_string(),
            must_precede: vec!["c".to_string()],
            reason: "base".to_string(),
        }];

        let first = validate(&registry, &rules);
        let second = validate(&registry, &rules);

        assert_eq!(first.pass(), second.pass());
        assert_eq!(first.cycles, second.cycles);
        assert_eq!(first.violations, second.violations);
    }

    #[test]
    fn test_secret_consumers_feed_into_violations() {
        let registry = registry(&[("external-secrets-config", &[]), ("gitea", &[])]);
        let consumers: BTreeSet<String> = ["gitea".to_string()].into();
        let report = validate_with_secret_consumers(&registry, &[], &consumers);

        assert!(!report.pass());
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].dependent, "gitea");
    }
}
