//! Ordering rules for kustomization dependencies.
//!
//! Two rule classes exist. Table-driven ordering rules say "prerequisite P
//! must be satisfied, directly or transitively, before each of D1..Dn" and
//! encode domain knowledge about the platform layers. The content-based
//! secret-consumer rule requires every kustomization shipping ExternalSecret
//! resources to declare the secrets prerequisite directly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::graph;
use crate::kustomization::Registry;

/// Kustomization that must be declared by every ExternalSecret consumer.
pub const SECRETS_PREREQUISITE: &str = "external-secrets-config";

/// A single ordering invariant: `prerequisite` must appear in the dependency
/// closure of every kustomization listed in `must_precede`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderingRule {
    pub prerequisite: String,
    pub must_precede: Vec<String>,
    /// Justification surfaced on violation.
    pub reason: String,
}

/// An unfulfilled ordering requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleViolation {
    pub dependent: String,
    pub prerequisite: String,
    pub reason: String,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} should depend on {} ({})",
            self.dependent, self.prerequisite, self.reason
        )
    }
}

/// The built-in rule table for the platform's critical ordering.
pub fn default_rules() -> Vec<OrderingRule> {
    fn rule(prerequisite: &str, must_precede: &[&str], reason: &str) -> OrderingRule {
        OrderingRule {
            prerequisite: prerequisite.to_string(),
            must_precede: must_precede.iter().map(|s| s.to_string()).collect(),
            reason: reason.to_string(),
        }
    }

    vec![
        rule(
            "external-secrets-config",
            &["authentik", "gitea", "harbor", "powerdns", "matrix"],
            "Applications need external-secrets ClusterSecretStore to sync secrets from Vault",
        ),
        rule(
            "cert-manager",
            &["ingress-nginx", "authentik", "gitea", "harbor"],
            "TLS certificates required for ingress and applications",
        ),
        rule(
            "ingress-nginx",
            &["authentik", "gitea", "harbor", "matrix"],
            "Applications need ingress controller for external access",
        ),
        rule(
            "vault",
            &["external-secrets-operator", "external-secrets-config"],
            "Vault must be ready before external-secrets can connect",
        ),
        rule(
            "metallb-config",
            &["ingress-nginx"],
            "Load balancer needed for ingress controller",
        ),
    ]
}

/// Load an ordering rule table from a YAML file.
pub fn load_rules(path: &Path) -> Result<Vec<OrderingRule>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse rules file: {}", path.display()))
}

/// Evaluate the rule table against the registry.
///
/// Rules whose prerequisite is not a registered kustomization are skipped,
/// as are listed dependents that are not registered — absence means the rule
/// does not apply to this deployment, not that it failed. A dependent
/// satisfies a rule by declaring the prerequisite directly, or through any
/// direct dependency whose closure reaches it. All rules are checked
/// independently and every violation is collected.
pub fn check_ordering_rules(rules: &[OrderingRule], registry: &Registry) -> Vec<RuleViolation> {
    let dependencies = graph::dependency_lists(registry);
    let mut violations = Vec::new();

    for rule in rules {
        if !registry.contains_key(&rule.prerequisite) {
            continue;
        }

        for dependent in &rule.must_precede {
            let declared = match dependencies.get(dependent) {
                Some(declared) => declared,
                None => continue,
            };

            if declared.iter().any(|dep| dep == &rule.prerequisite) {
                continue;
            }

            let transitive = declared
                .iter()
                .any(|dep| graph::has_dependency_path(&dependencies, &rule.prerequisite, dep));
            if transitive {
                continue;
            }

            violations.push(RuleViolation {
                dependent: dependent.clone(),
                prerequisite: rule.prerequisite.clone(),
                reason: rule.reason.clone(),
            });
        }
    }

    violations
}

/// Check that every scanned ExternalSecret consumer declares the secrets
/// prerequisite directly in `dependsOn`.
///
/// This is a direct-membership check: a transitive path to the prerequisite
/// is not accepted, because the ClusterSecretStore must be an explicit,
/// auditable dependency of anything that syncs secrets. Consumers not
/// present in the registry are skipped.
pub fn check_secret_consumers(
    consumers: &BTreeSet<String>,
    registry: &Registry,
) -> Vec<RuleViolation> {
    let mut violations = Vec::new();

    for consumer in consumers {
        let spec = match registry.get(consumer) {
            Some(spec) => spec,
            None => continue,
        };

        if !spec.depends_directly_on(SECRETS_PREREQUISITE) {
            violations.push(RuleViolation {
                dependent: consumer.clone(),
                prerequisite: SECRETS_PREREQUISITE.to_string(),
                reason: "kustomization declares ExternalSecret resources".to_string(),
            });
        }
    }

    violations
}
