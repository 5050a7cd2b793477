//! Flux Kustomization manifest types and parsing.
//!
//! A repository declares its deployment units as Flux `Kustomization`
//! documents. This module parses those documents down to the fields the
//! validator consumes: the unit name, its source path, and its declared
//! `dependsOn` prerequisites.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// API group prefix identifying Flux kustomize-controller resources.
pub const FLUX_KUSTOMIZE_API_GROUP: &str = "kustomize.toolkit.fluxcd.io";

/// All deployment units for a validation run, keyed by kustomization name.
///
/// Built once from parsed manifests and read-only afterward. Duplicate names
/// across files resolve last-write-wins at load time.
pub type Registry = BTreeMap<String, KustomizationSpec>;

/// A single entry of a kustomization's `dependsOn` list.
///
/// Dependency matching is by unqualified `name` only. The `namespace`
/// qualifier is carried through for display but does not participate in
/// graph edges, so two kustomizations sharing a name across namespaces are
/// ambiguous. Preserved as a known limitation of the dependsOn contract.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DependsOnRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Declared spec of a Flux Kustomization, reduced to the fields the
/// validator reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KustomizationSpec {
    /// Source path within the repository. Opaque to validation, kept for
    /// reporting.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub depends_on: Vec<DependsOnRef>,
}

impl KustomizationSpec {
    /// Whether `name` appears directly in this kustomization's `dependsOn`.
    pub fn depends_directly_on(&self, name: &str) -> bool {
        self.depends_on.iter().any(|dep| dep.name == name)
    }
}

/// Parse every Flux Kustomization out of a multi-document YAML file.
///
/// Documents of other kinds or foreign API groups are skipped, as are
/// Kustomizations without a `metadata.name`. `dependsOn` entries with no
/// name are dropped. Returns `(name, spec)` pairs in document order so the
/// caller can apply its own collision policy.
pub fn parse_kustomizations(content: &str) -> Result<Vec<(String, KustomizationSpec)>> {
    let mut found = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document).context("Failed to parse YAML document")?;

        if !is_flux_kustomization(&value) {
            continue;
        }

        let name = match value
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
        {
            Some(name) if !name.is_empty() => name,
            _ => continue,
        };

        let mut spec: KustomizationSpec = match value.get("spec") {
            Some(spec) => serde_yaml::from_value(spec.clone())
                .with_context(|| format!("Failed to parse spec of Kustomization '{}'", name))?,
            None => KustomizationSpec::default(),
        };
        spec.depends_on.retain(|dep| !dep.name.is_empty());

        found.push((name.to_string(), spec));
    }

    Ok(found)
}

fn is_flux_kustomization(value: &Value) -> bool {
    let kind = value.get("kind").and_then(Value::as_str);
    let api_version = value.get("apiVersion").and_then(Value::as_str);

    kind == Some("Kustomization")
        && api_version
            .map(|v| v.starts_with(FLUX_KUSTOMIZE_API_GROUP))
            .unwrap_or(false)
}
