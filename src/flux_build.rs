//! Whole-tree build validation through the `flux` CLI, with a `kustomize`
//! fallback, and analysis of the rendered manifest stream.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::process::Command;

use crate::paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// One observation about the rendered manifests. Warnings are advisory;
/// errors fail the run.
#[derive(Debug, Clone)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Aggregate view of a rendered manifest stream.
#[derive(Debug, Default)]
pub struct ManifestAnalysis {
    pub resource_counts: BTreeMap<String, usize>,
    pub namespaces: BTreeSet<String>,
    pub findings: Vec<Finding>,
}

impl ManifestAnalysis {
    pub fn total_resources(&self) -> usize {
        self.resource_counts.values().sum()
    }

    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|finding| finding.severity == Severity::Error)
    }

    /// Resource kinds ordered by descending count.
    pub fn top_resource_kinds(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut kinds: Vec<(&str, usize)> = self
            .resource_counts
            .iter()
            .map(|(kind, count)| (kind.as_str(), *count))
            .collect();
        kinds.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        kinds.truncate(limit);
        kinds
    }
}

/// Render the full tree: `flux build --dry-run` first, falling back to
/// plain `kustomize build` when the Flux CLI is unavailable or needs
/// cluster access.
pub fn run_build(root: &Path) -> Result<String> {
    let kustomization_file = root
        .join(paths::FLUX_SYSTEM_DIR)
        .join(paths::FLUX_KUSTOMIZATION_FILE);

    let output = Command::new("flux")
        .args(["build", "kustomization", "flux-system", "--path"])
        .arg(root)
        .arg("--kustomization-file")
        .arg(&kustomization_file)
        .arg("--dry-run")
        .output();

    match output {
        Ok(output) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(_) => {
            eprintln!(
                "{} flux build not available, falling back to kustomize build...",
                "Warning:".yellow()
            );
            run_kustomize_fallback(root)
        }
        Err(_) => {
            eprintln!(
                "{} flux CLI not found, falling back to kustomize build...",
                "Warning:".yellow()
            );
            run_kustomize_fallback(root)
        }
    }
}

fn run_kustomize_fallback(root: &Path) -> Result<String> {
    let output = Command::new("kustomize")
        .arg("build")
        .arg(root)
        .output()
        .context("kustomize command not found - ensure kustomize is installed")?;

    if !output.status.success() {
        anyhow::bail!(
            "kustomize build failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Analyze a rendered multi-document manifest stream for suspicious
/// patterns: counts resources by kind, collects namespaces, and checks the
/// GitOps shape (HelmReleases present, Flux Kustomizations present, exactly
/// one external-secrets HelmRelease).
pub fn analyze_manifests(rendered: &str) -> ManifestAnalysis {
    let mut analysis = ManifestAnalysis::default();
    let mut external_secrets_releases = 0usize;

    for document in serde_yaml::Deserializer::from_str(rendered) {
        let value = match Value::deserialize(document) {
            Ok(value) => value,
            Err(e) => {
                analysis.findings.push(Finding::warning(format!(
                    "Failed to parse rendered output as YAML: {}",
                    e
                )));
                break;
            }
        };

        if value.is_null() {
            continue;
        }

        let kind = value.get("kind").and_then(Value::as_str);
        if let Some(kind) = kind {
            *analysis.resource_counts.entry(kind.to_string()).or_insert(0) += 1;
        }

        let metadata = value.get("metadata");
        if let Some(namespace) = metadata
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
        {
            analysis.namespaces.insert(namespace.to_string());
        }

        let name = metadata.and_then(|m| m.get("name")).and_then(Value::as_str);
        if kind == Some("HelmRelease") && name == Some("external-secrets") {
            external_secrets_releases += 1;
        }
    }

    if analysis.resource_counts.get("HelmRelease").copied().unwrap_or(0) == 0 {
        analysis.findings.push(Finding::warning(
            "No HelmRelease resources found - expected for GitOps deployment",
        ));
    }

    if analysis
        .resource_counts
        .get("Kustomization")
        .copied()
        .unwrap_or(0)
        == 0
    {
        analysis
            .findings
            .push(Finding::warning("No Flux Kustomization resources found"));
    }

    if external_secrets_releases > 1 {
        analysis.findings.push(Finding::error(format!(
            "Found {} external-secrets HelmReleases (should be exactly 1)",
            external_secrets_releases
        )));
    } else if external_secrets_releases == 0 {
        analysis
            .findings
            .push(Finding::warning("No external-secrets HelmRelease found"));
    }

    analysis
}
