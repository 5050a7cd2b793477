//! Manifest discovery for Flux repositories.
//!
//! Walks a repository root for `flux-kustomization.yaml` files to build the
//! registry, and scans the wider manifest set for ExternalSecret usage.
//! Discovery is best-effort: unreadable or malformed files produce a warning
//! on stderr and are skipped, never a hard failure.

use anyhow::{Context, Result};
use colored::Colorize;
use glob::glob;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::kustomization::{self, Registry};
use crate::paths;

/// API group prefix identifying external-secrets-operator resources.
pub const EXTERNAL_SECRETS_API_GROUP: &str = "external-secrets.io";

/// Load all Flux kustomizations under `root` into a registry.
///
/// Duplicate names resolve last-write-wins in glob order.
pub fn load_kustomizations(root: &Path) -> Result<Registry> {
    let mut registry = Registry::new();
    let pattern = root
        .join("**")
        .join(paths::FLUX_KUSTOMIZATION_FILE)
        .to_string_lossy()
        .into_owned();

    for entry in glob(&pattern).context("Invalid kustomization search pattern")? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                eprintln!("{} Failed to read {}: {}", "Warning:".yellow(), e.path().display(), e);
                continue;
            }
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!(
                    "{} Failed to read {}: {}",
                    "Warning:".yellow(),
                    path.display(),
                    e
                );
                continue;
            }
        };

        match kustomization::parse_kustomizations(&content) {
            Ok(found) => {
                for (name, spec) in found {
                    registry.insert(name, spec);
                }
            }
            Err(e) => {
                eprintln!(
                    "{} Failed to parse {}: {:#}",
                    "Warning:".yellow(),
                    path.display(),
                    e
                );
            }
        }
    }

    Ok(registry)
}

/// Scan all manifests under `root` for ExternalSecret resources and return
/// the names of the kustomization directories that declare them.
///
/// A manifest belongs to the unit named by its first path component below
/// `root`. Flux kustomization files are skipped (they declare the units, not
/// their content), and unparseable files are ignored.
pub fn scan_external_secret_consumers(root: &Path) -> Result<BTreeSet<String>> {
    let mut consumers = BTreeSet::new();
    let pattern = root.join("**").join("*.yaml").to_string_lossy().into_owned();

    for entry in glob(&pattern).context("Invalid manifest search pattern")? {
        let path = match entry {
            Ok(path) => path,
            Err(_) => continue,
        };

        let is_flux_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.contains("flux-kustomization"))
            .unwrap_or(false);
        if is_flux_file {
            continue;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => continue,
        };

        if !declares_external_secret(&content) {
            continue;
        }

        if let Some(unit) = unit_name_for(root, &path) {
            consumers.insert(unit);
        }
    }

    Ok(consumers)
}

/// Whether any document in the file is an ExternalSecret.
fn declares_external_secret(content: &str) -> bool {
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = match Value::deserialize(document) {
            Ok(value) => value,
            Err(_) => return false,
        };

        let kind = value.get("kind").and_then(Value::as_str);
        let api_version = value.get("apiVersion").and_then(Value::as_str);

        if kind == Some("ExternalSecret")
            && api_version
                .map(|v| v.starts_with(EXTERNAL_SECRETS_API_GROUP))
                .unwrap_or(false)
        {
            return true;
        }
    }

    false
}

fn unit_name_for(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    relative
        .components()
        .next()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
}
