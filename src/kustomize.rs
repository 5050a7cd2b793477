//! Wrapper around the `kustomize` CLI for per-directory build validation.

use anyhow::{Context, Result};
use glob::glob;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::paths;

/// Outcome of building a single kustomization directory.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub dir: PathBuf,
    pub success: bool,
    /// Trimmed stderr of the failed build, or the spawn error.
    pub error: String,
}

/// Machine-readable summary of a successful build run.
#[derive(Debug, Serialize)]
pub struct BuildSummary {
    pub status: String,
    pub validated_count: usize,
}

/// One failed directory in the machine-readable error summary.
#[derive(Debug, Serialize)]
pub struct BuildFailure {
    pub path: String,
    pub error: String,
}

/// Machine-readable summary of a failed build run.
#[derive(Debug, Serialize)]
pub struct BuildErrorSummary {
    pub error: String,
    pub details: Vec<BuildFailure>,
}

/// Find every kustomization directory under `root`, excluding the Flux
/// bootstrap machinery in `flux-system/`.
pub fn find_kustomization_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let pattern = root
        .join("**")
        .join(paths::KUSTOMIZATION_FILE)
        .to_string_lossy()
        .into_owned();

    let mut dirs = Vec::new();
    for entry in glob(&pattern).context("Invalid kustomization search pattern")? {
        let path = match entry {
            Ok(path) => path,
            Err(_) => continue,
        };

        if path
            .components()
            .any(|c| c.as_os_str() == paths::FLUX_SYSTEM_DIR)
        {
            continue;
        }

        if let Some(parent) = path.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// Run `kustomize build` for one directory.
///
/// A missing `kustomize` binary is a per-directory failure rather than a
/// hard error, so one report covers every directory.
pub fn build_directory(dir: &Path) -> BuildOutcome {
    let output = Command::new("kustomize").arg("build").arg(dir).output();

    match output {
        Ok(output) if output.status.success() => BuildOutcome {
            dir: dir.to_path_buf(),
            success: true,
            error: String::new(),
        },
        Ok(output) => BuildOutcome {
            dir: dir.to_path_buf(),
            success: false,
            error: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        },
        Err(e) => BuildOutcome {
            dir: dir.to_path_buf(),
            success: false,
            error: format!("failed to run kustomize: {}", e),
        },
    }
}
