//! Command handlers for the fluxlint CLI.

pub mod build;
pub mod deps;
pub mod flux;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;

/// Expand `~` in a user-supplied root directory argument.
pub fn resolve_root(root: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(root).to_string())
}

/// Check if quiet mode is enabled via --quiet or environment variable.
pub fn is_quiet() -> bool {
    std::env::var("FLUXLINT_QUIET")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Run every validation in order, reporting all failures before exiting.
pub fn run_all(root: &Path, verbose: bool, jobs: usize) -> Result<i32> {
    let codes = [
        deps::run(root, None, OutputFormat::Human)?,
        build::run(root, verbose, OutputFormat::Human, jobs)?,
        flux::run(root)?,
    ];

    Ok(codes.into_iter().max().unwrap_or(0))
}
