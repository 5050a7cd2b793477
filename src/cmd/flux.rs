//! `fluxlint flux` - whole-tree flux build validation.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use fluxlint::flux_build::{self, Severity};

use super::is_quiet;

pub fn run(root: &Path) -> Result<i32> {
    if !is_quiet() {
        println!("Running flux build validation...");
    }

    let rendered = match flux_build::run_build(root) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("{} flux build failed: {:#}", "✗".red(), e);
            return Ok(1);
        }
    };

    let analysis = flux_build::analyze_manifests(&rendered);

    if analysis.total_resources() > 0 && !is_quiet() {
        println!(
            "Flux build generated {} resources across {} namespaces",
            analysis.total_resources(),
            analysis.namespaces.len()
        );
        for (kind, count) in analysis.top_resource_kinds(5) {
            println!("   {}: {}", kind, count);
        }
    }

    if !analysis.findings.is_empty() {
        println!();
        println!("Validation findings:");
        for finding in &analysis.findings {
            let icon = match finding.severity {
                Severity::Warning => "⚠".yellow(),
                Severity::Error => "✗".red(),
            };
            println!("{} {}", icon, finding.message);
        }

        if analysis.has_errors() {
            return Ok(1);
        }
    }

    println!("{} Flux build validation passed!", "✓".green());
    Ok(0)
}
