//! `fluxlint deps` - dependency ordering validation.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use fluxlint::{discovery, rules, validate};

use super::is_quiet;
use crate::cli::OutputFormat;

pub fn run(root: &Path, rules_file: Option<&Path>, format: OutputFormat) -> Result<i32> {
    let rules = match rules_file {
        Some(path) => rules::load_rules(path)?,
        None => rules::default_rules(),
    };

    if !is_quiet() && format == OutputFormat::Human {
        println!("Validating GitOps dependencies...");
    }

    let registry = discovery::load_kustomizations(root)?;

    if registry.is_empty() {
        match format {
            OutputFormat::Json => {
                let payload = serde_json::json!({
                    "error": format!("No Flux kustomizations found in {}", root.display()),
                });
                eprintln!("{}", payload);
            }
            OutputFormat::Human => {
                println!(
                    "{} No Flux kustomizations found in {}",
                    "✗".red(),
                    root.display()
                );
            }
        }
        return Ok(1);
    }

    if !is_quiet() && format == OutputFormat::Human {
        println!("Found {} kustomizations", registry.len());
    }

    let consumers = discovery::scan_external_secret_consumers(root)?;
    let report = validate::validate_with_secret_consumers(&registry, &rules, &consumers);

    match format {
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "status": if report.pass() { "passed" } else { "failed" },
                "validated_at": chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                "kustomizations": registry.len(),
                "cycles": report.cycles,
                "violations": report.violations,
            });
            if report.pass() {
                println!("{}", payload);
            } else {
                eprintln!("{}", payload);
            }
        }
        OutputFormat::Human => {
            if report.pass() {
                println!("{} All dependency validations passed!", "✓".green());
            } else {
                report.print();
            }
        }
    }

    Ok(report.exit_code())
}
