//! `fluxlint build` - parallel kustomize build validation.
//!
//! Fans the discovered kustomization directories out over a bounded worker
//! pool and collects per-directory outcomes, quiet on success unless
//! `--verbose`.

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use fluxlint::kustomize::{self, BuildErrorSummary, BuildFailure, BuildOutcome, BuildSummary};

use super::is_quiet;
use crate::cli::OutputFormat;

pub fn run(root: &Path, verbose: bool, format: OutputFormat, jobs: usize) -> Result<i32> {
    let dirs = kustomize::find_kustomization_dirs(root)?;

    if dirs.is_empty() {
        println!("No kustomizations found in {}", root.display());
        return Ok(0);
    }

    let show_progress = format == OutputFormat::Human && !is_quiet();
    let outcomes = run_builds(dirs, jobs.max(1), show_progress);

    let (successful, failed): (Vec<BuildOutcome>, Vec<BuildOutcome>) =
        outcomes.into_iter().partition(|outcome| outcome.success);

    match format {
        OutputFormat::Json => {
            if failed.is_empty() {
                let summary = BuildSummary {
                    status: "passed".to_string(),
                    validated_count: successful.len(),
                };
                println!("{}", serde_json::to_string(&summary)?);
                Ok(0)
            } else {
                let summary = BuildErrorSummary {
                    error: format!("Failed to validate {} kustomizations", failed.len()),
                    details: failed
                        .iter()
                        .map(|outcome| BuildFailure {
                            path: outcome.dir.display().to_string(),
                            error: outcome.error.clone(),
                        })
                        .collect(),
                };
                eprintln!("{}", serde_json::to_string(&summary)?);
                Ok(1)
            }
        }
        OutputFormat::Human => {
            if verbose && !successful.is_empty() {
                println!(
                    "{} Successfully validated {} kustomizations:",
                    "✓".green(),
                    successful.len()
                );
                for outcome in &successful {
                    println!("  {}", outcome.dir.display());
                }
            }

            if !failed.is_empty() {
                println!(
                    "{} Failed to validate {} kustomizations:",
                    "✗".red(),
                    failed.len()
                );
                for outcome in &failed {
                    println!("  {}:", outcome.dir.display());
                    println!("    {}", outcome.error);
                }
                return Ok(1);
            }

            if !verbose {
                println!(
                    "{} All {} kustomizations valid",
                    "✓".green(),
                    successful.len()
                );
            }
            Ok(0)
        }
    }
}

/// Run `kustomize build` for each directory on `jobs` worker threads.
fn run_builds(dirs: Vec<PathBuf>, jobs: usize, show_progress: bool) -> Vec<BuildOutcome> {
    let total = dirs.len();
    let queue = Arc::new(Mutex::new(VecDeque::from(dirs)));
    let (tx, rx) = mpsc::channel::<BuildOutcome>();

    let mut handles = Vec::new();
    for _ in 0..jobs.min(total) {
        let queue = Arc::clone(&queue);
        let tx = tx.clone();
        handles.push(thread::spawn(move || loop {
            let dir = match queue.lock() {
                Ok(mut queue) => queue.pop_front(),
                Err(_) => None,
            };
            let dir = match dir {
                Some(dir) => dir,
                None => break,
            };
            if tx.send(kustomize::build_directory(&dir)).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let progress = if show_progress {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut outcomes = Vec::with_capacity(total);
    for outcome in rx {
        if let Some(pb) = &progress {
            pb.set_message(outcome.dir.display().to_string());
            pb.inc(1);
        }
        outcomes.push(outcome);
    }

    for handle in handles {
        let _ = handle.join();
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    outcomes.sort_by(|a, b| a.dir.cmp(&b.dir));
    outcomes
}
