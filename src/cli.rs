//! CLI argument definitions for fluxlint.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use fluxlint::paths;

#[derive(Parser)]
#[command(name = "fluxlint")]
#[command(version)]
#[command(about = "Preflight validation for Flux GitOps repositories", long_about = None)]
#[command(
    after_help = "TYPICAL USE:\n    fluxlint all                Run every check before pushing\n    fluxlint deps               Only validate dependency ordering\n    fluxlint build --verbose    Show each kustomization as it builds"
)]
pub struct Cli {
    /// Suppress all non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate kustomization dependency ordering
    ///
    /// Detects circular dependencies, checks the ordering rule table, and
    /// verifies that kustomizations using ExternalSecret resources depend on
    /// the secrets prerequisite.
    Deps {
        /// Root directory to search for kustomizations
        #[arg(long, default_value = paths::DEFAULT_ROOT)]
        root: String,
        /// Load ordering rules from a YAML file instead of the built-in table
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,
        /// Output format (human or json for Terraform)
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// Run `kustomize build` across all kustomization directories
    Build {
        /// Root directory to search for kustomizations
        #[arg(long, default_value = paths::DEFAULT_ROOT)]
        root: String,
        /// Show successful validations
        #[arg(short, long)]
        verbose: bool,
        /// Output format (human or json for Terraform)
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
        /// Maximum concurrent kustomize processes
        #[arg(long, default_value_t = 8)]
        jobs: usize,
    },
    /// Run `flux build --dry-run` and analyze the rendered manifests
    Flux {
        /// Root directory of the Flux tree
        #[arg(long, default_value = paths::DEFAULT_ROOT)]
        root: String,
    },
    /// Run dependency, build, and flux validation in order
    All {
        /// Root directory to search for kustomizations
        #[arg(long, default_value = paths::DEFAULT_ROOT)]
        root: String,
        /// Show successful validations
        #[arg(short, long)]
        verbose: bool,
        /// Maximum concurrent kustomize processes
        #[arg(long, default_value_t = 8)]
        jobs: usize,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show version and build information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}
