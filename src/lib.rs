//! # fluxlint - Preflight validation for Flux GitOps repositories
//!
//! fluxlint checks that a Flux-managed repository is safe to reconcile
//! before anything reaches a cluster: the declared `dependsOn` ordering
//! between kustomizations must be acyclic and honor the platform's ordering
//! rules, every kustomization must build, and the fully rendered tree must
//! look like a sane GitOps deployment.
//!
//! ## Modules
//!
//! - [`kustomization`] - Flux Kustomization manifest types and parsing
//! - [`discovery`] - manifest discovery and ExternalSecret scanning
//! - [`graph`] - dependency graph, cycle detection, reachability
//! - [`rules`] - ordering rule table and rule evaluation
//! - [`validate`] - validation entry points
//! - [`report`] - aggregated validation results
//! - [`kustomize`] - per-directory `kustomize build` wrapper
//! - [`flux_build`] - whole-tree `flux build` wrapper and manifest analysis
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use fluxlint::{discovery, rules, validate};
//!
//! let registry = discovery::load_kustomizations(Path::new("k8s"))
//!     .expect("Failed to load kustomizations");
//! let report = validate::validate(&registry, &rules::default_rules());
//!
//! if !report.pass() {
//!     report.print();
//! }
//! ```

pub mod discovery;
pub mod flux_build;
pub mod graph;
pub mod kustomization;
pub mod kustomize;
pub mod report;
pub mod rules;
pub mod validate;

/// Well-known file and directory names in a Flux repository layout.
pub mod paths {
    /// Default root directory searched for manifests: `k8s`
    pub const DEFAULT_ROOT: &str = "k8s";
    /// File declaring a Flux Kustomization: `flux-kustomization.yaml`
    pub const FLUX_KUSTOMIZATION_FILE: &str = "flux-kustomization.yaml";
    /// File declaring a kustomize overlay: `kustomization.yaml`
    pub const KUSTOMIZATION_FILE: &str = "kustomization.yaml";
    /// Directory holding the Flux bootstrap machinery: `flux-system`
    pub const FLUX_SYSTEM_DIR: &str = "flux-system";
}
