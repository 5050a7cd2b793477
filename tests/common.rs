//! Common test helpers for integration tests

use std::fs;
use std::path::Path;

/// Write a flux-kustomization.yaml declaring `name` with the given
/// dependencies under `root/<name>/`.
pub fn write_flux_kustomization(root: &Path, name: &str, deps: &[&str]) {
    let mut content = format!(
        "apiVersion: kustomize.toolkit.fluxcd.io/v1\nkind: Kustomization\nmetadata:\n  name: {}\n  namespace: flux-system\nspec:\n  path: ./k8s/{}\n",
        name, name
    );
    if !deps.is_empty() {
        content.push_str("  dependsOn:\n");
        for dep in deps {
            content.push_str(&format!("    - name: {}\n", dep));
        }
    }

    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("flux-kustomization.yaml"), content).unwrap();
}

/// Write an arbitrary manifest file at `root/<relative>`.
pub fn write_manifest(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A minimal ExternalSecret document.
pub fn external_secret(name: &str) -> String {
    format!(
        "apiVersion: external-secrets.io/v1beta1\nkind: ExternalSecret\nmetadata:\n  name: {}\nspec:\n  secretStoreRef:\n    name: vault-backend\n    kind: ClusterSecretStore\n",
        name
    )
}
