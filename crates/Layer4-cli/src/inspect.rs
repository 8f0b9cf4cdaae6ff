//! Zeyon inspect command

use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use zeyon_core::{ClassKind, RegistryManifest};
use zeyon_foundation::ZeyonConfig;

/// Print a manifest, returning the number of entries per kind
pub fn run_inspect(
    root: &Path,
    manifest: Option<PathBuf>,
) -> anyhow::Result<BTreeMap<String, usize>> {
    let path = match manifest {
        Some(path) => path,
        None => {
            let config = ZeyonConfig::load(root).context("Failed to load zeyon.json")?;
            root.join(config.output)
        }
    };
    let manifest = RegistryManifest::load(&path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;

    if manifest.is_empty() {
        println!("No registered classes in {}.", path.display());
        return Ok(BTreeMap::new());
    }

    println!("\nRegistry ({} mode, {} entries)\n", manifest.mode, manifest.len());
    println!("{:<24} {:<16} {:<24} {}", "ID", "Kind", "Class", "Location");
    println!("{}", "-".repeat(88));

    for entry in &manifest.entries {
        let location = entry
            .path
            .as_deref()
            .or(entry.source.as_deref())
            .unwrap_or("-");
        println!(
            "{:<24} {:<16} {:<24} {}",
            truncate(&entry.id, 23),
            entry.kind,
            truncate(&entry.class, 23),
            location
        );
    }

    let counts = count_by_kind(&manifest);
    let summary = counts
        .iter()
        .map(|(kind, n)| format!("{} {}", n, kind))
        .collect::<Vec<_>>()
        .join(", ");
    println!("\n{}\n", summary);

    Ok(counts)
}

fn count_by_kind(manifest: &RegistryManifest) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for kind in ClassKind::ALL {
        let n = manifest.entries.iter().filter(|e| e.kind == kind).count();
        if n > 0 {
            counts.insert(kind.to_string(), n);
        }
    }
    counts
}

/// Truncate a string for display
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
