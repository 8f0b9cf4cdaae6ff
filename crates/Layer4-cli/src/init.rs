//! Zeyon init command
//!
//! Initializes a project with `.zeyon/zeyon.json`.

use std::path::Path;
use zeyon_foundation::{ZeyonConfig, ZeyonDir, ZEYON_CONFIG_FILE};

/// Result of `zeyon init`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    AlreadyInitialized,
    Reinitialized,
}

/// Initialize Zeyon configuration under `root`
pub fn init_project(root: &Path, force: bool) -> anyhow::Result<InitOutcome> {
    let exists = ZeyonDir::project(root).has_config();

    // Check if already initialized
    if exists && !force {
        println!("✓ Zeyon already initialized in this directory.");
        println!("  Use --force to reinitialize.");
        return Ok(InitOutcome::AlreadyInitialized);
    }

    println!("Initializing Zeyon...");

    let config = ZeyonConfig::default();
    config.save_project(root)?;
    println!("  Created .zeyon/{}", ZEYON_CONFIG_FILE);

    println!("\n✓ Zeyon initialized successfully!");
    println!("\nNext steps:");
    println!("  1. Mark classes with #[zeyon(id = \"...\", kind = \"...\")]");
    println!("  2. Adjust sourceDirs and mode in .zeyon/{}", ZEYON_CONFIG_FILE);
    println!("  3. Run 'zeyon scan' to generate {}", config.output);

    Ok(if exists {
        InitOutcome::Reinitialized
    } else {
        InitOutcome::Created
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use zeyon_foundation::RegistryMode;

    #[test]
    fn test_init_creates_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(init_project(dir.path(), false).unwrap(), InitOutcome::Created);

        let config = ZeyonConfig::load_project(dir.path()).unwrap();
        assert_eq!(config.source_dirs, vec!["src".to_string()]);
        assert!(dir.path().join(".zeyon").join(ZEYON_CONFIG_FILE).exists());
    }

    #[test]
    fn test_init_idempotent_and_force() {
        let dir = TempDir::new().unwrap();
        init_project(dir.path(), false).unwrap();

        // 사용자 수정은 --force 없이는 유지
        ZeyonConfig::default()
            .mode(RegistryMode::Dynamic)
            .save_project(dir.path())
            .unwrap();
        assert_eq!(
            init_project(dir.path(), false).unwrap(),
            InitOutcome::AlreadyInitialized
        );
        assert_eq!(ZeyonConfig::load_project(dir.path()).unwrap().mode, RegistryMode::Dynamic);

        assert_eq!(init_project(dir.path(), true).unwrap(), InitOutcome::Reinitialized);
        assert_eq!(ZeyonConfig::load_project(dir.path()).unwrap().mode, RegistryMode::Static);
    }
}
