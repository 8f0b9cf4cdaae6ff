//! Registry scanner
//!
//! Walks the configured source directories, finds `#[zeyon(...)]` markers in
//! front of struct declarations and produces a `RegistryManifest`.
//!
//! ```text
//! #[zeyon(id = "user-card", kind = "view", meta = r#"{"tag": "article"}"#)]
//! pub struct UserCard { ... }
//! ```

use anyhow::Context;
use ignore::WalkBuilder;
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zeyon_core::{ClassKind, ManifestEntry, Options, RegistryManifest};
use zeyon_foundation::{to_kebab_case, RegistryMode, ZeyonConfig};

/// A marker found in a source file
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub id: Option<String>,
    pub kind: Option<String>,
    pub meta: Option<String>,
    pub path: Option<String>,
    pub class: String,
}

/// Scan result
#[derive(Debug)]
pub struct ScanReport {
    pub manifest: RegistryManifest,
    pub files_scanned: usize,
    /// Earlier declarations replaced by a later one with the same id
    pub duplicates: usize,
    /// Declarations dropped because of an unknown kind
    pub skipped: usize,
}

pub struct Scanner {
    root: PathBuf,
    source_dirs: Vec<String>,
    extensions: Vec<String>,
    mode: RegistryMode,
    marker: Regex,
    argument: Regex,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>, config: &ZeyonConfig) -> anyhow::Result<Self> {
        // marker, then optional attributes/comments/visibility, then the struct name.
        // args only hold string literals and punctuation other than parens, so a
        // `)]` inside a string is not the end and a match never runs into the next marker
        let marker = Regex::new(
            r##"#\[zeyon\((?P<args>(?:r#"(?:[^"]|"[^#])*"#|"(?:[^"\\]|\\.)*"|[^"()\]])*)\)\]\s*(?:(?:#\[[^\n]*\]|//[^\n]*)\s*)*(?:pub(?:\([^)]*\))?\s+)?struct\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)"##,
        )?;
        let argument = Regex::new(
            r##"(?s)(?P<key>[A-Za-z_]+)\s*=\s*(?:r#"(?P<raw>.*?)"#|"(?P<str>(?:[^"\\]|\\.)*)")"##,
        )?;

        Ok(Self {
            root: root.into(),
            source_dirs: config.source_dirs.clone(),
            extensions: config.extensions.clone(),
            mode: config.mode,
            marker,
            argument,
        })
    }

    pub fn mode(mut self, mode: RegistryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Scan all source files and build the manifest
    pub fn scan(&self) -> anyhow::Result<ScanReport> {
        let files = self.collect_files();
        let mut manifest = RegistryManifest::new(self.mode);
        let mut duplicates = 0;
        let mut skipped = 0;

        for file in &files {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let source = self.relative(file);

            for declaration in self.parse_source(&content) {
                let Some(entry) = self.to_entry(declaration, &source) else {
                    skipped += 1;
                    continue;
                };

                if let Some(pos) = manifest.entries.iter().position(|e| e.id == entry.id) {
                    let earlier = manifest.entries.remove(pos);
                    warn!(
                        id = %entry.id,
                        earlier = earlier.source.as_deref().unwrap_or("?"),
                        later = %source,
                        "Duplicate registration id, keeping the later declaration"
                    );
                    duplicates += 1;
                }
                manifest.push(entry);
            }
        }

        info!(
            files = files.len(),
            entries = manifest.len(),
            duplicates,
            skipped,
            "Scan complete"
        );

        Ok(ScanReport {
            manifest,
            files_scanned: files.len(),
            duplicates,
            skipped,
        })
    }

    /// Source files in sorted path order
    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for dir in &self.source_dirs {
            let search_path = self.root.join(dir);
            if !search_path.exists() {
                debug!(path = %search_path.display(), "Source directory not found");
                continue;
            }

            let walker = WalkBuilder::new(&search_path)
                .hidden(false)
                .git_ignore(true)
                .git_global(false)
                .git_exclude(true)
                .build();

            for entry in walker {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable entry");
                        continue;
                    }
                };

                let path = entry.path();
                if path.is_file() && self.has_extension(path) {
                    files.push(path.to_path_buf());
                }
            }
        }

        files.sort();
        files.dedup();
        files
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.trim_start_matches('.') == ext))
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Find every marker in a source text
    pub fn parse_source(&self, content: &str) -> Vec<Declaration> {
        self.marker
            .captures_iter(content)
            .map(|caps| {
                let mut declaration = Declaration {
                    id: None,
                    kind: None,
                    meta: None,
                    path: None,
                    class: caps["name"].to_string(),
                };

                for arg in self.argument.captures_iter(&caps["args"]) {
                    let value = arg
                        .name("raw")
                        .or_else(|| arg.name("str"))
                        .map(|m| m.as_str().to_string());
                    match &arg["key"] {
                        "id" => declaration.id = value,
                        "kind" => declaration.kind = value,
                        "meta" => declaration.meta = value,
                        "path" => declaration.path = value,
                        other => debug!(key = other, class = %declaration.class, "Ignoring marker argument"),
                    }
                }
                declaration
            })
            .collect()
    }

    fn to_entry(&self, declaration: Declaration, source: &str) -> Option<ManifestEntry> {
        let kind = match declaration.kind.as_deref() {
            None => ClassKind::View,
            Some(name) => match ClassKind::parse(name) {
                Some(kind) => kind,
                None => {
                    warn!(class = %declaration.class, kind = name, source, "Unknown kind, skipping");
                    return None;
                }
            },
        };

        let class_slug = to_kebab_case(&declaration.class);
        let id = declaration.id.unwrap_or_else(|| class_slug.clone());
        let meta = declaration
            .meta
            .as_deref()
            .map(|raw| parse_meta(raw, &id, source))
            .unwrap_or_default();

        let mut entry = ManifestEntry::new(id, kind, declaration.class)
            .with_meta(meta)
            .with_source(source);

        if self.mode == RegistryMode::Dynamic {
            let path = declaration
                .path
                .unwrap_or_else(|| format!("{}/{}", kind, class_slug));
            entry = entry.with_path(path);
        }
        Some(entry)
    }
}

fn parse_meta(raw: &str, id: &str, source: &str) -> Options {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!(id, source, "Marker meta is not a JSON object, ignoring");
            Options::new()
        }
        Err(e) => {
            warn!(id, source, error = %e, "Invalid marker meta, ignoring");
            Options::new()
        }
    }
}

/// Scan `root` and write the manifest, returning the report
pub fn run_scan(
    root: &Path,
    output: Option<PathBuf>,
    mode: Option<RegistryMode>,
) -> anyhow::Result<ScanReport> {
    let config = ZeyonConfig::load(root).context("Failed to load zeyon.json")?;
    let mut scanner = Scanner::new(root, &config)?;
    if let Some(mode) = mode {
        scanner = scanner.mode(mode);
    }

    let report = scanner.scan()?;
    let output = output.unwrap_or_else(|| root.join(&config.output));
    report
        .manifest
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "✓ Registered {} classes from {} files ({} mode)",
        report.manifest.len(),
        report.files_scanned,
        report.manifest.mode
    );
    if report.duplicates > 0 {
        println!("  {} duplicate id(s) replaced by later declarations", report.duplicates);
    }
    if report.skipped > 0 {
        println!("  {} declaration(s) skipped", report.skipped);
    }
    println!("  Wrote {}", output.display());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        dir
    }

    fn scanner(root: &Path) -> Scanner {
        Scanner::new(root, &ZeyonConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_markers() {
        let dir = TempDir::new().unwrap();
        let source = r####"
#[zeyon(id = "user", kind = "model", meta = r#"{"defaults": {"role": "guest"}}"#)]
#[derive(Debug)]
/// A user
pub struct User;

#[zeyon(kind = "RouteView")]
pub(crate) struct HomePage {}

// not a marker: #[zeyon_other]
struct Plain;
"####;

        let declarations = scanner(dir.path()).parse_source(source);
        assert_eq!(declarations.len(), 2);

        assert_eq!(declarations[0].class, "User");
        assert_eq!(declarations[0].id.as_deref(), Some("user"));
        assert_eq!(declarations[0].kind.as_deref(), Some("model"));
        assert_eq!(
            declarations[0].meta.as_deref(),
            Some(r#"{"defaults": {"role": "guest"}}"#)
        );

        assert_eq!(declarations[1].class, "HomePage");
        assert_eq!(declarations[1].id, None);
    }

    #[test]
    fn test_marker_boundaries() {
        let dir = TempDir::new().unwrap();
        let source = r####"
#[zeyon(id = "tricky", meta = r#"{"label": "f(x)]"}"#)]
struct Tricky;

#[zeyon(id = "not-a-struct")]
enum Choice { A, B }

#[zeyon(id = "after")]
struct After;
"####;

        let declarations = scanner(dir.path()).parse_source(source);
        let ids: Vec<_> = declarations.iter().map(|d| d.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("tricky"), Some("after")]);

        assert_eq!(declarations[0].class, "Tricky");
        assert_eq!(declarations[0].meta.as_deref(), Some(r#"{"label": "f(x)]"}"#));
        assert_eq!(declarations[1].class, "After");
    }

    #[test]
    fn test_scan_builds_manifest() {
        let dir = project(&[
            (
                "src/models.rs",
                r#"#[zeyon(id = "user", kind = "model")] pub struct User;"#,
            ),
            (
                "src/views/home.rs",
                r#"#[zeyon(kind = "route_view")] pub struct HomePage;"#,
            ),
            ("src/readme.md", r#"#[zeyon(id = "ignored")] struct Ignored;"#),
        ]);

        let report = scanner(dir.path()).scan().unwrap();
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.manifest.mode, RegistryMode::Static);

        let user = report.manifest.get("user").unwrap();
        assert_eq!(user.kind, ClassKind::Model);
        assert_eq!(user.source.as_deref(), Some("src/models.rs"));
        assert_eq!(user.path, None);

        let home = report.manifest.get("home-page").unwrap();
        assert_eq!(home.kind, ClassKind::RouteView);
        assert_eq!(home.class, "HomePage");
    }

    #[test]
    fn test_duplicate_id_last_wins() {
        let dir = project(&[
            ("src/a.rs", r#"#[zeyon(id = "card")] struct FirstCard;"#),
            ("src/b.rs", r#"#[zeyon(id = "card")] struct SecondCard;"#),
        ]);

        let report = scanner(dir.path()).scan().unwrap();
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.manifest.len(), 1);
        assert_eq!(report.manifest.get("card").unwrap().class, "SecondCard");
    }

    #[test]
    fn test_default_and_unknown_kind() {
        let dir = project(&[(
            "src/lib.rs",
            r#"
#[zeyon(id = "plain")] struct Plain;
#[zeyon(id = "widget", kind = "widget")] struct Widget;
"#,
        )]);

        let report = scanner(dir.path()).scan().unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.manifest.get("plain").unwrap().kind, ClassKind::View);
        assert!(report.manifest.get("widget").is_none());
    }

    #[test]
    fn test_invalid_meta_keeps_entry() {
        let dir = project(&[(
            "src/lib.rs",
            r####"#[zeyon(id = "broken", meta = r#"{not json"#)] struct Broken;"####,
        )]);

        let report = scanner(dir.path()).scan().unwrap();
        let entry = report.manifest.get("broken").unwrap();
        assert!(entry.meta.is_empty());
    }

    #[test]
    fn test_dynamic_mode_paths() {
        let dir = project(&[(
            "src/lib.rs",
            r#"
#[zeyon(id = "list", kind = "collection_view")] struct UserListView;
#[zeyon(id = "user", kind = "model", path = "chunks/user")] struct User;
"#,
        )]);

        let report = scanner(dir.path())
            .mode(RegistryMode::Dynamic)
            .scan()
            .unwrap();
        assert_eq!(
            report.manifest.get("list").unwrap().path.as_deref(),
            Some("collection_view/user-list-view")
        );
        assert_eq!(
            report.manifest.get("user").unwrap().path.as_deref(),
            Some("chunks/user")
        );
    }

    #[test]
    fn test_run_scan_writes_manifest() {
        let dir = project(&[(
            "src/lib.rs",
            r####"#[zeyon(id = "user", kind = "model", meta = r#"{"defaults": {"n": 1}}"#)] struct User;"####,
        )]);

        let report = run_scan(dir.path(), None, None).unwrap();
        assert_eq!(report.manifest.len(), 1);

        let written = RegistryManifest::load(dir.path().join(".zeyon/registry.json")).unwrap();
        assert_eq!(
            Value::Object(written.get("user").unwrap().meta.clone()),
            json!({ "defaults": { "n": 1 } })
        );
    }
}
