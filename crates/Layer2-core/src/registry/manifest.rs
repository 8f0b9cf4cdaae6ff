//! Registry Manifest - 빌드 시 생성되는 레지스트리 초기 데이터
//!
//! 스캐너가 `RegistryManifest`를 JSON으로 기록하고, 애플리케이션은 시작 시
//! 이를 읽어 `RegistryBuilder`에 채웁니다. 정적 모드에서는 `class` 이름을
//! `ClassCatalog`로 생성자에 연결하고, 동적 모드에서는 `path`를 로더에 연결합니다.

use super::entry::ClassKind;
use super::traits::{Constructor, Options};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use zeyon_foundation::{read_json, write_json_atomic, Error, RegistryMode, Result};

/// 현재 매니페스트 포맷 버전
pub const MANIFEST_VERSION: u32 = 1;

// ============================================================================
// ManifestEntry
// ============================================================================

/// 매니페스트의 한 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// 등록 id
    pub id: String,

    /// 클래스 종류
    pub kind: ClassKind,

    /// 클래스(타입) 이름
    pub class: String,

    /// 동적 모드 로드 경로
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// 기본 옵션
    #[serde(default)]
    pub meta: Options,

    /// 선언된 소스 파일
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ManifestEntry {
    pub fn new(id: impl Into<String>, kind: ClassKind, class: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            class: class.into(),
            path: None,
            meta: Options::new(),
            source: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_meta(mut self, meta: Options) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// 동적 로드 경로 (명시 경로가 없으면 `<kind>/<id>`)
    pub fn load_path(&self) -> String {
        self.path
            .clone()
            .unwrap_or_else(|| format!("{}/{}", self.kind, self.id))
    }
}

// ============================================================================
// RegistryManifest
// ============================================================================

/// 생성된 레지스트리 데이터
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryManifest {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub mode: RegistryMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub entries: Vec<ManifestEntry>,
}

impl RegistryManifest {
    pub fn new(mode: RegistryMode) -> Self {
        Self {
            version: MANIFEST_VERSION,
            mode,
            generated_at: Some(Utc::now()),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 파일에서 로드
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        read_json(path)?
            .ok_or_else(|| Error::NotFound(format!("manifest {}", path.display())))
    }

    /// 파일로 저장 (상위 디렉토리 생성, 원자적 교체)
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json_atomic(path, self)
    }

    /// 등록 전에 포맷 버전과 id 중복 확인
    pub fn validate(&self) -> Result<()> {
        if self.version > MANIFEST_VERSION {
            return Err(Error::Validation(format!(
                "manifest version {} is newer than supported version {}",
                self.version, MANIFEST_VERSION
            )));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.id.as_str()) {
                return Err(Error::Validation(format!(
                    "manifest lists '{}' more than once",
                    entry.id
                )));
            }
        }
        Ok(())
    }
}

impl Default for RegistryManifest {
    fn default() -> Self {
        Self::new(RegistryMode::default())
    }
}

fn default_version() -> u32 {
    MANIFEST_VERSION
}

// ============================================================================
// ClassCatalog
// ============================================================================

/// 정적 모드에서 클래스 이름 → 생성자
///
/// 번들에 포함된 타입 목록으로, 애플리케이션이 시작 시 채웁니다.
#[derive(Default, Clone)]
pub struct ClassCatalog {
    classes: HashMap<String, Constructor>,
}

impl ClassCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: impl Into<String>, ctor: Constructor) {
        self.classes.insert(class.into(), ctor);
    }

    pub fn with(mut self, class: impl Into<String>, ctor: Constructor) -> Self {
        self.insert(class, ctor);
        self
    }

    pub fn get(&self, class: &str) -> Option<Constructor> {
        self.classes.get(class).cloned()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_manifest_parse() {
        let manifest: RegistryManifest = serde_json::from_value(json!({
            "mode": "dynamic",
            "entries": [
                { "id": "home", "kind": "route_view", "class": "HomeView", "meta": { "title": "Home" } },
                { "id": "user", "kind": "model", "class": "User", "path": "models/user" }
            ]
        }))
        .unwrap();

        assert_eq!(manifest.version, MANIFEST_VERSION);
        assert_eq!(manifest.mode, RegistryMode::Dynamic);
        assert_eq!(manifest.len(), 2);

        let home = manifest.get("home").unwrap();
        assert_eq!(home.kind, ClassKind::RouteView);
        assert_eq!(home.load_path(), "route_view/home");
        assert_eq!(home.meta.get("title"), Some(&json!("Home")));

        assert_eq!(manifest.get("user").unwrap().load_path(), "models/user");
    }

    #[test]
    fn test_manifest_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("registry.json");

        let mut manifest = RegistryManifest::new(RegistryMode::Static);
        manifest.push(ManifestEntry::new("list", ClassKind::Collection, "UserList").with_source("src/users.rs"));
        manifest.save(&path).unwrap();

        let loaded = RegistryManifest::load(&path).unwrap();
        assert_eq!(loaded.entries, manifest.entries);
        assert!(loaded.generated_at.is_some());
    }

    #[test]
    fn test_manifest_load_missing_file() {
        let result = RegistryManifest::load("/nonexistent/registry.json");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_manifest_validate() {
        let mut manifest = RegistryManifest::new(RegistryMode::Static);
        manifest.push(ManifestEntry::new("user", ClassKind::Model, "User"));
        assert!(manifest.validate().is_ok());

        manifest.push(ManifestEntry::new("user", ClassKind::Model, "Account"));
        assert!(matches!(manifest.validate(), Err(Error::Validation(_))));

        let mut future = RegistryManifest::new(RegistryMode::Static);
        future.version = MANIFEST_VERSION + 1;
        assert!(matches!(future.validate(), Err(Error::Validation(_))));
    }
}
