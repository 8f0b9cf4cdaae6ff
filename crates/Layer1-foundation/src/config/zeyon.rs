//! Zeyon Config - 프로젝트 설정
//!
//! 스캐너, Emitter, Router가 공유하는 ZeyonConfig

use crate::storage::ZeyonDir;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 설정 파일명
pub const ZEYON_CONFIG_FILE: &str = "zeyon.json";

/// 기본 debounce 대기 시간 (ms)
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

// ============================================================================
// Registry Mode
// ============================================================================

/// 클래스 레지스트리 배포 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryMode {
    /// 모든 클래스가 번들에 포함됨 (동기 resolve)
    #[default]
    Static,
    /// 로드 경로만 보관 (비동기 resolve)
    Dynamic,
}

impl RegistryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Dynamic => "dynamic",
        }
    }
}

impl std::fmt::Display for RegistryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Zeyon Config
// ============================================================================

/// Zeyon 프로젝트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeyonConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 스캔 대상 소스 디렉토리
    #[serde(default = "default_source_dirs")]
    pub source_dirs: Vec<String>,

    /// 스캔 대상 확장자
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// 매니페스트 출력 경로 (프로젝트 루트 기준)
    #[serde(default = "default_output")]
    pub output: String,

    /// 레지스트리 모드
    #[serde(default)]
    pub mode: RegistryMode,

    /// Emitter 설정
    #[serde(default)]
    pub emitter: EmitterConfig,

    /// Router 설정
    #[serde(default)]
    pub router: RouterConfig,
}

impl Default for ZeyonConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            source_dirs: default_source_dirs(),
            extensions: default_extensions(),
            output: default_output(),
            mode: RegistryMode::default(),
            emitter: EmitterConfig::default(),
            router: RouterConfig::default(),
        }
    }
}

impl ZeyonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    ///
    /// 각 파일은 `ConfigLayer`로 읽어 실제로 적힌 필드만 덮어씁니다.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = ZeyonDir::global() {
            if let Some(layer) = global.read_config::<ConfigLayer>()? {
                config.merge(layer);
            }
        }

        // 2. 프로젝트 설정
        if let Some(layer) = ZeyonDir::project(root).read_config::<ConfigLayer>()? {
            config.merge(layer);
        }

        Ok(config)
    }

    /// 프로젝트 설정만 로드 (없으면 기본값)
    pub fn load_project(root: impl AsRef<Path>) -> Result<Self> {
        Ok(ZeyonDir::project(root)
            .read_config::<Self>()?
            .unwrap_or_default())
    }

    /// 프로젝트 설정 저장
    pub fn save_project(&self, root: impl AsRef<Path>) -> Result<()> {
        ZeyonDir::project(root).write_config(self)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 레이어 병합 (레이어에 있는 값이 우선)
    pub fn merge(&mut self, layer: ConfigLayer) {
        if let Some(version) = layer.version {
            self.version = self.version.max(version);
        }
        if let Some(source_dirs) = layer.source_dirs {
            self.source_dirs = source_dirs;
        }
        if let Some(extensions) = layer.extensions {
            self.extensions = extensions;
        }
        if let Some(output) = layer.output {
            self.output = output;
        }
        if let Some(mode) = layer.mode {
            self.mode = mode;
        }
        if let Some(debounce_ms) = layer.emitter.and_then(|e| e.debounce_ms) {
            self.emitter.debounce_ms = debounce_ms;
        }
        if let Some(base_path) = layer.router.and_then(|r| r.base_path) {
            self.router.base_path = base_path;
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn mode(mut self, mode: RegistryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    pub fn source_dir(mut self, dir: impl Into<String>) -> Self {
        self.source_dirs.push(dir.into());
        self
    }
}

// ============================================================================
// Config Layer
// ============================================================================

/// 병합용 설정 파일 내용
///
/// 파일에 적힌 필드만 `Some`이 되므로, 기본값과 같은 값도 명시하면 덮어씁니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigLayer {
    pub version: Option<u32>,
    pub source_dirs: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
    pub output: Option<String>,
    pub mode: Option<RegistryMode>,
    pub emitter: Option<EmitterLayer>,
    pub router: Option<RouterLayer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmitterLayer {
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouterLayer {
    pub base_path: Option<String>,
}

impl From<ZeyonConfig> for ConfigLayer {
    fn from(config: ZeyonConfig) -> Self {
        Self {
            version: Some(config.version),
            source_dirs: Some(config.source_dirs),
            extensions: Some(config.extensions),
            output: Some(config.output),
            mode: Some(config.mode),
            emitter: Some(EmitterLayer {
                debounce_ms: Some(config.emitter.debounce_ms),
            }),
            router: Some(RouterLayer {
                base_path: Some(config.router.base_path),
            }),
        }
    }
}

// ============================================================================
// Emitter Config
// ============================================================================

/// Emitter 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitterConfig {
    /// debounce 대기 시간 (ms)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl EmitterConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// ============================================================================
// Router Config
// ============================================================================

/// Router 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    /// 모든 라우트 앞에 붙는 기본 경로
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_version() -> u32 {
    1
}

fn default_source_dirs() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_extensions() -> Vec<String> {
    vec!["rs".to_string()]
}

fn default_output() -> String {
    ".zeyon/registry.json".to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_base_path() -> String {
    "/".to_string()
}
