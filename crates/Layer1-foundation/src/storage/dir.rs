//! Zeyon 설정 디렉토리
//!
//! 글로벌(`~/.config/zeyon/`)과 프로젝트(`<root>/.zeyon/`) 두 곳에
//! `zeyon.json`을 둡니다. 프로젝트 디렉토리에는 기본 매니페스트도 생성됩니다.

use super::file::{read_json, write_json_atomic};
use crate::config::ZEYON_CONFIG_FILE;
use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// 프로젝트 설정 디렉토리 이름
pub const PROJECT_DIR: &str = ".zeyon";

/// 글로벌 설정 디렉토리 이름 (`dirs::config_dir()` 아래)
pub const GLOBAL_DIR: &str = "zeyon";

/// `zeyon.json`을 담는 디렉토리
#[derive(Debug, Clone)]
pub struct ZeyonDir {
    path: PathBuf,
}

impl ZeyonDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 글로벌 설정 (~/.config/zeyon/)
    pub fn global() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Cannot find config directory".to_string()))?;
        Ok(Self::new(dir.join(GLOBAL_DIR)))
    }

    /// 프로젝트 설정 (<root>/.zeyon/)
    pub fn project(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(PROJECT_DIR))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config_path(&self) -> PathBuf {
        self.path.join(ZEYON_CONFIG_FILE)
    }

    pub fn has_config(&self) -> bool {
        self.config_path().is_file()
    }

    /// `zeyon.json` 읽기, 없으면 `None`
    pub fn read_config<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        read_json(self.config_path())
    }

    /// `zeyon.json` 쓰기
    pub fn write_config<T: Serialize>(&self, config: &T) -> Result<()> {
        write_json_atomic(self.config_path(), config)
    }
}
