//! Storage module for Zeyon
//!
//! - `file`: JSON 파일 읽기 / 원자적 쓰기 (설정, 매니페스트 공용)
//! - `dir`: `.zeyon/` 설정 디렉토리

mod dir;
mod file;

pub use dir::{ZeyonDir, GLOBAL_DIR, PROJECT_DIR};
pub use file::{read_json, write_json_atomic};
