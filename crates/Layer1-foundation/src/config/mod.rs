//! Config - 통합 설정 관리
//!
//! - `zeyon.rs` - ZeyonConfig 프로젝트 설정 (스캐너, Emitter, Router)

mod zeyon;

pub use zeyon::{
    ConfigLayer, EmitterConfig, EmitterLayer, RegistryMode, RouterConfig, RouterLayer, ZeyonConfig,
    DEFAULT_DEBOUNCE_MS, ZEYON_CONFIG_FILE,
};
