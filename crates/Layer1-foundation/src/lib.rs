//! # zeyon-foundation
//!
//! Foundation layer for Zeyon:
//! - Error: 공통 에러 타입
//! - Config: 프로젝트 설정 (ZeyonConfig)
//! - Storage: ZeyonDir, JSON 원자적 쓰기 (설정/매니페스트 파일)
//! - Event: Emitter (검증된 발행/구독, debounce, 네이티브 이벤트)
//! - Strings: 이벤트 이름 상수, 케이스 변환
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  zeyon-core: ClassRegistry, Model, Collection, View,    │
//! │              Router                                     │
//! │                     │                                   │
//! │                     ▼                                   │
//! │          Emitter (모든 컴포넌트가 내장)                   │
//! │                     │                                   │
//! │          ┌─────────┴─────────┐                         │
//! │          ▼                   ▼                         │
//! │   Dispatch table       NativeTarget                    │
//! │   (on/once/emit)       (HeadlessElement)               │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod storage;
pub mod strings;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    ConfigLayer, EmitterConfig, EmitterLayer, RegistryMode, RouterConfig, RouterLayer, ZeyonConfig,
    DEFAULT_DEBOUNCE_MS, ZEYON_CONFIG_FILE,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{read_json, write_json_atomic, ZeyonDir, GLOBAL_DIR, PROJECT_DIR};

// ============================================================================
// Event (이벤트 시스템)
// ============================================================================
pub use event::{
    handler, is_native_event, Emitter, EmitterBuilder, EmitterEvent, EventId, Handler,
    HeadlessElement, ListenerHandle, ListenerId, NativeTarget, OffFilter, SubscriberId,
    BUILTIN_EVENTS, NATIVE_EVENTS,
};

// ============================================================================
// Strings
// ============================================================================
pub use strings::{to_camel_case, to_kebab_case, to_pascal_case, to_snake_case};
