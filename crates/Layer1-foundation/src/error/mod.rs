//! Error types for Zeyon
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Zeyon 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // Emitter 관련
    // ========================================================================
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Emitter already destroyed")]
    Destroyed,

    // ========================================================================
    // Registry 관련
    // ========================================================================
    #[error("Duplicate registration: '{id}' is already registered")]
    DuplicateRegistration { id: String },

    #[error("Class not registered: {0}")]
    NotRegistered(String),

    #[error("Failed to load '{id}' from {path}: {message}")]
    Load {
        id: String,
        path: String,
        message: String,
    },

    #[error("Failed to construct '{id}': {message}")]
    Construct { id: String, message: String },

    // ========================================================================
    // Router 관련
    // ========================================================================
    #[error("Route error: {0}")]
    Route(String),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 등록되지 않은 id 조회 실패인지 확인
    pub fn is_resolution_miss(&self) -> bool {
        matches!(self, Error::NotRegistered(_))
    }

    /// 중복 등록 에러 생성 헬퍼
    pub fn duplicate(id: impl Into<String>) -> Self {
        Error::DuplicateRegistration { id: id.into() }
    }

    /// 로드 에러 생성 헬퍼
    pub fn load(id: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Load {
            id: id.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// 생성 에러 생성 헬퍼
    pub fn construct(id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Construct {
            id: id.into(),
            message: message.into(),
        }
    }
}
