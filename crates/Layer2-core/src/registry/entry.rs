//! Registry Entry - 레지스트리 항목 정의

use super::traits::{Constructor, ModuleLoader, Options};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;

// ============================================================================
// ClassKind - 클래스 종류
// ============================================================================

/// 등록된 클래스의 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Model,
    Collection,
    View,
    RouteView,
    CollectionView,
}

impl ClassKind {
    pub const ALL: [ClassKind; 5] = [
        ClassKind::Model,
        ClassKind::Collection,
        ClassKind::View,
        ClassKind::RouteView,
        ClassKind::CollectionView,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Collection => "collection",
            Self::View => "view",
            Self::RouteView => "route_view",
            Self::CollectionView => "collection_view",
        }
    }

    /// 문자열에서 파싱 (`RouteView`, `route_view`, `route-view` 모두 허용)
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = zeyon_foundation::to_snake_case(s);
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
    }

    /// View 계열인지
    pub fn is_view(&self) -> bool {
        matches!(self, Self::View | Self::RouteView | Self::CollectionView)
    }
}

impl std::fmt::Display for ClassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ClassSource - 정적/동적 소스
// ============================================================================

/// 항목이 생성자를 얻는 방법
#[derive(Clone)]
pub enum ClassSource {
    /// 번들에 포함된 직접 참조
    Static(Constructor),

    /// 로드 경로 + 로더
    Dynamic {
        path: String,
        loader: Arc<dyn ModuleLoader>,
    },
}

impl ClassSource {
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Static(_) => None,
            Self::Dynamic { path, .. } => Some(path),
        }
    }
}

impl std::fmt::Debug for ClassSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Static(<constructor>)"),
            Self::Dynamic { path, loader } => f
                .debug_struct("Dynamic")
                .field("path", path)
                .field("loader", &loader.name())
                .finish(),
        }
    }
}

// ============================================================================
// RegistryEntry - 레지스트리 항목
// ============================================================================

/// 레지스트리 항목 - 등록 id, 종류, 소스, 기본 옵션
pub struct RegistryEntry {
    /// 등록 id
    pub id: String,

    /// 클래스 종류
    pub kind: ClassKind,

    /// 생성 시 병합되는 기본 옵션
    pub meta: Options,

    source: ClassSource,

    /// 동적 로드 결과 (한 번만 로드)
    loaded: OnceCell<Constructor>,
}

impl RegistryEntry {
    pub fn new(id: impl Into<String>, kind: ClassKind, source: ClassSource, meta: Options) -> Self {
        Self {
            id: id.into(),
            kind,
            meta,
            source,
            loaded: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &ClassSource {
        &self.source
    }

    /// 로드 없이 바로 사용할 수 있는 생성자
    pub fn ready_constructor(&self) -> Option<Constructor> {
        match &self.source {
            ClassSource::Static(ctor) => Some(Arc::clone(ctor)),
            ClassSource::Dynamic { .. } => self.loaded.get().cloned(),
        }
    }

    /// 동적 항목이 이미 로드되었는지
    pub fn is_loaded(&self) -> bool {
        self.source.is_static() || self.loaded.initialized()
    }

    pub(crate) fn loaded_cell(&self) -> &OnceCell<Constructor> {
        &self.loaded
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("source", &self.source)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(ClassKind::parse("RouteView"), Some(ClassKind::RouteView));
        assert_eq!(ClassKind::parse("route-view"), Some(ClassKind::RouteView));
        assert_eq!(ClassKind::parse("collection_view"), Some(ClassKind::CollectionView));
        assert_eq!(ClassKind::parse("model"), Some(ClassKind::Model));
        assert_eq!(ClassKind::parse("widget"), None);
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&ClassKind::RouteView).unwrap();
        assert_eq!(json, "\"route_view\"");
        assert!(ClassKind::CollectionView.is_view());
        assert!(!ClassKind::Model.is_view());
    }
}
