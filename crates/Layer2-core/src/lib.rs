//! zeyon-core: MVC Runtime for Zeyon
//!
//! Layer2 - ClassRegistry와 그 위의 컴포넌트 레이어
//!
//! # 주요 모듈
//!
//! - `registry`: 등록 id → 생성자 (정적/동적 모드, 전역 접근)
//! - `model`: 속성 + 변경 이벤트
//! - `collection`: Model 목록
//! - `view`: View, RouteView, CollectionView
//! - `router`: URL → RouteView
//!
//! # 사용 예시
//!
//! ```ignore
//! use zeyon_core::{ClassKind, ClassRegistry, Model, RouteView, Router};
//!
//! let mut builder = ClassRegistry::builder();
//! builder.register("user", ClassKind::Model, Model::constructor("user"), Options::new())?;
//! builder.register("home", ClassKind::RouteView, RouteView::constructor("home"), Options::new())?;
//! init_global_registry(builder.build())?;
//!
//! let router = Router::new(&config.router).route("/", "home")?;
//! router.navigate("/?tab=recent").await?;
//! ```

pub mod collection;
pub mod model;
pub mod registry;
pub mod router;
pub mod view;

// Re-exports: Registry
pub use registry::{
    constructor, global_registry, init_global_registry, merge_options, ClassCatalog, ClassKind,
    ClassRegistry, ClassSource, Component, Constructor, DeferredClass, ManifestEntry,
    ModuleFactory, ModuleLoader, ModuleTable, Options, RegistryBuilder, RegistryEntry,
    RegistryManifest, Resolution, ResolvedClass, MANIFEST_VERSION,
};

// Re-exports: Components
pub use collection::Collection;
pub use model::{change_event, Model};
pub use router::{Navigation, Route, RoutePattern, Router};
pub use view::{CollectionView, RenderFn, RouteHook, RouteView, View};

// Layer1 re-exports
pub use zeyon_foundation::{Emitter, Error, Result};

/// Layer2 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_component_exports() {
        let view = View::new("page", Options::new());
        let component: &dyn Component = &view;
        assert_eq!(component.kind(), ClassKind::View);
        assert!(component.view().is_some());

        let model = Model::new("user", Options::new());
        assert!(Component::view(&model).is_none());
    }
}
