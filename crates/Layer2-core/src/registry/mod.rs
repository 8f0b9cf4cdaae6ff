//! # Class Registry
//!
//! 문자열 등록 id로 클래스(생성자)를 찾는 레지스트리
//!
//! ## 개요
//!
//! Router, CollectionView 등은 구체 타입 대신 등록 id로 클래스를 참조합니다.
//! 레지스트리는 두 가지 모드로 동작합니다.
//!
//! - **정적 모드**: 모든 생성자가 번들에 포함됨, 조회 즉시 사용 가능
//! - **동적 모드**: 항목은 로드 경로만 가짐, 첫 사용 시 `ModuleLoader`로 로드
//!
//! 어느 모드든 `resolve(id)`는 같은 모양(`Resolution`)을 돌려주고,
//! 호출자는 `load().await`로 생성 가능한 `ResolvedClass`를 얻습니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  RegistryBuilder (시작 단계)                                   │
//! │    register / register_dynamic / extend_from_manifest         │
//! │                         │ build()                             │
//! │                         ▼                                     │
//! │  ClassRegistry (불변)                                          │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │ HashMap<String, Arc<RegistryEntry>>                    │  │
//! │  │   Static(Constructor)    │  Dynamic{path, loader}      │  │
//! │  │                          │    └─ OnceCell<Constructor> │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │         │ resolve(id)                                         │
//! │         ▼                                                     │
//! │  Resolution::Ready ──────┐                                    │
//! │  Resolution::Deferred ───┴─ load().await → ResolvedClass      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 사용 예시
//!
//! ```ignore
//! use zeyon_core::registry::{ClassKind, ClassRegistry, init_global_registry};
//!
//! let mut builder = ClassRegistry::builder();
//! builder.register("user", ClassKind::Model, Model::constructor("user"), Options::new())?;
//! init_global_registry(builder.build())?;
//!
//! let user = global_registry()?.instantiate("user", Options::new()).await?;
//! ```

mod class_registry;
mod entry;
mod loader;
mod manifest;
mod traits;

pub use class_registry::{
    global_registry, init_global_registry, merge_options, ClassRegistry, DeferredClass,
    RegistryBuilder, Resolution, ResolvedClass,
};
pub use entry::{ClassKind, ClassSource, RegistryEntry};
pub use loader::{ModuleFactory, ModuleTable};
pub use manifest::{ClassCatalog, ManifestEntry, RegistryManifest, MANIFEST_VERSION};
pub use traits::{constructor, Component, Constructor, ModuleLoader, Options};
