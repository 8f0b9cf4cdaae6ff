//! Class Registry - 등록 id → 생성자(또는 로더) 매핑
//!
//! 시작 단계에서 `RegistryBuilder`로 채운 뒤 `build()`로 불변 `ClassRegistry`를
//! 만듭니다. 빌드 이후에는 쓰기 경로가 없습니다.

use super::entry::{ClassKind, ClassSource, RegistryEntry};
use super::manifest::{ClassCatalog, RegistryManifest};
use super::traits::{Component, Constructor, ModuleLoader, Options};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};
use zeyon_foundation::{Error, RegistryMode, Result};

/// 기본 옵션과 호출자 옵션 병합 (호출자 우선, 얕은 병합)
pub fn merge_options(defaults: &Options, caller: Options) -> Options {
    let mut merged = defaults.clone();
    for (key, value) in caller {
        merged.insert(key, value);
    }
    merged
}

// ============================================================================
// ResolvedClass / Resolution
// ============================================================================

/// 생성 가능한 상태의 클래스
#[derive(Clone)]
pub struct ResolvedClass {
    entry: Arc<RegistryEntry>,
    constructor: Constructor,
}

impl ResolvedClass {
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn kind(&self) -> ClassKind {
        self.entry.kind
    }

    /// 등록 시 지정된 기본 옵션
    pub fn meta(&self) -> &Options {
        &self.entry.meta
    }

    /// 기본 옵션과 병합해 인스턴스 생성
    pub fn construct(&self, options: Options) -> Result<Box<dyn Component>> {
        let merged = merge_options(&self.entry.meta, options);
        debug!(id = %self.entry.id, kind = %self.entry.kind, "Constructing component");
        (self.constructor)(merged)
    }
}

impl std::fmt::Debug for ResolvedClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedClass")
            .field("id", &self.entry.id)
            .field("kind", &self.entry.kind)
            .finish()
    }
}

/// 아직 로드되지 않은 동적 클래스
#[derive(Debug, Clone)]
pub struct DeferredClass {
    entry: Arc<RegistryEntry>,
}

impl DeferredClass {
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn path(&self) -> &str {
        self.entry.source().path().unwrap_or_default()
    }

    pub fn meta(&self) -> &Options {
        &self.entry.meta
    }

    /// 모듈 로드 (항목당 한 번만 실제 로드)
    pub async fn load(self) -> Result<ResolvedClass> {
        let constructor = load_entry(&self.entry).await?;
        Ok(ResolvedClass {
            entry: self.entry,
            constructor,
        })
    }
}

async fn load_entry(entry: &Arc<RegistryEntry>) -> Result<Constructor> {
    let (path, loader) = match entry.source() {
        ClassSource::Static(ctor) => return Ok(Arc::clone(ctor)),
        ClassSource::Dynamic { path, loader } => (path.clone(), Arc::clone(loader)),
    };

    let ctor = entry
        .loaded_cell()
        .get_or_try_init(|| async {
            debug!(id = %entry.id, path = %path, loader = loader.name(), "Loading class module");
            loader
                .load(&path)
                .await
                .map_err(|e| Error::load(&entry.id, &path, e.to_string()))
        })
        .await?;
    Ok(Arc::clone(ctor))
}

/// `resolve` 결과: 정적(또는 이미 로드됨)이면 Ready, 동적이면 Deferred
///
/// 호출자는 모드와 무관하게 `load().await`로 `ResolvedClass`를 얻습니다.
#[derive(Debug, Clone)]
pub enum Resolution {
    Ready(ResolvedClass),
    Deferred(DeferredClass),
}

impl Resolution {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// 동기적으로 사용 가능한 경우에만 반환
    pub fn ready(self) -> Option<ResolvedClass> {
        match self {
            Self::Ready(class) => Some(class),
            Self::Deferred(_) => None,
        }
    }

    pub async fn load(self) -> Result<ResolvedClass> {
        match self {
            Self::Ready(class) => Ok(class),
            Self::Deferred(deferred) => deferred.load().await,
        }
    }
}

// ============================================================================
// RegistryBuilder - 시작 단계
// ============================================================================

/// 레지스트리 구성 (시작 단계 전용)
///
/// 같은 id의 두 번째 등록은 `Error::DuplicateRegistration`으로 거부합니다.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<String, Arc<RegistryEntry>>,
    order: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 항목 등록
    pub fn register_entry(&mut self, entry: RegistryEntry) -> Result<()> {
        if self.entries.contains_key(&entry.id) {
            warn!(id = %entry.id, "Rejecting duplicate registration");
            return Err(Error::duplicate(&entry.id));
        }

        debug!(
            id = %entry.id,
            kind = %entry.kind,
            dynamic = !entry.source().is_static(),
            "Registered class"
        );
        self.order.push(entry.id.clone());
        self.entries.insert(entry.id.clone(), Arc::new(entry));
        Ok(())
    }

    /// 정적 등록
    pub fn register(
        &mut self,
        id: impl Into<String>,
        kind: ClassKind,
        ctor: Constructor,
        meta: Options,
    ) -> Result<()> {
        self.register_entry(RegistryEntry::new(id, kind, ClassSource::Static(ctor), meta))
    }

    /// 동적 등록
    pub fn register_dynamic(
        &mut self,
        id: impl Into<String>,
        kind: ClassKind,
        path: impl Into<String>,
        loader: Arc<dyn ModuleLoader>,
        meta: Options,
    ) -> Result<()> {
        let source = ClassSource::Dynamic {
            path: path.into(),
            loader,
        };
        self.register_entry(RegistryEntry::new(id, kind, source, meta))
    }

    /// 생성된 매니페스트로 채우기, 등록된 항목 수 반환
    ///
    /// 정적 모드는 `catalog`에서 클래스 이름을 찾고, 동적 모드는 `loader`가 필요합니다.
    /// 모든 항목을 먼저 검증하므로 에러가 나면 빌더는 호출 전 상태 그대로입니다.
    pub fn extend_from_manifest(
        &mut self,
        manifest: &RegistryManifest,
        catalog: &ClassCatalog,
        loader: Option<Arc<dyn ModuleLoader>>,
    ) -> Result<usize> {
        manifest.validate()?;

        let loader = match manifest.mode {
            RegistryMode::Dynamic if !manifest.is_empty() => Some(loader.ok_or_else(|| {
                Error::Config("dynamic manifest requires a module loader".to_string())
            })?),
            _ => None,
        };

        let mut staged = Vec::with_capacity(manifest.len());
        for entry in &manifest.entries {
            if self.contains(&entry.id) {
                warn!(id = %entry.id, "Rejecting duplicate registration from manifest");
                return Err(Error::duplicate(&entry.id));
            }
            let source = match &loader {
                Some(loader) => ClassSource::Dynamic {
                    path: entry.load_path(),
                    loader: Arc::clone(loader),
                },
                None => ClassSource::Static(catalog.get(&entry.class).ok_or_else(|| {
                    Error::NotFound(format!(
                        "class '{}' for registration '{}'",
                        entry.class, entry.id
                    ))
                })?),
            };
            staged.push(RegistryEntry::new(
                &entry.id,
                entry.kind,
                source,
                entry.meta.clone(),
            ));
        }

        let count = staged.len();
        for entry in staged {
            self.register_entry(entry)?;
        }

        info!(mode = %manifest.mode, entries = count, "Loaded registry manifest");
        Ok(count)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 불변 레지스트리 생성
    pub fn build(self) -> ClassRegistry {
        ClassRegistry {
            entries: self.entries,
            order: self.order,
        }
    }
}

// ============================================================================
// ClassRegistry - 런타임 조회
// ============================================================================

/// 불변 클래스 레지스트리
///
/// ## 사용법
///
/// ```ignore
/// let mut builder = RegistryBuilder::new();
/// builder.register("user", ClassKind::Model, Model::constructor("user"), Options::new())?;
/// let registry = builder.build();
///
/// let user = registry.instantiate("user", options).await?;
/// ```
pub struct ClassRegistry {
    entries: HashMap<String, Arc<RegistryEntry>>,
    order: Vec<String>,
}

impl ClassRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// 로드 없이 존재 여부 확인
    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get_entry(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.get(id).map(|e| e.as_ref())
    }

    /// 등록 순서대로 id 목록
    pub fn ids(&self) -> Vec<String> {
        self.order.clone()
    }

    /// 종류별 id 목록
    pub fn by_kind(&self, kind: ClassKind) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| self.entries.get(*id).is_some_and(|e| e.kind == kind))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// id 조회
    ///
    /// 등록되지 않은 id는 `Error::NotRegistered`로 실패합니다.
    pub fn resolve(&self, id: &str) -> Result<Resolution> {
        let entry = self.entries.get(id).ok_or_else(|| {
            warn!(id, "Class not registered");
            Error::NotRegistered(id.to_string())
        })?;

        Ok(match entry.ready_constructor() {
            Some(constructor) => Resolution::Ready(ResolvedClass {
                entry: Arc::clone(entry),
                constructor,
            }),
            None => Resolution::Deferred(DeferredClass {
                entry: Arc::clone(entry),
            }),
        })
    }

    /// resolve + (필요 시) 로드 + 생성
    pub async fn instantiate(&self, id: &str, options: Options) -> Result<Box<dyn Component>> {
        let class = self.resolve(id)?.load().await?;
        class.construct(options)
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("ids", &self.order)
            .finish()
    }
}

// ============================================================================
// 전역 ClassRegistry
// ============================================================================

static GLOBAL_REGISTRY: OnceLock<Arc<ClassRegistry>> = OnceLock::new();

/// 전역 레지스트리 초기화 (한 번만 가능)
pub fn init_global_registry(registry: ClassRegistry) -> Result<Arc<ClassRegistry>> {
    let registry = Arc::new(registry);
    GLOBAL_REGISTRY
        .set(Arc::clone(&registry))
        .map_err(|_| Error::Config("class registry already initialized".to_string()))?;
    info!(entries = registry.len(), "Initialized global class registry");
    Ok(registry)
}

/// 전역 레지스트리 가져오기
pub fn global_registry() -> Result<Arc<ClassRegistry>> {
    GLOBAL_REGISTRY
        .get()
        .cloned()
        .ok_or_else(|| Error::Config("class registry not initialized".to_string()))
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::registry::loader::ModuleTable;
    use serde_json::json;

    fn model_ctor(id: &'static str) -> Constructor {
        Model::constructor(id)
    }

    fn meta(value: serde_json::Value) -> Options {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut builder = RegistryBuilder::new();
        builder
            .register("comp-a", ClassKind::Model, model_ctor("comp-a"), Options::new())
            .unwrap();

        let second = builder.register("comp-a", ClassKind::View, model_ctor("comp-a"), Options::new());
        assert!(matches!(second, Err(Error::DuplicateRegistration { .. })));
        assert_eq!(builder.len(), 1);

        let registry = builder.build();
        assert_eq!(registry.get_entry("comp-a").unwrap().kind, ClassKind::Model);
    }

    #[test]
    fn test_resolve_missing_id() {
        let registry = RegistryBuilder::new().build();
        let err = registry.resolve("missing-id").unwrap_err();
        assert!(err.is_resolution_miss());
        assert!(!registry.has("missing-id"));
    }

    #[tokio::test]
    async fn test_static_resolution_is_ready() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(
                "user",
                ClassKind::Model,
                model_ctor("user"),
                meta(json!({ "defaults": { "role": "guest", "name": "anon" } })),
            )
            .unwrap();
        let registry = builder.build();

        let resolution = registry.resolve("user").unwrap();
        assert!(resolution.is_ready());
        let class = resolution.ready().unwrap();
        assert_eq!(class.kind(), ClassKind::Model);

        let component = class
            .construct(meta(json!({ "attributes": { "name": "zeyon" } })))
            .unwrap();
        let model = component.downcast_ref::<Model>().unwrap();
        assert_eq!(model.get("name"), Some(json!("zeyon")));
        assert_eq!(model.get("role"), Some(json!("guest")));
    }

    #[test]
    fn test_merge_options_caller_wins() {
        let defaults = meta(json!({ "a": 1, "b": 2 }));
        let merged = merge_options(&defaults, meta(json!({ "b": 3, "c": 4 })));
        assert_eq!(serde_json::Value::Object(merged), json!({ "a": 1, "b": 3, "c": 4 }));
    }

    #[tokio::test]
    async fn test_dynamic_resolution_loads_once() {
        let table = Arc::new(ModuleTable::new("chunks"));
        table.register_ready("models/user", model_ctor("user"));

        let mut builder = RegistryBuilder::new();
        builder
            .register_dynamic("user", ClassKind::Model, "models/user", table.clone(), Options::new())
            .unwrap();
        let registry = builder.build();

        assert!(registry.has("user"));
        assert_eq!(table.load_count(), 0);

        let resolution = registry.resolve("user").unwrap();
        assert!(!resolution.is_ready());
        let first = registry.instantiate("user", Options::new()).await.unwrap();
        assert_eq!(first.registration_id(), "user");

        // 로드 이후에는 동기적으로 준비됨
        assert!(registry.resolve("user").unwrap().is_ready());
        registry.instantiate("user", Options::new()).await.unwrap();
        assert_eq!(table.load_count(), 1);
    }

    #[tokio::test]
    async fn test_dynamic_load_failure() {
        let table = Arc::new(ModuleTable::new("chunks"));
        let mut builder = RegistryBuilder::new();
        builder
            .register_dynamic("ghost", ClassKind::View, "views/ghost", table, Options::new())
            .unwrap();
        let registry = builder.build();

        let result = registry.instantiate("ghost", Options::new()).await;
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_by_kind_and_order() {
        let mut builder = RegistryBuilder::new();
        builder.register("b", ClassKind::Model, model_ctor("b"), Options::new()).unwrap();
        builder.register("a", ClassKind::View, model_ctor("a"), Options::new()).unwrap();
        builder.register("c", ClassKind::Model, model_ctor("c"), Options::new()).unwrap();
        let registry = builder.build();

        assert_eq!(registry.ids(), vec!["b", "a", "c"]);
        assert_eq!(registry.by_kind(ClassKind::Model), vec!["b", "c"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_extend_from_static_manifest() {
        use crate::registry::manifest::ManifestEntry;

        let mut manifest = RegistryManifest::new(RegistryMode::Static);
        manifest.push(ManifestEntry::new("user", ClassKind::Model, "User"));
        manifest.push(ManifestEntry::new("post", ClassKind::Model, "Post"));

        let catalog = ClassCatalog::new().with("User", model_ctor("user"));
        let mut builder = RegistryBuilder::new();
        let result = builder.extend_from_manifest(&manifest, &catalog, None);
        assert!(matches!(result, Err(Error::NotFound(_))));
        // 실패한 매니페스트는 일부도 등록하지 않음
        assert!(builder.is_empty());

        // 같은 빌더로 재시도 가능
        let catalog = catalog.with("Post", model_ctor("post"));
        assert_eq!(builder.extend_from_manifest(&manifest, &catalog, None).unwrap(), 2);
        assert!(builder.contains("user") && builder.contains("post"));
    }

    #[test]
    fn test_extend_from_manifest_conflict_keeps_builder() {
        use crate::registry::manifest::ManifestEntry;

        let mut builder = RegistryBuilder::new();
        builder
            .register("post", ClassKind::Model, model_ctor("post"), Options::new())
            .unwrap();

        let mut manifest = RegistryManifest::new(RegistryMode::Static);
        manifest.push(ManifestEntry::new("user", ClassKind::Model, "User"));
        manifest.push(ManifestEntry::new("post", ClassKind::Model, "Post"));
        let catalog = ClassCatalog::new()
            .with("User", model_ctor("user"))
            .with("Post", model_ctor("post"));

        let result = builder.extend_from_manifest(&manifest, &catalog, None);
        assert!(matches!(result, Err(Error::DuplicateRegistration { .. })));
        assert_eq!(builder.len(), 1);
        assert!(!builder.contains("user"));
    }

    #[test]
    fn test_dynamic_manifest_requires_loader() {
        use crate::registry::manifest::ManifestEntry;

        let mut manifest = RegistryManifest::new(RegistryMode::Dynamic);
        manifest.push(ManifestEntry::new("user", ClassKind::Model, "User"));

        let mut builder = RegistryBuilder::new();
        let result = builder.extend_from_manifest(&manifest, &ClassCatalog::new(), None);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
