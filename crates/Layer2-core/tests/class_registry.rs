//! ClassRegistry 통합 테스트
//!
//! 매니페스트 파일 → RegistryBuilder → 전역 레지스트리 → Router 흐름을 검증합니다.
//!
//! `cargo test -p zeyon-core --test class_registry`

use futures::future::BoxFuture;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use zeyon_core::{
    global_registry, init_global_registry, ClassCatalog, ClassKind, ClassRegistry, Collection,
    Component, Constructor, ManifestEntry, Model, ModuleTable, Navigation, Options,
    RegistryBuilder, RegistryManifest, RouteView, Router, View,
};
use zeyon_foundation::{Error, RegistryMode, RouterConfig};

fn options(value: Value) -> Options {
    value.as_object().cloned().unwrap_or_default()
}

fn page_view(id: &'static str) -> Constructor {
    RouteView::constructor_with_render(id, move |v: &View| {
        let title = v.option("title").and_then(Value::as_str).unwrap_or(id);
        format!("<main>{}</main>", title)
    })
}

fn dynamic_manifest() -> RegistryManifest {
    let mut manifest = RegistryManifest::new(RegistryMode::Dynamic);
    manifest.push(
        ManifestEntry::new("home", ClassKind::RouteView, "HomeView")
            .with_path("route_view/home-view")
            .with_meta(options(json!({ "title": "Welcome" }))),
    );
    manifest.push(
        ManifestEntry::new("user", ClassKind::Model, "User")
            .with_path("model/user")
            .with_meta(options(json!({ "defaults": { "role": "guest" } }))),
    );
    manifest
}

#[tokio::test]
async fn test_dynamic_manifest_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".zeyon").join("registry.json");
    dynamic_manifest().save(&path).unwrap();

    let loads = Arc::new(AtomicUsize::new(0));
    let table = Arc::new(ModuleTable::new("bundle"));
    let counter = loads.clone();
    table.register("route_view/home-view", move || -> BoxFuture<'static, _> {
        counter.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(page_view("home")) })
    });
    table.register_ready("model/user", Model::constructor("user"));

    let manifest = RegistryManifest::load(&path).unwrap();
    let mut builder = RegistryBuilder::new();
    let count = builder
        .extend_from_manifest(&manifest, &ClassCatalog::new(), Some(table.clone()))
        .unwrap();
    assert_eq!(count, 2);
    let registry = Arc::new(builder.build());

    // 존재 확인은 로드를 일으키지 않음
    assert!(registry.has("home"));
    assert_eq!(loads.load(Ordering::SeqCst), 0);

    let router = Router::new(&RouterConfig::default())
        .with_registry(registry.clone())
        .route("/", "home")
        .unwrap();
    router.navigate("/").await.unwrap();
    router.navigate("/?ref=nav").await.unwrap();

    let view = router.current_view().unwrap();
    assert_eq!(view.view().unwrap().markup(), "<main>Welcome</main>");
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    let user = registry.instantiate("user", Options::new()).await.unwrap();
    let model = user.downcast_ref::<Model>().unwrap();
    assert_eq!(model.get("role"), Some(json!("guest")));
}

#[tokio::test]
async fn test_static_and_dynamic_modes_resolve_alike() {
    let mut static_builder = RegistryBuilder::new();
    static_builder
        .register("home", ClassKind::RouteView, page_view("home"), Options::new())
        .unwrap();
    let static_registry = static_builder.build();

    let table = Arc::new(ModuleTable::new("bundle"));
    table.register_ready("route_view/home", page_view("home"));
    let mut dynamic_builder = RegistryBuilder::new();
    dynamic_builder
        .register_dynamic("home", ClassKind::RouteView, "route_view/home", table, Options::new())
        .unwrap();
    let dynamic_registry = dynamic_builder.build();

    for registry in [&static_registry, &dynamic_registry] {
        let class = registry.resolve("home").unwrap().load().await.unwrap();
        assert_eq!(class.kind(), ClassKind::RouteView);
        let component = class.construct(Options::new()).unwrap();
        assert_eq!(component.view().unwrap().render(), "<main>home</main>");

        let miss = registry.resolve("missing-id").unwrap_err();
        assert!(matches!(miss, Error::NotRegistered(ref id) if id == "missing-id"));
    }
}

#[tokio::test]
async fn test_static_manifest_with_catalog() {
    let mut manifest = RegistryManifest::new(RegistryMode::Static);
    manifest.push(
        ManifestEntry::new("users", ClassKind::Collection, "UserList")
            .with_meta(options(json!({ "model": "user" }))),
    );
    let catalog = ClassCatalog::new().with("UserList", Collection::constructor("users"));

    let mut builder = ClassRegistry::builder();
    builder.extend_from_manifest(&manifest, &catalog, None).unwrap();
    let registry = builder.build();

    let users = registry
        .instantiate("users", options(json!({ "models": [{ "name": "a" }] })))
        .await
        .unwrap();
    let collection = users.downcast_ref::<Collection>().unwrap();
    assert_eq!(collection.len(), 1);
    assert_eq!(collection.get(0).unwrap().registration_id(), "user");
}

#[tokio::test]
async fn test_global_registry_lifecycle() {
    assert!(matches!(global_registry(), Err(Error::Config(_))));

    let mut builder = RegistryBuilder::new();
    builder
        .register("home", ClassKind::RouteView, page_view("home"), Options::new())
        .unwrap();
    builder
        .register(
            "member",
            ClassKind::Model,
            Model::constructor("member"),
            options(json!({ "defaults": { "role": "guest", "active": true } })),
        )
        .unwrap();
    init_global_registry(builder.build()).unwrap();

    let second = init_global_registry(RegistryBuilder::new().build());
    assert!(matches!(second, Err(Error::Config(_))));
    assert!(global_registry().unwrap().has("home"));

    // 레지스트리를 지정하지 않은 Router는 전역 레지스트리 사용
    let router = Router::new(&RouterConfig::default()).route("/", "home").unwrap();
    let outcome = router.navigate("/").await.unwrap();
    assert!(matches!(outcome, Navigation::Rendered { .. }));

    // Collection의 `model` id는 등록된 Model의 기본 속성을 가져옴
    let team = Collection::new(
        "team",
        options(json!({
            "model": "member",
            "defaults": { "role": "admin" },
            "models": [{ "name": "a" }]
        })),
    );
    let first = team.get(0).unwrap();
    assert_eq!(first.registration_id(), "member");
    assert_eq!(first.get("role"), Some(json!("admin")));
    assert_eq!(first.get("active"), Some(json!(true)));
}
