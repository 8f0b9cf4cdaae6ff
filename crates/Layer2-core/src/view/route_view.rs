//! RouteView - Router가 생성하는 View

use super::View;
use crate::model::object_option;
use crate::registry::{constructor, ClassKind, Component, Constructor, Options};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tracing::debug;
use zeyon_foundation::strings::EVENT_ROUTE;
use zeyon_foundation::Emitter;

/// 라우트 진입/쿼리 변경 시 호출되는 함수
pub type RouteHook = Arc<dyn Fn(&RouteView) + Send + Sync>;

pub struct RouteView {
    view: View,
    params: RwLock<Options>,
    query: RwLock<Options>,
    hook: RwLock<Option<RouteHook>>,
}

impl RouteView {
    /// `params`, `query` 옵션을 초기 라우트 정보로 사용
    pub fn new(registration_id: impl Into<String>, options: Options) -> Self {
        let params = object_option(&options, "params");
        let query = object_option(&options, "query");
        Self {
            view: View::with_events(registration_id, ClassKind::RouteView, options, &[EVENT_ROUTE]),
            params: RwLock::new(params),
            query: RwLock::new(query),
            hook: RwLock::new(None),
        }
    }

    pub fn constructor(registration_id: impl Into<String>) -> Constructor {
        let id = registration_id.into();
        constructor(move |options| {
            Ok(Box::new(RouteView::new(id.clone(), options)) as Box<dyn Component>)
        })
    }

    /// 렌더 함수를 가진 RouteView 생성자
    pub fn constructor_with_render<F>(registration_id: impl Into<String>, render: F) -> Constructor
    where
        F: Fn(&View) -> String + Send + Sync + 'static,
    {
        let id = registration_id.into();
        let render: super::RenderFn = Arc::new(render);
        constructor(move |options| {
            let route_view = RouteView::new(id.clone(), options);
            route_view.view.set_render_fn(Arc::clone(&render));
            Ok(Box::new(route_view) as Box<dyn Component>)
        })
    }

    pub fn as_view(&self) -> &View {
        &self.view
    }

    pub fn route_params(&self) -> Options {
        self.params.read().clone()
    }

    pub fn param(&self, key: &str) -> Option<Value> {
        self.params.read().get(key).cloned()
    }

    pub fn query(&self) -> Options {
        self.query.read().clone()
    }

    pub fn set_route_hook(&self, hook: RouteHook) {
        *self.hook.write() = Some(hook);
    }
}

impl Component for RouteView {
    fn registration_id(&self) -> &str {
        self.view.registration_id()
    }

    fn kind(&self) -> ClassKind {
        ClassKind::RouteView
    }

    fn emitter(&self) -> &Emitter {
        self.view.emitter()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn view(&self) -> Option<&View> {
        Some(&self.view)
    }

    /// params/query 갱신 후 훅 호출, `route` 발행
    fn on_route(&self, params: &Options, query: &Options) {
        *self.params.write() = params.clone();
        *self.query.write() = query.clone();
        debug!(view = %self.registration_id(), "Route updated");

        let hook = self.hook.read().clone();
        if let Some(hook) = hook {
            hook(self);
        }
        self.view.emitter().emit(
            EVENT_ROUTE,
            Some(json!({ "params": params, "query": query })),
        );
    }

    fn destroy(&self) {
        self.view.destroy();
    }
}

impl std::fmt::Debug for RouteView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteView")
            .field("registration_id", &self.registration_id())
            .field("params", &*self.params.read())
            .field("query", &*self.query.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use zeyon_foundation::handler;

    fn options(value: Value) -> Options {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_initial_params_from_options() {
        let view = RouteView::new(
            "user-page",
            options(json!({ "params": { "id": "42" }, "query": { "tab": "posts" } })),
        );
        assert_eq!(view.param("id"), Some(json!("42")));
        assert_eq!(view.query().get("tab"), Some(&json!("posts")));
        assert_eq!(view.kind(), ClassKind::RouteView);
        assert_eq!(view.as_view().kind(), ClassKind::RouteView);
    }

    #[test]
    fn test_on_route_updates_and_notifies() {
        let view = RouteView::new("user-page", Options::new());
        let hooks = Arc::new(AtomicUsize::new(0));
        let h = hooks.clone();
        view.set_route_hook(Arc::new(move |v: &RouteView| {
            assert_eq!(v.param("id"), Some(json!("7")));
            h.fetch_add(1, Ordering::SeqCst);
        }));

        let routes = Arc::new(AtomicUsize::new(0));
        let r = routes.clone();
        view.emitter().on(
            "route",
            handler(move |_| {
                r.fetch_add(1, Ordering::SeqCst);
            }),
            None,
        );

        view.on_route(&options(json!({ "id": "7" })), &Options::new());
        assert_eq!(hooks.load(Ordering::SeqCst), 1);
        assert_eq!(routes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_render_through_view() {
        let ctor = RouteView::constructor_with_render("home", |v: &View| {
            format!("<main>{}</main>", v.option("title").and_then(Value::as_str).unwrap_or(""))
        });
        let component = ctor(options(json!({ "title": "Home" }))).unwrap();
        let view = component.view().unwrap();
        assert_eq!(view.render(), "<main>Home</main>");
        assert!(component.downcast_ref::<RouteView>().is_some());
    }
}
