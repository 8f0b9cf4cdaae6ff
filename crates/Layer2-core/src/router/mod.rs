//! # Router
//!
//! URL 경로를 RouteView 등록 id로 연결합니다.
//!
//! ## 동작
//!
//! ```text
//! navigate(url)
//!   │
//!   ├─ 경로 매칭 실패 ──────────────▶ `notfound`
//!   ├─ 같은 경로, 쿼리만 변경 ────────▶ on_route(params, query) + `query`
//!   └─ 새 경로
//!        ├─ `navigate` 발행
//!        ├─ ClassRegistry로 RouteView 생성 (정적/동적 모드 동일)
//!        ├─ on_route → render → attach
//!        └─ 이전 View 해제
//! ```

mod route;

pub use route::{build_query, normalize_path, parse_query, parse_url, ParsedUrl, RoutePattern};

use crate::registry::{global_registry, ClassRegistry, Component, Options};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use zeyon_foundation::strings::{EVENT_NAVIGATE, EVENT_NOT_FOUND, EVENT_QUERY};
use zeyon_foundation::{Emitter, Result, RouterConfig};

/// 등록된 라우트
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: RoutePattern,
    /// RouteView 등록 id
    pub view_id: String,
}

/// `navigate` 결과
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// 새 View 생성
    Rendered { view_id: String, path: String },
    /// 같은 경로에서 쿼리만 변경
    QueryChanged { path: String },
    /// 경로와 쿼리 모두 동일
    Unchanged,
    /// 매칭되는 라우트 없음
    NotFound { path: String },
}

/// 현재 활성 라우트
struct ActiveRoute {
    pattern: String,
    path: String,
    url: String,
    params: Options,
    query: Options,
    view: Arc<dyn Component>,
}

pub struct Router {
    emitter: Emitter,
    base_path: String,
    routes: RwLock<Vec<Route>>,
    registry: RwLock<Option<Arc<ClassRegistry>>>,
    current: Mutex<Option<ActiveRoute>>,
    history: Mutex<Vec<String>>,
    /// navigate 직렬화
    navigation: tokio::sync::Mutex<()>,
}

impl Router {
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            emitter: Emitter::new("router", [EVENT_NAVIGATE, EVENT_QUERY, EVENT_NOT_FOUND]),
            base_path: normalize_path(&config.base_path),
            routes: RwLock::new(Vec::new()),
            registry: RwLock::new(None),
            current: Mutex::new(None),
            history: Mutex::new(Vec::new()),
            navigation: tokio::sync::Mutex::new(()),
        }
    }

    /// 전역 대신 사용할 레지스트리
    pub fn with_registry(self, registry: Arc<ClassRegistry>) -> Self {
        *self.registry.write() = Some(registry);
        self
    }

    /// 라우트 추가 (먼저 추가된 라우트가 우선)
    pub fn route(self, pattern: &str, view_id: impl Into<String>) -> Result<Self> {
        self.add_route(pattern, view_id)?;
        Ok(self)
    }

    pub fn add_route(&self, pattern: &str, view_id: impl Into<String>) -> Result<()> {
        let route = Route {
            pattern: RoutePattern::parse(pattern)?,
            view_id: view_id.into(),
        };
        debug!(pattern, view_id = %route.view_id, "Added route");
        self.routes.write().push(route);
        Ok(())
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.read().clone()
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    fn registry(&self) -> Result<Arc<ClassRegistry>> {
        match self.registry.read().clone() {
            Some(registry) => Ok(registry),
            None => global_registry(),
        }
    }

    /// base path 제거
    fn strip_base<'a>(&self, path: &'a str) -> &'a str {
        if self.base_path == "/" {
            return path;
        }
        match path.strip_prefix(self.base_path.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        }
    }

    fn match_route(&self, path: &str) -> Option<(Route, Options)> {
        self.routes
            .read()
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|p| (route.clone(), p)))
    }

    // ========================================================================
    // 탐색
    // ========================================================================

    /// URL로 이동
    ///
    /// View 생성에 실패하면 에러를 반환하고 이전 View를 유지합니다.
    pub async fn navigate(&self, url: &str) -> Result<Navigation> {
        let _guard = self.navigation.lock().await;
        self.navigate_inner(url, true).await
    }

    /// 이전 URL로 이동, 기록이 없으면 `None`
    pub async fn back(&self) -> Result<Option<Navigation>> {
        let _guard = self.navigation.lock().await;
        let previous = {
            let history = self.history.lock();
            match history.len() {
                0 | 1 => return Ok(None),
                n => history[n - 2].clone(),
            }
        };

        // 이동이 실패하면 기록은 그대로
        let outcome = self.navigate_inner(&previous, false).await?;
        self.history.lock().pop();
        Ok(Some(outcome))
    }

    async fn navigate_inner(&self, url: &str, record: bool) -> Result<Navigation> {
        let parsed = parse_url(url)?;
        let path = normalize_path(self.strip_base(&parsed.path));

        let Some((route, params)) = self.match_route(&path) else {
            warn!(path = %path, "No route matched");
            self.emitter
                .emit(EVENT_NOT_FOUND, Some(json!({ "path": path })));
            return Ok(Navigation::NotFound { path });
        };

        // 같은 라우트, 같은 경로 → 쿼리만 비교
        let same_route = {
            let current = self.current.lock();
            current.as_ref().and_then(|active| {
                (active.pattern == route.pattern.as_str() && active.path == path)
                    .then(|| (Arc::clone(&active.view), active.query == parsed.query))
            })
        };

        if let Some((view, same_query)) = same_route {
            if same_query {
                return Ok(Navigation::Unchanged);
            }

            if let Some(active) = self.current.lock().as_mut() {
                active.query = parsed.query.clone();
                active.url = url.to_string();
            }
            view.on_route(&params, &parsed.query);
            if record {
                self.history.lock().push(url.to_string());
            }

            debug!(path = %path, "Query changed");
            self.emitter.emit(
                EVENT_QUERY,
                Some(json!({ "path": path, "query": parsed.query })),
            );
            return Ok(Navigation::QueryChanged { path });
        }

        self.emitter.emit(
            EVENT_NAVIGATE,
            Some(json!({
                "path": path,
                "view": route.view_id,
                "params": params,
                "query": parsed.query,
            })),
        );

        let mut options = Options::new();
        options.insert("params".into(), Value::Object(params.clone()));
        options.insert("query".into(), Value::Object(parsed.query.clone()));
        let view: Arc<dyn Component> = Arc::from(
            self.registry()?
                .instantiate(&route.view_id, options)
                .await?,
        );

        view.on_route(&params, &parsed.query);
        if let Some(v) = view.view() {
            v.render();
            v.attach();
        }

        let previous = self.current.lock().replace(ActiveRoute {
            pattern: route.pattern.as_str().to_string(),
            path: path.clone(),
            url: url.to_string(),
            params,
            query: parsed.query,
            view,
        });
        if let Some(previous) = previous {
            previous.view.destroy();
        }
        if record {
            self.history.lock().push(url.to_string());
        }

        info!(path = %path, view = %route.view_id, "Navigated");
        Ok(Navigation::Rendered {
            view_id: route.view_id,
            path,
        })
    }

    // ========================================================================
    // 상태
    // ========================================================================

    /// 현재 View
    pub fn current_view(&self) -> Option<Arc<dyn Component>> {
        self.current.lock().as_ref().map(|a| Arc::clone(&a.view))
    }

    pub fn current_path(&self) -> Option<String> {
        self.current.lock().as_ref().map(|a| a.path.clone())
    }

    pub fn current_url(&self) -> Option<String> {
        self.current.lock().as_ref().map(|a| a.url.clone())
    }

    pub fn current_params(&self) -> Options {
        self.current
            .lock()
            .as_ref()
            .map(|a| a.params.clone())
            .unwrap_or_default()
    }

    pub fn current_query(&self) -> Options {
        self.current
            .lock()
            .as_ref()
            .map(|a| a.query.clone())
            .unwrap_or_default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    /// 현재 View와 Emitter 해제
    pub fn destroy(&self) {
        let active = self.current.lock().take();
        if let Some(active) = active {
            active.view.destroy();
        }
        self.history.lock().clear();
        self.emitter.destroy();
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("base_path", &self.base_path)
            .field("routes", &self.routes.read().len())
            .field("current", &self.current_path())
            .finish()
    }
}
