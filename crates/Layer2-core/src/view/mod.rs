//! # View
//!
//! 요소(`HeadlessElement`)를 소유하고 네이티브 이벤트를 받을 수 있는 컴포넌트
//!
//! - `View`: 기본 View, 자식 View 트리와 렌더 함수
//! - `RouteView`: Router가 생성하는 View (params/query 수신)
//! - `CollectionView`: Collection 항목마다 자식 View를 생성
//!
//! 옵션 키:
//! - `tag`: 요소 태그 (기본 `div`)
//! - `className`: 요소 class 속성
//! - `content`: 렌더 함수가 없을 때 사용하는 정적 마크업
//! - `events`: 추가로 허용할 이벤트 이름 배열

mod collection_view;
mod route_view;

pub use collection_view::CollectionView;
pub use route_view::{RouteHook, RouteView};

use crate::registry::{constructor, ClassKind, Component, Constructor, Options};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};
use zeyon_foundation::strings::{EVENT_ATTACHED, EVENT_DETACHED, EVENT_RENDER};
use zeyon_foundation::{Emitter, HeadlessElement};

const DEFAULT_TAG: &str = "div";

/// 마크업 생성 함수
pub type RenderFn = Arc<dyn Fn(&View) -> String + Send + Sync>;

pub struct View {
    registration_id: String,
    kind: ClassKind,
    element: Arc<HeadlessElement>,
    emitter: Emitter,
    options: Options,
    render_fn: RwLock<Option<RenderFn>>,
    children: RwLock<Vec<(String, Arc<dyn Component>)>>,
    attached: AtomicBool,
}

impl View {
    pub fn new(registration_id: impl Into<String>, options: Options) -> Self {
        Self::with_kind(registration_id, ClassKind::View, options)
    }

    pub(crate) fn with_kind(
        registration_id: impl Into<String>,
        kind: ClassKind,
        options: Options,
    ) -> Self {
        Self::with_events(registration_id, kind, options, &[])
    }

    pub(crate) fn with_events(
        registration_id: impl Into<String>,
        kind: ClassKind,
        options: Options,
        extra_events: &[&str],
    ) -> Self {
        let registration_id = registration_id.into();
        let tag = options
            .get("tag")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TAG);
        let element = Arc::new(HeadlessElement::new(tag));
        if let Some(class) = options.get("className").and_then(Value::as_str) {
            element.set_attribute("class", class);
        }

        let declared = options
            .get("events")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_string);

        let emitter = Emitter::builder(&registration_id)
            .events([EVENT_RENDER, EVENT_ATTACHED, EVENT_DETACHED])
            .events(extra_events.iter().copied())
            .events(declared)
            .native(element.clone())
            .build();

        Self {
            registration_id,
            kind,
            element,
            emitter,
            options,
            render_fn: RwLock::new(None),
            children: RwLock::new(Vec::new()),
            attached: AtomicBool::new(false),
        }
    }

    /// 레지스트리 등록용 생성자
    pub fn constructor(registration_id: impl Into<String>) -> Constructor {
        let id = registration_id.into();
        constructor(move |options| Ok(Box::new(View::new(id.clone(), options)) as Box<dyn Component>))
    }

    /// 렌더 함수를 가진 View 생성자
    pub fn constructor_with_render<F>(registration_id: impl Into<String>, render: F) -> Constructor
    where
        F: Fn(&View) -> String + Send + Sync + 'static,
    {
        let id = registration_id.into();
        let render: RenderFn = Arc::new(render);
        constructor(move |options| {
            let view = View::new(id.clone(), options);
            view.set_render_fn(Arc::clone(&render));
            Ok(Box::new(view) as Box<dyn Component>)
        })
    }

    pub fn element(&self) -> &Arc<HeadlessElement> {
        &self.element
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn set_render_fn(&self, render: RenderFn) {
        *self.render_fn.write() = Some(render);
    }

    // ========================================================================
    // 렌더링
    // ========================================================================

    /// 마크업 생성 후 요소에 반영, `render` 발행
    ///
    /// 렌더 함수가 없으면 정적 `content` 뒤에 자식 View들의 마크업을 붙입니다.
    pub fn render(&self) -> String {
        if self.emitter.is_destroyed() {
            return self.element.content();
        }

        let render_fn = self.render_fn.read().clone();
        let markup = match render_fn {
            Some(render) => render(self),
            None => {
                let mut markup = self
                    .option("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                for (_, child) in self.children() {
                    if let Some(view) = child.view() {
                        markup.push_str(&view.render());
                    }
                }
                markup
            }
        };

        self.element.set_content(markup.clone());
        trace!(view = %self.registration_id, bytes = markup.len(), "Rendered view");
        self.emitter
            .emit(EVENT_RENDER, Some(json!({ "length": markup.len() })));
        markup
    }

    /// 마지막 렌더 결과
    pub fn markup(&self) -> String {
        self.element.content()
    }

    // ========================================================================
    // 부착
    // ========================================================================

    /// 문서에 부착 (자식 포함), 처음 부착될 때만 `attached` 발행
    pub fn attach(&self) -> bool {
        if self.emitter.is_destroyed() || self.attached.swap(true, Ordering::SeqCst) {
            return false;
        }
        for (_, child) in self.children() {
            if let Some(view) = child.view() {
                view.attach();
            }
        }
        self.emitter.emit(EVENT_ATTACHED, None);
        true
    }

    pub fn detach(&self) -> bool {
        if !self.attached.swap(false, Ordering::SeqCst) {
            return false;
        }
        for (_, child) in self.children() {
            if let Some(view) = child.view() {
                view.detach();
            }
        }
        self.emitter.emit(EVENT_DETACHED, None);
        true
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    // ========================================================================
    // 자식 View
    // ========================================================================

    /// 이름으로 자식 설정 (같은 이름의 기존 자식은 해제)
    pub fn set_child(&self, name: impl Into<String>, child: Arc<dyn Component>) {
        let name = name.into();
        let replaced = {
            let mut children = self.children.write();
            match children.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => Some(std::mem::replace(&mut slot.1, Arc::clone(&child))),
                None => {
                    children.push((name.clone(), Arc::clone(&child)));
                    None
                }
            }
        };

        if let Some(old) = replaced {
            old.destroy();
        }
        if self.is_attached() {
            if let Some(view) = child.view() {
                view.attach();
            }
        }
        debug!(view = %self.registration_id, child = %name, "Set child view");
    }

    pub fn child(&self, name: &str) -> Option<Arc<dyn Component>> {
        self.children
            .read()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| Arc::clone(c))
    }

    /// 자식 제거 후 해제
    pub fn remove_child(&self, name: &str) -> bool {
        let removed = {
            let mut children = self.children.write();
            children
                .iter()
                .position(|(n, _)| n == name)
                .map(|pos| children.remove(pos))
        };
        match removed {
            Some((_, child)) => {
                child.destroy();
                true
            }
            None => false,
        }
    }

    /// 모든 자식 제거 후 해제
    pub fn clear_children(&self) -> usize {
        let drained: Vec<_> = self.children.write().drain(..).collect();
        for (_, child) in &drained {
            child.destroy();
        }
        drained.len()
    }

    pub fn children(&self) -> Vec<(String, Arc<dyn Component>)> {
        self.children.read().clone()
    }

    pub fn child_names(&self) -> Vec<String> {
        self.children.read().iter().map(|(n, _)| n.clone()).collect()
    }

    /// 자식 → 부착 해제 → Emitter 순서로 해제 (멱등)
    pub fn destroy(&self) {
        if self.emitter.is_destroyed() {
            return;
        }
        self.clear_children();
        self.detach();
        self.emitter.destroy();
    }
}

impl Component for View {
    fn registration_id(&self) -> &str {
        &self.registration_id
    }

    fn kind(&self) -> ClassKind {
        self.kind
    }

    fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn view(&self) -> Option<&View> {
        Some(self)
    }

    fn destroy(&self) {
        View::destroy(self);
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("registration_id", &self.registration_id)
            .field("kind", &self.kind)
            .field("children", &self.child_names())
            .field("attached", &self.is_attached())
            .finish()
    }
}
