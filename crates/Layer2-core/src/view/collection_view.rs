//! CollectionView - Collection 항목마다 자식 View를 렌더링
//!
//! 옵션 키:
//! - `itemView`: 항목 View의 등록 id (필수)
//! - `models`, `model`, `defaults`: 내부 Collection 초기화에 사용
//!
//! 항목 View는 ClassRegistry로 생성하므로 정적/동적 모드 모두 동작합니다.
//! Collection의 `add`/`remove`/`reset`/`sort`는 `refresh`로 모였다가
//! 대기 시간 후 한 번 다시 렌더링됩니다.

use super::View;
use crate::collection::Collection;
use crate::registry::{
    constructor, global_registry, ClassKind, ClassRegistry, Component, Constructor, Options,
};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::any::Any;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};
use zeyon_foundation::strings::{EVENT_ADD, EVENT_REMOVE, EVENT_RESET, EVENT_SORT};
use zeyon_foundation::{handler, Emitter, Error, OffFilter, Result, SubscriberId};

const EVENT_REFRESH: &str = "refresh";

struct CollectionViewInner {
    view: View,
    item_view: String,
    collection: RwLock<Option<Arc<Collection>>>,
    registry: RwLock<Option<Arc<ClassRegistry>>>,
    subscriber: SubscriberId,
    /// 동시에 하나의 refresh만 실행
    refresh_lock: tokio::sync::Mutex<()>,
}

impl CollectionViewInner {
    fn registry(&self) -> Result<Arc<ClassRegistry>> {
        match self.registry.read().clone() {
            Some(registry) => Ok(registry),
            None => global_registry(),
        }
    }

    async fn refresh(&self) -> Result<usize> {
        let _guard = self.refresh_lock.lock().await;
        if self.view.emitter().is_destroyed() {
            return Ok(0);
        }

        let models = self
            .collection
            .read()
            .as_ref()
            .map(|c| c.models())
            .unwrap_or_default();

        let class = self.registry()?.resolve(&self.item_view)?.load().await?;
        let mut items = Vec::with_capacity(models.len());
        for (index, model) in models.iter().enumerate() {
            let mut options = Options::new();
            options.insert("model".into(), model.to_json());
            options.insert("index".into(), json!(index));
            items.push(class.construct(options)?);
        }

        self.view.clear_children();
        let count = items.len();
        for (index, item) in items.into_iter().enumerate() {
            self.view
                .set_child(format!("item-{}", index), Arc::from(item));
        }
        self.view.render();

        debug!(view = %self.view.registration_id(), items = count, "Collection view refreshed");
        Ok(count)
    }
}

pub struct CollectionView {
    inner: Arc<CollectionViewInner>,
}

impl CollectionView {
    pub fn new(registration_id: impl Into<String>, options: Options) -> Result<Self> {
        let registration_id = registration_id.into();
        let item_view = options
            .get("itemView")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::construct(&registration_id, "missing 'itemView' option"))?;

        let collection = Arc::new(Collection::new(
            format!("{}:items", registration_id),
            options.clone(),
        ));

        let inner = Arc::new(CollectionViewInner {
            view: View::with_events(
                registration_id,
                ClassKind::CollectionView,
                options,
                &[EVENT_REFRESH],
            ),
            item_view,
            collection: RwLock::new(None),
            registry: RwLock::new(None),
            subscriber: SubscriberId::new(),
            refresh_lock: tokio::sync::Mutex::new(()),
        });

        let weak: Weak<CollectionViewInner> = Arc::downgrade(&inner);
        inner.view.emitter().on(
            EVENT_REFRESH,
            handler(move |_| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                    warn!("No async runtime, skipping collection view refresh");
                    return;
                };
                runtime.spawn(async move {
                    if let Err(e) = inner.refresh().await {
                        warn!(error = %e, "Collection view refresh failed");
                    }
                });
            }),
            None,
        );

        let view = Self { inner };
        view.bind(collection);
        Ok(view)
    }

    /// 레지스트리 등록용 생성자
    pub fn constructor(registration_id: impl Into<String>) -> Constructor {
        let id = registration_id.into();
        constructor(move |options| {
            Ok(Box::new(CollectionView::new(id.clone(), options)?) as Box<dyn Component>)
        })
    }

    /// 전역 대신 사용할 레지스트리
    pub fn set_registry(&self, registry: Arc<ClassRegistry>) {
        *self.inner.registry.write() = Some(registry);
    }

    pub fn as_view(&self) -> &View {
        &self.inner.view
    }

    pub fn item_view(&self) -> &str {
        &self.inner.item_view
    }

    pub fn collection(&self) -> Option<Arc<Collection>> {
        self.inner.collection.read().clone()
    }

    /// 표시할 Collection 연결 (기존 연결은 해제)
    pub fn bind(&self, collection: Arc<Collection>) {
        self.unbind();

        let emitter = self.inner.view.emitter().clone();
        for event in [EVENT_ADD, EVENT_REMOVE, EVENT_RESET, EVENT_SORT] {
            let emitter = emitter.clone();
            collection.emitter().on(
                event,
                handler(move |_| emitter.debounced_emit(EVENT_REFRESH, None, false)),
                Some(self.inner.subscriber),
            );
        }
        *self.inner.collection.write() = Some(collection);
        emitter.debounced_emit(EVENT_REFRESH, None, false);
    }

    fn unbind(&self) {
        let previous = self.inner.collection.write().take();
        if let Some(previous) = previous {
            previous
                .emitter()
                .off(OffFilter::new().subscriber(self.inner.subscriber));
        }
    }

    /// 항목 View를 다시 생성하고 렌더링, 항목 수 반환
    pub async fn refresh(&self) -> Result<usize> {
        self.inner.refresh().await
    }
}

impl Component for CollectionView {
    fn registration_id(&self) -> &str {
        self.inner.view.registration_id()
    }

    fn kind(&self) -> ClassKind {
        ClassKind::CollectionView
    }

    fn emitter(&self) -> &Emitter {
        self.inner.view.emitter()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn view(&self) -> Option<&View> {
        Some(&self.inner.view)
    }

    fn destroy(&self) {
        self.unbind();
        self.inner.view.destroy();
    }
}

impl std::fmt::Debug for CollectionView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionView")
            .field("registration_id", &self.registration_id())
            .field("item_view", &self.inner.item_view)
            .field("items", &self.inner.view.child_names().len())
            .finish()
    }
}
