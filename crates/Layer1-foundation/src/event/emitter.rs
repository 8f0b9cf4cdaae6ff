//! Emitter - 검증된 이벤트 이름 기반 발행/구독
//!
//! 모든 Model, Collection, View, Router가 하나씩 내장합니다.

use super::debounce::Pending;
use super::listener::{Listener, ListenerHandle, ListenerRemover};
use super::native::{is_native_event, NativeTarget, NATIVE_EVENTS};
use super::types::{EmitterEvent, Handler, ListenerId, OffFilter, SubscriberId};
use crate::config::EmitterConfig;
use crate::strings::{EVENT_DESTROYED, EVENT_WILDCARD};
use crate::{Error, Result};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// 모든 Emitter가 기본으로 허용하는 이벤트
pub const BUILTIN_EVENTS: &[&str] = &[EVENT_WILDCARD, EVENT_DESTROYED];

const ALIVE: u8 = 0;
const DESTROYING: u8 = 1;
const DESTROYED: u8 = 2;

// ============================================================================
// EmitterInner
// ============================================================================

struct EmitterInner {
    /// 로그용 이름
    name: String,

    /// 허용된 이벤트 이름
    valid_events: RwLock<HashSet<String>>,

    /// 이벤트별 리스너 (등록 순서 = 호출 순서)
    listeners: Mutex<HashMap<String, Vec<Arc<Listener>>>>,

    /// 이벤트별 debounce 상태
    debounced: Mutex<HashMap<String, Pending>>,

    /// 네이티브 이벤트 대상 요소
    native: Option<Arc<dyn NativeTarget>>,

    debounce_window: Duration,

    listener_counter: AtomicU64,

    state: AtomicU8,
}

impl EmitterInner {
    fn is_alive(&self) -> bool {
        self.state.load(Ordering::SeqCst) == ALIVE
    }

    fn is_valid_event(&self, event: &str) -> bool {
        self.valid_events.read().contains(event)
    }

    fn native_target_for(&self, event: &str) -> Option<Arc<dyn NativeTarget>> {
        if is_native_event(event) {
            self.native.clone()
        } else {
            None
        }
    }

    fn next_listener_id(&self) -> ListenerId {
        ListenerId::new(self.listener_counter.fetch_add(1, Ordering::SeqCst))
    }

    fn remove_by_id(&self, id: ListenerId) -> bool {
        let removed = {
            let mut listeners = self.listeners.lock();
            let mut found = None;
            for list in listeners.values_mut() {
                if let Some(pos) = list.iter().position(|l| l.id == id) {
                    found = Some(list.remove(pos));
                    break;
                }
            }
            listeners.retain(|_, list| !list.is_empty());
            found
        };

        match removed {
            Some(listener) => {
                listener.destroy();
                debug!(emitter = %self.name, listener_id = %id, "Removed listener");
                true
            }
            None => false,
        }
    }

    /// 내부 디스패치: 이벤트 전용 리스너 → 와일드카드 리스너 순서
    fn dispatch(&self, event: &str, detail: Option<Value>) -> usize {
        let snapshot: Vec<Arc<Listener>> = {
            let listeners = self.listeners.lock();
            let specific = listeners.get(event).into_iter().flatten();
            let wildcard = if event == EVENT_WILDCARD {
                None
            } else {
                listeners.get(EVENT_WILDCARD)
            };
            specific
                .chain(wildcard.into_iter().flatten())
                .filter(|l| !l.is_native())
                .cloned()
                .collect()
        };

        trace!(
            emitter = %self.name,
            event,
            listeners = snapshot.len(),
            "Dispatching event"
        );

        let emitted = EmitterEvent::new(event, detail);
        snapshot
            .iter()
            .filter(|listener| listener.invoke(&emitted))
            .count()
    }

    fn flush_debounced(&self, event: &str, generation: u64) {
        let pending = {
            let mut debounced = self.debounced.lock();
            // 새 호출이 타이머를 재시작했거나 이미 정리됨
            let current = debounced
                .get(event)
                .is_some_and(|p| p.generation == generation);
            if current {
                debounced.remove(event)
            } else {
                None
            }
        };

        let Some(pending) = pending else {
            return;
        };

        if !self.is_alive() {
            return;
        }

        trace!(emitter = %self.name, event, generation, "Flushing debounced event");
        self.dispatch(event, pending.accumulator.into_payload());
    }
}

impl ListenerRemover for EmitterInner {
    fn remove_listener(&self, id: ListenerId) -> bool {
        self.remove_by_id(id)
    }
}

// ============================================================================
// Emitter
// ============================================================================

/// 이벤트 발행/구독 기본 요소
///
/// 복제 비용이 낮은 핸들이며, 복제본은 같은 리스너 테이블을 공유합니다.
///
/// ## 사용법
///
/// ```ignore
/// use zeyon_foundation::event::{handler, Emitter};
///
/// let emitter = Emitter::new("model", ["change"]);
/// let listener = emitter.on("change", handler(|e| println!("{:?}", e.detail)), None);
///
/// emitter.emit("change", Some(serde_json::json!({ "name": "zeyon" })));
/// listener.map(|l| l.off());
/// ```
#[derive(Clone)]
pub struct Emitter {
    inner: Arc<EmitterInner>,
}

impl Emitter {
    /// 기본 설정으로 Emitter 생성
    pub fn new<I, S>(name: impl Into<String>, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder(name).events(events).build()
    }

    pub fn builder(name: impl Into<String>) -> EmitterBuilder {
        EmitterBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// 같은 인스턴스인지 확인
    pub fn ptr_eq(&self, other: &Emitter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ========================================================================
    // 이벤트 이름
    // ========================================================================

    /// 허용 이벤트 추가 (멱등)
    pub fn extend_valid_events<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut valid = self.inner.valid_events.write();
        for name in names {
            valid.insert(name.into());
        }
    }

    /// 구독/발행 가능 여부 확인
    ///
    /// `on`/`once`/`emit`은 이 검사가 실패하면 경고만 남기고 무시합니다.
    pub fn check_event(&self, event: &str) -> Result<()> {
        if !self.inner.is_alive() {
            return Err(Error::Destroyed);
        }
        if !self.inner.is_valid_event(event) {
            return Err(Error::InvalidEvent(format!(
                "'{}' is not declared by {}",
                event, self.inner.name
            )));
        }
        Ok(())
    }

    pub fn is_valid_event(&self, event: &str) -> bool {
        self.inner.is_valid_event(event)
    }

    /// 허용 이벤트 목록 (정렬됨)
    pub fn valid_events(&self) -> Vec<String> {
        let mut events: Vec<String> = self.inner.valid_events.read().iter().cloned().collect();
        events.sort();
        events
    }

    pub fn has_native_target(&self) -> bool {
        self.inner.native.is_some()
    }

    // ========================================================================
    // 구독
    // ========================================================================

    /// 리스너 등록
    ///
    /// 허용되지 않은 이벤트면 경고를 남기고 `None`을 반환합니다.
    pub fn on(
        &self,
        event: &str,
        handler: Handler,
        subscriber: Option<SubscriberId>,
    ) -> Option<ListenerHandle> {
        let callback = handler.clone();
        self.add_listener(event, handler, move |_| callback, subscriber)
    }

    /// 한 번만 호출되는 리스너 등록
    ///
    /// 래퍼가 실행된 직후, 같은 emit의 다음 리스너보다 먼저 제거됩니다.
    pub fn once(
        &self,
        event: &str,
        handler: Handler,
        subscriber: Option<SubscriberId>,
    ) -> Option<ListenerHandle> {
        let weak: Weak<EmitterInner> = Arc::downgrade(&self.inner);
        let original = handler.clone();

        self.add_listener(
            event,
            original,
            move |id| {
                let fired = AtomicBool::new(false);
                Arc::new(move |e: &EmitterEvent| {
                    if fired.swap(true, Ordering::SeqCst) {
                        return;
                    }
                    handler(e);
                    if let Some(inner) = weak.upgrade() {
                        inner.remove_by_id(id);
                    }
                }) as Handler
            },
            subscriber,
        )
    }

    fn add_listener(
        &self,
        event: &str,
        original: Handler,
        make_callback: impl FnOnce(ListenerId) -> Handler,
        subscriber: Option<SubscriberId>,
    ) -> Option<ListenerHandle> {
        if let Err(err) = self.check_event(event) {
            warn!(emitter = %self.inner.name, error = %err, "Ignoring listener");
            return None;
        }

        let id = self.inner.next_listener_id();
        let listener = Arc::new(Listener::new(
            id,
            event,
            original,
            make_callback(id),
            subscriber,
        ));

        {
            // destroy와 경합하지 않도록 상태 확인은 잠금 안에서
            let mut listeners = self.inner.listeners.lock();
            if !self.inner.is_alive() {
                warn!(emitter = %self.inner.name, error = %Error::Destroyed, event, "Ignoring listener");
                return None;
            }
            if let Some(target) = self.inner.native_target_for(event) {
                listener.attach_native(target);
            }
            listeners
                .entry(event.to_string())
                .or_default()
                .push(Arc::clone(&listener));
        }

        debug!(
            emitter = %self.inner.name,
            listener_id = %id,
            event,
            native = listener.is_native(),
            "Registered listener"
        );

        let remover = Arc::downgrade(&self.inner) as Weak<dyn ListenerRemover>;
        Some(ListenerHandle::new(&listener, remover))
    }

    /// 필터에 맞는 리스너 제거, 제거된 수 반환
    ///
    /// 필터가 비어 있거나 `event == "*"`이면 와일드카드 구독자만이 아니라
    /// 인스턴스의 모든 리스너를 제거합니다.
    pub fn off(&self, filter: OffFilter) -> usize {
        if let Some(event) = filter.event.as_deref() {
            if !self.inner.is_valid_event(event) {
                warn!(emitter = %self.inner.name, event, "Ignoring off for unregistered event");
                return 0;
            }
        }

        let clear_all = filter.is_empty() || filter.event.as_deref() == Some(EVENT_WILDCARD);

        let removed: Vec<Arc<Listener>> = {
            let mut listeners = self.inner.listeners.lock();
            if clear_all {
                listeners.drain().flat_map(|(_, list)| list).collect()
            } else {
                let mut removed = Vec::new();
                for (name, list) in listeners.iter_mut() {
                    if filter.event.as_deref().is_some_and(|e| e != name.as_str()) {
                        continue;
                    }
                    let (matched, kept): (Vec<_>, Vec<_>) = std::mem::take(list)
                        .into_iter()
                        .partition(|l| Self::matches_filter(l, &filter));
                    *list = kept;
                    removed.extend(matched);
                }
                listeners.retain(|_, list| !list.is_empty());
                removed
            }
        };

        for listener in &removed {
            listener.destroy();
        }

        debug!(
            emitter = %self.inner.name,
            removed = removed.len(),
            clear_all,
            "Removed listeners"
        );
        removed.len()
    }

    /// 모든 리스너 제거
    pub fn off_all(&self) -> usize {
        self.off(OffFilter::new())
    }

    fn matches_filter(listener: &Listener, filter: &OffFilter) -> bool {
        if let Some(ref handler) = filter.handler {
            if !listener.matches_handler(handler) {
                return false;
            }
        }
        if let Some(subscriber) = filter.subscriber {
            if listener.subscriber != Some(subscriber) {
                return false;
            }
        }
        if let Some(id) = filter.listener {
            if listener.id != id {
                return false;
            }
        }
        true
    }

    // ========================================================================
    // 발행
    // ========================================================================

    /// 이벤트 발행, 호출된 리스너 수 반환
    ///
    /// 등록 순서대로 이벤트 리스너를 호출한 뒤 와일드카드 리스너를 호출합니다.
    pub fn emit(&self, event: &str, detail: Option<Value>) -> usize {
        if let Err(err) = self.check_event(event) {
            warn!(emitter = %self.inner.name, error = %err, "Ignoring emit");
            return 0;
        }
        self.inner.dispatch(event, detail)
    }

    /// 네이티브 이벤트면 요소에서 실제 이벤트를 발생시키고, 아니면 `emit`
    pub fn trigger(&self, event: &str, detail: Option<Value>) -> usize {
        if self.inner.is_alive() && self.inner.is_valid_event(event) {
            if let Some(target) = self.inner.native_target_for(event) {
                return target.dispatch(event, detail);
            }
        }
        self.emit(event, detail)
    }

    /// 지연 발행
    ///
    /// 같은 이벤트의 호출이 대기 시간 안에 반복되면 타이머를 재시작하고
    /// 페이로드를 합칩니다. `aggregate`가 false면 마지막 페이로드만 남습니다.
    /// tokio 런타임 밖에서 호출되면 즉시 발행합니다.
    pub fn debounced_emit(&self, event: &str, payload: Option<Value>, aggregate: bool) {
        if !self.inner.is_alive() {
            warn!(emitter = %self.inner.name, event, "Ignoring debounced emit on destroyed emitter");
            return;
        }
        if !self.inner.is_valid_event(event) {
            warn!(emitter = %self.inner.name, event, "Ignoring debounced emit for unregistered event");
            return;
        }

        let generation = self
            .inner
            .debounced
            .lock()
            .entry(event.to_string())
            .or_default()
            .trigger(payload, aggregate);

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(emitter = %self.inner.name, event, "No async runtime, emitting immediately");
                self.inner.flush_debounced(event, generation);
                return;
            }
        };

        let weak = Arc::downgrade(&self.inner);
        let window = self.inner.debounce_window;
        let event = event.to_string();
        runtime.spawn(async move {
            tokio::time::sleep(window).await;
            if let Some(inner) = weak.upgrade() {
                inner.flush_debounced(&event, generation);
            }
        });
    }

    /// 대기 중인 debounce 이벤트 수
    pub fn pending_debounced(&self) -> usize {
        self.inner.debounced.lock().len()
    }

    // ========================================================================
    // 수명
    // ========================================================================

    /// 인스턴스 해제 (멱등)
    ///
    /// `destroyed`를 한 번 발행한 뒤 모든 리스너를 해제하고 대기 중인
    /// debounce를 버립니다.
    pub fn destroy(&self) {
        if self
            .inner
            .state
            .compare_exchange(ALIVE, DESTROYING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            trace!(emitter = %self.inner.name, "Emitter already destroyed");
            return;
        }

        self.inner.dispatch(EVENT_DESTROYED, None);

        let drained: Vec<Arc<Listener>> = self
            .inner
            .listeners
            .lock()
            .drain()
            .flat_map(|(_, list)| list)
            .collect();
        for listener in &drained {
            listener.destroy();
        }
        self.inner.debounced.lock().clear();

        self.inner.state.store(DESTROYED, Ordering::SeqCst);
        debug!(emitter = %self.inner.name, released = drained.len(), "Emitter destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        !self.inner.is_alive()
    }

    // ========================================================================
    // 통계
    // ========================================================================

    /// 활성 리스너 수 (`None`이면 전체)
    pub fn listener_count(&self, event: Option<&str>) -> usize {
        let listeners = self.inner.listeners.lock();
        match event {
            Some(event) => listeners
                .get(event)
                .map(|list| list.iter().filter(|l| l.is_active()).count())
                .unwrap_or(0),
            None => listeners
                .values()
                .flatten()
                .filter(|l| l.is_active())
                .count(),
        }
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("name", &self.inner.name)
            .field("listeners", &self.listener_count(None))
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

// ============================================================================
// EmitterBuilder
// ============================================================================

/// Emitter 빌더
pub struct EmitterBuilder {
    name: String,
    events: Vec<String>,
    native: Option<Arc<dyn NativeTarget>>,
    debounce_window: Duration,
}

impl EmitterBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Vec::new(),
            native: None,
            debounce_window: EmitterConfig::default().debounce_window(),
        }
    }

    /// 서브클래스가 선언하는 이벤트 목록
    pub fn events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events.extend(events.into_iter().map(Into::into));
        self
    }

    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.events.push(event.into());
        self
    }

    /// 네이티브 요소 연결 (네이티브 이벤트 어휘가 허용 목록에 추가됨)
    pub fn native(mut self, target: Arc<dyn NativeTarget>) -> Self {
        self.native = Some(target);
        self
    }

    pub fn debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn config(mut self, config: &EmitterConfig) -> Self {
        self.debounce_window = config.debounce_window();
        self
    }

    pub fn build(self) -> Emitter {
        let mut valid: HashSet<String> = BUILTIN_EVENTS.iter().map(|e| e.to_string()).collect();
        valid.extend(self.events);
        if self.native.is_some() {
            valid.extend(NATIVE_EVENTS.iter().map(|e| e.to_string()));
        }

        Emitter {
            inner: Arc::new(EmitterInner {
                name: self.name,
                valid_events: RwLock::new(valid),
                listeners: Mutex::new(HashMap::new()),
                debounced: Mutex::new(HashMap::new()),
                native: self.native,
                debounce_window: self.debounce_window,
                listener_counter: AtomicU64::new(0),
                state: AtomicU8::new(ALIVE),
            }),
        }
    }
}

// ============================================================================
// 테스트
// ============================================================================
