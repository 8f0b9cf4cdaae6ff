//! Listener - 구독 레코드와 핸들

use super::native::NativeTarget;
use super::types::{same_handler, EmitterEvent, Handler, ListenerId, SubscriberId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

/// 네이티브 요소에 부착된 바인딩
pub(crate) struct NativeBinding {
    pub target: Arc<dyn NativeTarget>,
    /// 실제로 부착한 함수 참조 (제거 시 동일 참조 필요)
    pub bound: Handler,
}

/// 하나의 구독
///
/// destroy 이후에는 호출되지 않으며 보관 중인 참조를 모두 놓습니다.
pub(crate) struct Listener {
    pub id: ListenerId,
    pub event: String,
    pub subscriber: Option<SubscriberId>,
    /// 사용자가 넘긴 원본 핸들러 (off 필터 비교용)
    original: Mutex<Option<Handler>>,
    /// 실제 호출되는 함수 (once의 경우 래퍼)
    callback: Mutex<Option<Handler>>,
    native: Mutex<Option<NativeBinding>>,
    active: AtomicBool,
}

impl Listener {
    pub fn new(
        id: ListenerId,
        event: impl Into<String>,
        original: Handler,
        callback: Handler,
        subscriber: Option<SubscriberId>,
    ) -> Self {
        Self {
            id,
            event: event.into(),
            subscriber,
            original: Mutex::new(Some(original)),
            callback: Mutex::new(Some(callback)),
            native: Mutex::new(None),
            active: AtomicBool::new(true),
        }
    }

    /// 네이티브 요소에 부착
    ///
    /// 요소가 만든 이벤트에도 구독자가 실리도록 래퍼를 부착합니다.
    pub fn attach_native(&self, target: Arc<dyn NativeTarget>) {
        let Some(callback) = self.callback.lock().clone() else {
            return;
        };
        let subscriber = self.subscriber;
        let bound: Handler =
            Arc::new(move |e: &EmitterEvent| callback(&e.for_subscriber(subscriber)));
        target.add_listener(&self.event, bound.clone());
        *self.native.lock() = Some(NativeBinding { target, bound });
    }

    pub fn is_native(&self) -> bool {
        self.native.lock().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn matches_handler(&self, handler: &Handler) -> bool {
        self.original
            .lock()
            .as_ref()
            .is_some_and(|h| same_handler(h, handler))
    }

    /// 핸들러 호출 (비활성이면 무시)
    pub fn invoke(&self, event: &EmitterEvent) -> bool {
        if !self.is_active() {
            return false;
        }
        // 핸들러 실행 중 destroy가 가능하도록 잠금 밖에서 호출
        let callback = self.callback.lock().clone();
        match callback {
            Some(cb) => {
                cb(&event.for_subscriber(self.subscriber));
                true
            }
            None => false,
        }
    }

    /// 리스너 해제 (멱등)
    pub fn destroy(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(binding) = self.native.lock().take() {
            binding.target.remove_listener(&self.event, &binding.bound);
        }
        self.callback.lock().take();
        self.original.lock().take();

        trace!(listener_id = %self.id, event = %self.event, "Listener destroyed");
    }
}

// ============================================================================
// ListenerHandle
// ============================================================================

/// `on`/`once`가 반환하는 리스너 핸들
///
/// 핸들을 drop해도 리스너는 유지됩니다. 제거하려면 `off()`를 호출합니다.
#[derive(Clone)]
pub struct ListenerHandle {
    id: ListenerId,
    event: String,
    listener: Weak<Listener>,
    remover: Weak<dyn ListenerRemover>,
}

/// 핸들에서 Emitter로 역참조하기 위한 내부 trait
pub(crate) trait ListenerRemover: Send + Sync {
    fn remove_listener(&self, id: ListenerId) -> bool;
}

impl ListenerHandle {
    pub(crate) fn new(listener: &Arc<Listener>, remover: Weak<dyn ListenerRemover>) -> Self {
        Self {
            id: listener.id,
            event: listener.event.clone(),
            listener: Arc::downgrade(listener),
            remover,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    /// 리스너가 아직 살아 있는지
    pub fn is_active(&self) -> bool {
        self.listener.upgrade().is_some_and(|l| l.is_active())
    }

    /// 리스너 제거, 실제로 제거되었으면 true
    pub fn off(&self) -> bool {
        match self.remover.upgrade() {
            Some(remover) => remover.remove_listener(self.id),
            None => false,
        }
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("active", &self.is_active())
            .finish()
    }
}
