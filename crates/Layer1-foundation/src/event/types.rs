//! Event Types - Emitter가 사용하는 이벤트/식별자 타입 정의

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ============================================================================
// Event ID
// ============================================================================

/// 이벤트 고유 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    /// 새 이벤트 ID 생성
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Listener ID
// ============================================================================

/// 리스너 ID (Emitter 인스턴스 내에서 고유)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

// ============================================================================
// Subscriber ID
// ============================================================================

static SUBSCRIBER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// 구독자 키
///
/// 리스너를 소유한 객체를 나타냅니다. 핸들러 호출 시 이벤트에 실려 전달되고,
/// `off`에서 구독자 단위 제거 키로 사용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// 프로세스 내 고유 구독자 ID 생성
    pub fn new() -> Self {
        Self(SUBSCRIBER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "subscriber-{}", self.0)
    }
}

// ============================================================================
// EmitterEvent
// ============================================================================

/// 리스너에게 전달되는 이벤트 객체
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterEvent {
    /// 이벤트 ID
    pub id: EventId,

    /// 이벤트 이름 (예: "change", "navigate")
    pub name: String,

    /// 이벤트 데이터
    pub detail: Option<Value>,

    /// 리스너를 등록한 구독자
    pub subscriber: Option<SubscriberId>,

    /// 이벤트 발생 시간
    pub timestamp: DateTime<Utc>,
}

impl EmitterEvent {
    pub fn new(name: impl Into<String>, detail: Option<Value>) -> Self {
        Self {
            id: EventId::new(),
            name: name.into(),
            detail,
            subscriber: None,
            timestamp: Utc::now(),
        }
    }

    /// 특정 구독자에게 전달할 사본
    pub fn for_subscriber(&self, subscriber: Option<SubscriberId>) -> Self {
        Self {
            subscriber,
            ..self.clone()
        }
    }

    /// detail을 특정 타입으로 역직렬화
    pub fn detail_as<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.detail
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

// ============================================================================
// Handler
// ============================================================================

/// 이벤트 핸들러
pub type Handler = Arc<dyn Fn(&EmitterEvent) + Send + Sync>;

/// 클로저를 Handler로 변환
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&EmitterEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// 두 핸들러가 같은 함수 참조인지 확인 (포인터 동일성)
pub fn same_handler(a: &Handler, b: &Handler) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

// ============================================================================
// OffFilter
// ============================================================================

/// `off` 호출 시 제거 대상 필터
///
/// 모든 필드가 비어 있으면 전체 리스너를 제거합니다.
#[derive(Clone, Default)]
pub struct OffFilter {
    /// 이벤트 이름 ("*"이면 전체)
    pub event: Option<String>,

    /// 원본 핸들러 (포인터 동일성으로 비교)
    pub handler: Option<Handler>,

    /// 구독자
    pub subscriber: Option<SubscriberId>,

    /// 특정 리스너
    pub listener: Option<ListenerId>,
}

impl OffFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn subscriber(mut self, subscriber: SubscriberId) -> Self {
        self.subscriber = Some(subscriber);
        self
    }

    pub fn listener(mut self, id: ListenerId) -> Self {
        self.listener = Some(id);
        self
    }

    /// 필터가 비어 있는지 (전체 제거)
    pub fn is_empty(&self) -> bool {
        self.event.is_none()
            && self.handler.is_none()
            && self.subscriber.is_none()
            && self.listener.is_none()
    }
}

impl std::fmt::Debug for OffFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffFilter")
            .field("event", &self.event)
            .field("handler", &self.handler.as_ref().map(|_| "<fn>"))
            .field("subscriber", &self.subscriber)
            .field("listener", &self.listener)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_ids_unique() {
        let a = SubscriberId::new();
        let b = SubscriberId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_handler() {
        let h1 = handler(|_| {});
        let h2 = handler(|_| {});
        let h1_clone = Arc::clone(&h1);

        assert!(same_handler(&h1, &h1_clone));
        assert!(!same_handler(&h1, &h2));
    }

    #[test]
    fn test_detail_as() {
        let event = EmitterEvent::new("change", Some(serde_json::json!({ "a": 1 })));
        let map: Option<std::collections::HashMap<String, i32>> = event.detail_as();
        assert_eq!(map.unwrap().get("a"), Some(&1));
    }

    #[test]
    fn test_off_filter_empty() {
        assert!(OffFilter::new().is_empty());
        assert!(!OffFilter::new().event("change").is_empty());
    }
}
