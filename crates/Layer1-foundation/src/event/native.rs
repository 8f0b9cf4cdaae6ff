//! Native Events - DOM 요소 바인딩
//!
//! 네이티브 이벤트 이름은 Emitter 내부 디스패치 테이블을 거치지 않고
//! `NativeTarget`에 직접 바인딩됩니다. 브라우저 밖에서는 `HeadlessElement`가
//! 메모리 내 요소 역할을 합니다.

use super::types::{same_handler, EmitterEvent, Handler};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::trace;

/// 네이티브 이벤트 어휘
pub const NATIVE_EVENTS: &[&str] = &[
    "click",
    "dblclick",
    "input",
    "change",
    "submit",
    "reset",
    "keydown",
    "keyup",
    "keypress",
    "focus",
    "blur",
    "mousedown",
    "mouseup",
    "mousemove",
    "mouseenter",
    "mouseleave",
    "scroll",
    "resize",
    "contextmenu",
];

/// 네이티브 이벤트 이름인지 확인
pub fn is_native_event(name: &str) -> bool {
    NATIVE_EVENTS.contains(&name)
}

// ============================================================================
// NativeTarget Trait
// ============================================================================

/// 네이티브 리스너를 붙일 수 있는 요소
pub trait NativeTarget: Send + Sync {
    /// 리스너 부착
    fn add_listener(&self, event: &str, callback: Handler);

    /// 부착했던 것과 동일한 함수 참조를 제거
    fn remove_listener(&self, event: &str, callback: &Handler) -> bool;

    /// 실제 이벤트 발생, 호출된 리스너 수 반환
    fn dispatch(&self, event: &str, detail: Option<Value>) -> usize;
}

// ============================================================================
// HeadlessElement
// ============================================================================

/// 메모리 내 요소
pub struct HeadlessElement {
    tag: String,
    listeners: Mutex<Vec<(String, Handler)>>,
    attributes: Mutex<HashMap<String, String>>,
    content: Mutex<String>,
}

impl HeadlessElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            listeners: Mutex::new(Vec::new()),
            attributes: Mutex::new(HashMap::new()),
            content: Mutex::new(String::new()),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_attribute(&self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.lock().insert(key.into(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<String> {
        self.attributes.lock().get(key).cloned()
    }

    pub fn set_content(&self, content: impl Into<String>) {
        *self.content.lock() = content.into();
    }

    pub fn content(&self) -> String {
        self.content.lock().clone()
    }

    /// 부착된 리스너 수
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }
}

impl NativeTarget for HeadlessElement {
    fn add_listener(&self, event: &str, callback: Handler) {
        self.listeners.lock().push((event.to_string(), callback));
    }

    fn remove_listener(&self, event: &str, callback: &Handler) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        if let Some(pos) = listeners
            .iter()
            .position(|(name, cb)| name == event && same_handler(cb, callback))
        {
            listeners.remove(pos);
        }
        listeners.len() != before
    }

    fn dispatch(&self, event: &str, detail: Option<Value>) -> usize {
        // 핸들러가 리스너를 변경할 수 있으므로 잠금 해제 후 호출
        let snapshot: Vec<Handler> = self
            .listeners
            .lock()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, cb)| cb.clone())
            .collect();

        trace!(tag = %self.tag, event, listeners = snapshot.len(), "Dispatching native event");

        let native_event = EmitterEvent::new(event, detail);
        for callback in &snapshot {
            callback(&native_event);
        }
        snapshot.len()
    }
}

impl std::fmt::Debug for HeadlessElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessElement")
            .field("tag", &self.tag)
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::types::handler;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_native_vocabulary() {
        assert!(is_native_event("click"));
        assert!(!is_native_event("navigate"));
    }

    #[test]
    fn test_headless_dispatch_and_remove() {
        let element = HeadlessElement::new("button");
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let cb = handler(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        element.add_listener("click", cb.clone());
        assert_eq!(element.dispatch("click", None), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // 다른 함수 참조로는 제거되지 않음
        let other = handler(|_| {});
        assert!(!element.remove_listener("click", &other));
        assert!(element.remove_listener("click", &cb));
        assert_eq!(element.dispatch("click", None), 0);
    }

    #[test]
    fn test_attributes_and_content() {
        let element = HeadlessElement::new("div");
        element.set_attribute("id", "main");
        element.set_content("<p>hi</p>");
        assert_eq!(element.attribute("id").as_deref(), Some("main"));
        assert_eq!(element.content(), "<p>hi</p>");
        assert_eq!(element.tag(), "div");
    }
}
