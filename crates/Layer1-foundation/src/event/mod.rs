//! Event System - 검증된 이벤트 이름 기반 발행/구독
//!
//! 모든 컴포넌트(Model, Collection, View, Router)가 Emitter를 하나씩 내장하고
//! 자신의 도메인 이벤트를 발행합니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Emitter                              │
//! │  valid_events: { "*", "destroyed", ...declared, ...native }  │
//! │                                                              │
//! │  emit("change") ───────────────────────────────────────┐     │
//! │         │                                               │     │
//! │         ▼                                               ▼     │
//! │  ┌──────────────┐  ┌──────────────┐         ┌──────────────┐ │
//! │  │ "change" #1  │─▶│ "change" #2  │── ... ─▶│    "*" #1    │ │
//! │  └──────────────┘  └──────────────┘         └──────────────┘ │
//! │                                                              │
//! │  debounced_emit("change") ─▶ Pending(acc, gen) ─▶ emit       │
//! │  on("click") ─▶ NativeTarget (HeadlessElement)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 사용법
//!
//! ```ignore
//! use zeyon_foundation::event::{handler, Emitter, OffFilter};
//!
//! let emitter = Emitter::new("model", ["change"]);
//!
//! // 1. 리스너 등록
//! let listener = emitter.on("change", handler(|e| println!("{:?}", e.detail)), None);
//!
//! // 2. 이벤트 발행
//! emitter.emit("change", Some(serde_json::json!({ "a": 1 })));
//!
//! // 3. 지연 발행 (50ms 안의 호출을 하나로 합침)
//! emitter.debounced_emit("change", Some(serde_json::json!({ "b": 2 })), true);
//!
//! // 4. 해제
//! emitter.off(OffFilter::new().event("change"));
//! emitter.destroy();
//! ```

mod debounce;
pub mod emitter;
mod listener;
pub mod native;
pub mod types;

// Re-exports
pub use emitter::{Emitter, EmitterBuilder, BUILTIN_EVENTS};
pub use listener::ListenerHandle;
pub use native::{is_native_event, HeadlessElement, NativeTarget, NATIVE_EVENTS};
pub use types::{
    handler, same_handler, EmitterEvent, EventId, Handler, ListenerId, OffFilter, SubscriberId,
};
