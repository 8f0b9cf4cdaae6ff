//! Model - 속성 저장소 + 변경 이벤트
//!
//! 옵션 키:
//! - `defaults`: 기본 속성 (보통 등록 메타데이터에서 옴)
//! - `attributes`: 초기 속성 (기본값 위에 덮어씀)

use crate::registry::{constructor, ClassKind, Component, Constructor, Options};
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::any::Any;
use tracing::debug;
use zeyon_foundation::strings::{EVENT_CHANGE, EVENT_RESET};
use zeyon_foundation::Emitter;

/// 속성별 변경 이벤트 이름 (`change:<attr>`)
pub fn change_event(attribute: &str) -> String {
    format!("{}:{}", EVENT_CHANGE, attribute)
}

pub struct Model {
    registration_id: String,
    emitter: Emitter,
    defaults: Map<String, Value>,
    attributes: RwLock<Map<String, Value>>,
}

impl Model {
    pub fn new(registration_id: impl Into<String>, options: Options) -> Self {
        let registration_id = registration_id.into();
        let defaults = object_option(&options, "defaults");

        let mut attributes = defaults.clone();
        attributes.extend(object_option(&options, "attributes"));

        let emitter = Emitter::new(&registration_id, [EVENT_CHANGE, EVENT_RESET]);
        emitter.extend_valid_events(attributes.keys().map(|k| change_event(k)));

        Self {
            registration_id,
            emitter,
            defaults,
            attributes: RwLock::new(attributes),
        }
    }

    /// 레지스트리 등록용 생성자
    pub fn constructor(registration_id: impl Into<String>) -> Constructor {
        let id = registration_id.into();
        constructor(move |options| Ok(Box::new(Model::new(id.clone(), options)) as Box<dyn Component>))
    }

    /// 아직 값이 없는 속성의 `change:<attr>` 구독을 허용
    pub fn declare_attribute(&self, attribute: &str) {
        self.emitter.extend_valid_events([change_event(attribute)]);
    }

    pub fn get(&self, attribute: &str) -> Option<Value> {
        self.attributes.read().get(attribute).cloned()
    }

    pub fn has(&self, attribute: &str) -> bool {
        self.attributes
            .read()
            .get(attribute)
            .is_some_and(|v| !v.is_null())
    }

    /// 속성 하나 설정, 값이 실제로 바뀐 경우에만 이벤트 발행
    pub fn set(&self, attribute: &str, value: Value) -> bool {
        let mut changes = Map::new();
        changes.insert(attribute.to_string(), value);
        !self.set_many(changes).is_empty()
    }

    /// 여러 속성 설정, 바뀐 속성 이름 반환
    ///
    /// 바뀐 속성마다 `change:<attr>`를 발행한 뒤 `change`를 한 번 발행합니다.
    pub fn set_many(&self, changes: Map<String, Value>) -> Vec<String> {
        let mut changed = Vec::new();
        let mut previous = Map::new();
        {
            let mut attributes = self.attributes.write();
            for (key, value) in changes {
                let old = attributes.get(&key).cloned().unwrap_or(Value::Null);
                if old == value {
                    continue;
                }
                attributes.insert(key.clone(), value);
                previous.insert(key.clone(), old);
                changed.push(key);
            }
        }

        if changed.is_empty() {
            return changed;
        }

        self.emitter
            .extend_valid_events(changed.iter().map(|k| change_event(k)));
        self.notify_changes(&changed, previous);
        changed
    }

    /// 속성 제거
    pub fn unset(&self, attribute: &str) -> bool {
        let old = self.attributes.write().remove(attribute);
        match old {
            Some(old) => {
                let changed = vec![attribute.to_string()];
                let mut previous = Map::new();
                previous.insert(attribute.to_string(), old);
                self.notify_changes(&changed, previous);
                true
            }
            None => false,
        }
    }

    /// 기본값 + 주어진 속성으로 초기화 후 `reset` 발행
    pub fn reset(&self, attributes: Option<Map<String, Value>>) {
        let mut next = self.defaults.clone();
        next.extend(attributes.unwrap_or_default());
        self.emitter.extend_valid_events(next.keys().map(|k| change_event(k)));
        *self.attributes.write() = next;

        debug!(model = %self.registration_id, "Model reset");
        self.emitter.emit(EVENT_RESET, Some(self.to_json()));
    }

    pub fn attributes(&self) -> Map<String, Value> {
        self.attributes.read().clone()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes())
    }

    fn notify_changes(&self, changed: &[String], previous: Map<String, Value>) {
        let mut current = Map::new();
        for key in changed {
            let value = self.get(key).unwrap_or(Value::Null);
            self.emitter.emit(
                &change_event(key),
                Some(json!({
                    "attribute": key,
                    "value": value,
                    "previous": previous.get(key).cloned().unwrap_or(Value::Null),
                })),
            );
            current.insert(key.clone(), value);
        }
        self.emitter
            .emit(EVENT_CHANGE, Some(json!({ "changed": current })));
    }
}

impl Component for Model {
    fn registration_id(&self) -> &str {
        &self.registration_id
    }

    fn kind(&self) -> ClassKind {
        ClassKind::Model
    }

    fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("registration_id", &self.registration_id)
            .field("attributes", &*self.attributes.read())
            .finish()
    }
}

/// 옵션에서 객체 값 꺼내기 (없거나 객체가 아니면 빈 맵)
pub(crate) fn object_option(options: &Options, key: &str) -> Map<String, Value> {
    options
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use zeyon_foundation::{handler, EmitterEvent};

    fn options(value: Value) -> Options {
        value.as_object().cloned().unwrap_or_default()
    }

    fn record(model: &Model, event: &str) -> Arc<Mutex<Vec<Option<Value>>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = log.clone();
        model
            .emitter()
            .on(event, handler(move |e: &EmitterEvent| l.lock().push(e.detail.clone())), None)
            .unwrap();
        log
    }

    #[test]
    fn test_defaults_and_attributes() {
        let model = Model::new(
            "user",
            options(json!({
                "defaults": { "role": "guest", "active": false },
                "attributes": { "name": "zeyon", "active": true }
            })),
        );

        assert_eq!(model.get("role"), Some(json!("guest")));
        assert_eq!(model.get("active"), Some(json!(true)));
        assert_eq!(model.get("name"), Some(json!("zeyon")));
        assert!(model.has("name"));
        assert!(!model.has("missing"));
    }

    #[test]
    fn test_set_emits_only_on_change() {
        let model = Model::new("user", options(json!({ "attributes": { "name": "a" } })));
        let changes = record(&model, "change");
        let names = record(&model, "change:name");

        assert!(!model.set("name", json!("a")));
        assert!(changes.lock().is_empty());

        assert!(model.set("name", json!("b")));
        assert_eq!(changes.lock().len(), 1);
        assert_eq!(
            names.lock()[0],
            Some(json!({ "attribute": "name", "value": "b", "previous": "a" }))
        );
    }

    #[test]
    fn test_set_many_single_change_event() {
        let model = Model::new("user", Options::new());
        let changes = record(&model, "change");

        let changed = model.set_many(options(json!({ "a": 1, "b": 2 })));
        assert_eq!(changed.len(), 2);
        assert_eq!(changes.lock().len(), 1);
        assert_eq!(
            changes.lock()[0],
            Some(json!({ "changed": { "a": 1, "b": 2 } }))
        );
    }

    #[test]
    fn test_declared_attribute_listener() {
        let model = Model::new("user", Options::new());
        assert!(model.emitter().on("change:email", handler(|_| {}), None).is_none());

        model.declare_attribute("email");
        let log = record(&model, "change:email");
        model.set("email", json!("a@b.c"));
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_unset_and_reset() {
        let model = Model::new(
            "user",
            options(json!({ "defaults": { "role": "guest" }, "attributes": { "name": "x" } })),
        );
        let resets = record(&model, "reset");

        assert!(model.unset("name"));
        assert!(!model.unset("name"));
        assert_eq!(model.get("name"), None);

        model.set("role", json!("admin"));
        model.reset(None);
        assert_eq!(model.to_json(), json!({ "role": "guest" }));
        assert_eq!(resets.lock().len(), 1);
    }

    #[test]
    fn test_destroy_via_component() {
        let model = Model::new("user", Options::new());
        let component: &dyn Component = &model;
        component.destroy();
        component.destroy();
        assert!(model.emitter().is_destroyed());
        assert_eq!(component.kind(), ClassKind::Model);
    }
}
