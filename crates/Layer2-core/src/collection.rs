//! Collection - 순서 있는 Model 목록
//!
//! 옵션 키:
//! - `model`: 항목 Model의 등록 id (기본 `"model"`). 전역 레지스트리에 Model로
//!   등록된 id면 그 meta의 `defaults`가 항목 기본 속성의 바탕이 됩니다.
//! - `models`: 초기 항목 속성 배열
//! - `defaults`: 항목 Model에 전달되는 기본 속성 (등록 meta보다 우선)

use crate::model::{object_option, Model};
use crate::registry::{constructor, global_registry, ClassKind, Component, Constructor, Options};
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::any::Any;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};
use zeyon_foundation::strings::{EVENT_ADD, EVENT_CHANGE, EVENT_REMOVE, EVENT_RESET, EVENT_SORT};
use zeyon_foundation::{handler, Emitter, EmitterEvent, ListenerHandle, SubscriberId};

const DEFAULT_MODEL_ID: &str = "model";

pub struct Collection {
    registration_id: String,
    emitter: Emitter,
    model_id: String,
    model_defaults: Map<String, Value>,
    models: RwLock<Vec<Member>>,
    /// 항목 Model의 `change` 구독 소유자
    subscriber: SubscriberId,
}

/// 컬렉션 안의 한 자리
///
/// 같은 Model이 여러 번 들어 있어도 자리마다 구독이 따로 있습니다.
struct Member {
    model: Arc<Model>,
    forward: Option<ListenerHandle>,
}

impl Member {
    fn release(self) -> Arc<Model> {
        if let Some(handle) = self.forward {
            handle.off();
        }
        self.model
    }
}

impl Collection {
    pub fn new(registration_id: impl Into<String>, options: Options) -> Self {
        let registration_id = registration_id.into();
        let emitter = Emitter::new(
            &registration_id,
            [EVENT_ADD, EVENT_REMOVE, EVENT_RESET, EVENT_CHANGE, EVENT_SORT],
        );

        let model_id = options
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_MODEL_ID)
            .to_string();
        let mut model_defaults = registered_defaults(&model_id);
        model_defaults.extend(object_option(&options, "defaults"));

        let collection = Self {
            model_id,
            model_defaults,
            registration_id,
            emitter,
            models: RwLock::new(Vec::new()),
            subscriber: SubscriberId::new(),
        };

        let initial: Vec<Member> = options
            .get("models")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .map(|attrs| collection.member(Arc::new(collection.build_model(attrs.clone()))))
            .collect();
        *collection.models.write() = initial;

        collection
    }

    /// 레지스트리 등록용 생성자
    pub fn constructor(registration_id: impl Into<String>) -> Constructor {
        let id = registration_id.into();
        constructor(move |options| {
            Ok(Box::new(Collection::new(id.clone(), options)) as Box<dyn Component>)
        })
    }

    fn build_model(&self, attributes: Map<String, Value>) -> Model {
        let mut options = Options::new();
        options.insert("defaults".into(), Value::Object(self.model_defaults.clone()));
        options.insert("attributes".into(), Value::Object(attributes));
        Model::new(&self.model_id, options)
    }

    /// 항목 `change`를 컬렉션 `change`로 전달하는 자리 생성
    fn member(&self, model: Arc<Model>) -> Member {
        let emitter = self.emitter.clone();
        let model_id = model.registration_id().to_string();
        let forward = model.emitter().on(
            EVENT_CHANGE,
            handler(move |e: &EmitterEvent| {
                emitter.emit(
                    EVENT_CHANGE,
                    Some(json!({ "model": model_id, "detail": e.detail })),
                );
            }),
            Some(self.subscriber),
        );
        Member { model, forward }
    }

    /// 항목 추가, 인덱스 반환
    pub fn add(&self, model: Arc<Model>) -> usize {
        let member = self.member(Arc::clone(&model));
        let index = {
            let mut models = self.models.write();
            models.push(member);
            models.len() - 1
        };

        self.emitter.emit(
            EVENT_ADD,
            Some(json!({ "index": index, "model": model.to_json() })),
        );
        index
    }

    /// 속성으로 항목 Model을 만들어 추가
    pub fn add_attributes(&self, attributes: Map<String, Value>) -> Arc<Model> {
        let model = Arc::new(self.build_model(attributes));
        self.add(Arc::clone(&model));
        model
    }

    /// 인덱스의 항목 제거
    pub fn remove(&self, index: usize) -> Option<Arc<Model>> {
        let removed = {
            let mut models = self.models.write();
            (index < models.len()).then(|| models.remove(index))
        }?
        .release();

        self.emitter.emit(
            EVENT_REMOVE,
            Some(json!({ "index": index, "model": removed.to_json() })),
        );
        Some(removed)
    }

    /// 조건에 맞는 항목 모두 제거
    pub fn remove_where<F>(&self, predicate: F) -> Vec<Arc<Model>>
    where
        F: Fn(&Model) -> bool,
    {
        let mut removed = Vec::new();
        while let Some(index) = self.position(&predicate) {
            if let Some(model) = self.remove(index) {
                removed.push(model);
            }
        }
        removed
    }

    /// 전체 교체 후 `reset` 발행
    pub fn reset(&self, models: Vec<Arc<Model>>) {
        let members = models.into_iter().map(|m| self.member(m)).collect();
        let previous = std::mem::replace(&mut *self.models.write(), members);
        for member in previous {
            member.release();
        }

        let count = self.len();
        debug!(collection = %self.registration_id, count, "Collection reset");
        self.emitter.emit(EVENT_RESET, Some(json!({ "count": count })));
    }

    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Arc<Model>> {
        self.models.read().get(index).map(|m| Arc::clone(&m.model))
    }

    pub fn models(&self) -> Vec<Arc<Model>> {
        self.models.read().iter().map(|m| Arc::clone(&m.model)).collect()
    }

    pub fn find<F>(&self, predicate: F) -> Option<Arc<Model>>
    where
        F: Fn(&Model) -> bool,
    {
        self.models
            .read()
            .iter()
            .find(|m| predicate(&m.model))
            .map(|m| Arc::clone(&m.model))
    }

    fn position<F>(&self, predicate: &F) -> Option<usize>
    where
        F: Fn(&Model) -> bool,
    {
        self.models.read().iter().position(|m| predicate(&m.model))
    }

    /// 속성 값 기준 정렬 (값이 없는 항목은 뒤로) 후 `sort` 발행
    pub fn sort_by_key(&self, attribute: &str) {
        self.models.write().sort_by(|a, b| {
            compare_values(
                a.model.get(attribute).as_ref(),
                b.model.get(attribute).as_ref(),
            )
        });
        self.emitter
            .emit(EVENT_SORT, Some(json!({ "key": attribute })));
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.models.read().iter().map(|m| m.model.to_json()).collect())
    }
}

/// 전역 레지스트리에 Model로 등록된 id면 그 meta의 `defaults`
fn registered_defaults(model_id: &str) -> Map<String, Value> {
    let Ok(registry) = global_registry() else {
        return Map::new();
    };
    match registry.get_entry(model_id) {
        Some(entry) if entry.kind == ClassKind::Model => object_option(&entry.meta, "defaults"),
        Some(entry) => {
            warn!(id = model_id, kind = %entry.kind, "Collection member id is not a model");
            Map::new()
        }
        None => Map::new(),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

impl Component for Collection {
    fn registration_id(&self) -> &str {
        &self.registration_id
    }

    fn kind(&self) -> ClassKind {
        ClassKind::Collection
    }

    fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    /// 항목 구독을 해제한 뒤 자신의 Emitter 해제 (항목 Model은 유지)
    fn destroy(&self) {
        for member in self.models.write().iter_mut() {
            if let Some(handle) = member.forward.take() {
                handle.off();
            }
        }
        self.emitter.destroy();
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("registration_id", &self.registration_id)
            .field("len", &self.len())
            .finish()
    }
}
