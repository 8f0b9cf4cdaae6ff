//! Debounce - 이벤트별 지연/집계 상태 머신
//!
//! 이벤트 이름마다 `Idle → Pending(accumulator, generation)` 상태를 가집니다.
//! 호출마다 generation이 증가하고, 타이머 만료 시 generation이 일치할 때만
//! flush합니다. 즉 대기 중에 들어온 호출이 타이머를 재시작합니다.

use serde_json::Value;

/// 페이로드 누적기
#[derive(Debug, Clone, Default)]
pub(crate) struct Accumulator {
    /// 객체/배열 페이로드 (배열은 펼쳐서 합침)
    objects: Vec<Value>,
    /// 원시값 페이로드
    primitives: Vec<Value>,
    /// 마지막 페이로드
    last: Option<Value>,
    aggregate: bool,
}

impl Accumulator {
    pub fn push(&mut self, payload: Option<Value>, aggregate: bool) {
        self.aggregate = aggregate;

        if !aggregate {
            self.last = payload;
            return;
        }

        match payload {
            Some(Value::Array(items)) => self.objects.extend(items),
            Some(obj @ Value::Object(_)) => self.objects.push(obj),
            Some(Value::Null) | None => {}
            Some(primitive) => {
                self.primitives.push(primitive.clone());
                self.last = Some(primitive);
            }
        }
    }

    /// 최종 페이로드
    pub fn into_payload(self) -> Option<Value> {
        if !self.aggregate {
            return self.last;
        }
        if !self.objects.is_empty() {
            Some(Value::Array(self.objects))
        } else if !self.primitives.is_empty() {
            Some(Value::Array(self.primitives))
        } else {
            None
        }
    }
}

/// 대기 중인 debounce 상태
#[derive(Debug, Default)]
pub(crate) struct Pending {
    pub accumulator: Accumulator,
    pub generation: u64,
}

impl Pending {
    /// 새 호출 반영, 이번 호출의 generation 반환
    pub fn trigger(&mut self, payload: Option<Value>, aggregate: bool) -> u64 {
        self.accumulator.push(payload, aggregate);
        self.generation += 1;
        self.generation
    }
}
