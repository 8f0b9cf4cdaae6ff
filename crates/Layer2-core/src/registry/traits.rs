//! Registry Traits - 레지스트리가 생성/로드하는 대상의 인터페이스

use super::entry::ClassKind;
use crate::view::View;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::any::Any;
use std::sync::Arc;
use zeyon_foundation::{Emitter, Result};

/// 생성 옵션 (등록 메타데이터 + 호출자 옵션)
pub type Options = Map<String, Value>;

/// 등록 id로 생성되는 클래스 생성자
pub type Constructor = Arc<dyn Fn(Options) -> Result<Box<dyn Component>> + Send + Sync>;

/// 클로저를 Constructor로 변환
pub fn constructor<F>(f: F) -> Constructor
where
    F: Fn(Options) -> Result<Box<dyn Component>> + Send + Sync + 'static,
{
    Arc::new(f)
}

// ============================================================================
// Component - 레지스트리로 생성 가능한 객체
// ============================================================================

/// 레지스트리가 생성하는 다형 객체 (Model, Collection, View, RouteView, ...)
pub trait Component: Send + Sync {
    /// 생성에 사용된 등록 id
    fn registration_id(&self) -> &str;

    /// 클래스 종류
    fn kind(&self) -> ClassKind;

    /// 내장 Emitter
    fn emitter(&self) -> &Emitter;

    /// 다운캐스트용
    fn as_any(&self) -> &dyn Any;

    /// View 계열이면 내장 View
    fn view(&self) -> Option<&View> {
        None
    }

    /// Router가 라우트 진입/쿼리 변경 시 호출
    fn on_route(&self, _params: &Options, _query: &Options) {}

    /// 해제 (멱등)
    fn destroy(&self) {
        self.emitter().destroy();
    }
}

impl dyn Component {
    /// 구체 타입으로 다운캐스트
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

// ============================================================================
// ModuleLoader - 동적 모드 로더
// ============================================================================

/// 로드 경로에서 생성자를 가져오는 로더 (동적 모드)
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// 로더 이름 (디버깅용)
    fn name(&self) -> &str;

    /// 경로의 모듈을 로드해 생성자 반환
    async fn load(&self, path: &str) -> Result<Constructor>;
}
