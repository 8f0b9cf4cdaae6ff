//! Module Loader - 동적 모드에서 로드 경로를 생성자로 바꾸는 테이블

use super::traits::{Constructor, ModuleLoader};
use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;
use zeyon_foundation::{Error, Result};

/// 경로별 비동기 팩토리
pub type ModuleFactory = Arc<dyn Fn() -> BoxFuture<'static, Result<Constructor>> + Send + Sync>;

/// 프로세스 내 모듈 테이블
///
/// 코드 분할된 번들의 청크 로드를 대신합니다. 경로마다 비동기 팩토리를
/// 등록해 두고 `load` 시점에 실행합니다.
pub struct ModuleTable {
    name: String,
    modules: RwLock<HashMap<String, ModuleFactory>>,
    load_count: AtomicUsize,
}

impl ModuleTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: RwLock::new(HashMap::new()),
            load_count: AtomicUsize::new(0),
        }
    }

    /// 비동기 팩토리 등록
    pub fn register<F>(&self, path: impl Into<String>, factory: F)
    where
        F: Fn() -> BoxFuture<'static, Result<Constructor>> + Send + Sync + 'static,
    {
        self.modules.write().insert(path.into(), Arc::new(factory));
    }

    /// 이미 준비된 생성자 등록
    pub fn register_ready(&self, path: impl Into<String>, ctor: Constructor) {
        self.register(path, move || {
            let ctor = Arc::clone(&ctor);
            Box::pin(async move { Ok(ctor) })
        });
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.read().contains_key(path)
    }

    /// 실행된 로드 횟수
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModuleLoader for ModuleTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self, path: &str) -> Result<Constructor> {
        let factory = self
            .modules
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("module '{}'", path)))?;

        self.load_count.fetch_add(1, Ordering::SeqCst);
        debug!(loader = %self.name, path, "Loading module");
        factory().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::registry::traits::{constructor, Component};

    #[tokio::test]
    async fn test_load_registered_module() {
        let table = ModuleTable::new("chunks");
        table.register_ready(
            "model/user",
            constructor(|opts| Ok(Box::new(Model::new("user", opts)) as Box<dyn Component>)),
        );

        assert!(table.contains("model/user"));
        let ctor = table.load("model/user").await.unwrap();
        let component = ctor(Default::default()).unwrap();
        assert_eq!(component.registration_id(), "user");
        assert_eq!(table.load_count(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_module() {
        let table = ModuleTable::new("chunks");
        let result = table.load("view/missing").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(table.load_count(), 0);
    }
}
