//! QueueManagerBuilder - QueueManager の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）

use std::sync::Arc;

use tokio::runtime::Handle;

use super::manager::QueueManager;
use crate::ports::{KeyGenerator, KeyValueStore, TransportClient, UuidKeyGenerator};

/// QueueManagerBuilder は QueueManager を構築
///
/// # 使用例
/// ```ignore
/// let manager = QueueManager::builder()
///     .transport(Arc::new(transport))
///     .store(Arc::new(FileStore::open(path)?))
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - transport が無ければ BuildError::MissingTransport
/// - tokio runtime が見つからなければ BuildError::NoRuntime
#[derive(Default)]
pub struct QueueManagerBuilder {
    transport: Option<Arc<dyn TransportClient>>,
    key_generator: Option<Arc<dyn KeyGenerator>>,
    store: Option<Arc<dyn KeyValueStore>>,
    runtime: Option<Handle>,
}

/// BuildError は QueueManager 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no transport client was given")]
    MissingTransport,

    #[error("no tokio runtime handle was given and none is current: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

impl QueueManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client used by the delivery worker. Required.
    pub fn transport(mut self, transport: Arc<dyn TransportClient>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Source of payload keys. Defaults to [`UuidKeyGenerator`].
    pub fn key_generator(mut self, key_generator: Arc<dyn KeyGenerator>) -> Self {
        self.key_generator = Some(key_generator);
        self
    }

    /// Store to bind right away, same as calling `configure` after `build`.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Runtime the worker is spawned on. Defaults to the current runtime.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> Result<QueueManager, BuildError> {
        let transport = self.transport.ok_or(BuildError::MissingTransport)?;
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current()?,
        };
        let key_generator = self
            .key_generator
            .unwrap_or_else(|| Arc::new(UuidKeyGenerator));

        let manager = QueueManager::from_parts(transport, key_generator, runtime);
        if let Some(store) = self.store {
            manager.configure(store);
        }
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StatusCode;
    use crate::test_support::ScriptedTransport;

    #[test]
    fn build_without_transport_fails() {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let result = QueueManagerBuilder::new()
            .runtime(runtime.handle().clone())
            .build();
        assert!(matches!(result, Err(BuildError::MissingTransport)));
    }

    #[test]
    fn build_outside_runtime_fails() {
        let result = QueueManagerBuilder::new()
            .transport(Arc::new(ScriptedTransport::always(StatusCode::OK)))
            .build();
        assert!(matches!(result, Err(BuildError::NoRuntime(_))));
    }

    #[test]
    fn explicit_handle_works_outside_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap();
        let manager = QueueManagerBuilder::new()
            .transport(Arc::new(ScriptedTransport::always(StatusCode::OK)))
            .runtime(runtime.handle().clone())
            .build()
            .unwrap();
        assert!(!manager.is_worker_running());
        assert_eq!(manager.status().stored, None);
    }

    #[tokio::test]
    async fn store_option_configures_manager() {
        let manager = QueueManager::builder()
            .transport(Arc::new(ScriptedTransport::always(StatusCode::OK)))
            .store(Arc::new(crate::impls::InMemoryStore::new()))
            .build()
            .unwrap();
        assert_eq!(manager.status().stored, Some(0));
    }
}
