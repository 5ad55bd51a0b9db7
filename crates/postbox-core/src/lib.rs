//! postbox-core
//!
//! Durable outbound delivery queue: payloads are written to a key/value store,
//! queued in memory, and delivered by a single background worker.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（key, payload, outcome, state, errors）
//! - **ports**: 抽象化レイヤー（KeyValueStore, TransportClient, KeyGenerator）
//! - **queue**: PendingKeyQueue と PayloadStore アダプタ
//! - **app**: QueueManager と配送ループ
//! - **impls**: 実装（InMemoryStore, FileStore, HttpTransport）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod queue;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::{BuildError, QueueManager, QueueManagerBuilder, QueueStatus};
pub use domain::{
    DeliveryOutcome, JsonPayload, Payload, PayloadKey, PostboxError, RawPayload, StatusCode,
    StoreError, TransportError, WorkerState,
};
