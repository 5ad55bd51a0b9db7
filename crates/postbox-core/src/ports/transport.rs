//! TransportClient port - リモートへの送信（外部）
//!
//! # 実装
//! - **HttpTransport**: reqwest による POST（feature `http`）
//! - テストでは台本どおりの status を返す ScriptedTransport を使う

use async_trait::async_trait;

use crate::domain::{StatusCode, TransportError};

/// TransportClient は serialized body を 1 件送り、status を返す
///
/// Timeouts belong to the implementation. A request that never produced a
/// status is reported as `Err` and the worker treats it as transient.
#[async_trait]
pub trait TransportClient: Send + Sync {
    async fn deliver(&self, body: &str) -> Result<StatusCode, TransportError>;
}
