//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryStore**: 開発・テスト用の KeyValueStore
//! - **FileStore**: JSON ファイルに保存する KeyValueStore
//! - **HttpTransport**: reqwest による TransportClient（feature `http`）

pub mod file_store;
#[cfg(feature = "http")]
pub mod http_transport;
pub mod memory_store;

// 主要な型を再エクスポート
pub use self::file_store::FileStore;
#[cfg(feature = "http")]
pub use self::http_transport::{HttpTransport, HttpTransportConfig};
pub use self::memory_store::InMemoryStore;
