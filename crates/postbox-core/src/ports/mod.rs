//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 永続化ストアと送信クライアントは外部の協力者で、ここではインターフェース
//! だけを決めます。
//!
//! # 設計原則
//! - ストアが正本（source of truth）、キューは key だけを運ぶ
//! - 送信結果は status code だけを返す（分類は domain::outcome）

pub mod key_generator;
pub mod key_value_store;
pub mod transport;

// 主要な trait を再エクスポート
pub use self::key_generator::{KeyGenerator, UuidKeyGenerator};
pub use self::key_value_store::KeyValueStore;
pub use self::transport::TransportClient;
