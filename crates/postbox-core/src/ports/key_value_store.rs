//! KeyValueStore port - 永続化ストア（外部）
//!
//! KeyValueStore は key → 文字列の永続マップです。
//! 同じストアを他の用途と共有してもよい（payload キーは prefix で区別）。
//!
//! # 実装
//! - **InMemoryStore**: テスト・開発用
//! - **FileStore**: JSON ファイル（atomic rename）

use crate::domain::StoreError;

/// KeyValueStore はプロセス再起動を越えて値を保持する
///
/// # 設計原則
/// - 同期 API（呼び出し元から見て完了してから返る）
/// - 各操作は個別に atomic（途中状態は観測されない）
/// - 複数スレッドからの同時アクセスに耐える（`Send + Sync`）
pub trait KeyValueStore: Send + Sync {
    /// Write `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Read the value under `key`, `None` when there is no entry.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Remove the entry under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Every key currently in the store, in the store's own enumeration order.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}
