//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてキューの振る舞いを実装します。
//!
//! # 主要コンポーネント
//! - **QueueManagerBuilder**: 構築とワイヤリング
//! - **QueueManager**: submit / restart / ensure_worker_running
//! - **worker_loop**: 配送ループ（pop→get→deliver→classify）
//! - **QueueStatus**: 状態スナップショット

pub mod builder;
pub mod manager;
pub mod status;
mod worker_loop;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, QueueManagerBuilder};
pub use self::manager::QueueManager;
pub use self::status::{DeliveryCounts, QueueStatus};
