//! State - 配送ワーカーの状態

use serde::{Deserialize, Serialize};

/// WorkerState は配送ワーカーの状態を表現
///
/// # 状態遷移
/// - Idle -> Draining: ワーカー起動（submit / restart / ensure_worker_running）
/// - Draining -> Draining: 配送成功・拒否・本体なし（次のキーへ）
/// - Draining -> Idle: 一時的失敗、または shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Idle,
    Draining,
}

impl WorkerState {
    pub fn from_running(running: bool) -> Self {
        if running {
            WorkerState::Draining
        } else {
            WorkerState::Idle
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, WorkerState::Draining)
    }
}
