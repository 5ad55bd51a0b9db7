//! Status - キューとワーカーの状態スナップショット

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::domain::WorkerState;

/// Point-in-time view of a `QueueManager`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    /// Keys waiting in the in-memory queue.
    pub pending: usize,

    /// Payload entries in the store, `None` when no store is configured or
    /// the store could not be listed.
    pub stored: Option<usize>,

    pub worker: WorkerState,

    pub shutdown_requested: bool,

    pub counts: DeliveryCounts,
}

/// Cumulative counters since the manager was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryCounts {
    pub delivered: u64,
    pub rejected: u64,
    pub requeued: u64,
    /// Keys dropped because their entry was missing or corrupt.
    pub dropped: u64,
    pub workers_started: u64,
}

#[derive(Debug, Default)]
pub(crate) struct DeliveryCounters {
    pub(crate) delivered: AtomicU64,
    pub(crate) rejected: AtomicU64,
    pub(crate) requeued: AtomicU64,
    pub(crate) dropped: AtomicU64,
    pub(crate) workers_started: AtomicU64,
}

impl DeliveryCounters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DeliveryCounts {
        DeliveryCounts {
            delivered: self.delivered.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            requeued: self.requeued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            workers_started: self.workers_started.load(Ordering::Relaxed),
        }
    }
}
