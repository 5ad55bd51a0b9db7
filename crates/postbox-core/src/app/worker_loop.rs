//! WorkerLoop - 配送ループ
//!
//! # フロー
//! 1. PendingKeyQueue::pop() でキーを待つ（shutdown と競合）
//! 2. PayloadStore::get() で本体を取得
//! 3. TransportClient::deliver() で送信
//! 4. DeliveryOutcome で分類
//!    - Delivered / Rejected: ストアから削除して次へ
//!    - Transient: キュー末尾に戻してループ終了

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::manager::{RunningGuard, Shared};
use super::status::DeliveryCounters;
use crate::domain::{DeliveryOutcome, ErrorKind, PayloadKey};
use crate::queue::PayloadStore;

/// Why the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WorkerExit {
    Shutdown,
    /// The key went back to the queue tail; a later trigger retries it.
    TransientFailure(PayloadKey),
    /// No store bound; the key went back to the queue tail.
    Unconfigured(PayloadKey),
}

/// What to do after handling one key.
enum Step {
    Next,
    Requeue,
}

/// Body of the delivery task. `_running` is released when this returns or
/// unwinds.
pub(crate) async fn run(
    shared: Arc<Shared>,
    _running: RunningGuard,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!("delivery worker started");
    let exit = drain(&shared, &mut shutdown_rx).await;
    match &exit {
        WorkerExit::Shutdown => info!("delivery worker stopped by shutdown"),
        WorkerExit::TransientFailure(key) => {
            info!(%key, "delivery worker stopped after transient failure")
        }
        WorkerExit::Unconfigured(key) => {
            warn!(%key, "delivery worker stopped: no store configured")
        }
    }
}

async fn drain(shared: &Shared, shutdown_rx: &mut watch::Receiver<bool>) -> WorkerExit {
    loop {
        // shutdown が来ていたら抜ける
        if *shutdown_rx.borrow() {
            return WorkerExit::Shutdown;
        }

        let key = tokio::select! {
            biased;
            changed = shutdown_rx.changed() => {
                // sender が drop された = manager ごと消えた
                if changed.is_err() {
                    return WorkerExit::Shutdown;
                }
                continue;
            }
            key = shared.queue.pop() => key,
        };
        debug!(%key, "got a payload to send");

        let Some(store) = shared.store() else {
            shared.queue.push(key.clone());
            return WorkerExit::Unconfigured(key);
        };

        match deliver_one(shared, &store, &key).await {
            Step::Next => {}
            Step::Requeue => {
                shared.queue.push(key.clone());
                DeliveryCounters::bump(&shared.counters.requeued);
                return WorkerExit::TransientFailure(key);
            }
        }
    }
}

async fn deliver_one(shared: &Shared, store: &PayloadStore, key: &PayloadKey) -> Step {
    let body = match store.get(key) {
        Ok(Some(body)) => body,
        Ok(None) => {
            // 同時に削除された、またはそもそも無い
            debug!(%key, "stored payload is gone; dropping key");
            DeliveryCounters::bump(&shared.counters.dropped);
            return Step::Next;
        }
        Err(err) if err.kind() == ErrorKind::Permanent => {
            warn!(%key, error = %err, "stored payload is corrupt; discarding");
            remove_entry(store, key);
            DeliveryCounters::bump(&shared.counters.dropped);
            return Step::Next;
        }
        Err(err) => {
            warn!(%key, error = %err, "failed to read stored payload; placing back in queue");
            return Step::Requeue;
        }
    };

    // ここから先はネットワーク（await がある）
    let result = shared.transport.deliver(&body).await;

    match DeliveryOutcome::classify(&result) {
        DeliveryOutcome::Delivered => {
            info!(%key, status = ?result.as_ref().ok(), "payload delivered");
            remove_entry(store, key);
            DeliveryCounters::bump(&shared.counters.delivered);
            Step::Next
        }
        DeliveryOutcome::Rejected => {
            warn!(%key, status = ?result.as_ref().ok(), "payload rejected by endpoint; discarding");
            remove_entry(store, key);
            DeliveryCounters::bump(&shared.counters.rejected);
            Step::Next
        }
        DeliveryOutcome::Transient => {
            match &result {
                Ok(status) => {
                    warn!(%key, %status, "unable to deliver payload; placing back in queue")
                }
                Err(err) => {
                    warn!(%key, error = %err, "unable to deliver payload; placing back in queue")
                }
            }
            Step::Requeue
        }
    }
}

/// A failed removal leaves the entry in the store; `restart` recovers it.
fn remove_entry(store: &PayloadStore, key: &PayloadKey) {
    if let Err(err) = store.remove(key) {
        warn!(%key, error = %err, "failed to remove stored payload");
    }
}
