//! QueueManager - 永続キューの窓口
//!
//! # 責務
//! - payload を受け付けてストアに書き、キューに積む（submit）
//! - 起動時にストアからキューを再構築する（restart）
//! - 配送ワーカーを高々 1 つだけ動かす（ensure_worker_running）

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::builder::QueueManagerBuilder;
use super::status::{DeliveryCounters, QueueStatus};
use super::worker_loop;
use crate::domain::{Payload, PayloadKey, PostboxError, WorkerState};
use crate::ports::{KeyGenerator, KeyValueStore, TransportClient};
use crate::queue::{PayloadStore, PendingKeyQueue};

/// State shared by every `QueueManager` clone and the delivery worker.
pub(crate) struct Shared {
    store: RwLock<Option<PayloadStore>>,
    pub(crate) queue: PendingKeyQueue,
    pub(crate) transport: Arc<dyn TransportClient>,
    key_generator: Arc<dyn KeyGenerator>,
    runtime: Handle,
    running: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
    pub(crate) counters: DeliveryCounters,
}

impl Shared {
    /// Current store binding. Read per use, so `configure` takes effect for
    /// the next key the worker handles.
    pub(crate) fn store(&self) -> Option<PayloadStore> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Clears the running flag when dropped.
///
/// Owned by the worker future, so the flag is released on normal exit, on
/// panic inside the task, and when the runtime drops the task unpolled.
pub(crate) struct RunningGuard {
    shared: Arc<Shared>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
    }
}

/// Durable outbound delivery queue.
///
/// Cheap to clone; every clone drives the same queue and worker. Build one at
/// the composition root and hand clones to producers.
///
/// # 使用例
/// ```ignore
/// let manager = QueueManager::builder()
///     .transport(Arc::new(HttpTransport::new(config)?))
///     .build()?;
/// manager.configure(Arc::new(FileStore::open("postbox.json")?));
/// manager.restart()?;
/// manager.submit(&JsonPayload(event))?;
/// ```
#[derive(Clone)]
pub struct QueueManager {
    shared: Arc<Shared>,
}

impl QueueManager {
    pub fn builder() -> QueueManagerBuilder {
        QueueManagerBuilder::new()
    }

    pub(crate) fn from_parts(
        transport: Arc<dyn TransportClient>,
        key_generator: Arc<dyn KeyGenerator>,
        runtime: Handle,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                store: RwLock::new(None),
                queue: PendingKeyQueue::new(),
                transport,
                key_generator,
                runtime,
                running: AtomicBool::new(false),
                shutdown_tx,
                worker: Mutex::new(None),
                counters: DeliveryCounters::default(),
            }),
        }
    }

    /// Bind the manager to a store.
    ///
    /// Re-binding replaces the scope; entries of the old store are neither
    /// moved nor re-queued.
    pub fn configure(&self, store: Arc<dyn KeyValueStore>) {
        *self
            .shared
            .store
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(PayloadStore::new(store));
        debug!("queue manager bound to store");
    }

    /// Persist `payload` and queue it for delivery.
    ///
    /// The body is in the store before this returns, so it survives a crash
    /// right after the call. Never waits on the network; the delivery result
    /// is not reported back.
    ///
    /// # Errors
    /// - `NotConfigured` when `configure` was never called
    /// - `Serialize` when the payload cannot produce its body
    /// - `Store` when the store write fails (nothing is queued then)
    pub fn submit<P: Payload + ?Sized>(&self, payload: &P) -> Result<PayloadKey, PostboxError> {
        let store = self.shared.store().ok_or(PostboxError::NotConfigured)?;
        let body = payload.to_body()?;
        let key = self.shared.key_generator.generate();

        // ストアへの書き込みが先、キューへの追加は後
        store.put(&key, &body)?;
        self.shared.queue.push(key.clone());
        debug!(%key, bytes = body.len(), "payload stored and queued");

        self.ensure_worker_running();
        Ok(key)
    }

    /// Rebuild the queue from the store and start delivering.
    ///
    /// Meant to run once at startup so payloads persisted by an earlier
    /// process are sent. Queue order follows store enumeration order.
    /// Returns the number of recovered keys.
    pub fn restart(&self) -> Result<usize, PostboxError> {
        let store = self.shared.store().ok_or(PostboxError::NotConfigured)?;
        let keys = store.list_keys_with_prefix()?;
        let recovered = keys.len();

        self.shared.queue.replace(keys);
        info!(recovered, "pending queue rebuilt from store");

        self.ensure_worker_running();
        Ok(recovered)
    }

    /// Start the delivery worker unless one is already active.
    ///
    /// Returns `true` when this call spawned the worker. Concurrent callers
    /// race on a compare-and-set, so at most one of them wins. Never spawns
    /// after `shutdown`.
    pub fn ensure_worker_running(&self) -> bool {
        let shared = &self.shared;
        if *shared.shutdown_tx.borrow() {
            debug!("shutdown requested; not starting delivery worker");
            return false;
        }
        if shared
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        DeliveryCounters::bump(&shared.counters.workers_started);
        let guard = RunningGuard {
            shared: Arc::clone(shared),
        };
        let shutdown_rx = shared.shutdown_tx.subscribe();
        let join = shared
            .runtime
            .spawn(worker_loop::run(Arc::clone(shared), guard, shutdown_rx));

        // 前のワーカーは終了済み（running が false だった）なので上書きしてよい
        *shared.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(join);
        true
    }

    /// Ask the worker to stop at its next dequeue.
    ///
    /// An in-flight delivery is not cancelled; it is classified first.
    pub fn shutdown(&self) {
        self.shared.shutdown_tx.send_replace(true);
        info!("queue manager shutdown requested");
    }

    /// `shutdown`, then wait for the active worker (if any) to exit.
    pub async fn shutdown_and_join(&self) {
        self.shutdown();
        let join = self
            .shared
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(join) = join
            && let Err(e) = join.await
        {
            warn!(error = %e, "delivery worker ended abnormally");
        }
    }

    pub fn status(&self) -> QueueStatus {
        let shared = &self.shared;
        let stored = shared
            .store()
            .and_then(|store| store.list_keys_with_prefix().ok())
            .map(|keys| keys.len());

        QueueStatus {
            pending: shared.queue.len(),
            stored,
            worker: WorkerState::from_running(shared.running.load(Ordering::Acquire)),
            shutdown_requested: *shared.shutdown_tx.borrow(),
            counts: shared.counters.snapshot(),
        }
    }

    /// Keys currently waiting, head first.
    pub fn pending_keys(&self) -> Vec<PayloadKey> {
        self.shared.queue.snapshot()
    }

    pub fn is_worker_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for QueueManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueManager")
            .field("pending", &self.shared.queue.len())
            .field("worker_running", &self.is_worker_running())
            .finish_non_exhaustive()
    }
}
