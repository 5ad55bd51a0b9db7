//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::{PayloadKey, StatusCode, TransportError};
use crate::ports::{KeyGenerator, TransportClient};

/// Transport that answers from a script, then with a default status.
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<StatusCode, TransportError>>>,
    default_status: StatusCode,
    delivered: Mutex<Vec<String>>,
    gate: Option<watch::Sender<bool>>,
    waiting: AtomicUsize,
    waiting_body: Mutex<Option<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
    panic: AtomicBool,
}

impl ScriptedTransport {
    pub(crate) fn scripted(
        script: Vec<Result<StatusCode, TransportError>>,
        default_status: StatusCode,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            default_status,
            delivered: Mutex::new(Vec::new()),
            gate: None,
            waiting: AtomicUsize::new(0),
            waiting_body: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: None,
            panic: AtomicBool::new(false),
        }
    }

    pub(crate) fn always(status: StatusCode) -> Self {
        Self::scripted(Vec::new(), status)
    }

    /// Hold every delivery until `open_gate` is called.
    pub(crate) fn gated(mut self) -> Self {
        let (tx, _) = watch::channel(false);
        self.gate = Some(tx);
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Panic on the first delivery.
    pub(crate) fn panicking(self) -> Self {
        self.panic.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.send_replace(true);
        }
    }

    /// Bodies whose delivery completed, in order (one entry per attempt).
    pub(crate) fn delivered_bodies(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }

    /// Deliveries currently held at the gate.
    pub(crate) fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    pub(crate) fn waiting_body(&self) -> Option<String> {
        self.waiting_body.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportClient for ScriptedTransport {
    async fn deliver(&self, body: &str) -> Result<StatusCode, TransportError> {
        if self.panic.swap(false, Ordering::SeqCst) {
            panic!("scripted transport panic");
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            let mut rx = gate.subscribe();
            *self.waiting_body.lock().unwrap() = Some(body.to_string());
            self.waiting.fetch_add(1, Ordering::SeqCst);
            let _ = rx.wait_for(|open| *open).await;
            self.waiting.fetch_sub(1, Ordering::SeqCst);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.delivered.lock().unwrap().push(body.to_string());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(self.default_status))
    }
}

/// Deterministic keys: `payload-00000000-0000-4000-8000-<n>`.
pub(crate) struct FixedKeyGenerator {
    next: AtomicU64,
}

impl FixedKeyGenerator {
    pub(crate) fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl KeyGenerator for FixedKeyGenerator {
    fn generate(&self) -> PayloadKey {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        let id = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0000 | u128::from(n));
        PayloadKey::from_uuid(id)
    }
}

/// Poll `cond` until it holds. Panics after five seconds.
pub(crate) async fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within 5s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
