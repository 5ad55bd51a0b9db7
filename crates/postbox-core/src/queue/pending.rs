//! Pending-key queue: keys waiting for the delivery worker.
//!
//! # 学習ポイント
//! - Mutex + Notify による「待つ pop」（ポーリングしない）
//! - push は同期・非ブロッキング（どのスレッドからでも呼べる）
//! - pop は cancel-safe（select! で shutdown と競合させられる）

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::domain::PayloadKey;

/// FIFO of payload keys shared between producers and the worker.
///
/// Holds keys only; bodies stay in the store. A key offered twice is kept
/// twice (re-queued keys are not deduplicated).
#[derive(Debug, Default)]
pub struct PendingKeyQueue {
    keys: Mutex<VecDeque<PayloadKey>>,
    notify: Notify,
}

impl PendingKeyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key` at the tail. Never blocks on anything but the short
    /// critical section.
    pub fn push(&self, key: PayloadKey) {
        self.keys().push_back(key);
        // 待っている worker がいなければ permit が残り、次の pop がすぐ返る
        self.notify.notify_one();
    }

    /// Replace the whole content, e.g. after re-scanning the store.
    pub fn replace(&self, keys: impl IntoIterator<Item = PayloadKey>) {
        let mut guard = self.keys();
        guard.clear();
        guard.extend(keys);
        let has_keys = !guard.is_empty();
        drop(guard);

        if has_keys {
            self.notify.notify_one();
        }
    }

    /// Take the next key without waiting.
    pub fn try_pop(&self) -> Option<PayloadKey> {
        self.keys().pop_front()
    }

    /// Wait until a key is available and take it.
    ///
    /// Dropping the future before it completes loses nothing: a key is only
    /// removed in the same poll that returns it.
    pub async fn pop(&self) -> PayloadKey {
        loop {
            if let Some(key) = self.try_pop() {
                return key;
            }
            self.notify.notified().await;
        }
    }

    pub fn clear(&self) {
        self.keys().clear();
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Snapshot of the queued keys, head first.
    pub fn snapshot(&self) -> Vec<PayloadKey> {
        self.keys().iter().cloned().collect()
    }

    fn keys(&self) -> MutexGuard<'_, VecDeque<PayloadKey>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn key(n: u32) -> PayloadKey {
        PayloadKey::parse(format!("payload-{n}")).unwrap()
    }

    #[tokio::test]
    async fn push_pop_is_fifo() {
        let queue = PendingKeyQueue::new();
        queue.push(key(1));
        queue.push(key(2));
        queue.push(key(3));

        assert_eq!(queue.pop().await, key(1));
        assert_eq!(queue.pop().await, key(2));
        assert_eq!(queue.pop().await, key(3));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn pop_waits_for_push() {
        let queue = Arc::new(PendingKeyQueue::new());

        let popper = tokio::spawn({
            let queue = queue.clone();
            async move { queue.pop().await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!popper.is_finished());

        queue.push(key(7));
        let popped = tokio::time::timeout(Duration::from_secs(1), popper)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(popped, key(7));
    }

    #[tokio::test]
    async fn cancelled_pop_keeps_later_keys() {
        let queue = PendingKeyQueue::new();

        // 空のキューで pop を途中キャンセル
        let res = tokio::time::timeout(Duration::from_millis(20), queue.pop()).await;
        assert!(res.is_err());

        queue.push(key(1));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop().await, key(1));
    }

    #[test]
    fn duplicates_are_kept() {
        let queue = PendingKeyQueue::new();
        queue.push(key(1));
        queue.push(key(1));
        assert_eq!(queue.snapshot(), vec![key(1), key(1)]);
    }

    #[test]
    fn replace_discards_previous_content() {
        let queue = PendingKeyQueue::new();
        queue.push(key(1));
        queue.replace(vec![key(2), key(3)]);
        assert_eq!(queue.snapshot(), vec![key(2), key(3)]);

        queue.clear();
        assert_eq!(queue.try_pop(), None);
    }
}
