//! PayloadStore - KeyValueStore の上の薄いアダプタ
//!
//! Speaks `PayloadKey` instead of raw strings and knows the reserved prefix.

use std::sync::Arc;

use crate::domain::{PayloadKey, StoreError};
use crate::ports::KeyValueStore;

/// Typed pass-through to the durable store.
#[derive(Clone)]
pub struct PayloadStore {
    inner: Arc<dyn KeyValueStore>,
}

impl PayloadStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    pub fn put(&self, key: &PayloadKey, body: &str) -> Result<(), StoreError> {
        self.inner.put(key.as_str(), body)
    }

    pub fn get(&self, key: &PayloadKey) -> Result<Option<String>, StoreError> {
        self.inner.get(key.as_str())
    }

    pub fn remove(&self, key: &PayloadKey) -> Result<(), StoreError> {
        self.inner.remove(key.as_str())
    }

    /// Every payload key in the store, in store enumeration order.
    /// Keys without the reserved prefix are skipped.
    pub fn list_keys_with_prefix(&self) -> Result<Vec<PayloadKey>, StoreError> {
        let keys = self
            .inner
            .keys()?
            .into_iter()
            .filter_map(|raw| PayloadKey::parse(raw).ok())
            .collect();
        Ok(keys)
    }
}

impl std::fmt::Debug for PayloadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadStore").finish_non_exhaustive()
    }
}
