//! Queue module: the in-memory pending-key queue and the typed store adapter.

mod pending;
mod store;

pub use pending::PendingKeyQueue;
pub use store::PayloadStore;
