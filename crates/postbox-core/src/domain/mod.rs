//! Domain model (keys, payloads, outcomes, worker state, errors).

pub mod errors;
pub mod key;
pub mod outcome;
pub mod payload;
pub mod state;

pub use self::errors::{ErrorKind, PostboxError, StoreError, TransportError};
pub use self::key::{KeyError, PAYLOAD_KEY_PREFIX, PayloadKey};
pub use self::outcome::{DeliveryOutcome, StatusCode};
pub use self::payload::{JsonPayload, Payload, RawPayload};
pub use self::state::WorkerState;
