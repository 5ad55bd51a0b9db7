//! Delivery outcome: how a transport result is classified.
//!
//! This module does not know about queues or stores. It only turns
//! "what the transport said" into "what the worker should do with the item".

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{ErrorKind, TransportError};

/// Numeric status returned by the remote endpoint (HTTP-like).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const UNPROCESSABLE_ENTITY: StatusCode = StatusCode(422);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);

    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// `[200, 300)`
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }

    /// `[400, 500)`
    pub fn is_client_error(self) -> bool {
        (400..500).contains(&self.0)
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What happened to one delivery attempt.
///
/// Serialized as SCREAMING_SNAKE_CASE: DELIVERED / REJECTED / TRANSIENT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryOutcome {
    /// Accepted by the endpoint. The stored item is removed.
    Delivered,

    /// Refused by the endpoint for good. The stored item is removed, since
    /// resending the same body can only be refused again.
    Rejected,

    /// Network or server trouble. The item goes back to the queue tail and
    /// the worker stops.
    Transient,
}

impl DeliveryOutcome {
    /// Classify a status code.
    ///
    /// - `[200, 300)` → `Delivered`
    /// - `[400, 500)` → `Rejected`
    /// - anything else → `Transient`
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() {
            DeliveryOutcome::Delivered
        } else if status.is_client_error() {
            DeliveryOutcome::Rejected
        } else {
            DeliveryOutcome::Transient
        }
    }

    /// Classify a full transport result. Transport errors never reached the
    /// endpoint in a definitive way, so they are always transient.
    pub fn classify(result: &Result<StatusCode, TransportError>) -> Self {
        match result {
            Ok(status) => Self::from_status(*status),
            Err(_) => DeliveryOutcome::Transient,
        }
    }

    /// Does this outcome end the item's life (store entry removed)?
    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryOutcome::Delivered | DeliveryOutcome::Rejected)
    }

    pub fn error_kind(self) -> Option<ErrorKind> {
        match self {
            DeliveryOutcome::Delivered => None,
            DeliveryOutcome::Rejected => Some(ErrorKind::Permanent),
            DeliveryOutcome::Transient => Some(ErrorKind::Transient),
        }
    }
}
