//! Storage keys for queued payloads.
//!
//! # キー形式
//! `"payload-" + <UUID v4>`
//!
//! The reserved prefix keeps payload entries apart from unrelated values that
//! share the same store, and lets recovery filter keys with a cheap prefix
//! check instead of reading bodies.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reserved prefix of every payload key.
pub const PAYLOAD_KEY_PREFIX: &str = "payload-";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("key {0:?} does not carry the `payload-` prefix")]
    MissingPrefix(String),

    #[error("key {0:?} has an empty identifier")]
    EmptyIdentifier(String),
}

/// Key of a stored payload.
///
/// Identity is assigned at enqueue time; a payload has none of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayloadKey(String);

impl PayloadKey {
    /// Build a key from a freshly generated identifier.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(format!("{PAYLOAD_KEY_PREFIX}{}", id.hyphenated()))
    }

    /// Parse a raw store key. Only reserved-prefix keys are accepted.
    pub fn parse(raw: impl Into<String>) -> Result<Self, KeyError> {
        let raw = raw.into();
        match raw.strip_prefix(PAYLOAD_KEY_PREFIX) {
            None => Err(KeyError::MissingPrefix(raw)),
            Some("") => Err(KeyError::EmptyIdentifier(raw)),
            Some(_) => Ok(Self(raw)),
        }
    }

    /// Is `raw` a payload key? (prefix check only)
    pub fn is_payload_key(raw: &str) -> bool {
        Self::parse(raw).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PayloadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for PayloadKey {
    type Error = KeyError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl From<PayloadKey> for String {
    fn from(key: PayloadKey) -> Self {
        key.0
    }
}
