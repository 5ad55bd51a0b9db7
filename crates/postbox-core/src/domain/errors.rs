//! Errors - エラー型と分類

use thiserror::Error;

/// ErrorKind は配送エラーの分類
///
/// - Transient: 一時的なエラー（キューに戻して後で再送）
/// - Permanent: 恒久的なエラー（再送しても無意味、破棄）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
}

/// Errors surfaced to producers by `submit` / `restart`.
///
/// Delivery failures never show up here; they stay inside the worker.
#[derive(Debug, Error)]
pub enum PostboxError {
    #[error("queue manager has no store configured; call configure() first")]
    NotConfigured,

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of the durable key/value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store document is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    /// The entry exists but its value cannot be used as a payload body.
    #[error("stored value for {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Corrupt { .. } => ErrorKind::Permanent,
            StoreError::Io(_) | StoreError::Serde(_) => ErrorKind::Transient,
        }
    }
}

/// Failures that kept the transport from getting a status code at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,
}
