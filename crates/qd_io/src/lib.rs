//! crates/qd_io/src/lib.rs
//! I/O edge of the report engine.
//!
//! - `store`: the document-store read contract plus an in-memory snapshot store
//! - `loader`: bounded JSON reads for snapshots and report parameters
//! - `canonical_json`: sorted-key compact JSON and atomic file writes
//!
//! Shared error type (`IoError`) with `From` conversions used across modules.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod canonical_json;
pub mod loader;
pub mod store;

pub use store::{DocumentStore, Snapshot, SnapshotStore, StoreError};

/// Unified error for qd_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors.
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON serialization/deserialization errors with a JSON Pointer hint.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Input exceeded a size limit.
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// Parameter domain violations.
    #[error("invalid parameters: {0}")]
    Params(#[from] qd_core::CoreError),

    /// Snapshot contents violate store invariants (duplicate ids, double answers).
    #[error("store: {0}")]
    Store(#[from] StoreError),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer; default to root.
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}
