//! Error types for resolution and the DAG API.

use std::time::Duration;

use cid::Cid;
use dagwalk_core::CoreError;
use dagwalk_store::StoreError;
use thiserror::Error;

/// Errors that can occur while resolving paths or reading/writing DAG nodes.
///
/// Every error is terminal for the call that raised it; there is no partial
/// result alongside an error.
#[derive(Debug, Error)]
pub enum DagError {
    /// The path string has no usable segments.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A segment does not exist on the value being searched.
    #[error("no link named {segment:?} under {cid}")]
    NoLink { segment: String, cid: Cid },

    /// No codec is registered, or could be loaded, for a CID's codec field.
    #[error("no codec registered for code 0x{0:x}")]
    CodecNotFound(u64),

    /// The block is unknown, or resolution produced no steps.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller's cancellation token fired while a fetch was outstanding.
    #[error("resolution cancelled")]
    Cancelled,

    /// A fetch exceeded the per-call timeout.
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    /// Encoding or decoding a block failed.
    #[error("codec error: {0}")]
    Codec(CoreError),

    /// Any other fetcher or store failure, passed through unchanged.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<CoreError> for DagError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::CodecNotFound(code) => DagError::CodecNotFound(code),
            CoreError::InvalidPath(msg) => DagError::InvalidPath(msg),
            other => DagError::Codec(other),
        }
    }
}

impl From<StoreError> for DagError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(cid) => DagError::NotFound(format!("block {}", cid)),
            StoreError::Cancelled => DagError::Cancelled,
            StoreError::Timeout(after) => DagError::Timeout(after),
            StoreError::Core(core) => DagError::from(core),
            other => DagError::Store(other),
        }
    }
}

/// Result type for DAG operations.
pub type Result<T> = std::result::Result<T, DagError>;
