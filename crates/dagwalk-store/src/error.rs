//! Error types for the store module.

use std::time::Duration;

use cid::Cid;
use dagwalk_core::CoreError;
use thiserror::Error;

/// Errors that can occur while fetching or storing blocks.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No block is known for this CID.
    #[error("block not found: {0}")]
    NotFound(Cid),

    /// The bytes returned for a CID do not hash to it.
    #[error("block {0} failed digest verification")]
    HashMismatch(Cid),

    /// The fetch did not finish within the caller's timeout.
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The caller's cancellation token fired.
    #[error("fetch cancelled")]
    Cancelled,

    /// CID or hashing error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Backend-specific failure (transport, I/O, ...).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
