//! Error types for dagwalk core.

use thiserror::Error;

/// Errors raised by codecs, CID helpers, path parsing and the codec registry.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("encoding error ({codec}): {message}")]
    Encode { codec: &'static str, message: String },

    #[error("decoding error ({codec}): {message}")]
    Decode { codec: &'static str, message: String },

    #[error("no codec registered for code 0x{0:x}")]
    CodecNotFound(u64),

    #[error("codec loader failed for code 0x{code:x}: {message}")]
    LoaderFailed { code: u64, message: String },

    #[error("unsupported multihash code 0x{0:x}")]
    UnsupportedHash(u64),

    #[error("invalid cid: {0}")]
    InvalidCid(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl CoreError {
    pub(crate) fn encode(codec: &'static str, message: impl Into<String>) -> Self {
        CoreError::Encode {
            codec,
            message: message.into(),
        }
    }

    pub(crate) fn decode(codec: &'static str, message: impl Into<String>) -> Self {
        CoreError::Decode {
            codec,
            message: message.into(),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
