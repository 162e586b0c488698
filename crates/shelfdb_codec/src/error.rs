//! Error types for the codec crate.

use crate::format::Format;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a value.
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        /// Format that was being produced.
        format: Format,
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode bytes.
    #[error("{format} decoding failed: {message}")]
    DecodingFailed {
        /// Format that was being read.
        format: Format,
        /// Description of the decoding error.
        message: String,
    },

    /// The format name is not known.
    #[error("unknown format: {name}")]
    UnknownFormat {
        /// The name that failed to parse.
        name: String,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(format: Format, message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            format,
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(format: Format, message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            format,
            message: message.into(),
        }
    }
}
