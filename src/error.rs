//! Error types for KLV encoding and decoding.

use thiserror::Error;

/// Result type alias using the crate's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for KLV codec operations.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Destination region too small for the value being written.
    #[error("buffer overflow: {needed} bytes needed, {available} available")]
    BufferOverflow {
        /// Bytes the write required.
        needed: usize,
        /// Bytes the destination could accept.
        available: usize,
    },

    /// Source exhausted before the declared length was satisfied.
    #[error("buffer underrun: {needed} bytes needed, {available} available")]
    BufferUnderrun {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the source.
        available: usize,
    },

    /// Real value outside the documented range of its quantized format.
    #[error("value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Offending value.
        value: f64,
        /// Lower bound of the format.
        min: f64,
        /// Upper bound of the format.
        max: f64,
    },

    /// Decoded bytes violate the documented shape of a value.
    #[error("malformed value: {0}")]
    MalformedValue(String),
}

impl Error {
    /// Shorthand for a [`Error::BufferUnderrun`].
    pub(crate) fn underrun(needed: usize, available: usize) -> Self {
        Self::BufferUnderrun { needed, available }
    }

    /// Shorthand for a [`Error::BufferOverflow`].
    pub(crate) fn overflow(needed: usize, available: usize) -> Self {
        Self::BufferOverflow { needed, available }
    }

    /// Shorthand for a [`Error::MalformedValue`].
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedValue(msg.into())
    }
}
