//! Error types for data parsing in airthings-types.

use thiserror::Error;

/// Errors that can occur when decoding Airthings sensor payloads.
///
/// This error type is transport-agnostic and does not include
/// BLE-specific errors (those belong in airthings-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Fixed-layout decoders only accept buffers of exactly the layout size.
    #[error("Length mismatch: layout requires exactly {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Number of bytes the layout requires.
        expected: usize,
        /// Number of bytes that were supplied.
        actual: usize,
    },

    /// A decoded value was not usable.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Strict model lookup was given an unrecognized model number.
    #[error("Unknown model number: {0:?}")]
    UnknownModel(String),

    /// The date/time characteristic held an impossible calendar value.
    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),
}

/// Result type alias using airthings-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
