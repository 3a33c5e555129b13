//! Error types for airthings-core.
//!
//! Two layers of errors exist. [`AtomError`] describes why an Atom response
//! envelope was rejected; most of those are absorbed by the session and
//! reported as "no data". [`Error`] is what a session update returns when
//! the whole update fails.
//!
//! # Error Classification
//!
//! | Error Type | Retried by a session | Notes |
//! |------------|----------------------|-------|
//! | [`Error::Timeout`] | yes | Overall deadline or a stalled transport call |
//! | [`Error::Transport`] | yes | Generic link failure |
//! | [`Error::NotConnected`] | yes | Link dropped before an operation |
//! | [`Error::Disconnected`] | yes | Link dropped in the middle of an update |
//! | [`Error::ConnectionFailed`] | depends on reason | Rejected connections are final |
//! | [`Error::WriteFailed`] | yes | Writes can fail transiently |
//! | [`Error::UnsupportedDevice`] | no | Model number not recognized |
//! | [`Error::CharacteristicNotFound`] | no | Firmware does not expose it |
//! | [`Error::InvalidConfig`] | no | Fix configuration and restart |

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use airthings_types::ParseError;

/// Errors that can occur while talking to an Airthings device.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Error reported by the underlying transport.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Operation attempted while not connected to device.
    #[error("Not connected to device")]
    NotConnected,

    /// The device disconnected while an update was in progress.
    #[error("Device disconnected during update")]
    Disconnected,

    /// Required characteristic not found on device.
    #[error("Characteristic not found: {uuid}")]
    CharacteristicNotFound {
        /// The UUID that was not found.
        uuid: Uuid,
    },

    /// Data received from the device was unusable.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A fixed-layout payload failed to decode.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An Atom envelope failed to encode or decode.
    #[error(transparent)]
    Atom(#[from] AtomError),

    /// The model number is not one this library can read.
    #[error("Unsupported device: model {model:?}")]
    UnsupportedDevice {
        /// Raw model number reported by the device.
        model: String,
    },

    /// Operation timed out.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// Connection failed with specific reason.
    #[error("Connection failed: {reason}")]
    ConnectionFailed {
        /// Address of the device that failed to connect.
        address: Option<String>,
        /// The structured reason for the failure.
        reason: ConnectionFailureReason,
    },

    /// Write operation failed.
    #[error("Write failed to characteristic {uuid}: {reason}")]
    WriteFailed {
        /// The characteristic UUID.
        uuid: Uuid,
        /// The reason for the failure.
        reason: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Structured reasons for connection failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConnectionFailureReason {
    /// Device is out of range.
    OutOfRange,
    /// Device rejected the connection.
    Rejected,
    /// Connection attempt timed out.
    Timeout,
    /// Other/unknown error.
    Other(String),
}

impl std::fmt::Display for ConnectionFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "device out of range"),
            Self::Rejected => write!(f, "connection rejected by device"),
            Self::Timeout => write!(f, "connection timed out"),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error {
    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a transport error from any displayable cause.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a connection failure with structured reason.
    pub fn connection_failed(address: Option<String>, reason: ConnectionFailureReason) -> Self {
        Self::ConnectionFailed { address, reason }
    }

    /// Create a write failure for `uuid`.
    pub fn write_failed(uuid: Uuid, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            uuid,
            reason: reason.into(),
        }
    }

    /// Create an unsupported device error.
    pub fn unsupported_device(model: impl Into<String>) -> Self {
        Self::UnsupportedDevice {
            model: model.into(),
        }
    }

    /// Whether the error came from a deadline expiring.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Reasons an Atom envelope was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AtomError {
    /// The first five bytes were not the expected response header.
    #[error("Invalid response header: {0:02X?}")]
    InvalidHeader(Vec<u8>),

    /// The response did not echo the request nonce.
    #[error("Nonce mismatch: expected {expected:02X?}, got {actual:02X?}")]
    NonceMismatch {
        /// Nonce sent in the request.
        expected: [u8; 2],
        /// Nonce found in the response.
        actual: Vec<u8>,
    },

    /// The CBOR body was not of the expected type.
    #[error("Invalid CBOR type at byte {offset}: expected {expected}, got 0x{actual:02X}")]
    InvalidType {
        /// Offset of the offending byte.
        offset: usize,
        /// What was expected there.
        expected: &'static str,
        /// The byte found.
        actual: u8,
    },

    /// The array element was not a map of two entries.
    #[error("Invalid array length: expected map(2), got 0x{0:02X}")]
    InvalidArrayLength(u8),

    /// The first map key was not the path key `0`.
    #[error("Invalid response element: expected key 0x00, got 0x{0:02X}")]
    InvalidElement(u8),

    /// The echoed path had a different length than requested.
    #[error("Path length mismatch: expected {expected}, got {actual}")]
    PathLengthMismatch {
        /// Length of the requested path.
        expected: usize,
        /// Length of the echoed path.
        actual: usize,
    },

    /// The echoed path differs from the requested one.
    #[error("Path mismatch: expected {expected:?}, got {actual:?}")]
    PathMismatch {
        /// Requested path.
        expected: String,
        /// Echoed path.
        actual: String,
    },

    /// The envelope ended before a required field.
    #[error("Truncated response: need at least {expected} bytes, got {actual}")]
    Truncated {
        /// Minimum length required.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A caller-supplied nonce was not exactly two bytes.
    #[error("Nonce must be 2 bytes, got {0}")]
    InvalidNonceLength(usize),

    /// The CBOR encoder failed.
    #[error("CBOR encode failed: {0}")]
    Encode(String),
}

/// Result type alias using airthings-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotConnected;
        assert_eq!(err.to_string(), "Not connected to device");

        let err = Error::InvalidData("bad format".to_string());
        assert_eq!(err.to_string(), "Invalid data: bad format");

        let err = Error::timeout("update", Duration::from_secs(60));
        assert!(err.to_string().contains("update"));
        assert!(err.to_string().contains("60s"));
        assert!(err.is_timeout());

        let err = Error::unsupported_device("1234");
        assert_eq!(err.to_string(), "Unsupported device: model \"1234\"");
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: Error = ParseError::LengthMismatch {
            expected: 20,
            actual: 19,
        }
        .into();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("20"));
    }

    #[test]
    fn test_atom_error_conversion() {
        let err: Error = AtomError::NonceMismatch {
            expected: [0xA1, 0xB2],
            actual: vec![0x00, 0x00],
        }
        .into();
        assert!(matches!(err, Error::Atom(AtomError::NonceMismatch { .. })));
        assert!(err.to_string().contains("A1"));
    }

    #[test]
    fn test_connection_failure_display() {
        let err = Error::connection_failed(
            Some("AA:BB".to_string()),
            ConnectionFailureReason::Rejected,
        );
        assert_eq!(
            err.to_string(),
            "Connection failed: connection rejected by device"
        );
    }
}
