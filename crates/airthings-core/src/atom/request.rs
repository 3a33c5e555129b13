//! Atom request encoding.

use core::fmt;

use minicbor::Encoder;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AtomError;

/// Fixed request preamble.
pub const REQUEST_PREAMBLE: [u8; 2] = [0x03, 0x01];

/// Byte prefix of the literal encoding: array(1), map(1), key 0, text(13).
const LITERAL_PREFIX: [u8; 4] = [0x81, 0xA1, 0x00, 0x6D];

/// Resource paths understood by Atom devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomRequestPath {
    /// All current sensor values.
    LatestValues,
    /// How the device reaches the cloud.
    ConnectivityMode,
}

impl AtomRequestPath {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AtomRequestPath::LatestValues => "29999/0/31012",
            AtomRequestPath::ConnectivityMode => "29999/0/31160",
        }
    }
}

impl fmt::Display for AtomRequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the request body is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomEncoding {
    /// `[{0: path}]` written by a CBOR encoder.
    #[default]
    Cbor,
    /// Fixed `81 A1 00 6D` prefix followed by the raw path bytes. Only
    /// correct for 13-byte paths; kept for older firmware.
    LiteralPrefix,
}

/// One Atom request: preamble, nonce, then the path body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomRequest {
    path: AtomRequestPath,
    nonce: [u8; 2],
}

impl AtomRequest {
    /// Build a request with a caller-supplied or random nonce.
    ///
    /// # Errors
    ///
    /// Returns [`AtomError::InvalidNonceLength`] when `nonce` is given but
    /// not exactly two bytes long.
    pub fn new(path: AtomRequestPath, nonce: Option<&[u8]>) -> Result<Self, AtomError> {
        let nonce = match nonce {
            Some(bytes) => <[u8; 2]>::try_from(bytes)
                .map_err(|_| AtomError::InvalidNonceLength(bytes.len()))?,
            None => rand::rng().random(),
        };
        Ok(Self { path, nonce })
    }

    #[must_use]
    pub fn path(&self) -> AtomRequestPath {
        self.path
    }

    /// The nonce the response must echo.
    #[must_use]
    pub fn nonce(&self) -> [u8; 2] {
        self.nonce
    }

    /// Encode the request.
    ///
    /// # Errors
    ///
    /// Returns [`AtomError::Encode`] if the CBOR encoder fails.
    pub fn encode(&self, encoding: AtomEncoding) -> Result<Vec<u8>, AtomError> {
        let mut out = Vec::with_capacity(24);
        out.extend_from_slice(&REQUEST_PREAMBLE);
        out.extend_from_slice(&self.nonce);

        match encoding {
            AtomEncoding::Cbor => {
                let mut e = Encoder::new(&mut out);
                e.array(1)
                    .and_then(|e| e.map(1))
                    .and_then(|e| e.u8(0))
                    .and_then(|e| e.str(self.path.as_str()))
                    .map_err(|e| AtomError::Encode(e.to_string()))?;
            }
            AtomEncoding::LiteralPrefix => {
                out.extend_from_slice(&LITERAL_PREFIX);
                out.extend_from_slice(self.path.as_str().as_bytes());
            }
        }
        Ok(out)
    }
}
