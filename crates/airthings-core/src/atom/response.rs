//! Atom response validation and CBOR decoding.
//!
//! Structural checks on the envelope (header, nonce, leading CBOR markers
//! and the echoed path) run on the raw bytes before any CBOR decoding and
//! fail loudly with an [`AtomError`]. Problems inside the CBOR payload are
//! logged and reported as `Ok(None)`.

use std::collections::BTreeMap;
use std::fmt;

use minicbor::Decoder;
use minicbor::data::Type;
use tracing::{debug, error};

use airthings_types::ConnectivityMode;

use crate::atom::request::AtomRequestPath;
use crate::error::AtomError;

/// Fixed response header.
pub const RESPONSE_HEADER: [u8; 5] = [0x10, 0x01, 0x00, 0x03, 0x45];

const NONCE_RANGE: std::ops::Range<usize> = 5..7;
const BODY_OFFSET: usize = 7;
const ARRAY_OF_ONE: u8 = 0x81;
const MAP_OF_TWO: u8 = 0xA2;
const KEY_PATH: u8 = 0x00;
const PATH_HEADER_OFFSET: usize = 10;
const PATH_OFFSET: usize = 11;
const TEXT_MAJOR: u8 = 0x60;
const MIN_LEN: usize = PATH_OFFSET;

const KEY_PAYLOAD: u64 = 2;

/// A scalar from a latest-values map.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomValue {
    Int(i128),
    Float(f64),
    Text(String),
}

impl AtomValue {
    /// Numeric view of the value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AtomValue::Int(v) => Some(*v as f64),
            AtomValue::Float(v) => Some(*v),
            AtomValue::Text(_) => None,
        }
    }
}

/// Latest values keyed by short code (`TMP`, `HUM`, ...).
pub type AtomValues = BTreeMap<String, AtomValue>;

/// A successfully decoded response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomPayload {
    LatestValues(AtomValues),
    Connectivity(ConnectivityMode),
}

/// Whether `buf` holds a whole response frame.
///
/// Used as the completion predicate when reassembling notifications. A
/// frame whose body is malformed (rather than merely short) also counts as
/// complete so that it is parsed and rejected instead of timing out.
#[must_use]
pub fn is_complete_frame(buf: &[u8]) -> bool {
    if buf.len() < MIN_LEN {
        return false;
    }
    match Decoder::new(&buf[BODY_OFFSET..]).skip() {
        Ok(()) => true,
        Err(e) => !e.is_end_of_input(),
    }
}

/// A raw response paired with what the request expects it to echo.
#[derive(Debug, Clone)]
pub struct AtomResponse<'a> {
    raw: &'a [u8],
    nonce: [u8; 2],
    path: AtomRequestPath,
}

impl<'a> AtomResponse<'a> {
    #[must_use]
    pub fn new(raw: &'a [u8], nonce: [u8; 2], path: AtomRequestPath) -> Self {
        Self { raw, nonce, path }
    }

    /// Validate the envelope and decode the payload.
    ///
    /// # Errors
    ///
    /// Returns an [`AtomError`] for structural failures: short frame, wrong
    /// header, stale nonce, unexpected leading markers or a different path.
    /// CBOR payload problems are logged and yield `Ok(None)`.
    pub fn parse(&self) -> Result<Option<AtomPayload>, AtomError> {
        let raw = self.raw;
        if raw.len() < MIN_LEN {
            return Err(AtomError::Truncated {
                expected: MIN_LEN,
                actual: raw.len(),
            });
        }

        if raw[..RESPONSE_HEADER.len()] != RESPONSE_HEADER {
            error!(
                expected = %hex(&RESPONSE_HEADER),
                got = %hex(&raw[..RESPONSE_HEADER.len()]),
                "Invalid response header"
            );
            return Err(AtomError::InvalidHeader(raw[..RESPONSE_HEADER.len()].to_vec()));
        }

        if raw[NONCE_RANGE] != self.nonce {
            debug!(
                expected = %hex(&self.nonce),
                got = %hex(&raw[NONCE_RANGE]),
                "Invalid response nonce"
            );
            return Err(AtomError::NonceMismatch {
                expected: self.nonce,
                actual: raw[NONCE_RANGE].to_vec(),
            });
        }

        if raw[BODY_OFFSET] != ARRAY_OF_ONE {
            debug!(got = raw[BODY_OFFSET], "Invalid response type");
            return Err(AtomError::InvalidType {
                offset: BODY_OFFSET,
                expected: "array(1)",
                actual: raw[BODY_OFFSET],
            });
        }

        if raw[BODY_OFFSET + 1] != MAP_OF_TWO {
            debug!(got = raw[BODY_OFFSET + 1], "Invalid response array length");
            return Err(AtomError::InvalidArrayLength(raw[BODY_OFFSET + 1]));
        }

        if raw[BODY_OFFSET + 2] != KEY_PATH {
            debug!(got = raw[BODY_OFFSET + 2], "Invalid response element");
            return Err(AtomError::InvalidElement(raw[BODY_OFFSET + 2]));
        }

        let path = self.check_path()?;

        debug!(response = %hex(raw), "Atom response");

        let payload = match decode_body(&raw[PATH_OFFSET + path..]) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Failed to parse response");
                return Ok(None);
            }
        };

        debug!(?payload, "Decoded data");
        Ok(Some(payload))
    }

    /// Check the echoed path and return its length.
    fn check_path(&self) -> Result<usize, AtomError> {
        let raw = self.raw;
        let expected = self.path.as_str();
        let actual = usize::from(raw[PATH_HEADER_OFFSET].wrapping_sub(TEXT_MAJOR));
        if actual != expected.len() {
            debug!(expected = expected.len(), got = actual, "Invalid path length");
            return Err(AtomError::PathLengthMismatch {
                expected: expected.len(),
                actual,
            });
        }

        let end = PATH_OFFSET + actual;
        if raw.len() < end {
            return Err(AtomError::Truncated {
                expected: end,
                actual: raw.len(),
            });
        }

        let echoed = &raw[PATH_OFFSET..end];
        if echoed != expected.as_bytes() {
            let echoed = String::from_utf8_lossy(echoed);
            debug!(expected, got = %echoed, "Invalid response path");
            return Err(AtomError::PathMismatch {
                expected: expected.to_string(),
                actual: echoed.into_owned(),
            });
        }
        Ok(actual)
    }
}

/// Why the CBOR body could not be decoded.
#[derive(Debug)]
enum BodyError {
    Cbor(minicbor::decode::Error),
    Shape(&'static str),
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyError::Cbor(e) => write!(f, "CBOR: {e}"),
            BodyError::Shape(msg) => f.write_str(msg),
        }
    }
}

impl From<minicbor::decode::Error> for BodyError {
    fn from(e: minicbor::decode::Error) -> Self {
        BodyError::Cbor(e)
    }
}

/// Decode the rest of the map after the path: `2: payload`.
fn decode_body(bytes: &[u8]) -> Result<AtomPayload, BodyError> {
    let mut d = Decoder::new(bytes);
    if !is_unsigned(d.datatype()?) || d.u64()? != KEY_PAYLOAD {
        return Err(BodyError::Shape("second map key is not the payload"));
    }
    decode_payload(&mut d)
}

fn decode_payload(d: &mut Decoder<'_>) -> Result<AtomPayload, BodyError> {
    let ty = d.datatype()?;
    if is_integer(ty) {
        let value = i128::from(d.int()?);
        return Ok(AtomPayload::Connectivity(ConnectivityMode::from_atom_int(
            value,
        )));
    }
    match ty {
        Type::Bytes => {
            let nested = d.bytes()?;
            let mut inner = Decoder::new(nested);
            Ok(AtomPayload::LatestValues(decode_values(&mut inner)?))
        }
        Type::Map => Ok(AtomPayload::LatestValues(decode_values(d)?)),
        _ => Err(BodyError::Shape("payload is neither an integer, bytes nor a map")),
    }
}

fn decode_values(d: &mut Decoder<'_>) -> Result<AtomValues, BodyError> {
    if d.datatype()? != Type::Map {
        return Err(BodyError::Shape("latest values are not a map"));
    }
    let len = d
        .map()?
        .ok_or(BodyError::Shape("indefinite-length maps are not supported"))?;

    let mut values = AtomValues::new();
    for _ in 0..len {
        if d.datatype()? != Type::String {
            d.skip()?;
            d.skip()?;
            continue;
        }
        let key = d.str()?.to_string();
        let ty = d.datatype()?;
        let value = if is_integer(ty) {
            AtomValue::Int(i128::from(d.int()?))
        } else {
            match ty {
                Type::F32 => AtomValue::Float(f64::from(d.f32()?)),
                Type::F64 => AtomValue::Float(d.f64()?),
                Type::String => AtomValue::Text(d.str()?.to_string()),
                other => {
                    debug!(key = %key, ?other, "Skipping unsupported value type");
                    d.skip()?;
                    continue;
                }
            }
        };
        values.insert(key, value);
    }
    Ok(values)
}

fn is_unsigned(ty: Type) -> bool {
    matches!(ty, Type::U8 | Type::U16 | Type::U32 | Type::U64)
}

fn is_integer(ty: Type) -> bool {
    is_unsigned(ty)
        || matches!(
            ty,
            Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::Int
        )
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Random bytes after a valid header and nonce never panic the parser.
        #[test]
        fn parse_never_panics(body in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut raw = RESPONSE_HEADER.to_vec();
            raw.extend_from_slice(&[0x01, 0x02]);
            raw.extend_from_slice(&body);
            let _ = AtomResponse::new(&raw, [0x01, 0x02], AtomRequestPath::LatestValues).parse();
            let _ = is_complete_frame(&raw);
        }
    }
}
