//! Legacy command/response exchange for battery and illuminance.
//!
//! Older devices answer a one-byte command written to their access control
//! point with a notification: byte 0 echoes the command, byte 1 is unused and
//! the rest is a fixed little-endian record.

use tracing::debug;

use airthings_types::layout::{Field, Layout};
use airthings_types::validate::illuminance_converter;

use crate::reassembler::NotificationReassembler;

/// Command byte requesting the status record.
pub const COMMAND_BYTE: u8 = 0x6D;

/// Bytes before the packed record in a command response.
pub const RESPONSE_HEADER_LEN: usize = 2;

/// `<L2BH2B9H`
const WAVE_RADON_AND_PLUS_LAYOUT: Layout = Layout::new(&[
    Field::U32,
    Field::U8,
    Field::U8,
    Field::U16,
    Field::U8,
    Field::U8,
    Field::U16,
    Field::U16,
    Field::U16,
    Field::U16,
    Field::U16,
    Field::U16,
    Field::U16,
    Field::U16,
    Field::U16,
]);

/// `<2L4B2HL4HL`
const WAVE_MINI_LAYOUT: Layout = Layout::new(&[
    Field::U32,
    Field::U32,
    Field::U8,
    Field::U8,
    Field::U8,
    Field::U8,
    Field::U16,
    Field::U16,
    Field::U32,
    Field::U16,
    Field::U16,
    Field::U16,
    Field::U16,
    Field::U32,
]);

/// Values extracted from a command response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandReading {
    /// Battery voltage in volts.
    pub battery_voltage: f64,
    /// Illuminance percentage, when the record carries it.
    pub illuminance: Option<f64>,
}

/// Decoder for one family's command response record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandDecoder {
    WaveRadonAndPlus,
    WaveMini,
}

impl CommandDecoder {
    #[must_use]
    pub fn layout(&self) -> Layout {
        match self {
            CommandDecoder::WaveRadonAndPlus => WAVE_RADON_AND_PLUS_LAYOUT,
            CommandDecoder::WaveMini => WAVE_MINI_LAYOUT,
        }
    }

    /// The bytes to write to request a response.
    #[must_use]
    pub fn request(&self) -> [u8; 1] {
        [COMMAND_BYTE]
    }

    /// Total length of a well-formed response.
    #[must_use]
    pub fn response_len(&self) -> usize {
        RESPONSE_HEADER_LEN + self.layout().size()
    }

    /// A reassembler sized for one response.
    #[must_use]
    pub fn reassembler(&self) -> NotificationReassembler {
        NotificationReassembler::with_length(self.response_len())
    }

    /// Check the echoed command byte and record length, then unpack.
    ///
    /// Rejections are logged and reported as `None`, never raised.
    #[must_use]
    pub fn validate(&self, raw: Option<&[u8]>) -> Option<Vec<i64>> {
        let raw = raw?;

        let Some(&cmd) = raw.first() else {
            debug!("Empty command response");
            return None;
        };
        if cmd != COMMAND_BYTE {
            debug!(
                expected = format_args!("{COMMAND_BYTE:02x}"),
                got = format_args!("{cmd:02x}"),
                "Result for wrong command received"
            );
            return None;
        }

        let payload = raw.get(RESPONSE_HEADER_LEN..).unwrap_or_default();
        match self.layout().unpack(payload) {
            Ok(values) => Some(values),
            Err(e) => {
                debug!(error = %e, "Wrong length data received");
                None
            }
        }
    }

    /// Validate and extract the battery voltage and illuminance.
    #[must_use]
    pub fn decode(&self, raw: Option<&[u8]>) -> Option<CommandReading> {
        let v = self.validate(raw)?;
        let reading = match self {
            CommandDecoder::WaveRadonAndPlus => CommandReading {
                battery_voltage: v[13] as f64 / 1000.0,
                illuminance: illuminance_converter(v[2] as f64),
            },
            CommandDecoder::WaveMini => CommandReading {
                battery_voltage: v[11] as f64 / 1000.0,
                illuminance: None,
            },
        };
        Some(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn wave_mini_response(battery_mv: u16) -> Vec<u8> {
        let mut raw = vec![COMMAND_BYTE, 0x00];
        let mut payload = [0u8; 32];
        payload[24..26].copy_from_slice(&battery_mv.to_le_bytes());
        raw.extend_from_slice(&payload);
        raw
    }

    #[test]
    fn test_layout_sizes() {
        assert_eq!(CommandDecoder::WaveRadonAndPlus.layout().size(), 28);
        assert_eq!(CommandDecoder::WaveMini.layout().size(), 32);
        assert_eq!(CommandDecoder::WaveRadonAndPlus.response_len(), 30);
    }

    #[test]
    fn test_wave_plus_battery() {
        let raw = hex("6d00600c04000100008211ff00000000c04c20001f3560007006b80b0900");
        let reading = CommandDecoder::WaveRadonAndPlus
            .decode(Some(&raw))
            .unwrap();
        assert_eq!(reading.battery_voltage, 3.0);
        assert_eq!(reading.illuminance, Some(0.0));
    }

    #[test]
    fn test_wave_mini_battery() {
        let raw = wave_mini_response(4200);
        let reading = CommandDecoder::WaveMini.decode(Some(&raw)).unwrap();
        assert_eq!(reading.battery_voltage, 4.2);
        assert_eq!(reading.illuminance, None);
    }

    #[test]
    fn test_wrong_command_byte_is_rejected() {
        let mut raw = wave_mini_response(4200);
        raw[0] = 0x6E;
        assert!(CommandDecoder::WaveMini.validate(Some(&raw)).is_none());
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let mut raw = wave_mini_response(4200);
        raw.pop();
        assert!(CommandDecoder::WaveMini.validate(Some(&raw)).is_none());
        assert!(CommandDecoder::WaveRadonAndPlus.validate(Some(&raw)).is_none());
    }

    #[test]
    fn test_missing_or_empty_response() {
        assert!(CommandDecoder::WaveMini.validate(None).is_none());
        assert!(CommandDecoder::WaveMini.validate(Some(&[])).is_none());
        assert!(CommandDecoder::WaveMini.validate(Some(&[COMMAND_BYTE])).is_none());
    }

    #[test]
    fn test_reassembler_completes_on_full_response() {
        let raw = wave_mini_response(3000);
        let r = CommandDecoder::WaveMini.reassembler();
        r.push(&raw[..20]);
        assert!(!r.is_complete());
        r.push(&raw[20..]);
        assert_eq!(r.message().unwrap().as_ref(), raw.as_slice());
    }
}
