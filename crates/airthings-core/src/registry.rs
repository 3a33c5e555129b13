//! Characteristic to decoder lookup.

use std::collections::HashMap;

use uuid::Uuid;

use airthings_types::SensorDecoder;
use airthings_types::uuids;

use crate::command::CommandDecoder;

/// Immutable mapping from characteristic UUID to the decoder for its data.
///
/// Built once and handed to a session; nothing here is global.
#[derive(Debug, Clone)]
pub struct DecoderRegistry {
    sensors: HashMap<Uuid, SensorDecoder>,
    commands: HashMap<Uuid, CommandDecoder>,
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        let sensors = SensorDecoder::ALL
            .iter()
            .map(|d| (d.characteristic(), *d))
            .collect();

        let commands = HashMap::from([
            (uuids::COMMAND_WAVE_PLUS, CommandDecoder::WaveRadonAndPlus),
            (uuids::COMMAND_WAVE_2, CommandDecoder::WaveRadonAndPlus),
            (uuids::COMMAND_WAVE_MINI, CommandDecoder::WaveMini),
        ]);

        Self { sensors, commands }
    }
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder for a directly readable sensor characteristic.
    #[must_use]
    pub fn sensor(&self, characteristic: &Uuid) -> Option<SensorDecoder> {
        self.sensors.get(characteristic).copied()
    }

    /// Decoder for a command characteristic.
    #[must_use]
    pub fn command(&self, characteristic: &Uuid) -> Option<CommandDecoder> {
        self.commands.get(characteristic).copied()
    }

    /// Whether the exposed characteristics include the Atom command and notify pair.
    #[must_use]
    pub fn has_atom(characteristics: &[Uuid]) -> bool {
        characteristics.contains(&uuids::ATOM_COMMAND)
            && characteristics.contains(&uuids::ATOM_NOTIFY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_sensor_decoder_is_registered() {
        let registry = DecoderRegistry::new();
        for decoder in SensorDecoder::ALL {
            assert_eq!(registry.sensor(&decoder.characteristic()), Some(decoder));
        }
        assert_eq!(registry.sensor(&uuids::MODEL_NUMBER), None);
    }

    #[test]
    fn test_command_decoders() {
        let registry = DecoderRegistry::new();
        assert_eq!(
            registry.command(&uuids::COMMAND_WAVE_PLUS),
            Some(CommandDecoder::WaveRadonAndPlus)
        );
        assert_eq!(
            registry.command(&uuids::COMMAND_WAVE_2),
            Some(CommandDecoder::WaveRadonAndPlus)
        );
        assert_eq!(
            registry.command(&uuids::COMMAND_WAVE_MINI),
            Some(CommandDecoder::WaveMini)
        );
        assert_eq!(registry.command(&uuids::WAVE_PLUS_DATA), None);
    }

    #[test]
    fn test_has_atom_needs_both_characteristics() {
        assert!(DecoderRegistry::has_atom(&[
            uuids::MODEL_NUMBER,
            uuids::ATOM_COMMAND,
            uuids::ATOM_NOTIFY
        ]));
        assert!(!DecoderRegistry::has_atom(&[uuids::ATOM_COMMAND]));
        assert!(!DecoderRegistry::has_atom(&[uuids::ATOM_NOTIFY]));
        assert!(!DecoderRegistry::has_atom(&[]));
    }
}
