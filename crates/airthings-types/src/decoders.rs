//! Fixed-layout decoders, one per device generation or characteristic.
//!
//! Every decoder is a pure function from an exact-length buffer to a
//! [`SensorSnapshot`]. Values outside their quantity's range come back as
//! absent entries rather than errors.

use time::macros::format_description;
use time::{Date, Month, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::error::ParseError;
use crate::layout::{Field, Layout};
use crate::sensor::{SensorKey, SensorSnapshot};
use crate::uuid as chars;
use crate::validate::{
    CO2_MAX, PERCENTAGE_MAX, PRESSURE_MAX, RADON_MAX, TEMPERATURE_MAX, VOC_MAX,
    illuminance_converter, validate_value,
};

/// `<4B8H`: Wave Plus and Wave Radon sensor block.
pub const WAVE_PLUS_LAYOUT: Layout = Layout::new(&[
    Field::U8,
    Field::U8,
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
]);

/// `<2B5HLL`: Wave Mini sensor block.
pub const WAVE_MINI_LAYOUT: Layout = Layout::new(&[
    Field::U8,
    Field::U8,
    Field::U16,
    Field::U16,
    Field::U16,
    Field::U16,
    Field::U16,
    Field::U32,
    Field::U32,
]);

/// `<H5B`: year, month, day, hour, minute, second.
pub const DATETIME_LAYOUT: Layout = Layout::new(&[
    Field::U16,
    Field::U8,
    Field::U8,
    Field::U8,
    Field::U8,
    Field::U8,
]);

/// `BB`: illuminance byte, accelerometer byte.
pub const ILLUMINANCE_ACCELEROMETER_LAYOUT: Layout = Layout::new(&[Field::U8, Field::U8]);

const UNSIGNED_SCALAR: Layout = Layout::new(&[Field::U16]);
const SIGNED_SCALAR: Layout = Layout::new(&[Field::I16]);

const KELVIN_OFFSET: f64 = 273.15;

/// A decoder for one sensor characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorDecoder {
    /// Wave Plus block: humidity, illuminance, radon, temperature, pressure, CO2, VOC.
    WavePlus,
    /// Wave Radon block: the Wave Plus layout without CO2 and VOC.
    WaveRadon,
    /// Wave Mini block: temperature (Kelvin), pressure, humidity, VOC.
    WaveMini,
    /// Standard date/time characteristic.
    DateTime,
    /// Wave Gen 1 illuminance and accelerometer.
    IlluminanceAccelerometer,
    /// Standard humidity characteristic.
    Humidity,
    /// Wave Gen 1 radon 24 hour average.
    Radon1DayAvg,
    /// Wave Gen 1 radon long term average.
    RadonLongtermAvg,
    /// Standard temperature characteristic.
    Temperature,
}

impl SensorDecoder {
    /// Every sensor decoder.
    pub const ALL: [SensorDecoder; 9] = [
        SensorDecoder::WavePlus,
        SensorDecoder::WaveRadon,
        SensorDecoder::WaveMini,
        SensorDecoder::DateTime,
        SensorDecoder::IlluminanceAccelerometer,
        SensorDecoder::Humidity,
        SensorDecoder::Radon1DayAvg,
        SensorDecoder::RadonLongtermAvg,
        SensorDecoder::Temperature,
    ];

    /// The characteristic this decoder reads.
    #[must_use]
    pub fn characteristic(&self) -> Uuid {
        match self {
            SensorDecoder::WavePlus => chars::WAVE_PLUS_DATA,
            SensorDecoder::WaveRadon => chars::WAVE_2_DATA,
            SensorDecoder::WaveMini => chars::WAVE_MINI_DATA,
            SensorDecoder::DateTime => chars::DATETIME,
            SensorDecoder::IlluminanceAccelerometer => chars::ILLUMINANCE_ACCELEROMETER,
            SensorDecoder::Humidity => chars::HUMIDITY,
            SensorDecoder::Radon1DayAvg => chars::RADON_1DAY_AVG,
            SensorDecoder::RadonLongtermAvg => chars::RADON_LONG_TERM_AVG,
            SensorDecoder::Temperature => chars::TEMPERATURE,
        }
    }

    /// The wire layout this decoder expects.
    #[must_use]
    pub fn layout(&self) -> Layout {
        match self {
            SensorDecoder::WavePlus | SensorDecoder::WaveRadon => WAVE_PLUS_LAYOUT,
            SensorDecoder::WaveMini => WAVE_MINI_LAYOUT,
            SensorDecoder::DateTime => DATETIME_LAYOUT,
            SensorDecoder::IlluminanceAccelerometer => ILLUMINANCE_ACCELEROMETER_LAYOUT,
            SensorDecoder::Humidity
            | SensorDecoder::Radon1DayAvg
            | SensorDecoder::RadonLongtermAvg => UNSIGNED_SCALAR,
            SensorDecoder::Temperature => SIGNED_SCALAR,
        }
    }

    /// Decode an exact-length buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LengthMismatch`] when `data` is not exactly the
    /// layout size, and [`ParseError::InvalidDateTime`] for impossible dates.
    pub fn decode(&self, data: &[u8]) -> Result<SensorSnapshot, ParseError> {
        let v = self.layout().unpack(data)?;
        match self {
            SensorDecoder::WavePlus => Ok(decode_wave_plus(&v, true)),
            SensorDecoder::WaveRadon => Ok(decode_wave_plus(&v, false)),
            SensorDecoder::WaveMini => Ok(decode_wave_mini(&v)),
            SensorDecoder::DateTime => decode_datetime(&v),
            SensorDecoder::IlluminanceAccelerometer => Ok(decode_illuminance_accelerometer(&v)),
            SensorDecoder::Humidity => Ok(single(
                SensorKey::Humidity,
                v[0] as f64 / 100.0,
                PERCENTAGE_MAX,
            )),
            SensorDecoder::Radon1DayAvg => {
                Ok(single(SensorKey::Radon1DayAvg, v[0] as f64, RADON_MAX))
            }
            SensorDecoder::RadonLongtermAvg => {
                Ok(single(SensorKey::RadonLongtermAvg, v[0] as f64, RADON_MAX))
            }
            SensorDecoder::Temperature => Ok(single(
                SensorKey::Temperature,
                v[0] as f64 / 100.0,
                TEMPERATURE_MAX,
            )),
        }
    }
}

fn single(key: SensorKey, value: f64, max: f64) -> SensorSnapshot {
    let mut snapshot = SensorSnapshot::new();
    snapshot.insert_number(key, validate_value(value, max));
    snapshot
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn decode_wave_plus(v: &[i64], with_air_quality: bool) -> SensorSnapshot {
    let mut data = SensorSnapshot::new();
    data.insert_number(
        SensorKey::Humidity,
        validate_value(v[1] as f64 / 2.0, PERCENTAGE_MAX),
    );
    data.insert_number(SensorKey::Illuminance, illuminance_converter(v[2] as f64));
    data.insert_number(SensorKey::Radon1DayAvg, validate_value(v[4] as f64, RADON_MAX));
    data.insert_number(
        SensorKey::RadonLongtermAvg,
        validate_value(v[5] as f64, RADON_MAX),
    );
    data.insert_number(
        SensorKey::Temperature,
        validate_value(v[6] as f64 / 100.0, TEMPERATURE_MAX),
    );
    if with_air_quality {
        data.insert_number(
            SensorKey::RelAtmPressure,
            validate_value(v[7] as f64 / 50.0, PRESSURE_MAX),
        );
        data.insert_number(SensorKey::Co2, validate_value(v[8] as f64, CO2_MAX));
        data.insert_number(SensorKey::Voc, validate_value(v[9] as f64, VOC_MAX));
    }
    data
}

fn decode_wave_mini(v: &[i64]) -> SensorSnapshot {
    let mut data = SensorSnapshot::new();
    data.insert_number(
        SensorKey::Temperature,
        validate_value(round2(v[2] as f64 / 100.0 - KELVIN_OFFSET), TEMPERATURE_MAX),
    );
    data.insert_number(
        SensorKey::Pressure,
        validate_value(v[3] as f64 / 50.0, PRESSURE_MAX),
    );
    data.insert_number(
        SensorKey::Humidity,
        validate_value(v[4] as f64 / 100.0, PERCENTAGE_MAX),
    );
    data.insert_number(SensorKey::Voc, validate_value(v[5] as f64, VOC_MAX));
    data
}

fn decode_datetime(v: &[i64]) -> Result<SensorSnapshot, ParseError> {
    let invalid = |e: time::error::ComponentRange| ParseError::InvalidDateTime(e.to_string());

    // Every field came from a u8/u16, so the narrowing casts below are lossless.
    let month = Month::try_from(v[1] as u8).map_err(invalid)?;
    let date = Date::from_calendar_date(v[0] as i32, month, v[2] as u8).map_err(invalid)?;
    let time = Time::from_hms(v[3] as u8, v[4] as u8, v[5] as u8).map_err(invalid)?;

    let formatted = PrimitiveDateTime::new(date, time)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
        .map_err(|e| ParseError::InvalidDateTime(e.to_string()))?;

    let mut data = SensorSnapshot::new();
    data.insert_text(SensorKey::DateTime, formatted);
    Ok(data)
}

fn decode_illuminance_accelerometer(v: &[i64]) -> SensorSnapshot {
    let mut data = SensorSnapshot::new();
    data.insert_number(SensorKey::Illuminance, illuminance_converter(v[0] as f64));
    data.insert_text(SensorKey::Accelerometer, v[1].to_string());
    data
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

    #[test]
    fn test_layout_sizes_match_wire_formats() {
        assert_eq!(WAVE_PLUS_LAYOUT.size(), 20);
        assert_eq!(WAVE_MINI_LAYOUT.size(), 20);
        assert_eq!(DATETIME_LAYOUT.size(), 7);
        assert_eq!(ILLUMINANCE_ACCELEROMETER_LAYOUT.size(), 2);
    }

    #[test]
    fn test_wave_plus_sensor_data() {
        let raw = hex("01380d800b002200bd094cc31d036c0000007d05");
        let data = SensorDecoder::WavePlus.decode(&raw).unwrap();

        assert_eq!(data.number(SensorKey::Humidity), Some(28.0));
        assert_eq!(data.number(SensorKey::Radon1DayAvg), Some(11.0));
        assert_eq!(data.number(SensorKey::RadonLongtermAvg), Some(34.0));
        assert!((data.number(SensorKey::Temperature).unwrap() - 24.93).abs() < 1e-9);
        assert_eq!(data.number(SensorKey::Voc), Some(108.0));
        assert_eq!(data.number(SensorKey::Co2), Some(797.0));
        assert_eq!(data.number(SensorKey::Illuminance), Some(5.0));
        assert!((data.number(SensorKey::RelAtmPressure).unwrap() - 999.92).abs() < 1e-9);
        assert!(!data.contains_key(SensorKey::Pressure));
    }

    #[test]
    fn test_wave_radon_sensor_data() {
        let raw = hex("013860f009001100a709ffffffffffff0000ffff");
        let data = SensorDecoder::WaveRadon.decode(&raw).unwrap();

        assert_eq!(data.number(SensorKey::Humidity), Some(28.0));
        assert_eq!(data.number(SensorKey::Radon1DayAvg), Some(9.0));
        assert_eq!(data.number(SensorKey::RadonLongtermAvg), Some(17.0));
        assert!((data.number(SensorKey::Temperature).unwrap() - 24.71).abs() < 1e-9);
        assert!(!data.contains_key(SensorKey::Co2));
        assert!(!data.contains_key(SensorKey::Voc));
        assert!(!data.contains_key(SensorKey::RelAtmPressure));
    }

    #[test]
    fn test_wave_plus_out_of_range_radon_is_absent() {
        // radon_1day_avg = 0xFFFF, above the 16383 Bq/m3 ceiling
        let raw = hex("01380d80ffff2200bd094cc31d036c0000007d05");
        let data = SensorDecoder::WavePlus.decode(&raw).unwrap();

        assert_eq!(data.get(SensorKey::Radon1DayAvg), Some(None));
        assert_eq!(data.number(SensorKey::RadonLongtermAvg), Some(34.0));
    }

    #[test]
    fn test_wave_mini_sensor_data() {
        let raw: [u8; 20] = [
            0x01, 0x38, // unused bytes
            0x70, 0x74, // temperature = 29808 -> 298.08 K
            0x4C, 0xC3, // pressure = 49996 -> 999.92 mbar
            0xF0, 0x0A, // humidity = 2800 -> 28.00 %
            0x6C, 0x00, // voc = 108
            0x00, 0x00, // unused u16
            0x00, 0x00, 0x00, 0x00, // unused u32
            0x00, 0x00, 0x00, 0x00, // unused u32
        ];
        let data = SensorDecoder::WaveMini.decode(&raw).unwrap();

        assert_eq!(data.number(SensorKey::Temperature), Some(24.93));
        assert!((data.number(SensorKey::Pressure).unwrap() - 999.92).abs() < 1e-9);
        assert_eq!(data.number(SensorKey::Humidity), Some(28.0));
        assert_eq!(data.number(SensorKey::Voc), Some(108.0));
    }

    #[test]
    fn test_decoders_reject_wrong_length() {
        for decoder in SensorDecoder::ALL {
            let size = decoder.layout().size();
            let err = decoder.decode(&vec![0; size + 1]).unwrap_err();
            assert_eq!(
                err,
                ParseError::LengthMismatch {
                    expected: size,
                    actual: size + 1
                }
            );
        }
    }

    #[test]
    fn test_datetime_decoder() {
        // 2024-02-29 13:05:09
        let raw = [0xE8, 0x07, 2, 29, 13, 5, 9];
        let data = SensorDecoder::DateTime.decode(&raw).unwrap();
        assert_eq!(data.text(SensorKey::DateTime), Some("2024-02-29T13:05:09"));
    }

    #[test]
    fn test_datetime_decoder_rejects_impossible_dates() {
        let raw = [0xE7, 0x07, 2, 30, 0, 0, 0];
        assert!(matches!(
            SensorDecoder::DateTime.decode(&raw),
            Err(ParseError::InvalidDateTime(_))
        ));
        let raw = [0xE8, 0x07, 13, 1, 0, 0, 0];
        assert!(SensorDecoder::DateTime.decode(&raw).is_err());
    }

    #[test]
    fn test_wave_gen_1_illuminance_and_accelerometer() {
        let data = SensorDecoder::IlluminanceAccelerometer
            .decode(&hex("b20c"))
            .unwrap();
        assert_eq!(data.number(SensorKey::Illuminance), Some(69.0));
        assert_eq!(data.text(SensorKey::Accelerometer), Some("12"));
    }

    #[test]
    fn test_single_attribute_decoders() {
        let data = SensorDecoder::Humidity.decode(&[0xF0, 0x0A]).unwrap();
        assert_eq!(data.number(SensorKey::Humidity), Some(28.0));

        let data = SensorDecoder::Humidity.decode(&[0xFF, 0xFF]).unwrap();
        assert_eq!(data.get(SensorKey::Humidity), Some(None));

        let data = SensorDecoder::Radon1DayAvg.decode(&[0x2A, 0x00]).unwrap();
        assert_eq!(data.number(SensorKey::Radon1DayAvg), Some(42.0));

        let data = SensorDecoder::RadonLongtermAvg.decode(&[0x00, 0x40]).unwrap();
        assert_eq!(data.get(SensorKey::RadonLongtermAvg), Some(None));

        let data = SensorDecoder::Temperature.decode(&[0xBD, 0x09]).unwrap();
        assert!((data.number(SensorKey::Temperature).unwrap() - 24.93).abs() < 1e-9);
    }

    #[test]
    fn test_negative_temperature_is_dropped() {
        // -5.00 C
        let data = SensorDecoder::Temperature.decode(&[0x0C, 0xFE]).unwrap();
        assert_eq!(data.get(SensorKey::Temperature), Some(None));
    }

    #[test]
    fn test_every_decoder_has_a_distinct_characteristic() {
        let mut seen = std::collections::HashSet::new();
        for decoder in SensorDecoder::ALL {
            assert!(seen.insert(decoder.characteristic()));
        }
    }
}
