//! Range validation for decoded sensor values.
//!
//! Out-of-range readings are dropped (returned as `None`) instead of failing
//! the whole decode, so one bad field never hides the others.

/// Upper bound for percentages (humidity, illuminance).
pub const PERCENTAGE_MAX: f64 = 100.0;
/// Upper bound for radon concentrations in Bq/m³.
pub const RADON_MAX: f64 = 16383.0;
/// Upper bound for CO2 in ppm.
pub const CO2_MAX: f64 = 65534.0;
/// Upper bound for VOC in ppb.
pub const VOC_MAX: f64 = 65534.0;
/// Upper bound for pressure in mbar.
pub const PRESSURE_MAX: f64 = 1310.0;
/// Upper bound for temperature in °C.
pub const TEMPERATURE_MAX: f64 = 100.0;
/// Upper bound of a raw 8-bit illuminance reading.
pub const ILLUMINANCE_RAW_MAX: f64 = 255.0;

/// Return `value` when it lies in `[0, max_value]`, otherwise `None`.
///
/// ```
/// use airthings_types::validate::{validate_value, PERCENTAGE_MAX};
///
/// assert_eq!(validate_value(50.0, PERCENTAGE_MAX), Some(50.0));
/// assert_eq!(validate_value(100.1, PERCENTAGE_MAX), None);
/// assert_eq!(validate_value(-1.0, PERCENTAGE_MAX), None);
/// ```
#[must_use]
pub fn validate_value(value: f64, max_value: f64) -> Option<f64> {
    (0.0..=max_value).contains(&value).then_some(value)
}

/// Convert a raw 8-bit illuminance reading to a percentage.
///
/// The percentage is truncated toward zero rather than rounded, so `178`
/// (69.8%) maps to `69`.
#[must_use]
pub fn illuminance_converter(value: f64) -> Option<f64> {
    validate_value(value, ILLUMINANCE_RAW_MAX)
        .map(|raw| (raw / ILLUMINANCE_RAW_MAX * PERCENTAGE_MAX).trunc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_value_humidity() {
        for value in [0.0, 50.0, 100.0] {
            assert_eq!(validate_value(value, PERCENTAGE_MAX), Some(value));
        }
        for value in [-1.0, 100.1, 101.0] {
            assert_eq!(validate_value(value, PERCENTAGE_MAX), None);
        }
    }

    #[test]
    fn test_validate_value_radon() {
        for value in [0.0, 100.0, 1000.0, 16383.0] {
            assert_eq!(validate_value(value, RADON_MAX), Some(value));
        }
        for value in [-1.0, 16384.0, 65535.0] {
            assert_eq!(validate_value(value, RADON_MAX), None);
        }
    }

    #[test]
    fn test_validate_value_co2() {
        assert_eq!(validate_value(65534.0, CO2_MAX), Some(65534.0));
        assert_eq!(validate_value(65535.0, CO2_MAX), None);
    }

    #[test]
    fn test_validate_value_pressure() {
        assert_eq!(validate_value(0.0, PRESSURE_MAX), Some(0.0));
        assert_eq!(validate_value(1310.0, PRESSURE_MAX), Some(1310.0));
        assert_eq!(validate_value(1311.0, PRESSURE_MAX), None);
        assert_eq!(validate_value(-1.0, PRESSURE_MAX), None);
        assert_eq!(validate_value(65535.0, PRESSURE_MAX), None);
    }

    #[test]
    fn test_validate_value_nan_is_rejected() {
        assert_eq!(validate_value(f64::NAN, TEMPERATURE_MAX), None);
    }

    #[test]
    fn test_illuminance_boundaries() {
        assert_eq!(illuminance_converter(0.0), Some(0.0));
        assert_eq!(illuminance_converter(255.0), Some(100.0));
        assert_eq!(illuminance_converter(256.0), None);
    }

    #[test]
    fn test_illuminance_truncates() {
        // 13 / 255 * 100 = 5.09
        assert_eq!(illuminance_converter(13.0), Some(5.0));
        // 178 / 255 * 100 = 69.8
        assert_eq!(illuminance_converter(178.0), Some(69.0));
    }

    proptest! {
        #[test]
        fn prop_validate_is_idempotent(value in -1.0e6f64..1.0e6, max in 0.0f64..1.0e5) {
            let once = validate_value(value, max);
            let twice = once.and_then(|v| validate_value(v, max));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_illuminance_stays_in_percentage_range(raw in 0u8..=255) {
            let pct = illuminance_converter(f64::from(raw));
            prop_assert!(pct.is_some_and(|p| (0.0..=100.0).contains(&p)));
        }
    }
}
