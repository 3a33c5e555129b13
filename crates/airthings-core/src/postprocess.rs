//! Turning decoded values into the snapshot a caller sees.
//!
//! Decoders report raw-but-scaled quantities. This module derives radon
//! levels, applies unit and pressure conversions, turns battery voltages
//! into percentages and maps Atom short codes to sensor keys.

use tracing::debug;

use airthings_types::pressure::absolute_pressure;
use airthings_types::{BQ_TO_PCI_MULTIPLIER, DeviceType, SensorKey, SensorSnapshot};

use crate::atom::AtomValues;
use crate::config::SessionConfig;

const KELVIN_OFFSET: f64 = 273.15;

/// Atom reports pressure in 1/64 Pa steps, i.e. 6400 per mbar.
const ATOM_PRESSURE_DIVISOR: f64 = 6400.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Map an Atom latest-values payload to sensor keys.
///
/// Unknown codes and `TIM` are dropped.
#[must_use]
pub fn atom_values(values: &AtomValues, model: &DeviceType) -> SensorSnapshot {
    let mut snapshot = SensorSnapshot::new();

    for (code, value) in values {
        let Some(raw) = value.as_f64() else {
            debug!(code = %code, ?value, "Skipping non-numeric Atom value");
            continue;
        };

        let (key, converted) = match code.as_str() {
            "TMP" => (SensorKey::Temperature, round2(raw / 100.0 - KELVIN_OFFSET)),
            "HUM" => (SensorKey::Humidity, raw / 100.0),
            "CO2" => (SensorKey::Co2, raw),
            "VOC" => (SensorKey::Voc, raw),
            "LUX" => (SensorKey::Lux, raw),
            "PRS" => (SensorKey::Pressure, round2(raw / ATOM_PRESSURE_DIVISOR)),
            "NOI" => (SensorKey::Noise, raw),
            "BAT" => (
                SensorKey::Battery,
                f64::from(model.battery_percentage(raw / 1000.0)),
            ),
            "R24" => (SensorKey::Radon1DayAvg, raw),
            "R7D" => (SensorKey::RadonWeekAvg, raw),
            "R30D" | "R30" => (SensorKey::RadonMonthAvg, raw),
            "R1Y" => (SensorKey::RadonYearAvg, raw),
            "TIM" => continue,
            other => {
                debug!(code = other, "Ignoring unknown Atom value");
                continue;
            }
        };
        snapshot.insert_number(key, Some(converted));
    }

    snapshot
}

/// Add `*_level` keys for every radon average, then convert the averages to
/// pCi/L when the caller is not metric.
pub fn apply_radon(snapshot: &mut SensorSnapshot, config: &SessionConfig) {
    let averages: Vec<(SensorKey, f64)> = snapshot
        .iter()
        .filter(|(key, _)| key.radon_level_key().is_some())
        .filter_map(|(key, value)| Some((*key, value.as_ref()?.as_f64()?)))
        .collect();

    for (key, bq) in averages {
        if let Some(level_key) = key.radon_level_key() {
            snapshot.insert_text(level_key, config.radon_banding.level(bq));
        }
        if !config.is_metric {
            snapshot.insert_number(key, Some(bq * BQ_TO_PCI_MULTIPLIER));
        }
    }
}

/// Replace the scratch relative pressure with `pressure`, corrected for
/// elevation when one is configured.
pub fn apply_pressure(snapshot: &mut SensorSnapshot, elevation: Option<f64>) {
    let Some(rel) = snapshot.remove(SensorKey::RelAtmPressure).flatten() else {
        return;
    };
    let Some(rel) = rel.as_f64() else {
        return;
    };
    let pressure = match elevation {
        Some(elevation) => absolute_pressure(elevation, rel),
        None => rel,
    };
    snapshot.insert_number(SensorKey::Pressure, Some(pressure));
}

/// Run every conversion and reduce the snapshot to what `model` supports.
pub fn finish(snapshot: &mut SensorSnapshot, config: &SessionConfig, model: &DeviceType) {
    apply_radon(snapshot, config);
    apply_pressure(snapshot, config.elevation);
    snapshot.strip_scratch();
    snapshot.retain_supported(model.supported_sensors());
}
