//! Sensor keys, values, and the per-update snapshot mapping.

use core::fmt;
use std::collections::BTreeMap;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// Name of a quantity in a [`SensorSnapshot`].
///
/// [`SensorKey::RelAtmPressure`] and [`SensorKey::DateTime`] are scratch keys:
/// decoders emit them, and the session strips them before a snapshot is
/// returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum SensorKey {
    Temperature,
    Humidity,
    Co2,
    Voc,
    Pressure,
    RelAtmPressure,
    Illuminance,
    Lux,
    Accelerometer,
    Noise,
    Battery,
    Radon1DayAvg,
    RadonLongtermAvg,
    RadonWeekAvg,
    RadonMonthAvg,
    RadonYearAvg,
    Radon1DayLevel,
    RadonLongtermLevel,
    RadonWeekLevel,
    RadonMonthLevel,
    RadonYearLevel,
    DateTime,
    ConnectivityMode,
}

impl SensorKey {
    /// Every key, in declaration order.
    pub const ALL: [SensorKey; 23] = [
        SensorKey::Temperature,
        SensorKey::Humidity,
        SensorKey::Co2,
        SensorKey::Voc,
        SensorKey::Pressure,
        SensorKey::RelAtmPressure,
        SensorKey::Illuminance,
        SensorKey::Lux,
        SensorKey::Accelerometer,
        SensorKey::Noise,
        SensorKey::Battery,
        SensorKey::Radon1DayAvg,
        SensorKey::RadonLongtermAvg,
        SensorKey::RadonWeekAvg,
        SensorKey::RadonMonthAvg,
        SensorKey::RadonYearAvg,
        SensorKey::Radon1DayLevel,
        SensorKey::RadonLongtermLevel,
        SensorKey::RadonWeekLevel,
        SensorKey::RadonMonthLevel,
        SensorKey::RadonYearLevel,
        SensorKey::DateTime,
        SensorKey::ConnectivityMode,
    ];

    /// The wire/string form of the key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKey::Temperature => "temperature",
            SensorKey::Humidity => "humidity",
            SensorKey::Co2 => "co2",
            SensorKey::Voc => "voc",
            SensorKey::Pressure => "pressure",
            SensorKey::RelAtmPressure => "rel_atm_pressure",
            SensorKey::Illuminance => "illuminance",
            SensorKey::Lux => "lux",
            SensorKey::Accelerometer => "accelerometer",
            SensorKey::Noise => "noise",
            SensorKey::Battery => "battery",
            SensorKey::Radon1DayAvg => "radon_1day_avg",
            SensorKey::RadonLongtermAvg => "radon_longterm_avg",
            SensorKey::RadonWeekAvg => "radon_week_avg",
            SensorKey::RadonMonthAvg => "radon_month_avg",
            SensorKey::RadonYearAvg => "radon_year_avg",
            SensorKey::Radon1DayLevel => "radon_1day_level",
            SensorKey::RadonLongtermLevel => "radon_longterm_level",
            SensorKey::RadonWeekLevel => "radon_week_level",
            SensorKey::RadonMonthLevel => "radon_month_level",
            SensorKey::RadonYearLevel => "radon_year_level",
            SensorKey::DateTime => "date_time",
            SensorKey::ConnectivityMode => "connectivity_mode",
        }
    }

    /// Keys that only exist while a snapshot is being assembled.
    #[must_use]
    pub fn is_scratch(&self) -> bool {
        matches!(self, SensorKey::RelAtmPressure | SensorKey::DateTime)
    }

    /// Radon average keys paired with their derived level key.
    #[must_use]
    pub fn radon_level_key(&self) -> Option<SensorKey> {
        match self {
            SensorKey::Radon1DayAvg => Some(SensorKey::Radon1DayLevel),
            SensorKey::RadonLongtermAvg => Some(SensorKey::RadonLongtermLevel),
            SensorKey::RadonWeekAvg => Some(SensorKey::RadonWeekLevel),
            SensorKey::RadonMonthAvg => Some(SensorKey::RadonMonthLevel),
            SensorKey::RadonYearAvg => Some(SensorKey::RadonYearLevel),
            _ => None,
        }
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ParseError::InvalidValue(format!("unknown sensor key {s:?}")))
    }
}

#[cfg(feature = "serde")]
impl Serialize for SensorKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for SensorKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A decoded sensor value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum SensorValue {
    Number(f64),
    Text(String),
}

impl SensorValue {
    /// The numeric value, if this is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SensorValue::Number(v) => Some(*v),
            SensorValue::Text(_) => None,
        }
    }

    /// The text value, if this is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SensorValue::Text(s) => Some(s),
            SensorValue::Number(_) => None,
        }
    }
}

impl From<f64> for SensorValue {
    fn from(value: f64) -> Self {
        SensorValue::Number(value)
    }
}

impl From<String> for SensorValue {
    fn from(value: String) -> Self {
        SensorValue::Text(value)
    }
}

impl From<&str> for SensorValue {
    fn from(value: &str) -> Self {
        SensorValue::Text(value.to_string())
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Number(v) => write!(f, "{v}"),
            SensorValue::Text(s) => f.write_str(s),
        }
    }
}

/// Mapping from sensor key to value, where a present key with `None` marks a
/// reading the device reported but that failed validation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SensorSnapshot {
    values: BTreeMap<SensorKey, Option<SensorValue>>,
}

impl SensorSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: SensorKey, value: Option<SensorValue>) {
        self.values.insert(key, value);
    }

    /// Insert a numeric value, keeping `None` as an absent reading.
    pub fn insert_number(&mut self, key: SensorKey, value: Option<f64>) {
        self.values.insert(key, value.map(SensorValue::Number));
    }

    /// Insert a text value.
    pub fn insert_text(&mut self, key: SensorKey, value: impl Into<String>) {
        self.values.insert(key, Some(SensorValue::Text(value.into())));
    }

    /// Look up a key. The outer `Option` is key presence, the inner is validity.
    #[must_use]
    pub fn get(&self, key: SensorKey) -> Option<Option<&SensorValue>> {
        self.values.get(&key).map(Option::as_ref)
    }

    /// The numeric value for `key`, if present, valid, and numeric.
    #[must_use]
    pub fn number(&self, key: SensorKey) -> Option<f64> {
        self.values
            .get(&key)
            .and_then(Option::as_ref)
            .and_then(SensorValue::as_f64)
    }

    /// The text value for `key`, if present, valid, and text.
    #[must_use]
    pub fn text(&self, key: SensorKey) -> Option<&str> {
        self.values
            .get(&key)
            .and_then(Option::as_ref)
            .and_then(SensorValue::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: SensorKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: SensorKey) -> Option<Option<SensorValue>> {
        self.values.remove(&key)
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn merge(&mut self, other: SensorSnapshot) {
        self.values.extend(other.values);
    }

    /// Drop scratch keys.
    pub fn strip_scratch(&mut self) {
        self.values.retain(|key, _| !key.is_scratch());
    }

    /// Drop every key not in `supported`.
    pub fn retain_supported(&mut self, supported: &[SensorKey]) {
        self.values.retain(|key, _| supported.contains(key));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SensorKey, &Option<SensorValue>)> {
        self.values.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(SensorKey, Option<SensorValue>)> for SensorSnapshot {
    fn from_iter<I: IntoIterator<Item = (SensorKey, Option<SensorValue>)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
