//! Airthings product models, keyed by the model-number characteristic.

use core::fmt;

use crate::error::ParseError;
use crate::sensor::SensorKey;

/// Airthings device model.
///
/// Resolved from the model-number string the device reports. Model numbers
/// outside the known set are kept verbatim in [`DeviceType::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum DeviceType {
    /// Wave (first generation), model 2900.
    WaveGen1,
    /// Wave Mini, model 2920.
    WaveMini,
    /// Wave Plus, model 2930.
    WavePlus,
    /// Wave Radon, model 2950.
    WaveRadon,
    /// Wave Enhance (EU), model 3210.
    WaveEnhanceEu,
    /// Wave Enhance (US), model 3220.
    WaveEnhanceUs,
    /// Corentium Home 2, model 3250.
    CorentiumHome2,
    /// Unrecognized model number.
    Unknown(String),
}

const WAVE_GEN_1_SENSORS: &[SensorKey] = &[
    SensorKey::Temperature,
    SensorKey::Humidity,
    SensorKey::Radon1DayAvg,
    SensorKey::Radon1DayLevel,
    SensorKey::RadonLongtermAvg,
    SensorKey::RadonLongtermLevel,
    SensorKey::Illuminance,
    SensorKey::Accelerometer,
];

const WAVE_MINI_SENSORS: &[SensorKey] = &[
    SensorKey::Temperature,
    SensorKey::Humidity,
    SensorKey::Pressure,
    SensorKey::Voc,
    SensorKey::Battery,
];

const WAVE_PLUS_SENSORS: &[SensorKey] = &[
    SensorKey::Temperature,
    SensorKey::Humidity,
    SensorKey::Pressure,
    SensorKey::Co2,
    SensorKey::Voc,
    SensorKey::Radon1DayAvg,
    SensorKey::Radon1DayLevel,
    SensorKey::RadonLongtermAvg,
    SensorKey::RadonLongtermLevel,
    SensorKey::Illuminance,
    SensorKey::Battery,
];

const WAVE_RADON_SENSORS: &[SensorKey] = &[
    SensorKey::Temperature,
    SensorKey::Humidity,
    SensorKey::Radon1DayAvg,
    SensorKey::Radon1DayLevel,
    SensorKey::RadonLongtermAvg,
    SensorKey::RadonLongtermLevel,
    SensorKey::Illuminance,
    SensorKey::Battery,
];

const WAVE_ENHANCE_SENSORS: &[SensorKey] = &[
    SensorKey::Temperature,
    SensorKey::Humidity,
    SensorKey::Pressure,
    SensorKey::Co2,
    SensorKey::Voc,
    SensorKey::Lux,
    SensorKey::Noise,
    SensorKey::Battery,
    SensorKey::ConnectivityMode,
];

const CORENTIUM_HOME_2_SENSORS: &[SensorKey] = &[
    SensorKey::Temperature,
    SensorKey::Humidity,
    SensorKey::Battery,
    SensorKey::Radon1DayAvg,
    SensorKey::Radon1DayLevel,
    SensorKey::RadonWeekAvg,
    SensorKey::RadonWeekLevel,
    SensorKey::RadonMonthAvg,
    SensorKey::RadonMonthLevel,
    SensorKey::RadonYearAvg,
    SensorKey::RadonYearLevel,
    SensorKey::ConnectivityMode,
];

// Unknown models are read with the legacy defaults; keep whatever decodes.
const UNKNOWN_SENSORS: &[SensorKey] = &[
    SensorKey::Temperature,
    SensorKey::Humidity,
    SensorKey::Co2,
    SensorKey::Voc,
    SensorKey::Pressure,
    SensorKey::Illuminance,
    SensorKey::Accelerometer,
    SensorKey::Battery,
    SensorKey::Radon1DayAvg,
    SensorKey::Radon1DayLevel,
    SensorKey::RadonLongtermAvg,
    SensorKey::RadonLongtermLevel,
];

/// Piecewise-linear battery curve: `(voltage, percentage)` breakpoints in
/// ascending order.
type BatteryCurve = [(f64, f64); 6];

const WAVE_MINI_BATTERY: BatteryCurve = [
    (2.40, 0.0),
    (3.30, 23.0),
    (3.75, 42.0),
    (3.90, 62.0),
    (4.20, 85.0),
    (4.50, 100.0),
];

const AA_BATTERY: BatteryCurve = [
    (2.10, 0.0),
    (2.20, 5.0),
    (2.50, 28.0),
    (2.60, 53.0),
    (2.80, 81.0),
    (3.00, 100.0),
];

impl DeviceType {
    /// Every known model, in model-number order.
    pub const KNOWN: [DeviceType; 7] = [
        DeviceType::WaveGen1,
        DeviceType::WaveMini,
        DeviceType::WavePlus,
        DeviceType::WaveRadon,
        DeviceType::WaveEnhanceEu,
        DeviceType::WaveEnhanceUs,
        DeviceType::CorentiumHome2,
    ];

    /// Resolve a model number, keeping unrecognized values in
    /// [`DeviceType::Unknown`].
    ///
    /// ```
    /// use airthings_types::DeviceType;
    ///
    /// assert_eq!(DeviceType::from_raw_value("2930"), DeviceType::WavePlus);
    /// assert_eq!(
    ///     DeviceType::from_raw_value("9999"),
    ///     DeviceType::Unknown("9999".into())
    /// );
    /// ```
    #[must_use]
    pub fn from_raw_value(value: &str) -> Self {
        Self::try_from(value).unwrap_or_else(|_| DeviceType::Unknown(value.to_string()))
    }

    /// The model-number string this type was resolved from.
    #[must_use]
    pub fn raw_value(&self) -> &str {
        match self {
            DeviceType::WaveGen1 => "2900",
            DeviceType::WaveMini => "2920",
            DeviceType::WavePlus => "2930",
            DeviceType::WaveRadon => "2950",
            DeviceType::WaveEnhanceEu => "3210",
            DeviceType::WaveEnhanceUs => "3220",
            DeviceType::CorentiumHome2 => "3250",
            DeviceType::Unknown(raw) => raw,
        }
    }

    /// Human-readable product name.
    #[must_use]
    pub fn product_name(&self) -> &'static str {
        match self {
            DeviceType::WaveGen1 => "Wave Gen 1",
            DeviceType::WaveMini => "Wave Mini",
            DeviceType::WavePlus => "Wave Plus",
            DeviceType::WaveRadon => "Wave Radon",
            DeviceType::WaveEnhanceEu | DeviceType::WaveEnhanceUs => "Wave Enhance",
            DeviceType::CorentiumHome2 => "Corentium Home 2",
            DeviceType::Unknown(_) => "Unknown",
        }
    }

    /// Whether the model speaks the Atom request/response protocol.
    #[must_use]
    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            DeviceType::WaveEnhanceEu | DeviceType::WaveEnhanceUs | DeviceType::CorentiumHome2
        )
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, DeviceType::Unknown(_))
    }

    /// Minimum firmware version the integration expects, if any.
    #[must_use]
    pub fn required_firmware(&self) -> Option<&'static str> {
        match self {
            DeviceType::WaveEnhanceEu | DeviceType::WaveEnhanceUs => Some("2.6.1"),
            DeviceType::CorentiumHome2 => Some("1.3.4"),
            _ => None,
        }
    }

    /// Sensor keys this model can report. The final snapshot is filtered to
    /// this set.
    #[must_use]
    pub fn supported_sensors(&self) -> &'static [SensorKey] {
        match self {
            DeviceType::WaveGen1 => WAVE_GEN_1_SENSORS,
            DeviceType::WaveMini => WAVE_MINI_SENSORS,
            DeviceType::WavePlus => WAVE_PLUS_SENSORS,
            DeviceType::WaveRadon => WAVE_RADON_SENSORS,
            DeviceType::WaveEnhanceEu | DeviceType::WaveEnhanceUs => WAVE_ENHANCE_SENSORS,
            DeviceType::CorentiumHome2 => CORENTIUM_HOME_2_SENSORS,
            DeviceType::Unknown(_) => UNKNOWN_SENSORS,
        }
    }

    /// Convert a battery voltage to a rounded percentage.
    ///
    /// Wave Mini runs on a different cell chemistry than the AA-powered
    /// models and uses its own curve. Voltages at or above the top breakpoint
    /// give 100; below the bottom breakpoint give 0.
    ///
    /// ```
    /// use airthings_types::DeviceType;
    ///
    /// assert_eq!(DeviceType::WavePlus.battery_percentage(2.8), 81);
    /// assert_eq!(DeviceType::WaveMini.battery_percentage(4.2), 85);
    /// ```
    #[must_use]
    pub fn battery_percentage(&self, voltage: f64) -> u8 {
        let curve = match self {
            DeviceType::WaveMini => &WAVE_MINI_BATTERY,
            _ => &AA_BATTERY,
        };
        // The curve tops out at 100, so the cast cannot overflow.
        interpolate(curve, voltage).round() as u8
    }
}

fn interpolate(curve: &BatteryCurve, voltage: f64) -> f64 {
    let (top_v, top_pct) = curve[curve.len() - 1];
    if voltage >= top_v {
        return top_pct;
    }
    curve
        .windows(2)
        .find(|w| voltage >= w[0].0 && voltage < w[1].0)
        .map_or(0.0, |w| {
            let ((v0, p0), (v1, p1)) = (w[0], w[1]);
            (voltage - v0) / (v1 - v0) * (p1 - p0) + p0
        })
}

impl TryFrom<&str> for DeviceType {
    type Error = ParseError;

    /// Strict lookup: only known model numbers succeed.
    ///
    /// ```
    /// use airthings_types::DeviceType;
    ///
    /// assert_eq!(DeviceType::try_from("3250"), Ok(DeviceType::CorentiumHome2));
    /// assert!(DeviceType::try_from("1234").is_err());
    /// ```
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::KNOWN
            .into_iter()
            .find(|known| known.raw_value() == value)
            .ok_or_else(|| ParseError::UnknownModel(value.to_string()))
    }
}

impl Default for DeviceType {
    fn default() -> Self {
        DeviceType::Unknown(String::new())
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.product_name())
    }
}
