//! Qualitative radon bands.
//!
//! Two banding schemes exist across device generations. Both are kept as
//! separate static tables; callers pick one with [`RadonBanding`].

/// Multiplier from Bq/m³ to pCi/L.
pub const BQ_TO_PCI_MULTIPLIER: f64 = 0.027;

/// One half-open `[min, max)` band. A missing bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadonLevel {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub name: &'static str,
}

impl RadonLevel {
    const fn new(min: Option<f64>, max: Option<f64>, name: &'static str) -> Self {
        Self { min, max, name }
    }

    /// Whether `value` lies in this band.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value < max)
    }
}

/// very low / low / moderate / high
pub const LEGACY_LEVELS: [RadonLevel; 4] = [
    RadonLevel::new(Some(0.0), Some(50.0), "very low"),
    RadonLevel::new(Some(50.0), Some(100.0), "low"),
    RadonLevel::new(Some(100.0), Some(300.0), "moderate"),
    RadonLevel::new(Some(300.0), None, "high"),
];

/// good / fair / poor
pub const CURRENT_LEVELS: [RadonLevel; 3] = [
    RadonLevel::new(Some(0.0), Some(100.0), "good"),
    RadonLevel::new(Some(100.0), Some(150.0), "fair"),
    RadonLevel::new(Some(150.0), None, "poor"),
];

/// Name returned for values outside every band (negative or NaN).
pub const UNKNOWN_LEVEL: &str = "unknown";

/// Which radon banding table to classify with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RadonBanding {
    /// Four bands: very low, low, moderate, high.
    Legacy,
    /// Three bands: good, fair, poor.
    #[default]
    Current,
}

impl RadonBanding {
    #[must_use]
    pub fn levels(&self) -> &'static [RadonLevel] {
        match self {
            RadonBanding::Legacy => &LEGACY_LEVELS,
            RadonBanding::Current => &CURRENT_LEVELS,
        }
    }

    /// Classify a concentration in Bq/m³.
    ///
    /// ```
    /// use airthings_types::RadonBanding;
    ///
    /// assert_eq!(RadonBanding::Current.level(99.0), "good");
    /// assert_eq!(RadonBanding::Legacy.level(99.0), "low");
    /// assert_eq!(RadonBanding::Current.level(-1.0), "unknown");
    /// ```
    #[must_use]
    pub fn level(&self, bq: f64) -> &'static str {
        self.levels()
            .iter()
            .find(|level| level.contains(bq))
            .map_or(UNKNOWN_LEVEL, |level| level.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_banding() {
        let b = RadonBanding::Current;
        assert_eq!(b.level(0.0), "good");
        assert_eq!(b.level(49.0), "good");
        assert_eq!(b.level(99.9), "good");
        assert_eq!(b.level(100.0), "fair");
        assert_eq!(b.level(149.0), "fair");
        assert_eq!(b.level(150.0), "poor");
        assert_eq!(b.level(1000.0), "poor");
    }

    #[test]
    fn test_legacy_banding() {
        let b = RadonBanding::Legacy;
        assert_eq!(b.level(0.0), "very low");
        assert_eq!(b.level(49.0), "very low");
        assert_eq!(b.level(50.0), "low");
        assert_eq!(b.level(99.0), "low");
        assert_eq!(b.level(100.0), "moderate");
        assert_eq!(b.level(299.0), "moderate");
        assert_eq!(b.level(300.0), "high");
        assert_eq!(b.level(1000.0), "high");
    }

    #[test]
    fn test_out_of_band_values_are_unknown() {
        for b in [RadonBanding::Legacy, RadonBanding::Current] {
            assert_eq!(b.level(-0.1), UNKNOWN_LEVEL);
            assert_eq!(b.level(f64::NAN), UNKNOWN_LEVEL);
        }
    }

    #[test]
    fn test_bands_are_contiguous() {
        for b in [RadonBanding::Legacy, RadonBanding::Current] {
            for pair in b.levels().windows(2) {
                assert_eq!(pair[0].max, pair[1].min);
            }
            assert_eq!(b.levels().last().and_then(|l| l.max), None);
        }
    }

    #[test]
    fn test_default_banding() {
        assert_eq!(RadonBanding::default(), RadonBanding::Current);
    }
}
