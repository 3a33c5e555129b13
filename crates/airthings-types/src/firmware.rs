//! Firmware version parsing and upgrade checks.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;

static SEMANTIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").expect("valid regex"));

// "T-SUB-2.6.0-master+0", "R-SUB-1.3.5-master+0"
static AIRTHINGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]-SUB-(\d+)\.(\d+)\.(\d+)-.*").expect("valid regex")
});

/// A `major.minor.patch` version, ordered lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version(pub u32, pub u32, pub u32);

impl Version {
    /// Parse either a plain `X.Y.Z` string or an Airthings build string
    /// such as `T-SUB-2.6.0-master+0`.
    ///
    /// ```
    /// use airthings_types::firmware::Version;
    ///
    /// assert_eq!(Version::parse("1.3.4"), Some(Version(1, 3, 4)));
    /// assert_eq!(Version::parse("T-SUB-2.6.0-master+0"), Some(Version(2, 6, 0)));
    /// assert_eq!(Version::parse("1.2"), None);
    /// ```
    #[must_use]
    pub fn parse(version: &str) -> Option<Self> {
        let caps = SEMANTIC
            .captures(version)
            .or_else(|| AIRTHINGS.captures(version))?;
        let part = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
        Some(Version(part(1)?, part(2)?, part(3)?))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}

/// Current and required firmware for a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FirmwareVersion {
    pub current: Option<Version>,
    pub required: Option<Version>,
}

impl FirmwareVersion {
    /// Build from raw version strings; unparseable or missing strings become `None`.
    #[must_use]
    pub fn new(current: Option<&str>, required: Option<&str>) -> Self {
        Self {
            current: current.and_then(Version::parse),
            required: required.and_then(Version::parse),
        }
    }

    pub fn update_current(&mut self, current: Option<&str>) {
        self.current = current.and_then(Version::parse);
    }

    pub fn update_required(&mut self, required: Option<&str>) {
        self.required = required.and_then(Version::parse);
    }

    /// `true` only when both versions are known and current is older.
    #[must_use]
    pub fn need_firmware_upgrade(&self) -> bool {
        match (self.current, self.required) {
            (Some(current), Some(required)) => current < required,
            _ => false,
        }
    }
}
