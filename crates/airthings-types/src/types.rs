//! Device identity and the readings attached to it.

use std::sync::LazyLock;

use regex::Regex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::device_type::DeviceType;
use crate::firmware::FirmwareVersion;
use crate::sensor::SensorSnapshot;

/// Placeholder some platforms return instead of a real serial number.
pub const PLACEHOLDER_SERIAL: &str = "Serial Number";

// "AT#123456-2900Radon"
static WAVE_GEN_1_SERIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d{6})").expect("valid regex"));

/// Identity of an Airthings device, read once on first sync.
///
/// Firmware is the exception: it is refreshed on every update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceInfo {
    /// Manufacturer name.
    pub manufacturer: String,
    /// Hardware revision.
    pub hardware_version: String,
    /// Raw firmware revision string.
    pub firmware_version: String,
    /// Display name, including the identifier when known.
    pub name: String,
    /// Serial number or name-derived identifier.
    pub identifier: String,
    /// Transport address (MAC or platform UUID).
    pub address: String,
    /// Resolved model.
    pub model: DeviceType,
    /// Set after identity fields have been read once.
    pub did_first_sync: bool,
    /// Parsed firmware versions and upgrade verdict.
    pub firmware: FirmwareVersion,
}

impl DeviceInfo {
    /// Create a builder for constructing `DeviceInfo`.
    pub fn builder() -> DeviceInfoBuilder {
        DeviceInfoBuilder::default()
    }

    /// Display name: the advertised name (or `Airthings {product}`),
    /// followed by ` ({identifier})` when one is known.
    ///
    /// ```
    /// use airthings_types::{DeviceInfo, DeviceType};
    ///
    /// assert_eq!(
    ///     DeviceInfo::friendly_name(None, &DeviceType::WavePlus, "123456"),
    ///     "Airthings Wave Plus (123456)"
    /// );
    /// ```
    #[must_use]
    pub fn friendly_name(name: Option<&str>, model: &DeviceType, identifier: &str) -> String {
        let base = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Airthings {}", model.product_name()),
        };
        if identifier.is_empty() {
            base
        } else {
            format!("{base} ({identifier})")
        }
    }

    /// Whether the device reports a firmware older than the one it needs.
    #[must_use]
    pub fn need_firmware_upgrade(&self) -> bool {
        self.firmware.need_firmware_upgrade()
    }

    /// Last six hex digits of [`address`](Self::address).
    #[must_use]
    pub fn short_address(&self) -> String {
        short_address(&self.address)
    }
}

/// Normalize a serial number, dropping empty values and the platform placeholder.
#[must_use]
pub fn normalize_serial(serial: Option<&str>) -> Option<String> {
    serial
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != PLACEHOLDER_SERIAL)
        .map(str::to_string)
}

/// Extract the six-digit serial Wave Gen 1 devices embed in their name.
///
/// ```
/// use airthings_types::types::wave_gen_1_identifier;
///
/// assert_eq!(wave_gen_1_identifier("AT#123456-2900Radon").as_deref(), Some("123456"));
/// assert_eq!(wave_gen_1_identifier("Wave"), None);
/// ```
#[must_use]
pub fn wave_gen_1_identifier(name: &str) -> Option<String> {
    WAVE_GEN_1_SERIAL
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Last six hex digits of a MAC address or platform UUID, uppercased.
///
/// ```
/// use airthings_types::types::short_address;
///
/// assert_eq!(short_address("aa:bb:cc:dd:ee:ff"), "DDEEFF");
/// ```
#[must_use]
pub fn short_address(address: &str) -> String {
    let digits: Vec<char> = address
        .chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let start = digits.len().saturating_sub(6);
    digits[start..].iter().collect()
}

/// Builder for constructing `DeviceInfo`.
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct DeviceInfoBuilder {
    info: DeviceInfo,
}

impl DeviceInfoBuilder {
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.info.manufacturer = manufacturer.into();
        self
    }

    pub fn hardware_version(mut self, hardware: impl Into<String>) -> Self {
        self.info.hardware_version = hardware.into();
        self
    }

    /// Set the raw firmware string and re-parse the current version.
    pub fn firmware_version(mut self, firmware: impl Into<String>) -> Self {
        self.info.firmware_version = firmware.into();
        self.info
            .firmware
            .update_current(Some(&self.info.firmware_version));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.info.name = name.into();
        self
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.info.identifier = identifier.into();
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.info.address = address.into();
        self
    }

    /// Set the model and the firmware it requires.
    pub fn model(mut self, model: DeviceType) -> Self {
        self.info.firmware.update_required(model.required_firmware());
        self.info.model = model;
        self
    }

    pub fn did_first_sync(mut self, synced: bool) -> Self {
        self.info.did_first_sync = synced;
        self
    }

    #[must_use]
    pub fn build(self) -> DeviceInfo {
        self.info
    }
}

/// A device together with its latest readings.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AirthingsDevice {
    pub info: DeviceInfo,
    pub sensors: SensorSnapshot,
}

impl AirthingsDevice {
    #[must_use]
    pub fn new(info: DeviceInfo, sensors: SensorSnapshot) -> Self {
        Self { info, sensors }
    }
}
