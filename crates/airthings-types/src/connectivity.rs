//! How a device reaches the cloud.

use core::fmt;

/// Connectivity mode reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectivityMode {
    NotConfigured,
    Ble,
    SmartLink,
    Unknown,
}

impl ConnectivityMode {
    /// Classify the integer carried by an Atom connectivity response.
    ///
    /// ```
    /// use airthings_types::ConnectivityMode;
    ///
    /// assert_eq!(ConnectivityMode::from_atom_int(0), ConnectivityMode::NotConfigured);
    /// assert_eq!(ConnectivityMode::from_atom_int(1), ConnectivityMode::SmartLink);
    /// assert_eq!(ConnectivityMode::from_atom_int(4), ConnectivityMode::Ble);
    /// assert_eq!(ConnectivityMode::from_atom_int(99), ConnectivityMode::Unknown);
    /// ```
    #[must_use]
    pub fn from_atom_int(value: i128) -> Self {
        match value {
            0 => ConnectivityMode::NotConfigured,
            1 => ConnectivityMode::SmartLink,
            4 => ConnectivityMode::Ble,
            _ => ConnectivityMode::Unknown,
        }
    }

    /// Classify the integer used by older Wave firmware, where `0` means
    /// Bluetooth-only. Not interchangeable with [`from_atom_int`](Self::from_atom_int).
    #[must_use]
    pub fn from_legacy_int(value: i128) -> Self {
        match value {
            0 => ConnectivityMode::Ble,
            v if v > 0 => ConnectivityMode::SmartLink,
            _ => ConnectivityMode::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectivityMode::NotConfigured => "Not configured",
            ConnectivityMode::Ble => "Bluetooth",
            ConnectivityMode::SmartLink => "SmartLink",
            ConnectivityMode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ConnectivityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_connectivity() {
        assert_eq!(ConnectivityMode::from_atom_int(0), ConnectivityMode::NotConfigured);
        assert_eq!(ConnectivityMode::from_atom_int(1), ConnectivityMode::SmartLink);
        assert_eq!(ConnectivityMode::from_atom_int(4), ConnectivityMode::Ble);
        for other in [-1, 2, 3, 5, 99] {
            assert_eq!(ConnectivityMode::from_atom_int(other), ConnectivityMode::Unknown);
        }
    }

    #[test]
    fn test_legacy_connectivity() {
        assert_eq!(ConnectivityMode::from_legacy_int(0), ConnectivityMode::Ble);
        assert_eq!(ConnectivityMode::from_legacy_int(1), ConnectivityMode::SmartLink);
        assert_eq!(ConnectivityMode::from_legacy_int(4), ConnectivityMode::SmartLink);
        assert_eq!(ConnectivityMode::from_legacy_int(-1), ConnectivityMode::Unknown);
    }

    #[test]
    fn test_zero_differs_between_families() {
        assert_ne!(
            ConnectivityMode::from_atom_int(0),
            ConnectivityMode::from_legacy_int(0)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectivityMode::NotConfigured.to_string(), "Not configured");
        assert_eq!(ConnectivityMode::Ble.to_string(), "Bluetooth");
        assert_eq!(ConnectivityMode::SmartLink.to_string(), "SmartLink");
        assert_eq!(ConnectivityMode::Unknown.to_string(), "unknown");
    }
}
