//! Bluetooth UUIDs for Airthings devices.
//!
//! Standard Bluetooth SIG characteristics use the `0000xxxx-0000-1000-8000-00805f9b34fb`
//! base; Airthings vendor characteristics share the
//! `b42exxxx-ade7-11e4-89d3-123b93f75cba` base.

use uuid::{Uuid, uuid};

/// Airthings manufacturer ID in BLE advertisements.
pub const MANUFACTURER_ID: u16 = 820;

// --- Device Information ---

/// Manufacturer name string.
pub const MANUFACTURER_NAME: Uuid = uuid!("00002a29-0000-1000-8000-00805f9b34fb");

/// Serial number string.
pub const SERIAL_NUMBER: Uuid = uuid!("00002a25-0000-1000-8000-00805f9b34fb");

/// Model number string; resolves the [`DeviceType`](crate::DeviceType).
pub const MODEL_NUMBER: Uuid = uuid!("00002a24-0000-1000-8000-00805f9b34fb");

/// GAP device name.
pub const DEVICE_NAME: Uuid = uuid!("00002a00-0000-1000-8000-00805f9b34fb");

/// Firmware revision string.
pub const FIRMWARE_REVISION: Uuid = uuid!("00002a26-0000-1000-8000-00805f9b34fb");

/// Hardware revision string.
pub const HARDWARE_REVISION: Uuid = uuid!("00002a27-0000-1000-8000-00805f9b34fb");

// --- Standard sensor characteristics ---

/// Date/time of the last measurement.
pub const DATETIME: Uuid = uuid!("00002a08-0000-1000-8000-00805f9b34fb");

/// Temperature, signed hundredths of a degree.
pub const TEMPERATURE: Uuid = uuid!("00002a6e-0000-1000-8000-00805f9b34fb");

/// Relative humidity, hundredths of a percent.
pub const HUMIDITY: Uuid = uuid!("00002a6f-0000-1000-8000-00805f9b34fb");

// --- Airthings sensor characteristics ---

/// Radon 24 hour average (Wave Gen 1).
pub const RADON_1DAY_AVG: Uuid = uuid!("b42e01aa-ade7-11e4-89d3-123b93f75cba");

/// Radon long term average (Wave Gen 1).
pub const RADON_LONG_TERM_AVG: Uuid = uuid!("b42e0a4c-ade7-11e4-89d3-123b93f75cba");

/// Illuminance and accelerometer bytes (Wave Gen 1).
pub const ILLUMINANCE_ACCELEROMETER: Uuid = uuid!("b42e1348-ade7-11e4-89d3-123b93f75cba");

/// Combined sensor block (Wave Plus).
pub const WAVE_PLUS_DATA: Uuid = uuid!("b42e2a68-ade7-11e4-89d3-123b93f75cba");

/// Combined sensor block (Wave Radon / Wave 2).
pub const WAVE_2_DATA: Uuid = uuid!("b42e4dcc-ade7-11e4-89d3-123b93f75cba");

/// Combined sensor block (Wave Mini).
pub const WAVE_MINI_DATA: Uuid = uuid!("b42e3b98-ade7-11e4-89d3-123b93f75cba");

// --- Command characteristics ---

/// Access control point used for the battery command on Wave Plus.
pub const COMMAND_WAVE_PLUS: Uuid = uuid!("b42e2d06-ade7-11e4-89d3-123b93f75cba");

/// Access control point on Wave Radon.
pub const COMMAND_WAVE_2: Uuid = uuid!("b42e50d8-ade7-11e4-89d3-123b93f75cba");

/// Access control point on Wave Mini.
pub const COMMAND_WAVE_MINI: Uuid = uuid!("b42e5316-ade7-11e4-89d3-123b93f75cba");

/// Atom protocol request characteristic (write).
pub const ATOM_COMMAND: Uuid = uuid!("b42e3ef4-ade7-11e4-89d3-123b93f75cba");

/// Atom protocol response characteristic (notify).
pub const ATOM_NOTIFY: Uuid = uuid!("b42e3ef5-ade7-11e4-89d3-123b93f75cba");
