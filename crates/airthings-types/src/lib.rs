//! Platform-agnostic types and decoders for Airthings indoor air quality sensors.
//!
//! This crate holds everything that can be done without a radio: the
//! characteristic table, fixed-layout sensor decoders, value validation,
//! device models, firmware checks and the radon and connectivity
//! classifiers. The connection and session logic lives in `airthings-core`.
//!
//! # Example
//!
//! ```
//! use airthings_types::{SensorDecoder, SensorKey};
//!
//! let raw = [
//!     0x01, 0x38, 0x0d, 0x80, 0x0b, 0x00, 0x22, 0x00, 0xbd, 0x09,
//!     0x4c, 0xc3, 0x1d, 0x03, 0x6c, 0x00, 0x00, 0x00, 0x7d, 0x05,
//! ];
//! let snapshot = SensorDecoder::WavePlus.decode(&raw).unwrap();
//! assert_eq!(snapshot.number(SensorKey::Co2), Some(797.0));
//! ```

pub mod connectivity;
pub mod decoders;
pub mod device_type;
pub mod error;
pub mod firmware;
pub mod layout;
pub mod pressure;
pub mod radon;
pub mod sensor;
pub mod types;
pub mod uuid;
pub mod validate;

pub use connectivity::ConnectivityMode;
pub use decoders::SensorDecoder;
pub use device_type::DeviceType;
pub use error::{ParseError, ParseResult};
pub use firmware::{FirmwareVersion, Version};
pub use layout::{Field, Layout};
pub use radon::{BQ_TO_PCI_MULTIPLIER, RadonBanding};
pub use sensor::{SensorKey, SensorSnapshot, SensorValue};
pub use types::{AirthingsDevice, DeviceInfo, DeviceInfoBuilder};
pub use uuid as uuids;
