//! Async protocol library for Airthings environmental sensors.
//!
//! This crate talks to Airthings devices over any link that implements
//! [`Transport`]. It knows both protocol generations:
//!
//! - **Legacy** (Wave Gen 1, Wave Mini, Wave Plus, Wave Radon): sensor
//!   characteristics are read directly, and battery/illuminance come from a
//!   one-byte command answered by notification.
//! - **Atom** (Wave Enhance, Corentium Home 2): CBOR-framed request/response
//!   over a command and a notify characteristic.
//!
//! Byte-level decoding of the legacy sensor records lives in
//! [`airthings_types`]; this crate adds the async pieces: notification
//! reassembly, the command and Atom codecs, retry and timeouts, and the
//! [`AirthingsSession`] that ties a full update together.
//!
//! # Supported Devices
//!
//! | Device | Model | Protocol |
//! |--------|-------|----------|
//! | Wave Gen 1 | 2900 | legacy |
//! | Wave Mini | 2920 | legacy |
//! | Wave Plus | 2930 | legacy |
//! | Wave Radon | 2950 | legacy |
//! | Wave Enhance | 3210 / 3220 | Atom |
//! | Corentium Home 2 | 3250 | Atom |
//!
//! # Quick Start
//!
//! ```
//! use airthings_core::{AirthingsSession, MockTransport, SessionConfig};
//! use airthings_types::{SensorKey, uuids};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let link = MockTransport::builder()
//!         .name("Airthings Wave Plus")
//!         .characteristic(uuids::MODEL_NUMBER, b"2930".to_vec())
//!         .characteristic(uuids::TEMPERATURE, vec![0xBD, 0x09])
//!         .build();
//!
//!     let mut session = AirthingsSession::new(link, SessionConfig::default());
//!     let device = session.update().await?;
//!     println!("{}: {:?}", device.info.name, device.sensors.number(SensorKey::Temperature));
//!     Ok(())
//! }
//! ```

pub mod atom;
pub mod command;
pub mod config;
pub mod error;
pub mod mock;
pub mod postprocess;
pub mod reassembler;
pub mod registry;
pub mod retry;
pub mod session;
pub mod transport;

// Core exports
pub use atom::{AtomEncoding, AtomPayload, AtomRequest, AtomRequestPath, AtomResponse};
pub use command::{CommandDecoder, CommandReading};
pub use config::SessionConfig;
pub use error::{AtomError, ConnectionFailureReason, Error, Result};
pub use mock::{MockTransport, MockTransportBuilder};
pub use reassembler::{Completion, NotificationReassembler};
pub use registry::DecoderRegistry;
pub use retry::{RetryConfig, with_retry};
pub use session::AirthingsSession;
pub use transport::{NotificationHandler, SubscriptionHandle, Transport};

// Re-export from airthings-types
pub use airthings_types::uuid as uuids;
pub use airthings_types::{AirthingsDevice, DeviceInfo, DeviceType, SensorKey, SensorSnapshot};
