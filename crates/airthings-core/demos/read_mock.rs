//! Example: Reading a Simulated Wave Plus
//!
//! Drives a full session update against the in-memory mock transport and
//! prints the resulting snapshot. An optional TOML file overrides the
//! session configuration.
//!
//! Run with: `RUST_LOG=debug cargo run --example read_mock -- [CONFIG.toml]`

use std::env;

use airthings_core::{AirthingsSession, MockTransport, SessionConfig, uuids};
use tracing_subscriber::EnvFilter;

const WAVE_PLUS_DATA: [u8; 20] = [
    0x01, 0x38, 0x0d, 0x80, 0x0b, 0x00, 0x22, 0x00, 0xbd, 0x09, 0x4c, 0xc3, 0x1d, 0x03, 0x6c,
    0x00, 0x00, 0x00, 0x7d, 0x05,
];

const WAVE_PLUS_COMMAND: [u8; 30] = [
    0x6d, 0x00, 0x60, 0x0c, 0x04, 0x00, 0x01, 0x00, 0x00, 0x82, 0x11, 0xff, 0x00, 0x00, 0x00,
    0x00, 0xc0, 0x4c, 0x20, 0x00, 0x1f, 0x35, 0x60, 0x00, 0x70, 0x06, 0xb8, 0x0b, 0x09, 0x00,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match env::args().nth(1) {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };

    let link = MockTransport::builder()
        .address("AA:BB:CC:12:34:56")
        .name("Airthings Wave+")
        .characteristic(uuids::MODEL_NUMBER, b"2930".to_vec())
        .characteristic(uuids::SERIAL_NUMBER, b"2930012345".to_vec())
        .characteristic(uuids::FIRMWARE_REVISION, b"G-BLE-1.5.3-master+0".to_vec())
        .characteristic(uuids::WAVE_PLUS_DATA, WAVE_PLUS_DATA.to_vec())
        .responder(uuids::COMMAND_WAVE_PLUS, uuids::COMMAND_WAVE_PLUS, |_| {
            WAVE_PLUS_COMMAND.chunks(20).map(<[u8]>::to_vec).collect()
        })
        .build();

    let mut session = AirthingsSession::new(link, config);
    let device = session.update().await?;

    println!("{} [{}]", device.info.name, device.info.model);
    println!("  Firmware: {}", device.info.firmware_version);
    println!();
    for (key, value) in device.sensors.iter() {
        match value {
            Some(value) => println!("  {:<20} {}", key.as_str(), value),
            None => println!("  {:<20} -", key.as_str()),
        }
    }

    Ok(())
}
