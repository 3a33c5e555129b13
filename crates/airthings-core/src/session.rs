//! One device, one update at a time.
//!
//! [`AirthingsSession`] drives a full update over a [`Transport`]: connect,
//! identify the model on first sync, refresh firmware, fetch sensors over the
//! Atom or legacy path, post-process and disconnect. The whole sequence is
//! retried on transient failures and bounded by a wall-clock timeout.

use std::sync::atomic::{AtomicU32, Ordering};

use bytes::Bytes;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use airthings_types::types::{normalize_serial, short_address, wave_gen_1_identifier};
use airthings_types::{
    AirthingsDevice, DeviceInfo, DeviceType, SensorKey, SensorSnapshot, uuids,
};

use crate::atom::{self, AtomPayload, AtomRequest, AtomRequestPath, AtomResponse};
use crate::command::{CommandDecoder, CommandReading};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::postprocess;
use crate::reassembler::NotificationReassembler;
use crate::registry::DecoderRegistry;
use crate::retry::{RetryConfig, with_retry};
use crate::transport::Transport;

/// Atom paths requested on every update, in order.
const ATOM_PATHS: [AtomRequestPath; 2] = [
    AtomRequestPath::ConnectivityMode,
    AtomRequestPath::LatestValues,
];

/// Reads an Airthings device over a [`Transport`].
///
/// Identity fields are read once and kept across updates; firmware is re-read
/// every time.
///
/// # Example
///
/// ```
/// use airthings_core::{AirthingsSession, MockTransport, SessionConfig};
/// use airthings_types::{SensorKey, uuids};
///
/// #[tokio::main]
/// async fn main() -> airthings_core::Result<()> {
///     let link = MockTransport::builder()
///         .characteristic(uuids::MODEL_NUMBER, b"2950".to_vec())
///         .characteristic(uuids::HUMIDITY, vec![0x88, 0x13])
///         .build();
///
///     let mut session = AirthingsSession::new(link, SessionConfig::default());
///     let device = session.update().await?;
///     assert_eq!(device.sensors.number(SensorKey::Humidity), Some(50.0));
///     Ok(())
/// }
/// ```
pub struct AirthingsSession<T: Transport> {
    transport: T,
    config: SessionConfig,
    registry: DecoderRegistry,
    info: DeviceInfo,
}

impl<T: Transport> AirthingsSession<T> {
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            config,
            registry: DecoderRegistry::default(),
            info: DeviceInfo::default(),
        }
    }

    /// Use a custom decoder registry.
    #[must_use]
    pub fn with_registry(mut self, registry: DecoderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Identity as of the last successful update.
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Run a full update.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnsupportedDevice`] when an Atom-capable device
    /// reports an unknown model, with a structural [`Error::Atom`] error, or
    /// with the last transport error once every attempt is used up.
    #[tracing::instrument(skip(self), fields(device = %short_address(self.transport.address())))]
    pub async fn update(&mut self) -> Result<AirthingsDevice> {
        self.config.validate()?;

        let retry = RetryConfig::attempts(self.config.max_attempts, self.config.retry_delay);
        let info = self.info.clone();
        let attempt = AtomicU32::new(0);

        let device = with_retry(&retry, "update", || {
            let n = attempt.fetch_add(1, Ordering::Relaxed) + 1;
            self.attempt(info.clone(), n)
        })
        .await?;

        self.info = device.info.clone();
        Ok(device)
    }

    #[tracing::instrument(skip(self, info))]
    async fn attempt(&self, mut info: DeviceInfo, attempt: u32) -> Result<AirthingsDevice> {
        let overall = self.config.overall_timeout;
        let result = timeout(overall, self.connected_update(&mut info))
            .await
            .unwrap_or_else(|_| Err(Error::timeout("update", overall)));

        if let Err(e) = self.transport.disconnect().await {
            warn!(error = %e, "Failed to disconnect");
        }

        let sensors = result?;
        Ok(AirthingsDevice::new(info, sensors))
    }

    async fn connected_update(&self, info: &mut DeviceInfo) -> Result<SensorSnapshot> {
        self.transport.connect().await?;
        let disconnected = self.transport.disconnected();

        tokio::select! {
            biased;
            _ = disconnected.cancelled() => {
                warn!("Device disconnected during update");
                Err(Error::Disconnected)
            }
            result = self.fetch(info) => result,
        }
    }

    async fn fetch(&self, info: &mut DeviceInfo) -> Result<SensorSnapshot> {
        let characteristics = self.transport.characteristics().await?;
        let has_atom = DecoderRegistry::has_atom(&characteristics);

        if !info.did_first_sync {
            *info = self.identify(has_atom).await?;
        }
        self.refresh_firmware(info).await?;

        let mut sensors = if info.model.is_atom() && has_atom {
            self.fetch_atom(&info.model).await?
        } else {
            self.fetch_legacy(&info.model, &characteristics).await?
        };

        postprocess::finish(&mut sensors, &self.config, &info.model);
        debug!(count = sensors.len(), "Sensors updated");
        Ok(sensors)
    }

    /// Read identity fields and resolve the model.
    async fn identify(&self, has_atom: bool) -> Result<DeviceInfo> {
        let model_raw = self
            .read_string(uuids::MODEL_NUMBER)
            .await?
            .unwrap_or_default();
        let model = DeviceType::from_raw_value(&model_raw);

        if model.is_unknown() {
            if has_atom {
                return Err(Error::unsupported_device(model_raw));
            }
            warn!(model = %model_raw, "Unknown model, continuing with defaults");
        }

        let manufacturer = self.read_string(uuids::MANUFACTURER_NAME).await?;
        let hardware = self.read_string(uuids::HARDWARE_REVISION).await?;
        let name = match self.read_string(uuids::DEVICE_NAME).await? {
            Some(name) => Some(name),
            None => self.transport.name().map(str::to_string),
        };

        let serial = self.read_string(uuids::SERIAL_NUMBER).await?;
        let identifier = match normalize_serial(serial.as_deref()) {
            Some(serial) => Some(serial),
            None if model == DeviceType::WaveGen1 => {
                name.as_deref().and_then(wave_gen_1_identifier)
            }
            None => None,
        };
        let identifier = identifier.unwrap_or_default();
        if identifier.is_empty() {
            warn!(model = %model, "Missing identifier");
        }

        let display_name = DeviceInfo::friendly_name(name.as_deref(), &model, &identifier);
        info!(name = %display_name, model = %model, "Identified device");

        Ok(DeviceInfo::builder()
            .manufacturer(manufacturer.unwrap_or_default())
            .hardware_version(hardware.unwrap_or_default())
            .name(display_name)
            .identifier(identifier)
            .address(self.transport.address())
            .model(model)
            .did_first_sync(true)
            .build())
    }

    async fn refresh_firmware(&self, info: &mut DeviceInfo) -> Result<()> {
        let Some(firmware) = self.read_string(uuids::FIRMWARE_REVISION).await? else {
            warn!("Missing firmware version");
            return Ok(());
        };
        info.firmware.update_current(Some(&firmware));
        info.firmware_version = firmware;

        if info.need_firmware_upgrade() {
            warn!(
                current = %info.firmware_version,
                required = ?info.firmware.required,
                "Firmware upgrade needed"
            );
        }
        Ok(())
    }

    async fn fetch_atom(&self, model: &DeviceType) -> Result<SensorSnapshot> {
        let mut sensors = SensorSnapshot::new();

        for path in ATOM_PATHS {
            let request = AtomRequest::new(path, None)?;
            let bytes = request.encode(self.config.atom_encoding)?;

            let Some(message) = self
                .exchange(uuids::ATOM_COMMAND, uuids::ATOM_NOTIFY, atom::reassembler(), &bytes)
                .await?
            else {
                continue;
            };

            match AtomResponse::new(&message, request.nonce(), path).parse()? {
                Some(AtomPayload::Connectivity(mode)) => {
                    sensors.insert_text(SensorKey::ConnectivityMode, mode.as_str());
                }
                Some(AtomPayload::LatestValues(values)) => {
                    sensors.merge(postprocess::atom_values(&values, model));
                }
                None => debug!(%path, "No data in Atom response"),
            }
        }

        Ok(sensors)
    }

    async fn fetch_legacy(
        &self,
        model: &DeviceType,
        characteristics: &[Uuid],
    ) -> Result<SensorSnapshot> {
        let mut sensors = SensorSnapshot::new();
        let mut command_illuminance = None;

        for uuid in characteristics {
            if let Some(decoder) = self.registry.sensor(uuid) {
                if let Some(raw) = self.read_optional(*uuid).await? {
                    match decoder.decode(&raw) {
                        Ok(data) => sensors.merge(data),
                        Err(e) => {
                            warn!(characteristic = %uuid, error = %e, "Failed to decode sensor data");
                        }
                    }
                }
            }

            if let Some(decoder) = self.registry.command(uuid)
                && let Some(reading) = self.run_command(*uuid, decoder).await?
            {
                let pct = model.battery_percentage(reading.battery_voltage);
                sensors.insert_number(SensorKey::Battery, Some(f64::from(pct)));
                command_illuminance = command_illuminance.or(reading.illuminance);
            }
        }

        if !sensors.contains_key(SensorKey::Illuminance)
            && let Some(illuminance) = command_illuminance
        {
            sensors.insert_number(SensorKey::Illuminance, Some(illuminance));
        }

        Ok(sensors)
    }

    async fn run_command(
        &self,
        characteristic: Uuid,
        decoder: CommandDecoder,
    ) -> Result<Option<CommandReading>> {
        let message = self
            .exchange(
                characteristic,
                characteristic,
                decoder.reassembler(),
                &decoder.request(),
            )
            .await?;
        Ok(decoder.decode(message.as_deref()))
    }

    /// Subscribe, write `request`, wait for the reassembled reply and
    /// unsubscribe. A reply that does not arrive in time is `None`.
    async fn exchange(
        &self,
        write: Uuid,
        notify: Uuid,
        reassembler: NotificationReassembler,
        request: &[u8],
    ) -> Result<Option<Bytes>> {
        let handle = self
            .transport
            .subscribe(notify, Box::new(reassembler.sink()))
            .await?;

        let outcome = match self.transport.write(write, request).await {
            Ok(()) => match reassembler.await_complete(self.config.command_timeout).await {
                Ok(message) => Ok(Some(message)),
                Err(e) => {
                    warn!(characteristic = %notify, error = %e, "Timeout getting command data");
                    Ok(None)
                }
            },
            Err(e) => Err(e),
        };

        let unsubscribed = self.transport.unsubscribe(handle).await;
        let message = outcome?;
        unsubscribed?;
        Ok(message)
    }

    /// Read a characteristic, treating a missing one as `None`.
    async fn read_optional(&self, characteristic: Uuid) -> Result<Option<Vec<u8>>> {
        match self.transport.read(characteristic).await {
            Ok(raw) => Ok(Some(raw)),
            Err(Error::CharacteristicNotFound { .. }) => {
                debug!(%characteristic, "Characteristic not available");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn read_string(&self, characteristic: Uuid) -> Result<Option<String>> {
        Ok(self.read_optional(characteristic).await?.and_then(|raw| {
            let s = String::from_utf8_lossy(&raw);
            let s = s.trim_end_matches('\0').trim();
            (!s.is_empty()).then(|| s.to_string())
        }))
    }
}
