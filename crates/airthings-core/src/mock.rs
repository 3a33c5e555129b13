//! Mock transport for testing.
//!
//! [`MockTransport`] implements [`Transport`] over an in-memory table of
//! characteristic values, so sessions can be exercised without a radio.
//!
//! # Features
//!
//! - **Notification responders**: a write to a command characteristic
//!   produces notification chunks on a notify characteristic
//! - **Failure injection**: fail the next connects, or drop the link in the
//!   middle of an update
//! - **Latency simulation**: delay reads and notifications

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{ConnectionFailureReason, Error, Result};
use crate::transport::{NotificationHandler, SubscriptionHandle, Transport};

/// Produces the notification chunks sent in reply to a write.
pub type Responder = Arc<dyn Fn(&[u8]) -> Vec<Vec<u8>> + Send + Sync>;

#[derive(Clone)]
struct ResponderEntry {
    notify: Uuid,
    respond: Responder,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-memory device link.
///
/// # Example
///
/// ```
/// use airthings_core::{MockTransport, Transport};
/// use airthings_types::uuids;
///
/// #[tokio::main]
/// async fn main() {
///     let link = MockTransport::builder()
///         .characteristic(uuids::MODEL_NUMBER, b"2930".to_vec())
///         .build();
///     link.connect().await.unwrap();
///     assert_eq!(link.read(uuids::MODEL_NUMBER).await.unwrap(), b"2930");
/// }
/// ```
pub struct MockTransport {
    address: String,
    name: Option<String>,
    connected: AtomicBool,
    values: Mutex<HashMap<Uuid, Vec<u8>>>,
    extra_characteristics: BTreeSet<Uuid>,
    responders: HashMap<Uuid, ResponderEntry>,
    subscriptions: Mutex<HashMap<u64, (Uuid, Arc<NotificationHandler>)>>,
    writes: Mutex<Vec<(Uuid, Vec<u8>)>>,
    token: Mutex<CancellationToken>,
    next_subscription: AtomicU64,
    connect_count: AtomicU32,
    read_count: AtomicU32,
    /// Connect attempts left to fail.
    remaining_connect_failures: AtomicU32,
    /// Writes left to fail.
    remaining_write_failures: AtomicU32,
    /// Drop the link on this read (1-based, counted across connections; 0 = never).
    disconnect_on_read: AtomicU32,
    /// Simulated read latency in milliseconds (0 = no delay).
    read_latency_ms: AtomicU64,
    /// Delay before responder notifications are delivered (0 = inline).
    notification_delay_ms: AtomicU64,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("address", &self.address)
            .field("name", &self.name)
            .field("connected", &self.connected.load(Ordering::Relaxed))
            .finish()
    }
}

impl MockTransport {
    /// Create a builder for a mock transport.
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Replace a readable characteristic value.
    pub fn set_value(&self, characteristic: Uuid, value: Vec<u8>) {
        lock(&self.values).insert(characteristic, value);
    }

    /// Fail the next `count` connect attempts.
    pub fn set_connect_failures(&self, count: u32) {
        self.remaining_connect_failures
            .store(count, Ordering::Relaxed);
    }

    /// Fail the next `count` writes.
    pub fn set_write_failures(&self, count: u32) {
        self.remaining_write_failures.store(count, Ordering::Relaxed);
    }

    /// Drop the link when the `n`th read (counted from now) starts.
    pub fn disconnect_on_read(&self, n: u32) {
        let target = if n == 0 {
            0
        } else {
            self.read_count.load(Ordering::Relaxed) + n
        };
        self.disconnect_on_read.store(target, Ordering::Relaxed);
    }

    /// Set simulated read latency.
    pub fn set_read_latency(&self, latency: Duration) {
        self.read_latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Set the delay before responder notifications are delivered.
    pub fn set_notification_delay(&self, delay: Duration) {
        self.notification_delay_ms
            .store(delay.as_millis() as u64, Ordering::Relaxed);
    }

    /// Simulate the device dropping the link.
    pub fn drop_link(&self) {
        self.connected.store(false, Ordering::Relaxed);
        lock(&self.subscriptions).clear();
        lock(&self.token).cancel();
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::Relaxed)
    }

    pub fn read_count(&self) -> u32 {
        self.read_count.load(Ordering::Relaxed)
    }

    /// Number of subscriptions still active.
    pub fn active_subscriptions(&self) -> usize {
        lock(&self.subscriptions).len()
    }

    /// Every write performed so far, in order.
    pub fn writes(&self) -> Vec<(Uuid, Vec<u8>)> {
        lock(&self.writes).clone()
    }

    fn check_connected(&self) -> Result<()> {
        if !self.connected.load(Ordering::Relaxed) {
            Err(Error::NotConnected)
        } else {
            Ok(())
        }
    }

    fn deliver(&self, notify: Uuid, chunks: Vec<Vec<u8>>) {
        let handlers: Vec<Arc<NotificationHandler>> = lock(&self.subscriptions)
            .values()
            .filter(|(uuid, _)| *uuid == notify)
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        let delay = self.notification_delay_ms.load(Ordering::Relaxed);
        if delay == 0 {
            for chunk in &chunks {
                for handler in &handlers {
                    handler(chunk);
                }
            }
            return;
        }

        tokio::spawn(async move {
            for chunk in &chunks {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                for handler in &handlers {
                    handler(chunk);
                }
            }
        });
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn address(&self) -> &str {
        &self.address
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn connect(&self) -> Result<()> {
        if self.remaining_connect_failures.load(Ordering::Relaxed) > 0 {
            self.remaining_connect_failures
                .fetch_sub(1, Ordering::Relaxed);
            return Err(Error::connection_failed(
                Some(self.address.clone()),
                ConnectionFailureReason::OutOfRange,
            ));
        }
        if !self.connected.swap(true, Ordering::Relaxed) {
            *lock(&self.token) = CancellationToken::new();
            self.connect_count.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::Relaxed);
        lock(&self.subscriptions).clear();
        Ok(())
    }

    async fn characteristics(&self) -> Result<Vec<Uuid>> {
        self.check_connected()?;
        let mut all: BTreeSet<Uuid> = lock(&self.values).keys().copied().collect();
        all.extend(self.extra_characteristics.iter().copied());
        for (write, entry) in &self.responders {
            all.insert(*write);
            all.insert(entry.notify);
        }
        Ok(all.into_iter().collect())
    }

    async fn read(&self, characteristic: Uuid) -> Result<Vec<u8>> {
        self.check_connected()?;

        let latency = self.read_latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let count = self.read_count.fetch_add(1, Ordering::Relaxed) + 1;
        if count == self.disconnect_on_read.load(Ordering::Relaxed) {
            self.disconnect_on_read.store(0, Ordering::Relaxed);
            self.drop_link();
            // A real stack never completes a read on a dead link.
            std::future::pending::<()>().await;
        }

        lock(&self.values)
            .get(&characteristic)
            .cloned()
            .ok_or(Error::CharacteristicNotFound {
                uuid: characteristic,
            })
    }

    async fn write(&self, characteristic: Uuid, data: &[u8]) -> Result<()> {
        self.check_connected()?;
        if self.remaining_write_failures.load(Ordering::Relaxed) > 0 {
            self.remaining_write_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(Error::write_failed(characteristic, "simulated write failure"));
        }
        lock(&self.writes).push((characteristic, data.to_vec()));

        if let Some(entry) = self.responders.get(&characteristic) {
            let chunks = (entry.respond)(data);
            self.deliver(entry.notify, chunks);
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        characteristic: Uuid,
        handler: NotificationHandler,
    ) -> Result<SubscriptionHandle> {
        self.check_connected()?;
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        lock(&self.subscriptions).insert(id, (characteristic, Arc::new(handler)));
        Ok(SubscriptionHandle { characteristic, id })
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()> {
        lock(&self.subscriptions).remove(&handle.id);
        Ok(())
    }

    fn disconnected(&self) -> CancellationToken {
        lock(&self.token).clone()
    }
}

/// Builder for creating mock transports with custom settings.
#[derive(Default)]
pub struct MockTransportBuilder {
    address: Option<String>,
    name: Option<String>,
    values: HashMap<Uuid, Vec<u8>>,
    extra_characteristics: BTreeSet<Uuid>,
    responders: HashMap<Uuid, ResponderEntry>,
    connect_failures: u32,
    write_failures: u32,
    read_latency: Duration,
    notification_delay: Duration,
}

impl MockTransportBuilder {
    #[must_use]
    pub fn address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    /// Set the advertised name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Add a readable characteristic.
    #[must_use]
    pub fn characteristic(mut self, uuid: Uuid, value: impl Into<Vec<u8>>) -> Self {
        self.values.insert(uuid, value.into());
        self
    }

    /// Expose a characteristic that has no readable value.
    #[must_use]
    pub fn exposes(mut self, uuid: Uuid) -> Self {
        self.extra_characteristics.insert(uuid);
        self
    }

    /// Reply to writes on `write` with notifications on `notify`.
    #[must_use]
    pub fn responder<F>(mut self, write: Uuid, notify: Uuid, respond: F) -> Self
    where
        F: Fn(&[u8]) -> Vec<Vec<u8>> + Send + Sync + 'static,
    {
        self.responders.insert(
            write,
            ResponderEntry {
                notify,
                respond: Arc::new(respond),
            },
        );
        self
    }

    #[must_use]
    pub fn connect_failures(mut self, count: u32) -> Self {
        self.connect_failures = count;
        self
    }

    #[must_use]
    pub fn write_failures(mut self, count: u32) -> Self {
        self.write_failures = count;
        self
    }

    #[must_use]
    pub fn read_latency(mut self, latency: Duration) -> Self {
        self.read_latency = latency;
        self
    }

    #[must_use]
    pub fn notification_delay(mut self, delay: Duration) -> Self {
        self.notification_delay = delay;
        self
    }

    /// Build the mock transport.
    #[must_use]
    pub fn build(self) -> MockTransport {
        MockTransport {
            address: self
                .address
                .unwrap_or_else(|| format!("MOCK-{:06X}", rand::random::<u32>() % 0xFF_FFFF)),
            name: self.name,
            connected: AtomicBool::new(false),
            values: Mutex::new(self.values),
            extra_characteristics: self.extra_characteristics,
            responders: self.responders,
            subscriptions: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            token: Mutex::new(CancellationToken::new()),
            next_subscription: AtomicU64::new(1),
            connect_count: AtomicU32::new(0),
            read_count: AtomicU32::new(0),
            remaining_connect_failures: AtomicU32::new(self.connect_failures),
            remaining_write_failures: AtomicU32::new(self.write_failures),
            disconnect_on_read: AtomicU32::new(0),
            read_latency_ms: AtomicU64::new(self.read_latency.as_millis() as u64),
            notification_delay_ms: AtomicU64::new(self.notification_delay.as_millis() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reassembler::NotificationReassembler;

    const READ: Uuid = Uuid::from_u128(1);
    const WRITE: Uuid = Uuid::from_u128(2);
    const NOTIFY: Uuid = Uuid::from_u128(3);

    fn echo_transport() -> MockTransport {
        MockTransport::builder()
            .address("AA:BB:CC:DD:EE:FF")
            .characteristic(READ, vec![1, 2, 3])
            .responder(WRITE, NOTIFY, |req| vec![req.to_vec(), vec![0xEE]])
            .build()
    }

    #[tokio::test]
    async fn test_mock_transport_connect() {
        let link = echo_transport();
        assert!(!link.is_connected());
        link.connect().await.unwrap();
        assert!(link.is_connected());
        assert_eq!(link.connect_count(), 1);
        link.disconnect().await.unwrap();
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn test_mock_transport_not_connected() {
        let link = echo_transport();
        assert!(matches!(link.read(READ).await, Err(Error::NotConnected)));
        assert!(matches!(link.write(WRITE, &[1]).await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_mock_transport_read() {
        let link = echo_transport();
        link.connect().await.unwrap();
        assert_eq!(link.read(READ).await.unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            link.read(NOTIFY).await,
            Err(Error::CharacteristicNotFound { .. })
        ));
        assert_eq!(link.read_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_transport_characteristics() {
        let link = echo_transport();
        link.connect().await.unwrap();
        let chars = link.characteristics().await.unwrap();
        assert_eq!(chars, vec![READ, WRITE, NOTIFY]);
    }

    #[tokio::test]
    async fn test_mock_transport_responder_notifies_subscribers() {
        let link = echo_transport();
        link.connect().await.unwrap();

        let r = NotificationReassembler::with_length(3);
        let handle = link.subscribe(NOTIFY, Box::new(r.sink())).await.unwrap();
        link.write(WRITE, &[0x6D, 0x00]).await.unwrap();

        assert_eq!(r.message().unwrap().as_ref(), &[0x6D, 0x00, 0xEE]);
        assert_eq!(link.writes(), vec![(WRITE, vec![0x6D, 0x00])]);

        link.unsubscribe(handle).await.unwrap();
        assert_eq!(link.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_mock_transport_connect_failures() {
        let link = MockTransport::builder().connect_failures(2).build();
        assert!(link.connect().await.is_err());
        assert!(link.connect().await.is_err());
        assert!(link.connect().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_transport_write_failures() {
        let link = echo_transport();
        link.set_write_failures(1);
        link.connect().await.unwrap();

        let err = link.write(WRITE, &[0x6D]).await.unwrap_err();
        assert!(matches!(err, Error::WriteFailed { uuid, .. } if uuid == WRITE));
        assert!(link.writes().is_empty());

        link.write(WRITE, &[0x6D]).await.unwrap();
        assert_eq!(link.writes(), vec![(WRITE, vec![0x6D])]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_transport_drops_link_mid_read() {
        let link = echo_transport();
        link.connect().await.unwrap();
        let token = link.disconnected();
        link.disconnect_on_read(1);

        let read = tokio::time::timeout(Duration::from_secs(1), link.read(READ)).await;
        assert!(read.is_err(), "read on a dropped link must not complete");
        assert!(token.is_cancelled());
        assert!(!link.is_connected());

        link.connect().await.unwrap();
        assert!(!link.disconnected().is_cancelled());
        assert_eq!(link.read(READ).await.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_mock_transport_debug() {
        let link = echo_transport();
        let debug = format!("{:?}", link);
        assert!(debug.contains("MockTransport"));
        assert!(debug.contains("AA:BB:CC:DD:EE:FF"));
    }
}
