//! The link a session talks over.
//!
//! [`Transport`] is the seam between the protocol logic in this crate and a
//! concrete radio stack. A session only needs to read and write
//! characteristics, subscribe to notifications and learn when the link
//! drops.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::Result;

/// Callback invoked with each notification chunk.
pub type NotificationHandler = Box<dyn Fn(&[u8]) + Send + Sync>;

/// Identifies one active notification subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    /// The characteristic the subscription is on.
    pub characteristic: Uuid,
    /// Transport-assigned id, unique per connection.
    pub id: u64,
}

/// Trait abstracting a connection to one device.
///
/// # Example
///
/// ```ignore
/// use airthings_core::{Transport, Result};
/// use airthings_types::uuids;
///
/// async fn model<T: Transport>(link: &T) -> Result<String> {
///     let raw = link.read(uuids::MODEL_NUMBER).await?;
///     Ok(String::from_utf8_lossy(&raw).into_owned())
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Device address (MAC or platform UUID).
    fn address(&self) -> &str;

    /// Advertised device name, if any.
    fn name(&self) -> Option<&str>;

    /// Establish the link. A no-op when already connected.
    async fn connect(&self) -> Result<()>;

    /// Tear down the link.
    async fn disconnect(&self) -> Result<()>;

    /// Characteristics exposed by the connected device.
    async fn characteristics(&self) -> Result<Vec<Uuid>>;

    /// Read a characteristic value.
    async fn read(&self, characteristic: Uuid) -> Result<Vec<u8>>;

    /// Write a characteristic value with response.
    async fn write(&self, characteristic: Uuid, data: &[u8]) -> Result<()>;

    /// Start delivering notifications from `characteristic` to `handler`.
    async fn subscribe(
        &self,
        characteristic: Uuid,
        handler: NotificationHandler,
    ) -> Result<SubscriptionHandle>;

    /// Stop a subscription started with [`subscribe`](Self::subscribe).
    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()>;

    /// A token cancelled when the current connection drops.
    ///
    /// A fresh token is issued on every successful [`connect`](Self::connect).
    fn disconnected(&self) -> CancellationToken;
}
