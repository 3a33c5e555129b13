//! Reassembly of notifications that span several packets.
//!
//! A response longer than the link MTU arrives as consecutive notification
//! chunks. [`NotificationReassembler`] appends chunks until the message is
//! complete, then wakes the task waiting in
//! [`await_complete`](NotificationReassembler::await_complete). Chunks that
//! arrive after completion are dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::sync::Notify;
use tracing::trace;

use crate::error::{Error, Result};

/// When a reassembled message counts as complete.
#[derive(Debug, Clone, Copy)]
pub enum Completion {
    /// Complete once at least this many bytes have arrived.
    Length(usize),
    /// Complete once the predicate accepts the accumulated bytes.
    Predicate(fn(&[u8]) -> bool),
}

impl Completion {
    fn is_met(&self, buf: &[u8]) -> bool {
        match self {
            Completion::Length(n) => buf.len() >= *n,
            Completion::Predicate(f) => f(buf),
        }
    }
}

#[derive(Debug)]
struct Inner {
    buf: BytesMut,
    complete: bool,
}

/// Accumulates notification chunks into one message.
///
/// Cloning yields another handle to the same buffer, so one clone can be
/// moved into the transport's notification callback while the session awaits
/// on the other.
#[derive(Debug, Clone)]
pub struct NotificationReassembler {
    inner: Arc<Mutex<Inner>>,
    notify: Arc<Notify>,
    completion: Completion,
}

impl NotificationReassembler {
    pub fn new(completion: Completion) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                buf: BytesMut::new(),
                complete: false,
            })),
            notify: Arc::new(Notify::new()),
            completion,
        }
    }

    /// Reassembler that completes after `len` bytes.
    pub fn with_length(len: usize) -> Self {
        Self::new(Completion::Length(len))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one notification chunk.
    pub fn push(&self, chunk: &[u8]) {
        let mut inner = self.lock();
        if inner.complete {
            trace!(len = chunk.len(), "dropping chunk after completion");
            return;
        }
        inner.buf.extend_from_slice(chunk);
        if self.completion.is_met(&inner.buf) {
            inner.complete = true;
            drop(inner);
            self.notify.notify_waiters();
        }
    }

    /// A callback suitable for a transport subscription.
    pub fn sink(&self) -> impl Fn(&[u8]) + Send + Sync + 'static {
        let this = self.clone();
        move |chunk: &[u8]| this.push(chunk)
    }

    pub fn is_complete(&self) -> bool {
        self.lock().complete
    }

    /// The reassembled message, once complete.
    pub fn message(&self) -> Option<Bytes> {
        let inner = self.lock();
        inner.complete.then(|| Bytes::copy_from_slice(&inner.buf))
    }

    /// Wait until the message is complete, or fail with [`Error::Timeout`].
    ///
    /// Returns immediately when the message was already complete.
    pub async fn await_complete(&self, timeout: Duration) -> Result<Bytes> {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking so a completion between the check and the
        // await is not missed.
        notified.as_mut().enable();

        if let Some(message) = self.message() {
            return Ok(message);
        }

        tokio::time::timeout(timeout, notified)
            .await
            .map_err(|_| Error::timeout("notification", timeout))?;

        self.message()
            .ok_or_else(|| Error::InvalidData("notification signalled without data".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_completion() {
        let r = NotificationReassembler::with_length(4);
        r.push(&[1, 2]);
        assert!(!r.is_complete());
        assert!(r.message().is_none());
        r.push(&[3, 4, 5]);
        assert!(r.is_complete());
        assert_eq!(r.message().unwrap().as_ref(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_chunks_after_completion_are_dropped() {
        let r = NotificationReassembler::with_length(2);
        r.push(&[1, 2]);
        r.push(&[3]);
        assert_eq!(r.message().unwrap().as_ref(), &[1, 2]);
    }

    #[test]
    fn test_predicate_completion() {
        let r = NotificationReassembler::new(Completion::Predicate(|b| b.last() == Some(&0xFF)));
        r.push(&[1, 2]);
        assert!(!r.is_complete());
        r.push(&[0xFF]);
        assert!(r.is_complete());
    }

    #[test]
    fn test_sink_feeds_shared_buffer() {
        let r = NotificationReassembler::with_length(3);
        let sink = r.sink();
        sink(&[1]);
        sink(&[2, 3]);
        assert!(r.is_complete());
    }

    #[tokio::test]
    async fn test_await_returns_immediately_when_complete() {
        let r = NotificationReassembler::with_length(1);
        r.push(&[9]);
        let msg = r.await_complete(Duration::from_millis(1)).await.unwrap();
        assert_eq!(msg.as_ref(), &[9]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_wakes_on_completion() {
        let r = NotificationReassembler::with_length(4);
        let feeder = r.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            feeder.push(&[1, 2]);
            tokio::time::sleep(Duration::from_millis(100)).await;
            feeder.push(&[3, 4]);
        });

        let msg = r.await_complete(Duration::from_secs(5)).await.unwrap();
        assert_eq!(msg.as_ref(), &[1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_times_out_on_partial_message() {
        let r = NotificationReassembler::with_length(4);
        r.push(&[1, 2]);

        let err = r.await_complete(Duration::from_secs(5)).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(!r.is_complete());
    }
}
