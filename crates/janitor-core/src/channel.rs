//! Asynchronous FIFO channels passed between janitor stages
//!
//! Channels are created and owned by the startup orchestrator. Plugins only
//! keep a clone of the caller's `Arc`, so the very same channel object is
//! reachable from both sides and never closed by a plugin.

use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Message exchanged on a janitor channel
///
/// `None` marks the end of a stream. The payload is opaque to this crate.
pub type Message = Option<serde_json::Value>;

/// Shared handle to a channel
pub type ChannelRef<T = Message> = Arc<Channel<T>>;

/// Unbounded FIFO queue
#[derive(Debug)]
pub struct Channel<T = Message> {
    tx: mpsc::UnboundedSender<T>,
    rx: Mutex<mpsc::UnboundedReceiver<T>>,
}

impl<T> Channel<T> {
    /// Create a new, empty channel
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Create a new channel wrapped for sharing
    pub fn shared() -> ChannelRef<T> {
        Arc::new(Self::new())
    }

    /// Enqueue a message
    ///
    /// The channel holds its own sender, so this cannot fail while the
    /// channel is alive.
    pub async fn put(&self, item: T) {
        // Receiver lives as long as `self`; send only fails once it is dropped.
        let _ = self.tx.send(item);
    }

    /// Wait for the next message
    pub async fn get(&self) -> Option<T> {
        self.rx.lock().await.recv().await
    }

    /// Take the next message if one is queued
    pub fn try_get(&self) -> Option<T> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }

    /// Number of queued messages
    ///
    /// Reports 0 while a consumer is parked in [`Channel::get`].
    pub fn len(&self) -> usize {
        self.rx.try_lock().map(|rx| rx.len()).unwrap_or(0)
    }

    /// Whether no message is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}
