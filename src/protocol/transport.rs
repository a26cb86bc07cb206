//! Broker transport seam
//!
//! The publisher talks to the broker through this trait only. Connection
//! management, reconnection, and frame encoding live behind it in
//! whatever concrete client a deployment wires in; the in-memory
//! implementation here records frames for tests and local dry runs.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Minimal broker contract: connection liveness plus fire-and-forget
/// publish. Implementations must be safe to share across tasks.
pub trait Transport: Send + Sync {
    /// Whether the broker connection is currently up.
    fn is_connected(&self) -> bool;

    /// Publish one frame to a destination.
    fn publish(&self, destination: &str, body: &str) -> crate::Result<()>;
}

/// One frame as it left the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedFrame {
    /// Destination the frame was sent to
    pub destination: String,
    /// Serialized payload
    pub body: String,
}

/// In-memory transport that records published frames.
///
/// Connection state is toggleable so tests can exercise the
/// disconnected paths.
#[derive(Debug, Default)]
pub struct ChannelTransport {
    connected: AtomicBool,
    frames: Mutex<Vec<PublishedFrame>>,
}

impl ChannelTransport {
    /// Create a transport in the connected state.
    pub fn connected() -> Arc<Self> {
        let transport = Arc::new(Self::default());
        transport.set_connected(true);
        transport
    }

    /// Flip the simulated connection state.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// All frames published so far, in order.
    pub fn frames(&self) -> Vec<PublishedFrame> {
        self.frames.lock().clone()
    }

    /// Frames published to a specific destination.
    pub fn frames_for(&self, destination: &str) -> Vec<PublishedFrame> {
        self.frames
            .lock()
            .iter()
            .filter(|f| f.destination == destination)
            .cloned()
            .collect()
    }

    /// Drop all recorded frames.
    pub fn clear(&self) {
        self.frames.lock().clear();
    }
}

impl Transport for ChannelTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn publish(&self, destination: &str, body: &str) -> crate::Result<()> {
        if !self.is_connected() {
            return Err(crate::Error::TransportUnavailable(format!(
                "not connected while publishing to {destination}"
            )));
        }
        self.frames.lock().push(PublishedFrame {
            destination: destination.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
