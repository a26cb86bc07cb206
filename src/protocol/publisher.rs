//! Outbound event publisher
//!
//! Serializes lifecycle and gesture payloads and hands them to the
//! transport. Teardown sends (`stop`, `unregister`) degrade to silent
//! no-ops when the broker is down: local cleanup must still complete,
//! and the backend reaps orphaned sessions on its own. A gesture
//! dispatch, by contrast, surfaces the failure so the caller can leave
//! the cooldown clocks untouched and retry on a later stable frame.

use crate::observe::types::GestureLabel;
use crate::protocol::messages::{
    DestinationScheme, DetectPayload, RegisterPayload, StartPayload, StopPayload,
};
use crate::protocol::transport::Transport;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Publishes outbound protocol events for all sessions.
pub struct EventPublisher {
    transport: Arc<dyn Transport>,
    scheme: DestinationScheme,
}

impl EventPublisher {
    /// Create a publisher over the given transport and destinations.
    pub fn new(transport: Arc<dyn Transport>, scheme: DestinationScheme) -> Self {
        Self { transport, scheme }
    }

    /// The destination scheme in use.
    pub fn scheme(&self) -> &DestinationScheme {
        &self.scheme
    }

    /// Announce a new session to the backend.
    pub fn register(&self, session_id: &str) -> crate::Result<()> {
        let payload = RegisterPayload {
            session_id: session_id.to_string(),
        };
        self.send(&self.scheme.register(), &serde_json::to_string(&payload)?)
    }

    /// Tear a session down. Best effort when disconnected.
    pub fn unregister(&self, session_id: &str) -> crate::Result<()> {
        let payload = StopPayload {
            session_id: session_id.to_string(),
        };
        self.send_best_effort(&self.scheme.unregister(), &serde_json::to_string(&payload)?);
        Ok(())
    }

    /// Tell the backend detection has started for a session.
    pub fn start_detection(&self, session_id: &str, camera_index: u32) -> crate::Result<()> {
        let payload = StartPayload {
            session_id: session_id.to_string(),
            camera_index,
        };
        self.send(&self.scheme.start(), &serde_json::to_string(&payload)?)
    }

    /// Tell the backend detection has stopped. Best effort when
    /// disconnected.
    pub fn stop_detection(&self, session_id: &str) -> crate::Result<()> {
        let payload = StopPayload {
            session_id: session_id.to_string(),
        };
        self.send_best_effort(&self.scheme.stop(), &serde_json::to_string(&payload)?);
        Ok(())
    }

    /// Dispatch one admitted gesture bound to a game.
    ///
    /// Fails with [`TransportUnavailable`] when the broker is down; the
    /// caller must not record a cooldown admission in that case.
    ///
    /// [`TransportUnavailable`]: crate::Error::TransportUnavailable
    pub fn send_gesture(
        &self,
        session_id: &str,
        label: GestureLabel,
        game_id: &str,
    ) -> crate::Result<()> {
        let payload = DetectPayload {
            session_id: session_id.to_string(),
            gesture: label.as_str().to_string(),
            game_id: game_id.to_string(),
            timestamp: Utc::now(),
        };
        debug!(session_id, gesture = %label, game_id, "Dispatching gesture");
        self.send(&self.scheme.detect(), &serde_json::to_string(&payload)?)
    }

    fn send(&self, destination: &str, body: &str) -> crate::Result<()> {
        if !self.transport.is_connected() {
            return Err(crate::Error::TransportUnavailable(format!(
                "not connected while publishing to {destination}"
            )));
        }
        self.transport.publish(destination, body)
    }

    fn send_best_effort(&self, destination: &str, body: &str) {
        if !self.transport.is_connected() {
            debug!(destination, "Skipping publish while disconnected");
            return;
        }
        if let Err(e) = self.transport.publish(destination, body) {
            warn!(destination, error = %e, "Best-effort publish failed");
        }
    }
}
