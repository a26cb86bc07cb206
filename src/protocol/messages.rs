//! Message payloads and destination naming
//!
//! Outbound payloads are serialized in camelCase to match the backend's
//! field naming. Inbound updates are deliberately loose: every field
//! except `gesture` is optional, and a game snapshot is only extracted
//! when the update carries both cards.

use crate::game::types::{Card, GameSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default application destination prefix
pub const DEFAULT_DESTINATION_PREFIX: &str = "/app/tensorflow";

/// Default broadcast topic prefix
pub const DEFAULT_TOPIC_PREFIX: &str = "/topic";

/// Builds the broker destinations for one deployment.
///
/// All destination strings flow through here so a deployment can remap
/// the prefixes without touching the publisher.
#[derive(Debug, Clone)]
pub struct DestinationScheme {
    destination_prefix: String,
    topic_prefix: String,
}

impl DestinationScheme {
    /// Create a scheme with custom prefixes.
    pub fn new(destination_prefix: impl Into<String>, topic_prefix: impl Into<String>) -> Self {
        Self {
            destination_prefix: destination_prefix.into(),
            topic_prefix: topic_prefix.into(),
        }
    }

    /// Destination for session registration.
    pub fn register(&self) -> String {
        format!("{}/gesture.register", self.destination_prefix)
    }

    /// Destination for session teardown.
    pub fn unregister(&self) -> String {
        format!("{}/gesture.unregister", self.destination_prefix)
    }

    /// Destination for starting detection.
    pub fn start(&self) -> String {
        format!("{}/gesture.start", self.destination_prefix)
    }

    /// Destination for stopping detection.
    pub fn stop(&self) -> String {
        format!("{}/gesture.stop", self.destination_prefix)
    }

    /// Destination for dispatching a detected gesture.
    pub fn detect(&self) -> String {
        format!("{}/gesture.detect", self.destination_prefix)
    }

    /// Session-scoped inbound topic carrying gesture echoes and status.
    pub fn gesture_topic(&self, session_id: &str) -> String {
        format!("{}/gesture/{}", self.topic_prefix, session_id)
    }

    /// Broadcast topic carrying authoritative game snapshots.
    pub fn game_updates_topic(&self) -> String {
        format!("{}/game-updates", self.topic_prefix)
    }
}

impl Default for DestinationScheme {
    fn default() -> Self {
        Self::new(DEFAULT_DESTINATION_PREFIX, DEFAULT_TOPIC_PREFIX)
    }
}

/// Payload for `gesture.register`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    /// Session being registered
    pub session_id: String,
}

/// Payload for `gesture.start`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPayload {
    /// Session starting detection
    pub session_id: String,
    /// Index of the camera feeding the estimator
    pub camera_index: u32,
}

/// Payload for `gesture.stop` and `gesture.unregister`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPayload {
    /// Session stopping
    pub session_id: String,
}

/// Payload for `gesture.detect`: one admitted gesture bound to a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectPayload {
    /// Session that produced the gesture
    pub session_id: String,
    /// Wire spelling of the admitted label
    pub gesture: String,
    /// Game the gesture acts on
    pub game_id: String,
    /// Dispatch time
    pub timestamp: DateTime<Utc>,
}

/// Inbound update from the session-scoped gesture topic.
///
/// The `gesture` field carries either an echoed gesture label or one of
/// the status pseudo-gestures ("connected", "started", "stopped",
/// "error"); downstream code matches on the string rather than an enum
/// so unknown values pass through harmlessly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureUpdate {
    /// Echoed gesture or status pseudo-gesture
    pub gesture: String,
    /// Game the update refers to, when bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    /// Card currently face up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_card: Option<Card>,
    /// Card about to be revealed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_card: Option<Card>,
    /// Running score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    /// Whether the game has ended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_over: Option<bool>,
    /// Human-readable status text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GestureUpdate {
    /// Status pseudo-gestures the backend may emit instead of a label.
    pub const STATUS_GESTURES: [&'static str; 4] = ["connected", "started", "stopped", "error"];

    /// Check whether this update is a status notification rather than an
    /// echoed gesture.
    pub fn is_status(&self) -> bool {
        Self::STATUS_GESTURES.contains(&self.gesture.as_str())
    }

    /// Extract a full game snapshot, if the update carries one.
    ///
    /// Both cards must be present; partial updates never replace local
    /// state.
    pub fn snapshot(&self) -> Option<GameSnapshot> {
        let current_card = self.current_card.clone()?;
        let next_card = self.next_card.clone()?;
        Some(GameSnapshot {
            game_id: self.game_id.clone().unwrap_or_default(),
            current_card: Some(current_card),
            next_card: Some(next_card),
            score: self.score.unwrap_or(0),
            game_over: self.game_over.unwrap_or(false),
            message: self.message.clone(),
        })
    }
}
