//! # Gesture Bridge
//!
//! Turns a noisy, high-frequency stream of hand-pose observations into a
//! small set of discrete, trustworthy card-game commands ("higher",
//! "lower", "reset") delivered to a backend over a publish/subscribe
//! channel, while a companion channel delivers authoritative game state
//! back to the observer.
//!
//! ## Overview
//!
//! Hand-pose estimation itself is an external collaborator: something
//! upstream (a camera pipeline, a replayed log) produces one
//! [`Observation`](observe::Observation) per frame. This library makes
//! that jittery signal safe to act on:
//!
//! - [`observe`]: observation types, the classifier contract and its two
//!   interchangeable implementations, and replayable observation logs
//! - [`pipeline`]: majority-vote stabilization over a bounded history
//!   window, and the per-category/global cooldown gate
//! - [`protocol`]: the session-scoped pub/sub wire contract and the
//!   publisher that speaks it
//! - [`game`]: the REST client for the authoritative game service
//! - [`session`]: per-session state, the coordinator that runs the
//!   classify → stabilize → gate → dispatch pipeline, and the
//!   fixed-period detection driver
//! - [`app`]: CLI and configuration management
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ Observation │───▶│ Classifier  │───▶│  Stability  │───▶│  Cooldown   │
//! │  (1/frame)  │    │ (raw label) │    │   Filter    │    │    Gate     │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                                                                 │
//!                                                                 ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌──────────────┐
//! │ GameSnapshot│◀───│  Inbound    │◀───│   Backend   │◀───│  Publisher   │
//! │  (replace)  │    │ gesture/{id}│    │             │    │gesture.detect│
//! └─────────────┘    └─────────────┘    └─────────────┘    └──────────────┘
//! ```
//!
//! Game state is never computed locally: every snapshot is accepted
//! wholesale from the server, whether it arrives over REST or pub/sub.

pub mod app;
pub mod game;
pub mod observe;
pub mod pipeline;
pub mod protocol;
pub mod session;

// Re-export commonly used types
pub use game::types::{Card, GameSnapshot, GuessDirection, Suit};
pub use observe::classifier::GestureClassifier;
pub use observe::types::{GestureLabel, HandObservation, Handedness, Observation};
pub use session::coordinator::{FrameOutcome, SessionCoordinator};
pub use session::state::SessionId;

/// Result type alias for the gesture bridge
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the gesture bridge
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Publish attempted while the broker connection is down. The caller
    /// may retry on the next stable frame; no cooldown state was advanced.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// Non-success response from the game service.
    #[error("game service error: {0}")]
    UpstreamService(String),

    /// Inbound payload missing required fields or failing to parse.
    #[error("malformed inbound message: {0}")]
    MalformedMessage(String),

    /// Classifier not yet initialized; detection cannot start.
    #[error("classifier model not ready")]
    ModelUnavailable,

    /// No observation frames are arriving.
    #[error("observation source unavailable: {0}")]
    SourceUnavailable(String),

    /// Operation referenced a session id that was never registered.
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// Guess or gesture dispatch attempted with no game bound.
    #[error("no active game for session {0}")]
    NoActiveGame(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
