//! Observation ingestion
//!
//! Per-frame hand observations, the classifier contract with its two
//! interchangeable implementations, and replayable observation logs.

pub mod classifier;
pub mod log;
pub mod source;
pub mod types;

pub use classifier::{FingerCountClassifier, GestureClassifier, HandednessClassifier};
pub use log::{ObservationLog, ObservationLogMetadata};
pub use source::{ObservationSource, ReplaySource};
pub use types::{GestureLabel, HandObservation, Handedness, Observation};
