//! Observation log persistence
//!
//! Serialization format for recorded observation streams. A log captures
//! the estimator's per-frame output so a detection run can be replayed
//! through the full pipeline without a live camera.

use crate::observe::types::Observation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Current log format version
pub const CURRENT_FORMAT_VERSION: &str = "1.0";

/// Observation log metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationLogMetadata {
    /// Unique log ID
    pub id: Uuid,
    /// Log name
    pub name: String,
    /// Capture start time
    pub started_at: DateTime<Utc>,
    /// Total frame count
    pub frame_count: usize,
    /// Nominal interval between frames at capture time (ms)
    pub frame_interval_ms: u64,
    /// Version of the log format
    pub format_version: String,
}

impl ObservationLogMetadata {
    /// Create new metadata for a log
    pub fn new(name: String, frame_interval_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            started_at: Utc::now(),
            frame_count: 0,
            frame_interval_ms,
            format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }
}

impl Default for ObservationLogMetadata {
    fn default() -> Self {
        Self::new(String::new(), 100)
    }
}

/// A recorded stream of per-frame observations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationLog {
    /// Log metadata
    pub metadata: ObservationLogMetadata,
    /// Frames in capture order
    pub frames: Vec<Observation>,
}

impl ObservationLog {
    /// Create a new empty log
    pub fn new(name: String, frame_interval_ms: u64) -> Self {
        Self {
            metadata: ObservationLogMetadata::new(name, frame_interval_ms),
            frames: Vec::new(),
        }
    }

    /// Append one frame
    pub fn push(&mut self, frame: Observation) {
        self.frames.push(frame);
        self.metadata.frame_count = self.frames.len();
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the log holds no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Save the log to a file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a log from a file.
    ///
    /// Logs a warning on an unknown format version but still attempts to
    /// deserialize (forward-compatible via `#[serde(default)]`).
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let log: ObservationLog = serde_json::from_str(&content)?;
        if log.metadata.format_version != CURRENT_FORMAT_VERSION {
            tracing::warn!(
                name = %log.metadata.name,
                found = %log.metadata.format_version,
                expected = CURRENT_FORMAT_VERSION,
                "Observation log has different format version; some fields may use default values"
            );
        }
        Ok(log)
    }
}

impl Default for ObservationLog {
    fn default() -> Self {
        Self::new("untitled".to_string(), 100)
    }
}
