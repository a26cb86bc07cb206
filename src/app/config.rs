//! Configuration Management

use crate::game::client::DEFAULT_API_BASE_URL;
use crate::observe::classifier::{
    FingerCountClassifier, GestureClassifier, HandednessClassifier,
};
use crate::pipeline::cooldown::{
    CooldownPolicy, DEFAULT_GESTURE_COOLDOWN_MS, DEFAULT_GLOBAL_COOLDOWN_MS,
    DEFAULT_RESET_COOLDOWN_MS,
};
use crate::pipeline::stability::{DEFAULT_VOTE_THRESHOLD, DEFAULT_WINDOW_CAPACITY};
use crate::protocol::messages::{DEFAULT_DESTINATION_PREFIX, DEFAULT_TOPIC_PREFIX};
use crate::session::coordinator::PipelineSettings;
use crate::session::driver::DEFAULT_FRAME_INTERVAL_MS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Detection settings
    pub detection: DetectionConfig,
    /// Cooldown settings
    pub cooldown: CooldownConfig,
    /// Game service settings
    pub backend: BackendConfig,
    /// Broker destination settings
    #[serde(default)]
    pub broker: BrokerConfig,
}

/// Detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Frame period in milliseconds
    pub frame_interval_ms: u64,
    /// Stability window capacity in frames
    pub history_window: usize,
    /// Frames a label must occupy to stabilize
    pub stability_threshold: usize,
    /// Classifier to use ("finger-count" or "handedness")
    pub classifier: String,
}

/// Cooldown configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    /// Gate policy ("flat" or "tiered")
    pub policy: String,
    /// Cooldown between same-category gestures (ms)
    pub gesture_cooldown_ms: u64,
    /// Cooldown between resets under the tiered policy (ms)
    pub reset_cooldown_ms: u64,
    /// Cross-category suppression window under the tiered policy (ms)
    pub global_cooldown_ms: u64,
}

/// Game service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the game service REST API
    pub api_base_url: String,
}

/// Broker destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Application destination prefix
    pub destination_prefix: String,
    /// Broadcast topic prefix
    pub topic_prefix: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            history_window: DEFAULT_WINDOW_CAPACITY,
            stability_threshold: DEFAULT_VOTE_THRESHOLD,
            classifier: "finger-count".to_string(),
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            policy: "tiered".to_string(),
            gesture_cooldown_ms: DEFAULT_GESTURE_COOLDOWN_MS,
            reset_cooldown_ms: DEFAULT_RESET_COOLDOWN_MS,
            global_cooldown_ms: DEFAULT_GLOBAL_COOLDOWN_MS,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            destination_prefix: DEFAULT_DESTINATION_PREFIX.to_string(),
            topic_prefix: DEFAULT_TOPIC_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.detection.frame_interval_ms == 0 {
            return Err(crate::Error::Config(
                "frame_interval_ms must be > 0".to_string(),
            ));
        }
        if self.detection.history_window == 0 {
            return Err(crate::Error::Config(
                "history_window must be > 0".to_string(),
            ));
        }
        if self.detection.stability_threshold == 0
            || self.detection.stability_threshold > self.detection.history_window
        {
            return Err(crate::Error::Config(format!(
                "stability_threshold must be in [1, history_window], got {}",
                self.detection.stability_threshold
            )));
        }
        if !matches!(
            self.detection.classifier.as_str(),
            "finger-count" | "handedness"
        ) {
            return Err(crate::Error::Config(format!(
                "classifier must be \"finger-count\" or \"handedness\", got {:?}",
                self.detection.classifier
            )));
        }
        if !matches!(self.cooldown.policy.as_str(), "flat" | "tiered") {
            return Err(crate::Error::Config(format!(
                "cooldown policy must be \"flat\" or \"tiered\", got {:?}",
                self.cooldown.policy
            )));
        }
        if self.cooldown.gesture_cooldown_ms == 0 {
            return Err(crate::Error::Config(
                "gesture_cooldown_ms must be > 0".to_string(),
            ));
        }
        if self.cooldown.policy == "tiered"
            && self.cooldown.global_cooldown_ms < self.cooldown.reset_cooldown_ms
        {
            return Err(crate::Error::Config(format!(
                "global_cooldown_ms must be >= reset_cooldown_ms, got {} < {}",
                self.cooldown.global_cooldown_ms, self.cooldown.reset_cooldown_ms
            )));
        }
        if self.backend.api_base_url.trim().is_empty() {
            return Err(crate::Error::Config(
                "api_base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The cooldown policy described by this config.
    pub fn cooldown_policy(&self) -> CooldownPolicy {
        match self.cooldown.policy.as_str() {
            "flat" => CooldownPolicy::Flat {
                cooldown: Duration::from_millis(self.cooldown.gesture_cooldown_ms),
            },
            _ => CooldownPolicy::Tiered {
                gesture_cooldown: Duration::from_millis(self.cooldown.gesture_cooldown_ms),
                reset_cooldown: Duration::from_millis(self.cooldown.reset_cooldown_ms),
                global_cooldown: Duration::from_millis(self.cooldown.global_cooldown_ms),
            },
        }
    }

    /// Pipeline settings derived from this config.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            window_capacity: self.detection.history_window,
            stability_threshold: self.detection.stability_threshold,
            cooldown_policy: self.cooldown_policy(),
        }
    }

    /// Build the configured classifier.
    pub fn build_classifier(&self) -> Result<Arc<dyn GestureClassifier>, crate::Error> {
        match self.detection.classifier.as_str() {
            "finger-count" => Ok(Arc::new(FingerCountClassifier)),
            "handedness" => Ok(Arc::new(HandednessClassifier)),
            other => Err(crate::Error::Config(format!(
                "unknown classifier: {other}"
            ))),
        }
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gesture_bridge").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
