//! Core observation types
//!
//! Defines the per-frame data structures handed to the classifier and the
//! gesture label vocabulary used throughout the pipeline.

use serde::{Deserialize, Serialize};

/// Number of landmark points per detected hand (handpose layout).
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices of the five fingertips (thumb first).
pub const FINGER_TIPS: [usize; 5] = [4, 8, 12, 16, 20];

/// Landmark indices of the corresponding lower joints.
pub const FINGER_JOINTS: [usize; 5] = [2, 5, 9, 13, 17];

/// Discrete gesture categories the pipeline can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureLabel {
    /// No recognizable gesture
    None,
    /// Guess the next card is higher
    Higher,
    /// Guess the next card is lower
    Lower,
    /// Discard the current game and start a new one
    Reset,
}

impl GestureLabel {
    /// Wire spelling of the label, matching the backend's expectations.
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::None => "none",
            GestureLabel::Higher => "higher",
            GestureLabel::Lower => "lower",
            GestureLabel::Reset => "reset",
        }
    }

    /// Check if this label may be submitted to the cooldown gate and
    /// dispatched. `None` never fires.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, GestureLabel::None)
    }
}

impl std::fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which hand the upstream estimator believes it saw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// One detected hand: 21 normalized landmark points plus an optional
/// handedness label. Landmarks are `[x, y, z]`; only x and y are used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandObservation {
    /// Landmark coordinates in handpose index order
    pub landmarks: Vec<[f64; 3]>,
    /// Handedness label, when the estimator reports one
    #[serde(default)]
    pub handedness: Option<Handedness>,
}

impl HandObservation {
    /// Create a hand observation from landmark points.
    pub fn new(landmarks: Vec<[f64; 3]>) -> Self {
        Self {
            landmarks,
            handedness: None,
        }
    }

    /// Attach a handedness label.
    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = Some(handedness);
        self
    }

    /// Count fingers the estimator sees as extended.
    ///
    /// The thumb counts as extended when its tip's horizontal coordinate
    /// lies beyond the lower thumb joint on the handedness-appropriate
    /// side (unlabeled hands are treated as right hands, matching the
    /// mirrored front-camera convention). The other four fingers count as
    /// extended when the tip sits above its lower joint, i.e. tip.y is
    /// numerically less than joint.y in image coordinates.
    pub fn extended_finger_count(&self) -> usize {
        if self.landmarks.len() < LANDMARK_COUNT {
            return 0;
        }

        let mut extended = 0;
        for (i, (&tip_idx, &joint_idx)) in
            FINGER_TIPS.iter().zip(FINGER_JOINTS.iter()).enumerate()
        {
            let tip = self.landmarks[tip_idx];
            let joint = self.landmarks[joint_idx];

            let is_extended = if i == 0 {
                match self.handedness {
                    Some(Handedness::Left) => tip[0] < joint[0],
                    _ => tip[0] > joint[0],
                }
            } else {
                tip[1] < joint[1]
            };

            if is_extended {
                extended += 1;
            }
        }
        extended
    }

    /// An open palm: at least four fingers extended.
    pub fn is_open_palm(&self) -> bool {
        self.extended_finger_count() >= 4
    }
}

/// One externally-produced snapshot of detected hands for a single frame.
///
/// Immutable once built; discarded after classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Observation {
    /// Detected hands, in estimator order. May be empty.
    pub hands: Vec<HandObservation>,
}

impl Observation {
    /// An observation with no hands in frame.
    pub fn empty() -> Self {
        Self { hands: Vec::new() }
    }

    /// An observation holding the given hands.
    pub fn with_hands(hands: Vec<HandObservation>) -> Self {
        Self { hands }
    }

    /// Check whether any hand was detected this frame.
    pub fn has_hands(&self) -> bool {
        !self.hands.is_empty()
    }
}

/// Build a hand whose per-finger extension checks match `flags` (thumb
/// first). Assumes right-handed thumb geometry. Test fixture helper.
#[cfg(test)]
pub(crate) fn hand_with_extensions(flags: [bool; 5]) -> HandObservation {
    let mut landmarks = vec![[0.5, 0.5, 0.0]; LANDMARK_COUNT];
    for (i, (&tip_idx, &joint_idx)) in FINGER_TIPS.iter().zip(FINGER_JOINTS.iter()).enumerate() {
        if i == 0 {
            landmarks[joint_idx] = [0.5, 0.5, 0.0];
            landmarks[tip_idx] = if flags[0] {
                [0.7, 0.5, 0.0]
            } else {
                [0.3, 0.5, 0.0]
            };
        } else {
            landmarks[joint_idx] = [0.5, 0.5, 0.0];
            landmarks[tip_idx] = if flags[i] {
                [0.5, 0.3, 0.0]
            } else {
                [0.5, 0.7, 0.0]
            };
        }
    }
    HandObservation::new(landmarks)
}
