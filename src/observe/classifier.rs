//! Gesture classification strategies
//!
//! Two interchangeable classifiers sit behind one contract. The
//! coordinator holds whichever variant is configured and never branches
//! on which one is active.

use crate::observe::types::{GestureLabel, Handedness, Observation};

/// Per-frame classification contract: one observation in, one coarse
/// label out. Pure; implementations must tolerate zero, one, or many
/// detected hands (hands beyond the first two are ignored).
pub trait GestureClassifier: Send + Sync {
    /// Classify a single frame's observation into a raw gesture label.
    fn classify(&self, observation: &Observation) -> GestureLabel;

    /// Short identifier used in logs and status lines.
    fn name(&self) -> &'static str;
}

/// Single-hand classifier driven by extended-finger thresholds.
///
/// Only the first detected hand is considered. Mapping: at least four
/// extended fingers is Higher (open palm), at most one is Lower (fist),
/// exactly two is Reset, three is None.
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerCountClassifier;

impl GestureClassifier for FingerCountClassifier {
    fn classify(&self, observation: &Observation) -> GestureLabel {
        let Some(hand) = observation.hands.first() else {
            return GestureLabel::None;
        };

        match hand.extended_finger_count() {
            n if n >= 4 => GestureLabel::Higher,
            n if n <= 1 => GestureLabel::Lower,
            2 => GestureLabel::Reset,
            _ => GestureLabel::None,
        }
    }

    fn name(&self) -> &'static str {
        "finger-count"
    }
}

/// Two-hand classifier driven by handedness labels.
///
/// One hand: Left means Higher, Right means Lower, an unlabeled hand
/// means None. Two hands: two open palms mean Reset, as do differing
/// handedness labels; the same label reported twice is a sensor quirk
/// and falls back to the one-hand mapping for that label. Zero hands or
/// more than two hands never fire.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandednessClassifier;

impl GestureClassifier for HandednessClassifier {
    fn classify(&self, observation: &Observation) -> GestureLabel {
        match observation.hands.len() {
            1 => match observation.hands[0].handedness {
                Some(Handedness::Left) => GestureLabel::Higher,
                Some(Handedness::Right) => GestureLabel::Lower,
                None => GestureLabel::None,
            },
            2 => {
                let (a, b) = (&observation.hands[0], &observation.hands[1]);

                if a.is_open_palm() && b.is_open_palm() {
                    return GestureLabel::Reset;
                }
                if a.handedness != b.handedness {
                    return GestureLabel::Reset;
                }
                match a.handedness {
                    Some(Handedness::Left) => GestureLabel::Higher,
                    Some(Handedness::Right) => GestureLabel::Lower,
                    None => GestureLabel::None,
                }
            }
            _ => GestureLabel::None,
        }
    }

    fn name(&self) -> &'static str {
        "handedness"
    }
}
