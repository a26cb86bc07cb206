//! Gesture stabilization
//!
//! Reduces a window of recent raw labels to a single stabilized label by
//! majority vote. The window is the sole inter-frame stabilization state
//! and is owned by the session; a gap in observation (no hands in frame)
//! must clear it rather than pollute the vote with stale labels.

use crate::observe::types::GestureLabel;
use std::collections::VecDeque;

/// Default window capacity in frames
pub const DEFAULT_WINDOW_CAPACITY: usize = 5;

/// Default vote threshold: frames a label must occupy to stabilize
pub const DEFAULT_VOTE_THRESHOLD: usize = 3;

/// Fixed-capacity FIFO of the most recent raw labels for one session.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    entries: VecDeque<GestureLabel>,
    capacity: usize,
}

impl HistoryWindow {
    /// Create a window with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a raw label, evicting the oldest entry at capacity.
    pub fn push(&mut self, label: GestureLabel) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(label);
    }

    /// Drop all entries. Called when no hand is observed or when
    /// detection (re)starts.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of labels currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the window holds no labels.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels in arrival order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = GestureLabel> + '_ {
        self.entries.iter().copied()
    }

    fn count(&self, label: GestureLabel) -> usize {
        self.entries.iter().filter(|&&l| l == label).count()
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

/// Majority-vote reducer over a session's [`HistoryWindow`].
#[derive(Debug, Clone, Copy)]
pub struct StabilityFilter {
    threshold: usize,
}

impl StabilityFilter {
    /// Create a filter with the given vote threshold.
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// Append `raw` to the window and return the stabilized label.
    ///
    /// Returns the first label other than None, scanned in order of
    /// first appearance in the window, whose count meets the threshold;
    /// None if no label qualifies. With the default 5-frame window and
    /// threshold 3 at most one label can qualify, so the scan order only
    /// matters under non-default tuning; it is fixed here regardless.
    pub fn observe(&self, window: &mut HistoryWindow, raw: GestureLabel) -> GestureLabel {
        window.push(raw);

        let mut seen: Vec<GestureLabel> = Vec::with_capacity(window.len());
        for label in window.iter() {
            if label == GestureLabel::None || seen.contains(&label) {
                continue;
            }
            seen.push(label);
            if window.count(label) >= self.threshold {
                return label;
            }
        }
        GestureLabel::None
    }
}

impl Default for StabilityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_VOTE_THRESHOLD)
    }
}
