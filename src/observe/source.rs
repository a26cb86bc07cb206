//! Observation sources
//!
//! The pipeline pulls one observation per frame boundary from whatever
//! source is configured. Live capture is an external collaborator; the
//! contract here only covers handing frames to the driver.

use crate::observe::log::ObservationLog;
use crate::observe::types::Observation;

/// Supplier of per-frame observations.
///
/// `next_frame` is polled once per frame boundary by the detection
/// driver; returning `None` means the source is exhausted and the run
/// should wind down. A frame with zero hands is a valid observation (it
/// clears the stability window), not an end-of-source signal.
pub trait ObservationSource: Send {
    /// Pull the next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<Observation>;
}

/// Replays a recorded [`ObservationLog`] frame by frame.
///
/// Pacing comes from the driver's interval clock, not from the log's
/// nominal capture rate.
pub struct ReplaySource {
    frames: std::vec::IntoIter<Observation>,
    remaining: usize,
}

impl ReplaySource {
    /// Create a replay source from a loaded log.
    pub fn new(log: ObservationLog) -> Self {
        let remaining = log.frames.len();
        Self {
            frames: log.frames.into_iter(),
            remaining,
        }
    }

    /// Frames not yet replayed.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl ObservationSource for ReplaySource {
    fn next_frame(&mut self) -> Option<Observation> {
        let frame = self.frames.next();
        if frame.is_some() {
            self.remaining -= 1;
        }
        frame
    }
}
