//! Detection driver
//!
//! Pulls frames from an observation source on a fixed period and feeds
//! them to the coordinator. Ticks never overlap: if a frame takes longer
//! than the period, the next tick is skipped rather than queued, so a
//! slow frame produces a late frame, not a burst.
//!
//! Cancellation is level-triggered through the session's detection flag:
//! the loop checks it before every frame, so stopping from an inbound
//! game-over update or a signal handler takes effect at the next tick.

use crate::observe::source::ObservationSource;
use crate::session::coordinator::{FrameOutcome, SessionCoordinator};
use crate::session::state::SessionId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Default frame period in milliseconds (10 fps)
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 100;

/// Tally of a finished detection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionReport {
    /// Frames pulled from the source
    pub frames: usize,
    /// Gestures published
    pub dispatched: usize,
    /// Stable gestures suppressed by the cooldown gate
    pub suppressed: usize,
    /// Dispatches that failed on the transport
    pub failed: usize,
}

/// Drive detection for one session until the source is exhausted or
/// detection is stopped.
///
/// Inbound broker messages may arrive on `updates` and are applied
/// between frames; a game-over update flips the detection flag and ends
/// the run at the next tick.
pub async fn run_detection(
    coordinator: Arc<SessionCoordinator>,
    session_id: SessionId,
    mut source: Box<dyn ObservationSource>,
    frame_interval: Duration,
    mut updates: Option<mpsc::Receiver<String>>,
) -> crate::Result<DetectionReport> {
    let mut ticker = interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut report = DetectionReport::default();
    loop {
        if !coordinator.is_detecting(&session_id) {
            info!(session_id = %session_id, "Detection flag cleared, ending run");
            break;
        }
        ticker.tick().await;

        if let Some(rx) = updates.as_mut() {
            drain_updates(&coordinator, &session_id, rx);
        }
        if !coordinator.is_detecting(&session_id) {
            info!(session_id = %session_id, "Detection flag cleared, ending run");
            break;
        }

        let Some(frame) = source.next_frame() else {
            info!(session_id = %session_id, "Observation source exhausted");
            coordinator.stop_detection(&session_id)?;
            break;
        };
        report.frames += 1;

        match coordinator.process_frame(&session_id, &frame)? {
            FrameOutcome::Dispatched { label } => {
                info!(session_id = %session_id, %label, "Gesture dispatched");
                report.dispatched += 1;
            }
            FrameOutcome::Suppressed { label, .. } => {
                debug!(session_id = %session_id, %label, "Gesture suppressed");
                report.suppressed += 1;
            }
            FrameOutcome::DispatchFailed { label } => {
                warn!(session_id = %session_id, %label, "Gesture dispatch failed");
                report.failed += 1;
            }
            FrameOutcome::AwaitingGame { label } => {
                debug!(session_id = %session_id, %label, "Gesture withheld, no game bound");
            }
            FrameOutcome::Inactive => break,
            FrameOutcome::Cleared | FrameOutcome::Unstable { .. } => {}
        }
    }
    Ok(report)
}

fn drain_updates(
    coordinator: &SessionCoordinator,
    session_id: &SessionId,
    rx: &mut mpsc::Receiver<String>,
) {
    while let Ok(body) = rx.try_recv() {
        if let Err(e) = coordinator.apply_raw_update(session_id, &body) {
            warn!(session_id = %session_id, error = %e, "Dropping inbound update");
        }
    }
}
