//! Dispatch cooldown gate
//!
//! Rate-limits stabilized gestures before they become outbound commands.
//! The gate is split into a pure `check` and a separate `record` so that
//! a dispatch which fails downstream never advances the cooldown clocks:
//! the caller records an admission only after the command actually left.

use crate::observe::types::GestureLabel;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default cooldown between admissions of the same category (ms)
pub const DEFAULT_GESTURE_COOLDOWN_MS: u64 = 800;

/// Default cooldown for the Reset category under the tiered policy (ms)
pub const DEFAULT_RESET_COOLDOWN_MS: u64 = 2000;

/// Default cross-category suppression window under the tiered policy (ms)
pub const DEFAULT_GLOBAL_COOLDOWN_MS: u64 = 5000;

/// How admissions are rate-limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownPolicy {
    /// One shared clock: any admission suppresses every category for the
    /// same fixed interval.
    Flat { cooldown: Duration },
    /// Per-category clocks plus a cross-category window. A category can
    /// repeat once its own clock expires; switching to a different
    /// category additionally requires the global window since the last
    /// admission of any category to have elapsed.
    Tiered {
        gesture_cooldown: Duration,
        reset_cooldown: Duration,
        global_cooldown: Duration,
    },
}

impl CooldownPolicy {
    /// Flat policy with the default interval.
    pub fn flat_default() -> Self {
        Self::Flat {
            cooldown: Duration::from_millis(DEFAULT_GESTURE_COOLDOWN_MS),
        }
    }

    /// Tiered policy with the default intervals.
    pub fn tiered_default() -> Self {
        Self::Tiered {
            gesture_cooldown: Duration::from_millis(DEFAULT_GESTURE_COOLDOWN_MS),
            reset_cooldown: Duration::from_millis(DEFAULT_RESET_COOLDOWN_MS),
            global_cooldown: Duration::from_millis(DEFAULT_GLOBAL_COOLDOWN_MS),
        }
    }

    fn category_cooldown(&self, label: GestureLabel) -> Duration {
        match *self {
            Self::Flat { cooldown } => cooldown,
            Self::Tiered {
                gesture_cooldown,
                reset_cooldown,
                ..
            } => {
                if label == GestureLabel::Reset {
                    reset_cooldown
                } else {
                    gesture_cooldown
                }
            }
        }
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::tiered_default()
    }
}

/// Per-session cooldown clocks.
#[derive(Debug, Clone, Default)]
pub struct CooldownState {
    last_by_category: HashMap<GestureLabel, Instant>,
    last_admission: Option<(GestureLabel, Instant)>,
}

impl CooldownState {
    /// Fresh state with no recorded admissions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all recorded admissions. Called when detection (re)starts.
    pub fn clear(&mut self) {
        self.last_by_category.clear();
        self.last_admission = None;
    }

    /// Label and time of the most recent admission, if any.
    pub fn last_admission(&self) -> Option<(GestureLabel, Instant)> {
        self.last_admission
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The candidate may be dispatched.
    Admit,
    /// The candidate's own category clock has not expired.
    DeniedCategory { remaining: Duration },
    /// A different category was admitted too recently.
    DeniedGlobal { remaining: Duration },
}

impl GateDecision {
    /// Whether the candidate passed the gate.
    pub fn is_admit(&self) -> bool {
        matches!(self, Self::Admit)
    }
}

/// Applies a [`CooldownPolicy`] to a session's [`CooldownState`].
#[derive(Debug, Clone, Copy)]
pub struct CooldownGate {
    policy: CooldownPolicy,
}

impl CooldownGate {
    /// Create a gate with the given policy.
    pub fn new(policy: CooldownPolicy) -> Self {
        Self { policy }
    }

    /// The configured policy.
    pub fn policy(&self) -> CooldownPolicy {
        self.policy
    }

    /// Decide whether `label` may be dispatched at `now`. Never mutates
    /// state; callers follow a successful dispatch with [`record`].
    ///
    /// [`record`]: Self::record
    pub fn check(&self, state: &CooldownState, label: GestureLabel, now: Instant) -> GateDecision {
        if let CooldownPolicy::Tiered { global_cooldown, .. } = self.policy {
            if let Some((last_label, last_at)) = state.last_admission {
                if last_label != label {
                    let elapsed = now.saturating_duration_since(last_at);
                    if elapsed < global_cooldown {
                        return GateDecision::DeniedGlobal {
                            remaining: global_cooldown - elapsed,
                        };
                    }
                }
            }
        }

        let cooldown = self.policy.category_cooldown(label);
        let last_at = match self.policy {
            CooldownPolicy::Flat { .. } => state.last_admission.map(|(_, at)| at),
            CooldownPolicy::Tiered { .. } => state.last_by_category.get(&label).copied(),
        };
        if let Some(last_at) = last_at {
            let elapsed = now.saturating_duration_since(last_at);
            if elapsed < cooldown {
                return GateDecision::DeniedCategory {
                    remaining: cooldown - elapsed,
                };
            }
        }
        GateDecision::Admit
    }

    /// Record that `label` was dispatched at `now`, advancing its
    /// category clock and the shared admission marker.
    pub fn record(&self, state: &mut CooldownState, label: GestureLabel, now: Instant) {
        state.last_by_category.insert(label, now);
        state.last_admission = Some((label, now));
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(CooldownPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GestureLabel::{Higher, Lower, Reset};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_admission_always_passes() {
        let gate = CooldownGate::default();
        let state = CooldownState::new();
        let now = Instant::now();
        assert!(gate.check(&state, Higher, now).is_admit());
        assert!(gate.check(&state, Reset, now).is_admit());
    }

    #[test]
    fn test_flat_policy_blocks_every_category() {
        let gate = CooldownGate::new(CooldownPolicy::flat_default());
        let mut state = CooldownState::new();
        let t0 = Instant::now();

        gate.record(&mut state, Higher, t0);

        assert!(matches!(
            gate.check(&state, Higher, t0 + ms(799)),
            GateDecision::DeniedCategory { .. }
        ));
        assert!(matches!(
            gate.check(&state, Lower, t0 + ms(799)),
            GateDecision::DeniedCategory { .. }
        ));
        assert!(gate.check(&state, Higher, t0 + ms(800)).is_admit());
        assert!(gate.check(&state, Lower, t0 + ms(800)).is_admit());
    }

    #[test]
    fn test_tiered_same_category_repeat_uses_category_clock() {
        let gate = CooldownGate::new(CooldownPolicy::tiered_default());
        let mut state = CooldownState::new();
        let t0 = Instant::now();

        gate.record(&mut state, Higher, t0);

        assert!(matches!(
            gate.check(&state, Higher, t0 + ms(799)),
            GateDecision::DeniedCategory { .. }
        ));
        assert!(gate.check(&state, Higher, t0 + ms(800)).is_admit());
    }

    #[test]
    fn test_tiered_reset_repeat_uses_reset_clock() {
        let gate = CooldownGate::new(CooldownPolicy::tiered_default());
        let mut state = CooldownState::new();
        let t0 = Instant::now();

        gate.record(&mut state, Reset, t0);

        assert!(matches!(
            gate.check(&state, Reset, t0 + ms(1999)),
            GateDecision::DeniedCategory { .. }
        ));
        assert!(gate.check(&state, Reset, t0 + ms(2001)).is_admit());
    }

    #[test]
    fn test_tiered_category_switch_blocked_by_global_window() {
        let gate = CooldownGate::new(CooldownPolicy::tiered_default());
        let mut state = CooldownState::new();
        let t0 = Instant::now();

        gate.record(&mut state, Higher, t0);

        // Lower's own clock has never fired, but the global window since
        // the Higher admission still applies.
        assert!(matches!(
            gate.check(&state, Lower, t0 + ms(4999)),
            GateDecision::DeniedGlobal { .. }
        ));
        assert!(gate.check(&state, Lower, t0 + ms(5000)).is_admit());
    }

    #[test]
    fn test_tiered_denied_global_reports_remaining() {
        let gate = CooldownGate::new(CooldownPolicy::tiered_default());
        let mut state = CooldownState::new();
        let t0 = Instant::now();

        gate.record(&mut state, Higher, t0);

        match gate.check(&state, Reset, t0 + ms(3000)) {
            GateDecision::DeniedGlobal { remaining } => assert_eq!(remaining, ms(2000)),
            other => panic!("expected DeniedGlobal, got {other:?}"),
        }
    }

    #[test]
    fn test_tiered_denied_category_reports_remaining() {
        let gate = CooldownGate::new(CooldownPolicy::tiered_default());
        let mut state = CooldownState::new();
        let t0 = Instant::now();

        gate.record(&mut state, Higher, t0);

        match gate.check(&state, Higher, t0 + ms(300)) {
            GateDecision::DeniedCategory { remaining } => assert_eq!(remaining, ms(500)),
            other => panic!("expected DeniedCategory, got {other:?}"),
        }
    }

    #[test]
    fn test_check_does_not_advance_clocks() {
        let gate = CooldownGate::new(CooldownPolicy::tiered_default());
        let mut state = CooldownState::new();
        let t0 = Instant::now();

        gate.record(&mut state, Higher, t0);

        // Repeated denied checks leave the admission timestamp alone.
        for offset in [100, 200, 300] {
            let _ = gate.check(&state, Higher, t0 + ms(offset));
        }
        assert_eq!(state.last_admission(), Some((Higher, t0)));
        assert!(gate.check(&state, Higher, t0 + ms(800)).is_admit());
    }

    #[test]
    fn test_category_clock_survives_other_category_admission() {
        let gate = CooldownGate::new(CooldownPolicy::tiered_default());
        let mut state = CooldownState::new();
        let t0 = Instant::now();

        gate.record(&mut state, Reset, t0);
        gate.record(&mut state, Higher, t0 + ms(5000));

        // Reset's own 2000ms clock expired long ago, but switching back
        // to Reset re-enters the global window from the Higher admission.
        assert!(matches!(
            gate.check(&state, Reset, t0 + ms(9999)),
            GateDecision::DeniedGlobal { .. }
        ));
        assert!(gate.check(&state, Reset, t0 + ms(10_000)).is_admit());
    }

    #[test]
    fn test_clear_forgets_all_clocks() {
        let gate = CooldownGate::new(CooldownPolicy::tiered_default());
        let mut state = CooldownState::new();
        let t0 = Instant::now();

        gate.record(&mut state, Higher, t0);
        state.clear();

        assert!(gate.check(&state, Lower, t0 + ms(1)).is_admit());
        assert!(state.last_admission().is_none());
    }
}
