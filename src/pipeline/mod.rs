//! Signal conditioning
//!
//! The two stages that make a jittery per-frame classification safe to
//! act on: majority-vote stabilization over a bounded history window,
//! and the per-category/global cooldown gate.

pub mod cooldown;
pub mod stability;

pub use cooldown::{CooldownGate, CooldownPolicy, CooldownState, GateDecision};
pub use stability::{HistoryWindow, StabilityFilter};
