//! Per-session state
//!
//! Everything the pipeline remembers between frames for one session:
//! the bound game, the detection flag, the stability window, and the
//! cooldown clocks. All of it is local bookkeeping; game state itself
//! is only ever a copy of what the server last reported.

use crate::game::types::GameSnapshot;
use crate::pipeline::cooldown::CooldownState;
use crate::pipeline::stability::HistoryWindow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mutable state for one registered session.
#[derive(Debug)]
pub struct SessionState {
    /// Game this session's gestures act on, once one is started
    pub game_id: Option<String>,
    /// Whether the detection loop is active
    pub detecting: bool,
    /// Stability window over recent raw labels
    pub window: HistoryWindow,
    /// Cooldown clocks
    pub cooldowns: CooldownState,
    /// Last complete snapshot received from the server
    pub snapshot: Option<GameSnapshot>,
    /// Last status text reported over the session topic
    pub status: Option<String>,
}

impl SessionState {
    /// Fresh state with the given stability window capacity.
    pub fn new(window_capacity: usize) -> Self {
        Self {
            game_id: None,
            detecting: false,
            window: HistoryWindow::new(window_capacity),
            cooldowns: CooldownState::new(),
            snapshot: None,
            status: None,
        }
    }

    /// Bind a (possibly new) game, replacing any previous binding.
    pub fn bind_game(&mut self, game_id: String) {
        self.game_id = Some(game_id);
    }

    /// Reset the inter-frame pipeline state. Called when detection
    /// (re)starts so stale votes and clocks never leak across runs.
    pub fn reset_pipeline(&mut self) {
        self.window.clear();
        self.cooldowns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_session_id_roundtrip() {
        let id = SessionId::from("abc-123");
        assert_eq!(id.as_str(), "abc-123");
        assert_eq!(id.to_string(), "abc-123");
    }

    #[test]
    fn test_fresh_state_is_idle() {
        let state = SessionState::new(5);
        assert!(state.game_id.is_none());
        assert!(!state.detecting);
        assert!(state.window.is_empty());
        assert!(state.snapshot.is_none());
    }

    #[test]
    fn test_bind_game_replaces_previous() {
        let mut state = SessionState::new(5);
        state.bind_game("g1".to_string());
        state.bind_game("g2".to_string());
        assert_eq!(state.game_id.as_deref(), Some("g2"));
    }

    #[test]
    fn test_reset_pipeline_clears_window_and_clocks() {
        use crate::observe::types::GestureLabel;
        use crate::pipeline::cooldown::CooldownGate;
        use std::time::Instant;

        let mut state = SessionState::new(5);
        state.window.push(GestureLabel::Higher);
        CooldownGate::default().record(&mut state.cooldowns, GestureLabel::Higher, Instant::now());

        state.reset_pipeline();
        assert!(state.window.is_empty());
        assert!(state.cooldowns.last_admission().is_none());
    }
}
