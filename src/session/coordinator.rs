//! Session coordinator
//!
//! Owns the session registry and runs the per-frame pipeline: classify,
//! stabilize, gate, dispatch. Also applies inbound updates from the
//! broker and fronts the game service for explicit actions.
//!
//! Locking discipline: the registry lock is never held across an await
//! point or a transport call that can block.

use crate::game::client::GameClient;
use crate::game::types::{GameSnapshot, GuessDirection};
use crate::observe::classifier::GestureClassifier;
use crate::observe::types::{GestureLabel, Observation};
use crate::pipeline::cooldown::{CooldownGate, CooldownPolicy, GateDecision};
use crate::pipeline::stability::{
    StabilityFilter, DEFAULT_VOTE_THRESHOLD, DEFAULT_WINDOW_CAPACITY,
};
use crate::protocol::messages::GestureUpdate;
use crate::protocol::publisher::EventPublisher;
use crate::session::state::{SessionId, SessionState};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tunable pipeline parameters, shared by every session.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Stability window capacity in frames
    pub window_capacity: usize,
    /// Frames a label must occupy in the window to stabilize
    pub stability_threshold: usize,
    /// Cooldown policy applied to admitted gestures
    pub cooldown_policy: CooldownPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            stability_threshold: DEFAULT_VOTE_THRESHOLD,
            cooldown_policy: CooldownPolicy::default(),
        }
    }
}

/// What happened to one observation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Detection is not active for this session; the frame was ignored.
    Inactive,
    /// No hands in frame; the stability window was cleared.
    Cleared,
    /// A raw label entered the window but no majority emerged.
    Unstable { raw: GestureLabel },
    /// A stable label was suppressed by the cooldown gate.
    Suppressed {
        label: GestureLabel,
        decision: GateDecision,
    },
    /// A stable label passed the gate but no game is bound yet; the
    /// dispatch is withheld until one is.
    AwaitingGame { label: GestureLabel },
    /// A stable label passed the gate and was published.
    Dispatched { label: GestureLabel },
    /// A stable label passed the gate but the publish failed; cooldown
    /// clocks were left untouched so a later frame can retry.
    DispatchFailed { label: GestureLabel },
}

/// Coordinates all sessions' pipelines against one backend.
pub struct SessionCoordinator {
    classifier: RwLock<Option<Arc<dyn GestureClassifier>>>,
    filter: StabilityFilter,
    gate: CooldownGate,
    publisher: EventPublisher,
    game_client: GameClient,
    sessions: Mutex<HashMap<SessionId, SessionState>>,
    window_capacity: usize,
}

impl SessionCoordinator {
    /// Create a coordinator. No classifier is bound yet; detection
    /// cannot start until [`set_classifier`] is called.
    ///
    /// [`set_classifier`]: Self::set_classifier
    pub fn new(
        publisher: EventPublisher,
        game_client: GameClient,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            classifier: RwLock::new(None),
            filter: StabilityFilter::new(settings.stability_threshold),
            gate: CooldownGate::new(settings.cooldown_policy),
            publisher,
            game_client,
            sessions: Mutex::new(HashMap::new()),
            window_capacity: settings.window_capacity,
        }
    }

    /// Bind the classifier used for every session's frames.
    pub fn set_classifier(&self, classifier: Arc<dyn GestureClassifier>) {
        info!(classifier = classifier.name(), "Classifier ready");
        *self.classifier.write() = Some(classifier);
    }

    /// Register a new session with the backend under a generated id.
    pub fn register(&self) -> crate::Result<SessionId> {
        let id = SessionId::generate();
        self.register_with_id(id.clone())?;
        Ok(id)
    }

    /// Register a session under a caller-supplied id.
    ///
    /// No local state is kept if the registration publish fails.
    pub fn register_with_id(&self, id: SessionId) -> crate::Result<()> {
        self.publisher.register(id.as_str())?;
        self.sessions
            .lock()
            .insert(id.clone(), SessionState::new(self.window_capacity));
        info!(session_id = %id, "Session registered");
        Ok(())
    }

    /// Tear a session down, dropping its state. The unregister publish
    /// is best effort.
    pub fn unregister(&self, id: &SessionId) -> crate::Result<()> {
        if self.sessions.lock().remove(id).is_none() {
            return Err(crate::Error::UnknownSession(id.to_string()));
        }
        self.publisher.unregister(id.as_str())?;
        info!(session_id = %id, "Session unregistered");
        Ok(())
    }

    /// Start a new game over REST and bind it to the session.
    pub async fn start_game(&self, id: &SessionId) -> crate::Result<GameSnapshot> {
        self.ensure_session(id)?;
        let snapshot = self.game_client.start_game().await?;

        let mut sessions = self.sessions.lock();
        let state = Self::state_mut(&mut sessions, id)?;
        state.bind_game(snapshot.game_id.clone());
        state.snapshot = Some(snapshot.clone());
        info!(session_id = %id, game_id = %snapshot.game_id, "Game started");
        Ok(snapshot)
    }

    /// Bind an existing game to the session without starting one.
    pub fn bind_game(&self, id: &SessionId, game_id: &str) -> crate::Result<()> {
        let mut sessions = self.sessions.lock();
        Self::state_mut(&mut sessions, id)?.bind_game(game_id.to_string());
        Ok(())
    }

    /// Submit an explicit guess for the session's bound game.
    pub async fn make_guess(
        &self,
        id: &SessionId,
        direction: GuessDirection,
    ) -> crate::Result<GameSnapshot> {
        let game_id = self.bound_game(id)?;
        let snapshot = self.game_client.make_guess(&game_id, direction).await?;
        self.accept_snapshot(id, snapshot.clone())?;
        Ok(snapshot)
    }

    /// Fetch the bound game's state from the server.
    pub async fn fetch_state(&self, id: &SessionId) -> crate::Result<GameSnapshot> {
        let game_id = self.bound_game(id)?;
        let snapshot = self.game_client.get_game(&game_id).await?;
        self.accept_snapshot(id, snapshot.clone())?;
        Ok(snapshot)
    }

    /// Start the detection pipeline for a session.
    ///
    /// Requires a bound classifier. A game need not be bound yet:
    /// stable gestures are simply withheld until one is. Clears the
    /// stability window and cooldown clocks so nothing leaks from a
    /// previous run. A no-op if detection is already active.
    pub fn start_detection(&self, id: &SessionId, camera_index: u32) -> crate::Result<()> {
        if self.classifier.read().is_none() {
            return Err(crate::Error::ModelUnavailable);
        }
        {
            let mut sessions = self.sessions.lock();
            let state = Self::state_mut(&mut sessions, id)?;
            if state.detecting {
                debug!(session_id = %id, "Detection already active");
                return Ok(());
            }
        }
        self.publisher.start_detection(id.as_str(), camera_index)?;

        let mut sessions = self.sessions.lock();
        let state = Self::state_mut(&mut sessions, id)?;
        state.reset_pipeline();
        state.detecting = true;
        info!(session_id = %id, camera_index, "Detection started");
        Ok(())
    }

    /// Stop the detection pipeline. Idempotent; safe to call when
    /// detection never started or the broker is down.
    pub fn stop_detection(&self, id: &SessionId) -> crate::Result<()> {
        {
            let mut sessions = self.sessions.lock();
            let state = Self::state_mut(&mut sessions, id)?;
            if !state.detecting {
                return Ok(());
            }
            state.detecting = false;
        }
        self.publisher.stop_detection(id.as_str())?;
        info!(session_id = %id, "Detection stopped");
        Ok(())
    }

    /// Run one observation frame through the pipeline.
    pub fn process_frame(
        &self,
        id: &SessionId,
        observation: &Observation,
    ) -> crate::Result<FrameOutcome> {
        let classifier = self
            .classifier
            .read()
            .clone()
            .ok_or(crate::Error::ModelUnavailable)?;

        // Stabilize and gate under the lock, then release it before the
        // transport call; the admission is recorded afterwards only if
        // the publish went out.
        let (stable, now, game_id) = {
            let mut sessions = self.sessions.lock();
            let state = Self::state_mut(&mut sessions, id)?;
            if !state.detecting {
                return Ok(FrameOutcome::Inactive);
            }

            if !observation.has_hands() {
                state.window.clear();
                return Ok(FrameOutcome::Cleared);
            }

            let raw = classifier.classify(observation);
            let stable = self.filter.observe(&mut state.window, raw);
            if !stable.is_actionable() {
                return Ok(FrameOutcome::Unstable { raw });
            }

            let now = Instant::now();
            let decision = self.gate.check(&state.cooldowns, stable, now);
            if !decision.is_admit() {
                debug!(session_id = %id, label = %stable, ?decision, "Gesture suppressed");
                return Ok(FrameOutcome::Suppressed {
                    label: stable,
                    decision,
                });
            }

            let Some(game_id) = state.game_id.clone() else {
                debug!(session_id = %id, label = %stable, "No game bound, withholding gesture");
                return Ok(FrameOutcome::AwaitingGame { label: stable });
            };
            (stable, now, game_id)
        };

        match self.publisher.send_gesture(id.as_str(), stable, &game_id) {
            Ok(()) => {
                let mut sessions = self.sessions.lock();
                let state = Self::state_mut(&mut sessions, id)?;
                self.gate.record(&mut state.cooldowns, stable, now);
                Ok(FrameOutcome::Dispatched { label: stable })
            }
            Err(crate::Error::TransportUnavailable(reason)) => {
                warn!(session_id = %id, label = %stable, reason, "Dispatch failed, will retry");
                Ok(FrameOutcome::DispatchFailed { label: stable })
            }
            Err(e) => Err(e),
        }
    }

    /// Apply an inbound update from the session's gesture topic.
    pub fn apply_update(&self, id: &SessionId, update: &GestureUpdate) -> crate::Result<()> {
        let mut force_stop = false;
        {
            let mut sessions = self.sessions.lock();
            let state = Self::state_mut(&mut sessions, id)?;

            if update.is_status() {
                let status = update
                    .message
                    .clone()
                    .unwrap_or_else(|| update.gesture.clone());
                if update.gesture == "error" {
                    warn!(session_id = %id, status, "Backend reported an error");
                }
                state.status = Some(status);
                return Ok(());
            }

            // A reset echo arrives with the replacement game's id; any
            // id differing from the binding rebinds.
            if let Some(game_id) = &update.game_id {
                if state.game_id.as_deref() != Some(game_id.as_str()) {
                    info!(session_id = %id, game_id, "Rebinding to new game");
                    state.bind_game(game_id.clone());
                }
            }

            if let Some(snapshot) = update.snapshot() {
                state.snapshot = Some(snapshot);
            }

            if update.game_over == Some(true) && state.detecting {
                state.detecting = false;
                force_stop = true;
            }
        }

        if force_stop {
            info!(session_id = %id, "Game over, stopping detection");
            self.publisher.stop_detection(id.as_str())?;
        }
        Ok(())
    }

    /// Parse and apply a raw JSON update from the broker.
    pub fn apply_raw_update(&self, id: &SessionId, body: &str) -> crate::Result<()> {
        let update: GestureUpdate = serde_json::from_str(body)
            .map_err(|e| crate::Error::MalformedMessage(e.to_string()))?;
        self.apply_update(id, &update)
    }

    /// Whether detection is currently active for a session.
    pub fn is_detecting(&self, id: &SessionId) -> bool {
        self.sessions
            .lock()
            .get(id)
            .map(|s| s.detecting)
            .unwrap_or(false)
    }

    /// The session's last known snapshot, if any.
    pub fn snapshot(&self, id: &SessionId) -> crate::Result<Option<GameSnapshot>> {
        let sessions = self.sessions.lock();
        let state = sessions
            .get(id)
            .ok_or_else(|| crate::Error::UnknownSession(id.to_string()))?;
        Ok(state.snapshot.clone())
    }

    /// The session's last status text, if any.
    pub fn status(&self, id: &SessionId) -> crate::Result<Option<String>> {
        let sessions = self.sessions.lock();
        let state = sessions
            .get(id)
            .ok_or_else(|| crate::Error::UnknownSession(id.to_string()))?;
        Ok(state.status.clone())
    }

    fn ensure_session(&self, id: &SessionId) -> crate::Result<()> {
        if self.sessions.lock().contains_key(id) {
            Ok(())
        } else {
            Err(crate::Error::UnknownSession(id.to_string()))
        }
    }

    fn bound_game(&self, id: &SessionId) -> crate::Result<String> {
        let sessions = self.sessions.lock();
        let state = sessions
            .get(id)
            .ok_or_else(|| crate::Error::UnknownSession(id.to_string()))?;
        state
            .game_id
            .clone()
            .ok_or_else(|| crate::Error::NoActiveGame(id.to_string()))
    }

    fn accept_snapshot(&self, id: &SessionId, snapshot: GameSnapshot) -> crate::Result<()> {
        let mut force_stop = false;
        {
            let mut sessions = self.sessions.lock();
            let state = Self::state_mut(&mut sessions, id)?;
            state.bind_game(snapshot.game_id.clone());
            if snapshot.game_over && state.detecting {
                state.detecting = false;
                force_stop = true;
            }
            state.snapshot = Some(snapshot);
        }
        if force_stop {
            info!(session_id = %id, "Game over, stopping detection");
            self.publisher.stop_detection(id.as_str())?;
        }
        Ok(())
    }

    fn state_mut<'a>(
        sessions: &'a mut HashMap<SessionId, SessionState>,
        id: &SessionId,
    ) -> crate::Result<&'a mut SessionState> {
        sessions
            .get_mut(id)
            .ok_or_else(|| crate::Error::UnknownSession(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::classifier::FingerCountClassifier;
    use crate::observe::types::hand_with_extensions;
    use crate::protocol::messages::DestinationScheme;
    use crate::protocol::transport::{ChannelTransport, Transport};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Weak;

    fn coordinator(transport: Arc<ChannelTransport>) -> SessionCoordinator {
        let publisher = EventPublisher::new(transport, DestinationScheme::default());
        let client = GameClient::new("http://127.0.0.1:1/api/game").unwrap();
        let coordinator =
            SessionCoordinator::new(publisher, client, PipelineSettings::default());
        coordinator.set_classifier(Arc::new(FingerCountClassifier));
        coordinator
    }

    fn registered(coordinator: &SessionCoordinator) -> SessionId {
        let id = coordinator.register().unwrap();
        coordinator.bind_game(&id, "g1").unwrap();
        id
    }

    fn open_palm_frame() -> Observation {
        Observation::with_hands(vec![hand_with_extensions([true; 5])])
    }

    #[test]
    fn test_register_publishes_and_tracks_session() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport.clone());

        let id = coordinator.register().unwrap();
        assert!(!coordinator.is_detecting(&id));
        assert_eq!(
            transport
                .frames_for("/app/tensorflow/gesture.register")
                .len(),
            1
        );
    }

    #[test]
    fn test_register_with_caller_supplied_id() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport.clone());

        let id = SessionId::from("observer-7");
        coordinator.register_with_id(id.clone()).unwrap();
        coordinator.bind_game(&id, "g1").unwrap();
        coordinator.start_detection(&id, 0).unwrap();

        let frames = transport.frames_for("/app/tensorflow/gesture.start");
        assert!(frames[0].body.contains("\"sessionId\":\"observer-7\""));
    }

    #[test]
    fn test_register_fails_when_disconnected() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport.clone());
        transport.set_connected(false);

        assert!(coordinator.register().is_err());
    }

    #[test]
    fn test_detection_without_game_withholds_dispatch() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport.clone());

        // No game bound yet: detection may start, but stable gestures
        // are withheld instead of dispatched.
        let id = coordinator.register().unwrap();
        coordinator.start_detection(&id, 0).unwrap();

        for _ in 0..2 {
            coordinator.process_frame(&id, &open_palm_frame()).unwrap();
        }
        let outcome = coordinator.process_frame(&id, &open_palm_frame()).unwrap();
        assert_eq!(
            outcome,
            FrameOutcome::AwaitingGame {
                label: GestureLabel::Higher
            }
        );
        assert!(transport
            .frames_for("/app/tensorflow/gesture.detect")
            .is_empty());

        // Binding a game unblocks dispatch; no cooldown was recorded
        // while withheld, so the next stable frame goes straight out.
        coordinator.bind_game(&id, "g1").unwrap();
        let outcome = coordinator.process_frame(&id, &open_palm_frame()).unwrap();
        assert_eq!(
            outcome,
            FrameOutcome::Dispatched {
                label: GestureLabel::Higher
            }
        );
    }

    #[test]
    fn test_start_detection_requires_a_classifier() {
        let transport = ChannelTransport::connected();
        let publisher = EventPublisher::new(transport, DestinationScheme::default());
        let client = GameClient::new("http://127.0.0.1:1/api/game").unwrap();
        let coordinator =
            SessionCoordinator::new(publisher, client, PipelineSettings::default());

        let id = coordinator.register().unwrap();
        coordinator.bind_game(&id, "g1").unwrap();
        let result = coordinator.start_detection(&id, 0);
        assert!(matches!(result, Err(crate::Error::ModelUnavailable)));
    }

    #[test]
    fn test_unknown_session_is_rejected() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport);

        let ghost = SessionId::from("ghost");
        assert!(matches!(
            coordinator.start_detection(&ghost, 0),
            Err(crate::Error::UnknownSession(_))
        ));
        assert!(matches!(
            coordinator.process_frame(&ghost, &Observation::empty()),
            Err(crate::Error::UnknownSession(_))
        ));
    }

    #[test]
    fn test_frames_ignored_while_inactive() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport);
        let id = registered(&coordinator);

        let outcome = coordinator.process_frame(&id, &open_palm_frame()).unwrap();
        assert_eq!(outcome, FrameOutcome::Inactive);
    }

    #[test]
    fn test_stable_gesture_is_dispatched_once() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport.clone());
        let id = registered(&coordinator);
        coordinator.start_detection(&id, 0).unwrap();

        let mut dispatched = 0;
        for _ in 0..5 {
            if let FrameOutcome::Dispatched { label } =
                coordinator.process_frame(&id, &open_palm_frame()).unwrap()
            {
                assert_eq!(label, GestureLabel::Higher);
                dispatched += 1;
            }
        }
        assert_eq!(dispatched, 1);

        let frames = transport.frames_for("/app/tensorflow/gesture.detect");
        assert_eq!(frames.len(), 1);
        assert!(frames[0].body.contains("\"gesture\":\"higher\""));
    }

    /// Transport that calls back into the coordinator from `publish`,
    /// taking the registry lock. Deadlocks if the caller still holds it.
    #[derive(Default)]
    struct ReentrantTransport {
        target: Mutex<Option<(Weak<SessionCoordinator>, SessionId)>>,
        reentered: AtomicBool,
    }

    impl Transport for ReentrantTransport {
        fn is_connected(&self) -> bool {
            true
        }

        fn publish(&self, destination: &str, _body: &str) -> crate::Result<()> {
            if destination.ends_with("gesture.detect") {
                if let Some((coordinator, id)) = self.target.lock().clone() {
                    if let Some(coordinator) = coordinator.upgrade() {
                        self.reentered
                            .store(coordinator.is_detecting(&id), Ordering::SeqCst);
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_registry_lock_released_before_publish() {
        let transport = Arc::new(ReentrantTransport::default());
        let publisher = EventPublisher::new(transport.clone(), DestinationScheme::default());
        let client = GameClient::new("http://127.0.0.1:1/api/game").unwrap();
        let coordinator = Arc::new(SessionCoordinator::new(
            publisher,
            client,
            PipelineSettings::default(),
        ));
        coordinator.set_classifier(Arc::new(FingerCountClassifier));

        let id = coordinator.register().unwrap();
        coordinator.bind_game(&id, "g1").unwrap();
        coordinator.start_detection(&id, 0).unwrap();
        *transport.target.lock() = Some((Arc::downgrade(&coordinator), id.clone()));

        for _ in 0..3 {
            coordinator.process_frame(&id, &open_palm_frame()).unwrap();
        }
        assert!(transport.reentered.load(Ordering::SeqCst));
    }

    #[test]
    fn test_no_hands_clears_the_window() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport.clone());
        let id = registered(&coordinator);
        coordinator.start_detection(&id, 0).unwrap();

        // Two votes, then a gap, then two more: never stabilizes
        for _ in 0..2 {
            coordinator.process_frame(&id, &open_palm_frame()).unwrap();
        }
        let outcome = coordinator
            .process_frame(&id, &Observation::empty())
            .unwrap();
        assert_eq!(outcome, FrameOutcome::Cleared);
        for _ in 0..2 {
            let outcome = coordinator.process_frame(&id, &open_palm_frame()).unwrap();
            assert!(matches!(outcome, FrameOutcome::Unstable { .. }));
        }
        assert!(transport
            .frames_for("/app/tensorflow/gesture.detect")
            .is_empty());
    }

    #[test]
    fn test_failed_dispatch_leaves_cooldown_untouched() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport.clone());
        let id = registered(&coordinator);
        coordinator.start_detection(&id, 0).unwrap();

        for _ in 0..2 {
            coordinator.process_frame(&id, &open_palm_frame()).unwrap();
        }
        transport.set_connected(false);
        let outcome = coordinator.process_frame(&id, &open_palm_frame()).unwrap();
        assert_eq!(
            outcome,
            FrameOutcome::DispatchFailed {
                label: GestureLabel::Higher
            }
        );

        // Reconnect: the very next stable frame dispatches because no
        // admission was recorded.
        transport.set_connected(true);
        let outcome = coordinator.process_frame(&id, &open_palm_frame()).unwrap();
        assert_eq!(
            outcome,
            FrameOutcome::Dispatched {
                label: GestureLabel::Higher
            }
        );
    }

    #[test]
    fn test_stop_detection_is_idempotent() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport.clone());
        let id = registered(&coordinator);
        coordinator.start_detection(&id, 0).unwrap();

        coordinator.stop_detection(&id).unwrap();
        coordinator.stop_detection(&id).unwrap();
        assert!(!coordinator.is_detecting(&id));
        assert_eq!(transport.frames_for("/app/tensorflow/gesture.stop").len(), 1);
    }

    #[test]
    fn test_stop_detection_survives_disconnect() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport.clone());
        let id = registered(&coordinator);
        coordinator.start_detection(&id, 0).unwrap();

        transport.set_connected(false);
        coordinator.stop_detection(&id).unwrap();
        assert!(!coordinator.is_detecting(&id));
    }

    #[test]
    fn test_restart_clears_pipeline_state() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport.clone());
        let id = registered(&coordinator);
        coordinator.start_detection(&id, 0).unwrap();

        for _ in 0..3 {
            coordinator.process_frame(&id, &open_palm_frame()).unwrap();
        }
        coordinator.stop_detection(&id).unwrap();
        coordinator.start_detection(&id, 0).unwrap();

        // Fresh cooldown clocks: three frames re-stabilize and dispatch
        // again immediately.
        let mut dispatched = 0;
        for _ in 0..3 {
            if matches!(
                coordinator.process_frame(&id, &open_palm_frame()).unwrap(),
                FrameOutcome::Dispatched { .. }
            ) {
                dispatched += 1;
            }
        }
        assert_eq!(dispatched, 1);
        assert_eq!(
            transport.frames_for("/app/tensorflow/gesture.detect").len(),
            2
        );
    }

    #[test]
    fn test_status_update_sets_status_line() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport);
        let id = registered(&coordinator);

        coordinator
            .apply_raw_update(&id, r#"{"gesture": "started"}"#)
            .unwrap();
        assert_eq!(coordinator.status(&id).unwrap().as_deref(), Some("started"));
    }

    #[test]
    fn test_reset_echo_rebinds_game() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport);
        let id = registered(&coordinator);

        let body = r#"{
            "gesture": "reset",
            "gameId": "g2",
            "currentCard": {"suit": "HEARTS", "rank": "3", "value": 3},
            "nextCard": {"suit": "CLUBS", "rank": "9", "value": 9},
            "score": 0,
            "gameOver": false
        }"#;
        coordinator.apply_raw_update(&id, body).unwrap();

        let snapshot = coordinator.snapshot(&id).unwrap().unwrap();
        assert_eq!(snapshot.game_id, "g2");
    }

    #[test]
    fn test_game_over_update_stops_detection() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport.clone());
        let id = registered(&coordinator);
        coordinator.start_detection(&id, 0).unwrap();

        let body = r#"{
            "gesture": "higher",
            "gameId": "g1",
            "currentCard": {"suit": "HEARTS", "rank": "3", "value": 3},
            "nextCard": {"suit": "CLUBS", "rank": "9", "value": 9},
            "score": 4,
            "gameOver": true
        }"#;
        coordinator.apply_raw_update(&id, body).unwrap();

        assert!(!coordinator.is_detecting(&id));
        assert_eq!(transport.frames_for("/app/tensorflow/gesture.stop").len(), 1);
    }

    #[test]
    fn test_partial_update_keeps_previous_snapshot() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport);
        let id = registered(&coordinator);

        let full = r#"{
            "gesture": "higher",
            "gameId": "g1",
            "currentCard": {"suit": "HEARTS", "rank": "3", "value": 3},
            "nextCard": {"suit": "CLUBS", "rank": "9", "value": 9},
            "score": 1,
            "gameOver": false
        }"#;
        coordinator.apply_raw_update(&id, full).unwrap();

        // Missing nextCard: must not replace the snapshot
        let partial = r#"{"gesture": "higher", "gameId": "g1", "score": 2}"#;
        coordinator.apply_raw_update(&id, partial).unwrap();

        let snapshot = coordinator.snapshot(&id).unwrap().unwrap();
        assert_eq!(snapshot.score, 1);
    }

    #[test]
    fn test_malformed_update_is_rejected() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport);
        let id = registered(&coordinator);

        let result = coordinator.apply_raw_update(&id, "{ not json");
        assert!(matches!(result, Err(crate::Error::MalformedMessage(_))));
    }

    #[test]
    fn test_unregister_drops_state() {
        let transport = ChannelTransport::connected();
        let coordinator = coordinator(transport);
        let id = registered(&coordinator);

        coordinator.unregister(&id).unwrap();
        assert!(matches!(
            coordinator.snapshot(&id),
            Err(crate::Error::UnknownSession(_))
        ));
        assert!(matches!(
            coordinator.unregister(&id),
            Err(crate::Error::UnknownSession(_))
        ));
    }
}
