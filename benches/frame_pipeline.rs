//! Criterion benchmarks for the per-frame hot path
//!
//! Covers: finger-extension counting, both classifiers, stability
//! voting, and the cooldown gate check.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gesture_bridge::observe::classifier::{
    FingerCountClassifier, GestureClassifier, HandednessClassifier,
};
use gesture_bridge::observe::types::{
    GestureLabel, HandObservation, Handedness, Observation, FINGER_JOINTS, FINGER_TIPS,
    LANDMARK_COUNT,
};
use gesture_bridge::pipeline::cooldown::{CooldownGate, CooldownPolicy, CooldownState};
use gesture_bridge::pipeline::stability::{HistoryWindow, StabilityFilter};
use std::time::Instant;

fn open_palm() -> HandObservation {
    let mut landmarks = vec![[0.5, 0.5, 0.0]; LANDMARK_COUNT];
    for (i, (&tip, &joint)) in FINGER_TIPS.iter().zip(FINGER_JOINTS.iter()).enumerate() {
        landmarks[joint] = [0.5, 0.5, 0.0];
        landmarks[tip] = if i == 0 {
            [0.7, 0.5, 0.0]
        } else {
            [0.5, 0.3, 0.0]
        };
    }
    HandObservation::new(landmarks)
}

fn bench_finger_counting(c: &mut Criterion) {
    let hand = open_palm();
    c.bench_function("extended_finger_count", |b| {
        b.iter(|| black_box(&hand).extended_finger_count())
    });
}

fn bench_classifiers(c: &mut Criterion) {
    let single = Observation::with_hands(vec![open_palm()]);
    let pair = Observation::with_hands(vec![
        open_palm().with_handedness(Handedness::Left),
        open_palm().with_handedness(Handedness::Right),
    ]);

    c.bench_function("classify_finger_count", |b| {
        b.iter(|| FingerCountClassifier.classify(black_box(&single)))
    });
    c.bench_function("classify_handedness_two_hands", |b| {
        b.iter(|| HandednessClassifier.classify(black_box(&pair)))
    });
}

fn bench_stability_vote(c: &mut Criterion) {
    let filter = StabilityFilter::default();
    c.bench_function("stability_observe", |b| {
        let mut window = HistoryWindow::default();
        b.iter(|| filter.observe(&mut window, black_box(GestureLabel::Higher)))
    });
}

fn bench_cooldown_check(c: &mut Criterion) {
    let gate = CooldownGate::new(CooldownPolicy::tiered_default());
    let mut state = CooldownState::new();
    let t0 = Instant::now();
    gate.record(&mut state, GestureLabel::Higher, t0);

    c.bench_function("cooldown_check", |b| {
        b.iter(|| gate.check(black_box(&state), GestureLabel::Lower, t0))
    });
}

criterion_group!(
    benches,
    bench_finger_counting,
    bench_classifiers,
    bench_stability_vote,
    bench_cooldown_check
);
criterion_main!(benches);
