//! Branch Predictor Direction Tests.
//!
//! Verifies the direction prediction and training logic for the five
//! predictor implementations: always-not-taken, always-taken, one-bit,
//! two-bit saturating counters, and the perceptron.

use rvfive_core::core::units::bru::one_bit::OneBitPredictor;
use rvfive_core::core::units::bru::perceptron::PerceptronPredictor;
use rvfive_core::core::units::bru::static_bp::{AlwaysNotTakenPredictor, AlwaysTakenPredictor};
use rvfive_core::core::units::bru::two_bit::TwoBitPredictor;
use rvfive_core::core::units::bru::DirectionPredictor;

/// Trains a predictor with `n` identical outcomes for the branch at `pc`.
fn train<P: DirectionPredictor>(bp: &mut P, pc: u64, taken: bool, n: usize) {
    for _ in 0..n {
        bp.update(pc, taken, 0x2000);
    }
}

// ══════════════════════════════════════════════════════════
// 1. Static predictors
// ══════════════════════════════════════════════════════════

/// Always-not-taken ignores training.
#[test]
fn not_taken_ignores_training() {
    let mut bp = AlwaysNotTakenPredictor;
    train(&mut bp, 0x1000, true, 100);
    assert!(!bp.predict(0x1000));
}

/// Always-taken ignores training.
#[test]
fn taken_ignores_training() {
    let mut bp = AlwaysTakenPredictor;
    train(&mut bp, 0x1000, false, 100);
    assert!(bp.predict(0x1000));
}

// ══════════════════════════════════════════════════════════
// 2. One-bit predictor
// ══════════════════════════════════════════════════════════

/// One-bit state is global: any branch's outcome sets the next prediction
/// for every PC.
#[test]
fn one_bit_tracks_last_outcome_globally() {
    let mut bp = OneBitPredictor::new();
    assert!(!bp.predict(0x1000), "initial state is not-taken");

    bp.update(0x1000, true, 0x2000);
    assert!(bp.predict(0x1000));
    assert!(bp.predict(0x3000), "state is shared across PCs");

    bp.update(0x3000, false, 0x2000);
    assert!(!bp.predict(0x1000));
}

// ══════════════════════════════════════════════════════════
// 3. Two-bit predictor
// ══════════════════════════════════════════════════════════

/// Counters start at 2 (weakly taken).
#[test]
fn two_bit_starts_weakly_taken() {
    let bp = TwoBitPredictor::new(16);
    assert!(bp.predict(0x1000));
}

/// One not-taken outcome drops a weakly-taken counter below the threshold;
/// one taken outcome brings it back.
#[test]
fn two_bit_hysteresis() {
    let mut bp = TwoBitPredictor::new(16);
    let pc = 0x1000;

    bp.update(pc, false, 0);
    assert!(!bp.predict(pc), "2 -> 1 predicts not-taken");

    bp.update(pc, true, 0x2000);
    assert!(bp.predict(pc), "1 -> 2 predicts taken");
}

/// Counters saturate at both bounds.
#[test]
fn two_bit_saturates() {
    let mut bp = TwoBitPredictor::new(16);
    let pc = 0x1000;

    train(&mut bp, pc, true, 10);
    // From strongly taken, two not-taken outcomes flip the prediction.
    bp.update(pc, false, 0);
    assert!(bp.predict(pc), "3 -> 2 still predicts taken");
    bp.update(pc, false, 0);
    assert!(!bp.predict(pc), "2 -> 1 predicts not-taken");

    train(&mut bp, pc, false, 10);
    bp.update(pc, true, 0x2000);
    assert!(!bp.predict(pc), "0 -> 1 still predicts not-taken");
}

/// Branches K entries apart share a counter; neighbors do not.
#[test]
fn two_bit_indexes_pc_mod_k() {
    let mut bp = TwoBitPredictor::new(16);

    train(&mut bp, 0x1000, false, 4);
    assert!(!bp.predict(0x1000 + 16), "same counter 16 apart");
    assert!(bp.predict(0x1001), "neighboring PC uses a different counter");
}

/// A zero table size falls back to 16 entries.
#[test]
fn two_bit_zero_size_defaults() {
    let bp = TwoBitPredictor::new(0);
    assert_eq!(bp.name(), "2-Bit (K=16)");
}

// ══════════════════════════════════════════════════════════
// 4. Perceptron predictor
// ══════════════════════════════════════════════════════════

/// All-zero weights output zero, which predicts taken.
#[test]
fn perceptron_initial_prediction_is_taken() {
    let bp = PerceptronPredictor::new();
    assert!(bp.predict(0x1000));
}

/// The perceptron learns a constant direction and can relearn the opposite.
#[test]
fn perceptron_learns_and_relearns() {
    let mut bp = PerceptronPredictor::new();
    let pc = 0x1000;

    train(&mut bp, pc, false, 100);
    assert!(!bp.predict(pc), "should learn not-taken");

    train(&mut bp, pc, true, 200);
    assert!(bp.predict(pc), "should relearn taken");
}
