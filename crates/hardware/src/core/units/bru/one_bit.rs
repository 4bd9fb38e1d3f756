//! One-bit branch predictor.
//!
//! A single global bit: the next prediction is whatever the last resolved
//! branch did. No per-PC state.

use super::DirectionPredictor;

/// One-bit predictor state.
#[derive(Default)]
pub struct OneBitPredictor {
    last_taken: bool,
}

impl OneBitPredictor {
    /// Creates a one-bit predictor starting at not-taken.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DirectionPredictor for OneBitPredictor {
    /// Predicts the direction of the last resolved branch.
    fn predict(&self, _pc: u64) -> bool {
        self.last_taken
    }

    /// Records the resolved direction as the new global state.
    fn update(&mut self, _pc: u64, taken: bool, _target_pc: u64) {
        self.last_taken = taken;
    }

    fn name(&self) -> String {
        "1-Bit".to_string()
    }
}
