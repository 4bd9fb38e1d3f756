//! Static branch predictors.
//!
//! Stateless policies: one always predicts fall-through, the other always
//! predicts the branch taken. Updates are ignored.

use super::DirectionPredictor;

/// Predicts every conditional branch as not taken.
pub struct AlwaysNotTakenPredictor;

impl DirectionPredictor for AlwaysNotTakenPredictor {
    fn predict(&self, _pc: u64) -> bool {
        false
    }

    fn update(&mut self, _pc: u64, _taken: bool, _target_pc: u64) {}

    fn name(&self) -> String {
        "Always Not Taken".to_string()
    }
}

/// Predicts every conditional branch as taken.
pub struct AlwaysTakenPredictor;

impl DirectionPredictor for AlwaysTakenPredictor {
    fn predict(&self, _pc: u64) -> bool {
        true
    }

    fn update(&mut self, _pc: u64, _taken: bool, _target_pc: u64) {}

    fn name(&self) -> String {
        "Always Taken".to_string()
    }
}
