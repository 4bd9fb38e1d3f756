//! Two-bit saturating counter predictor.
//!
//! A branch history table of K two-bit counters indexed by `pc mod K`.
//! Counters start at 2 (weakly taken); a counter of 2 or 3 predicts taken.
//! Taken outcomes increment (saturating at 3), not-taken decrement
//! (saturating at 0).

use super::DirectionPredictor;

/// Counter value at or above which the branch is predicted taken.
const TAKEN_THRESHOLD: u8 = 2;
/// Saturation ceiling (strongly taken).
const COUNTER_MAX: u8 = 3;
/// Initial counter state (weakly taken).
const INITIAL_STATE: u8 = 2;
/// Table size used when the configured size is zero.
const DEFAULT_ENTRIES: usize = 16;

/// Two-bit predictor state.
pub struct TwoBitPredictor {
    bht: Vec<u8>,
}

impl TwoBitPredictor {
    /// Creates a two-bit predictor with `entries` counters (0 falls back to 16).
    pub fn new(entries: usize) -> Self {
        let entries = if entries == 0 { DEFAULT_ENTRIES } else { entries };
        Self {
            bht: vec![INITIAL_STATE; entries],
        }
    }

    /// Table index for the branch at `pc`.
    fn index(&self, pc: u64) -> usize {
        (pc % self.bht.len() as u64) as usize
    }
}

impl DirectionPredictor for TwoBitPredictor {
    /// Predicts taken when the counter is in a taken state (2 or 3).
    fn predict(&self, pc: u64) -> bool {
        self.bht[self.index(pc)] >= TAKEN_THRESHOLD
    }

    /// Moves the counter toward the resolved direction, saturating at the bounds.
    fn update(&mut self, pc: u64, taken: bool, _target_pc: u64) {
        let idx = self.index(pc);
        let state = self.bht[idx];
        self.bht[idx] = if taken {
            state.min(COUNTER_MAX - 1) + 1
        } else {
            state.saturating_sub(1)
        };
    }

    fn name(&self) -> String {
        format!("2-Bit (K={})", self.bht.len())
    }
}
