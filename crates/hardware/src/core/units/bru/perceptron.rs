//! Perceptron branch predictor.
//!
//! Uses a single-layer perceptron per table entry instead of saturating
//! counters: each entry holds a bias weight plus one weight per global
//! history bit, and the prediction is the sign of the dot product between
//! the weights and the history vector.

use super::DirectionPredictor;

/// Global history length (bits of the history vector).
const HISTORY_LENGTH: usize = 16;
/// Log2 of the weight table size.
const TABLE_BITS: usize = 8;
/// Coefficient used to calculate the training threshold.
const THETA_COEFF: f64 = 1.93;
/// Bias used to calculate the training threshold.
const THETA_BIAS: f64 = 14.0;

/// Perceptron predictor state.
pub struct PerceptronPredictor {
    /// Global history register.
    ghr: u64,
    /// Table of weights (flattened; each row is bias + history weights).
    table: Vec<i8>,
    /// Mask for indexing the table.
    table_mask: usize,
    /// Size of a single row in the table (history length + bias).
    row_size: usize,
    /// Training threshold (theta).
    threshold: i32,
}

impl PerceptronPredictor {
    /// Creates a perceptron predictor with all weights zeroed.
    pub fn new() -> Self {
        let table_entries = 1 << TABLE_BITS;
        let row_size = HISTORY_LENGTH + 1;
        Self {
            ghr: 0,
            table: vec![0; table_entries * row_size],
            table_mask: table_entries - 1,
            row_size,
            threshold: (THETA_COEFF * (HISTORY_LENGTH as f64) + THETA_BIAS) as i32,
        }
    }

    /// Calculates the index into the weight table using a PC/GHR hash.
    fn index(&self, pc: u64) -> usize {
        let pc_idx = (pc >> 2) as usize & self.table_mask;
        let hist_idx = (self.ghr as usize) & self.table_mask;
        pc_idx ^ hist_idx
    }

    /// Computes the perceptron output (dot product) for a given row.
    fn output(&self, row_idx: usize) -> i32 {
        let base = row_idx * self.row_size;
        let mut y = self.table[base] as i32;
        for i in 0..HISTORY_LENGTH {
            let bit = if (self.ghr >> i) & 1 != 0 { 1 } else { -1 };
            y += (self.table[base + 1 + i] as i32) * bit;
        }
        y
    }
}

impl Default for PerceptronPredictor {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamps a weight value to the 8-bit signed integer range.
fn clamp_weight(v: i32) -> i8 {
    v.clamp(i8::MIN as i32, i8::MAX as i32) as i8
}

impl DirectionPredictor for PerceptronPredictor {
    /// Predicts taken when the perceptron output is non-negative.
    fn predict(&self, pc: u64) -> bool {
        self.output(self.index(pc)) >= 0
    }

    /// Trains the weights when mispredicted or below the confidence threshold,
    /// then shifts the outcome into the global history register.
    fn update(&mut self, pc: u64, taken: bool, _target_pc: u64) {
        let idx = self.index(pc);
        let y = self.output(idx);
        let t = if taken { 1 } else { -1 };

        if y.abs() <= self.threshold || (y >= 0) != taken {
            let base = idx * self.row_size;
            self.table[base] = clamp_weight(self.table[base] as i32 + t);
            for i in 0..HISTORY_LENGTH {
                let x = if (self.ghr >> i) & 1 != 0 { 1 } else { -1 };
                let w_idx = base + 1 + i;
                self.table[w_idx] = clamp_weight(self.table[w_idx] as i32 + t * x);
            }
        }

        self.ghr =
            ((self.ghr << 1) | u64::from(taken)) & ((1u64 << HISTORY_LENGTH) - 1);
    }

    fn name(&self) -> String {
        "Perceptron".to_string()
    }
}
