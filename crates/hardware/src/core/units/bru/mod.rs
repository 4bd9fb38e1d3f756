//! Branch prediction unit (BRU).
//!
//! This module contains the branch direction predictors consulted by the
//! Decode stage and trained by the Execute stage with resolved outcomes.
//! The predictor never observes speculative updates.

pub use self::predictor::DirectionPredictor;

/// Predictor trait shared by every implementation.
pub mod predictor;

/// Single global one-bit predictor.
pub mod one_bit;

/// Global-history perceptron predictor.
pub mod perceptron;

/// Stateless always-taken / always-not-taken predictors.
pub mod static_bp;

/// Table of two-bit saturating counters.
pub mod two_bit;

use self::{
    one_bit::OneBitPredictor,
    perceptron::PerceptronPredictor,
    static_bp::{AlwaysNotTakenPredictor, AlwaysTakenPredictor},
    two_bit::TwoBitPredictor,
};
use crate::config::{Config, PredictorKind};

/// Enum wrapper for static dispatch of direction predictors.
/// This avoids vtable lookups in the per-branch decode path.
pub enum PredictorUnit {
    NotTaken(AlwaysNotTakenPredictor),
    Taken(AlwaysTakenPredictor),
    OneBit(OneBitPredictor),
    TwoBit(TwoBitPredictor),
    Perceptron(PerceptronPredictor),
}

impl PredictorUnit {
    /// Creates the predictor selected by the configuration.
    pub fn new(config: &Config) -> Self {
        match config.branch_predictor {
            PredictorKind::NotTaken => Self::NotTaken(AlwaysNotTakenPredictor),
            PredictorKind::Taken => Self::Taken(AlwaysTakenPredictor),
            PredictorKind::OneBit => Self::OneBit(OneBitPredictor::new()),
            PredictorKind::TwoBit => Self::TwoBit(TwoBitPredictor::new(config.bht_size)),
            PredictorKind::Perceptron => Self::Perceptron(PerceptronPredictor::new()),
        }
    }
}

impl DirectionPredictor for PredictorUnit {
    /// Predicts whether the branch at `pc` will be taken.
    #[inline(always)]
    fn predict(&self, pc: u64) -> bool {
        match self {
            Self::NotTaken(bp) => bp.predict(pc),
            Self::Taken(bp) => bp.predict(pc),
            Self::OneBit(bp) => bp.predict(pc),
            Self::TwoBit(bp) => bp.predict(pc),
            Self::Perceptron(bp) => bp.predict(pc),
        }
    }

    /// Trains the predictor with the resolved outcome of the branch at `pc`.
    #[inline(always)]
    fn update(&mut self, pc: u64, taken: bool, target_pc: u64) {
        match self {
            Self::NotTaken(bp) => bp.update(pc, taken, target_pc),
            Self::Taken(bp) => bp.update(pc, taken, target_pc),
            Self::OneBit(bp) => bp.update(pc, taken, target_pc),
            Self::TwoBit(bp) => bp.update(pc, taken, target_pc),
            Self::Perceptron(bp) => bp.update(pc, taken, target_pc),
        }
    }

    /// Display name used in the statistics report.
    fn name(&self) -> String {
        match self {
            Self::NotTaken(bp) => bp.name(),
            Self::Taken(bp) => bp.name(),
            Self::OneBit(bp) => bp.name(),
            Self::TwoBit(bp) => bp.name(),
            Self::Perceptron(bp) => bp.name(),
        }
    }
}
