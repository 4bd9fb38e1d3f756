//! Branch direction predictor trait.

/// Capability set every branch direction predictor implements.
///
/// `predict` is consulted in Decode for conditional branches; `update` is
/// called from Execute with the architecturally resolved outcome, so the
/// predictor never trains on speculation.
pub trait DirectionPredictor {
    /// Predicts whether the branch at `pc` will be taken.
    fn predict(&self, pc: u64) -> bool;

    /// Trains the predictor with the resolved direction and target.
    fn update(&mut self, pc: u64, taken: bool, target_pc: u64);

    /// Display name used in the statistics report.
    fn name(&self) -> String;
}
