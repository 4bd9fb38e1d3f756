//! CPU core.
//!
//! Contains the five-stage pipeline, the integer register file, and the
//! branch prediction unit.

/// The five-stage pipeline controller and its stages.
pub mod pipeline;
/// Integer register file.
pub mod reg;
/// Functional units (branch prediction).
pub mod units;

pub use pipeline::Pipeline;
pub use reg::RegisterFile;
