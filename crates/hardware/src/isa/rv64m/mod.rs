//! RV64 multiply/divide extension encoding constants.

/// funct3 values for M-extension instructions.
pub mod funct3;
/// funct7 marker for M-extension instructions.
pub mod opcodes;
