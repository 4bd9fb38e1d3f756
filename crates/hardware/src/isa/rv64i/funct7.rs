//! funct7 field values for the base integer instruction set.

/// Default encoding (ADD, SRL, SLL, ...).
pub const DEFAULT: u32 = 0x00;

/// Alternate encoding (SUB, SRA).
pub const ALT: u32 = 0x20;

/// SRET encoding inside OP_SYSTEM (with rs2 field = 0x02).
pub const SRET: u32 = 0x08;
