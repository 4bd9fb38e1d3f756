//! funct3 field values for the base integer instruction set.

/// ADD/SUB (OP_REG) and ADDI (OP_IMM).
pub const ADD_SUB: u32 = 0x0;
/// Shift left logical.
pub const SLL: u32 = 0x1;
/// Set less than (signed).
pub const SLT: u32 = 0x2;
/// Set less than (unsigned).
pub const SLTU: u32 = 0x3;
/// Bitwise XOR.
pub const XOR: u32 = 0x4;
/// Shift right logical/arithmetic (disambiguated by funct7).
pub const SRL_SRA: u32 = 0x5;
/// Bitwise OR.
pub const OR: u32 = 0x6;
/// Bitwise AND.
pub const AND: u32 = 0x7;

/// Load byte (sign-extended).
pub const LB: u32 = 0x0;
/// Load halfword (sign-extended).
pub const LH: u32 = 0x1;
/// Load word (sign-extended).
pub const LW: u32 = 0x2;
/// Load doubleword.
pub const LD: u32 = 0x3;
/// Load byte (zero-extended).
pub const LBU: u32 = 0x4;
/// Load halfword (zero-extended).
pub const LHU: u32 = 0x5;
/// Load word (zero-extended).
pub const LWU: u32 = 0x6;

/// Store byte.
pub const SB: u32 = 0x0;
/// Store halfword.
pub const SH: u32 = 0x1;
/// Store word.
pub const SW: u32 = 0x2;
/// Store doubleword.
pub const SD: u32 = 0x3;

/// Branch if equal.
pub const BEQ: u32 = 0x0;
/// Branch if not equal.
pub const BNE: u32 = 0x1;
/// Branch if less than (signed).
pub const BLT: u32 = 0x4;
/// Branch if greater or equal (signed).
pub const BGE: u32 = 0x5;
/// Branch if less than (unsigned).
pub const BLTU: u32 = 0x6;
/// Branch if greater or equal (unsigned).
pub const BGEU: u32 = 0x7;
