//! RISC-V Base Integer (I) Opcodes.
//!
//! Defines the major opcodes (bits 6-0) for the base integer instruction set.

/// Load instructions (LB, LH, LW, LD, LBU, LHU, LWU).
pub const OP_LOAD: u32 = 0x03;

/// Immediate arithmetic instructions (ADDI, ANDI, SLLI, etc.).
pub const OP_IMM: u32 = 0x13;

/// Add Upper Immediate to PC (AUIPC).
pub const OP_AUIPC: u32 = 0x17;

/// 32-bit immediate arithmetic (ADDIW, SLLIW, etc.) - RV64 only.
pub const OP_IMM_32: u32 = 0x1B;

/// Store instructions (SB, SH, SW, SD).
pub const OP_STORE: u32 = 0x23;

/// Register-register arithmetic (ADD, SUB, SLL, etc.).
pub const OP_REG: u32 = 0x33;

/// Load Upper Immediate (LUI).
pub const OP_LUI: u32 = 0x37;

/// 32-bit register-register arithmetic (ADDW, SUBW, etc.) - RV64 only.
pub const OP_REG_32: u32 = 0x3B;

/// Conditional branch instructions (BEQ, BNE, etc.).
pub const OP_BRANCH: u32 = 0x63;

/// Jump and Link Register (JALR).
pub const OP_JALR: u32 = 0x67;

/// Jump and Link (JAL).
pub const OP_JAL: u32 = 0x6F;

/// System instructions (ECALL, SRET).
pub const OP_SYSTEM: u32 = 0x73;
