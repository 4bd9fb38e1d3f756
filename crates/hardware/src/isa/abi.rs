//! RISC-V integer ABI register assignments.
//!
//! Defines the architectural indices of the ABI-named registers and the
//! name table used by the disassembler and the CPU state dump.

/// Hard-wired zero register.
pub const REG_ZERO: usize = 0;
/// Return address.
pub const REG_RA: usize = 1;
/// Stack pointer.
pub const REG_SP: usize = 2;
/// Global pointer.
pub const REG_GP: usize = 3;
/// Thread pointer.
pub const REG_TP: usize = 4;
/// First argument / return value.
pub const REG_A0: usize = 10;
/// Second argument.
pub const REG_A1: usize = 11;
/// Syscall number register.
pub const REG_A7: usize = 17;

/// ABI names for the 32 integer registers, indexed by register number.
pub const REG_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];
