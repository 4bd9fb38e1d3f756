//! The pipeline operation record.
//!
//! One `PipeOp` is allocated per fetched instruction and travels forward
//! through the pipeline slots; each slot owns at most one op at a time and
//! forwarding is a move.

use crate::isa::kind::InstKind;

/// A decoded operation flowing through the pipeline.
///
/// Fetch fills the pc and raw word; Decode populates kind, registers, and
/// operands; Execute fills the result, memory flags, and branch outcome.
#[derive(Clone, Debug, Default)]
pub struct PipeOp {
    /// Address this instruction was fetched from.
    pub pc: u64,
    /// Raw 32-bit instruction word.
    pub inst: u32,
    /// Instruction length in bytes (always 4; compressed encodings are rejected).
    pub inst_len: u32,

    /// Operation tag set by the decoder.
    pub kind: InstKind,
    /// First source register index (0 when unused).
    pub rs1: usize,
    /// Second source register index (0 when unused).
    pub rs2: usize,
    /// Destination register index (0 suppresses the write).
    pub dest_reg: usize,
    /// First materialized operand (register value or immediate).
    pub op1: i64,
    /// Second materialized operand (register value or immediate).
    pub op2: i64,
    /// Sign-extended immediate/offset for branches, memory, and U-types.
    pub offset: i64,
    /// Disassembly text recorded into the execution history.
    pub disasm: String,

    /// Computed result, or the effective address for memory operations.
    pub out: i64,
    /// This op reads memory in the Memory stage.
    pub read_mem: bool,
    /// This op writes memory in the Memory stage.
    pub write_mem: bool,
    /// Sign-extend the loaded value to 64 bits.
    pub read_sign_ext: bool,
    /// Memory access width in bytes (1, 2, 4, or 8).
    pub mem_len: u32,
    /// The branch/jump was resolved taken.
    pub branch: bool,
    /// Resolved next PC (sequential `pc + 4` when not taken).
    pub jump_pc: u64,
    /// Direction the predictor chose in Decode.
    pub predicted_taken: bool,
}

impl PipeOp {
    /// Creates a fresh op for the instruction word fetched at `pc`.
    pub fn fetched(pc: u64, inst: u32) -> Self {
        Self {
            pc,
            inst,
            inst_len: 4,
            ..Self::default()
        }
    }
}
