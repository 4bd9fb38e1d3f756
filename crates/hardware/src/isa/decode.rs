//! RISC-V instruction decoder.
//!
//! This module turns a raw 32-bit instruction word plus a register file
//! snapshot into a fully populated pipeline operation. It extracts opcode,
//! register indices, and function codes, assembles the sign-extended
//! immediate for every format (R, I, S, SB, U, UJ), and materializes the
//! operand values the executor will consume. Unknown encodings fail with a
//! fault carrying the offending fields.

use crate::common::Fault;
use crate::core::pipeline::op::PipeOp;
use crate::core::reg::RegisterFile;
use crate::isa::disasm;
use crate::isa::kind::InstKind;
use crate::isa::rv64i::{funct3 as i_funct3, funct7 as i_funct7, opcodes};
use crate::isa::rv64m::{funct3 as m_funct3, opcodes as m_opcodes};
use crate::isa::abi;

/// Total width of an uncompressed instruction in bits.
const INSTRUCTION_WIDTH: u32 = 32;

/// Low-two-bits value marking an uncompressed (32-bit) encoding.
const UNCOMPRESSED_LOW_BITS: u32 = 0x3;

/// Shift-amount mask for 64-bit shift immediates (low 6 bits).
const SHAMT_MASK_64: i64 = 0x3F;

/// High immediate bits distinguishing SRLI (0x00) from SRAI (0x10).
const SHIFT_FUNCT6_SRLI: u32 = 0x00;
/// High immediate bits marking SRAI.
const SHIFT_FUNCT6_SRAI: u32 = 0x10;

/// rs2-field value of the SRET encoding.
const SRET_RS2: usize = 0x02;

/// Trait for extracting instruction fields from a raw encoding.
pub trait InstructionBits {
    /// Extracts the major opcode (bits 6-0).
    fn opcode(&self) -> u32;
    /// Extracts the destination register index (bits 11-7).
    fn rd(&self) -> usize;
    /// Extracts the first source register index (bits 19-15).
    fn rs1(&self) -> usize;
    /// Extracts the second source register index (bits 24-20).
    fn rs2(&self) -> usize;
    /// Extracts the funct3 field (bits 14-12).
    fn funct3(&self) -> u32;
    /// Extracts the funct7 field (bits 31-25).
    fn funct7(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & 0x7F
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> 7) & 0x1F) as usize
    }

    #[inline(always)]
    fn rs1(&self) -> usize {
        ((self >> 15) & 0x1F) as usize
    }

    #[inline(always)]
    fn rs2(&self) -> usize {
        ((self >> 20) & 0x1F) as usize
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> 12) & 0x7
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> 25) & 0x7F
    }
}

/// Decodes the immediate value for I-type instructions.
///
/// I-type format: `imm[11:0] | rs1 | funct3 | rd | opcode`.
/// Used for loads, JALR, and immediate arithmetic.
fn decode_i_type_imm(inst: u32) -> i64 {
    ((inst as i32) >> 20) as i64
}

/// Decodes the immediate value for S-type instructions.
///
/// S-type format: `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`.
fn decode_s_type_imm(inst: u32) -> i64 {
    let low = (inst >> 7) & 0x1F;
    let high = (inst >> 25) & 0x7F;
    sign_extend((high << 5) | low, 12)
}

/// Decodes the immediate value for SB-type (branch) instructions.
///
/// SB-type format: `imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode`.
/// The reconstructed value is an even byte offset.
fn decode_sb_type_imm(inst: u32) -> i64 {
    let bit_11 = (inst >> 7) & 0x1;
    let bits_4_1 = (inst >> 8) & 0xF;
    let bits_10_5 = (inst >> 25) & 0x3F;
    let bit_12 = (inst >> 31) & 0x1;

    let combined = (bit_12 << 12) | (bit_11 << 11) | (bits_10_5 << 5) | (bits_4_1 << 1);
    sign_extend(combined, 13)
}

/// Decodes the immediate value for U-type instructions.
///
/// U-type format: `imm[31:12] | rd | opcode`. The value is kept unshifted;
/// the executor applies the `<< 12` when computing the result.
fn decode_u_type_imm(inst: u32) -> i64 {
    ((inst as i32) >> 12) as i64
}

/// Decodes the immediate value for UJ-type (JAL) instructions.
///
/// UJ-type format: `imm[20] | imm[10:1] | imm[11] | imm[19:12] | rd | opcode`.
/// The reconstructed value is an even byte offset.
fn decode_uj_type_imm(inst: u32) -> i64 {
    let bits_19_12 = (inst >> 12) & 0xFF;
    let bit_11 = (inst >> 20) & 0x1;
    let bits_10_1 = (inst >> 21) & 0x3FF;
    let bit_20 = (inst >> 31) & 0x1;

    let combined = (bit_20 << 20) | (bits_19_12 << 12) | (bit_11 << 11) | (bits_10_1 << 1);
    sign_extend(combined, 21)
}

/// Sign extends a value of `bits` width to a 64-bit signed integer.
fn sign_extend(val: u32, bits: u32) -> i64 {
    let shift = INSTRUCTION_WIDTH - bits;
    (((val as i32) << shift) >> shift) as i64
}

/// Builds an illegal-instruction fault carrying the offending fields.
fn illegal(inst: u32) -> Fault {
    Fault::IllegalInstruction {
        inst,
        opcode: inst.opcode(),
        funct3: inst.funct3(),
        funct7: inst.funct7(),
    }
}

/// Decodes `op.inst` into a complete pipeline operation.
///
/// Populates the kind tag, source/destination register indices, the
/// materialized operand values (register reads or immediates), the
/// sign-extended offset, and the disassembly text. Compressed (16-bit)
/// encodings and unrecognized opcode/funct combinations fail.
///
/// Decoding is repeatable: an op held in the decode slot across a stall is
/// decoded again next cycle so its operands pick up fresh register values.
pub fn decode_op(op: &mut PipeOp, regs: &RegisterFile) -> Result<(), Fault> {
    let inst = op.inst;

    if inst & 0x3 != UNCOMPRESSED_LOW_BITS {
        return Err(Fault::CompressedInstruction(inst));
    }

    let funct3 = inst.funct3();
    let funct7 = inst.funct7();
    let rd = inst.rd();
    let rs1 = inst.rs1();
    let rs2 = inst.rs2();

    match inst.opcode() {
        opcodes::OP_REG => {
            op.op1 = regs.read(rs1) as i64;
            op.op2 = regs.read(rs2) as i64;
            op.rs1 = rs1;
            op.rs2 = rs2;
            op.dest_reg = rd;
            op.kind = if funct7 == m_opcodes::M_EXTENSION {
                match funct3 {
                    m_funct3::MUL => InstKind::Mul,
                    m_funct3::DIV => InstKind::Div,
                    m_funct3::REM => InstKind::Rem,
                    _ => return Err(illegal(inst)),
                }
            } else {
                match (funct3, funct7) {
                    (i_funct3::ADD_SUB, i_funct7::DEFAULT) => InstKind::Add,
                    (i_funct3::ADD_SUB, i_funct7::ALT) => InstKind::Sub,
                    (i_funct3::SLL, i_funct7::DEFAULT) => InstKind::Sll,
                    (i_funct3::SLT, i_funct7::DEFAULT) => InstKind::Slt,
                    (i_funct3::SLTU, i_funct7::DEFAULT) => InstKind::Sltu,
                    (i_funct3::XOR, i_funct7::DEFAULT) => InstKind::Xor,
                    (i_funct3::SRL_SRA, i_funct7::DEFAULT) => InstKind::Srl,
                    (i_funct3::SRL_SRA, i_funct7::ALT) => InstKind::Sra,
                    (i_funct3::OR, i_funct7::DEFAULT) => InstKind::Or,
                    (i_funct3::AND, i_funct7::DEFAULT) => InstKind::And,
                    _ => return Err(illegal(inst)),
                }
            };
        }
        opcodes::OP_IMM => {
            op.op1 = regs.read(rs1) as i64;
            op.rs1 = rs1;
            op.op2 = decode_i_type_imm(inst);
            op.dest_reg = rd;
            op.kind = match funct3 {
                i_funct3::ADD_SUB => InstKind::Addi,
                i_funct3::SLT => InstKind::Slti,
                i_funct3::SLTU => InstKind::Sltiu,
                i_funct3::XOR => InstKind::Xori,
                i_funct3::OR => InstKind::Ori,
                i_funct3::AND => InstKind::Andi,
                i_funct3::SLL => {
                    op.op2 &= SHAMT_MASK_64;
                    InstKind::Slli
                }
                i_funct3::SRL_SRA => {
                    op.op2 &= SHAMT_MASK_64;
                    match (inst >> 26) & 0x3F {
                        SHIFT_FUNCT6_SRLI => InstKind::Srli,
                        SHIFT_FUNCT6_SRAI => InstKind::Srai,
                        _ => return Err(illegal(inst)),
                    }
                }
                _ => return Err(illegal(inst)),
            };
        }
        opcodes::OP_LUI => {
            op.op1 = decode_u_type_imm(inst);
            op.op2 = 0;
            op.offset = op.op1;
            op.dest_reg = rd;
            op.kind = InstKind::Lui;
        }
        opcodes::OP_AUIPC => {
            op.op1 = decode_u_type_imm(inst);
            op.op2 = 0;
            op.offset = op.op1;
            op.dest_reg = rd;
            op.kind = InstKind::Auipc;
        }
        opcodes::OP_JAL => {
            op.op1 = decode_uj_type_imm(inst);
            op.op2 = 0;
            op.offset = op.op1;
            op.dest_reg = rd;
            op.kind = InstKind::Jal;
        }
        opcodes::OP_JALR => {
            op.op1 = regs.read(rs1) as i64;
            op.rs1 = rs1;
            op.op2 = decode_i_type_imm(inst);
            op.dest_reg = rd;
            op.kind = InstKind::Jalr;
        }
        opcodes::OP_BRANCH => {
            op.op1 = regs.read(rs1) as i64;
            op.op2 = regs.read(rs2) as i64;
            op.rs1 = rs1;
            op.rs2 = rs2;
            op.offset = decode_sb_type_imm(inst);
            op.kind = match funct3 {
                i_funct3::BEQ => InstKind::Beq,
                i_funct3::BNE => InstKind::Bne,
                i_funct3::BLT => InstKind::Blt,
                i_funct3::BGE => InstKind::Bge,
                i_funct3::BLTU => InstKind::Bltu,
                i_funct3::BGEU => InstKind::Bgeu,
                _ => return Err(illegal(inst)),
            };
        }
        opcodes::OP_STORE => {
            op.op1 = regs.read(rs1) as i64;
            op.op2 = regs.read(rs2) as i64;
            op.rs1 = rs1;
            op.rs2 = rs2;
            op.offset = decode_s_type_imm(inst);
            op.kind = match funct3 {
                i_funct3::SB => InstKind::Sb,
                i_funct3::SH => InstKind::Sh,
                i_funct3::SW => InstKind::Sw,
                i_funct3::SD => InstKind::Sd,
                _ => return Err(illegal(inst)),
            };
        }
        opcodes::OP_LOAD => {
            op.op1 = regs.read(rs1) as i64;
            op.rs1 = rs1;
            op.op2 = decode_i_type_imm(inst);
            op.offset = op.op2;
            op.dest_reg = rd;
            op.kind = match funct3 {
                i_funct3::LB => InstKind::Lb,
                i_funct3::LH => InstKind::Lh,
                i_funct3::LW => InstKind::Lw,
                i_funct3::LD => InstKind::Ld,
                i_funct3::LBU => InstKind::Lbu,
                i_funct3::LHU => InstKind::Lhu,
                i_funct3::LWU => InstKind::Lwu,
                _ => return Err(illegal(inst)),
            };
        }
        opcodes::OP_SYSTEM => {
            if funct3 == 0 && funct7 == i_funct7::DEFAULT && rs2 == 0 {
                // ECALL: the syscall number travels in a7, the argument in a0,
                // and the result returns through a0 via the write-back path.
                op.op1 = regs.read(abi::REG_A0) as i64;
                op.op2 = regs.read(abi::REG_A7) as i64;
                op.rs1 = abi::REG_A0;
                op.rs2 = abi::REG_A7;
                op.dest_reg = abi::REG_A0;
                op.kind = InstKind::Ecall;
            } else if funct3 == 0 && funct7 == i_funct7::SRET && rs2 == SRET_RS2 {
                op.kind = InstKind::Sret;
            } else {
                return Err(illegal(inst));
            }
        }
        opcodes::OP_IMM_32 => {
            op.op1 = regs.read(rs1) as i64;
            op.rs1 = rs1;
            op.op2 = decode_i_type_imm(inst);
            op.dest_reg = rd;
            op.kind = match funct3 {
                i_funct3::ADD_SUB => InstKind::Addiw,
                i_funct3::SLL => InstKind::Slliw,
                i_funct3::SRL_SRA => match funct7 {
                    i_funct7::DEFAULT => InstKind::Srliw,
                    i_funct7::ALT => InstKind::Sraiw,
                    _ => return Err(illegal(inst)),
                },
                _ => return Err(illegal(inst)),
            };
        }
        opcodes::OP_REG_32 => {
            op.op1 = regs.read(rs1) as i64;
            op.op2 = regs.read(rs2) as i64;
            op.rs1 = rs1;
            op.rs2 = rs2;
            op.dest_reg = rd;
            op.kind = match (funct3, funct7) {
                (i_funct3::ADD_SUB, i_funct7::DEFAULT) => InstKind::Addw,
                (i_funct3::ADD_SUB, i_funct7::ALT) => InstKind::Subw,
                (i_funct3::SLL, i_funct7::DEFAULT) => InstKind::Sllw,
                (i_funct3::SRL_SRA, i_funct7::DEFAULT) => InstKind::Srlw,
                (i_funct3::SRL_SRA, i_funct7::ALT) => InstKind::Sraw,
                _ => return Err(illegal(inst)),
            };
        }
        _ => return Err(illegal(inst)),
    }

    op.disasm = disasm::render(op);
    Ok(())
}
