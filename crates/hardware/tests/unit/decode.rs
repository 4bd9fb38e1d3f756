//! Instruction Decoder Tests.
//!
//! Verifies field extraction, operand materialization, immediate
//! sign-extension for every format, the ECALL/SRET conventions, and the
//! rejection of compressed and unknown encodings.

use rvfive_core::common::Fault;
use rvfive_core::core::pipeline::op::PipeOp;
use rvfive_core::core::reg::RegisterFile;
use rvfive_core::isa::decode::decode_op;
use rvfive_core::isa::kind::InstKind;

use crate::common::asm;

/// Decodes one instruction against the given register file.
fn decode(inst: u32, regs: &RegisterFile) -> Result<PipeOp, Fault> {
    let mut op = PipeOp::fetched(0x1000, inst);
    decode_op(&mut op, regs)?;
    Ok(op)
}

// ══════════════════════════════════════════════════════════
// 1. Register-register and immediate forms
// ══════════════════════════════════════════════════════════

/// `add x5, x6, x7` materializes both register operands.
#[test]
fn add_decodes_registers_and_operands() {
    let mut regs = RegisterFile::new();
    regs.write(6, 3);
    regs.write(7, 4);

    let op = decode(asm::add(5, 6, 7), &regs).expect("add must decode");

    assert_eq!(op.kind, InstKind::Add);
    assert_eq!((op.rs1, op.rs2, op.dest_reg), (6, 7, 5));
    assert_eq!((op.op1, op.op2), (3, 4));
    assert_eq!(op.disasm, "add t0,t1,t2");
}

/// `addi` sign-extends a negative 12-bit immediate.
#[test]
fn addi_sign_extends_immediate() {
    let regs = RegisterFile::new();
    let op = decode(asm::addi(5, 0, -2048), &regs).expect("addi must decode");

    assert_eq!(op.kind, InstKind::Addi);
    assert_eq!(op.op2, -2048);
}

/// Shift immediates are masked to the low six bits at decode time.
#[test]
fn slli_keeps_six_bit_shift_amount() {
    let regs = RegisterFile::new();
    let op = decode(asm::encode_i(0x13, 5, 0x1, 6, 63), &regs).expect("slli must decode");

    assert_eq!(op.kind, InstKind::Slli);
    assert_eq!(op.op2, 63);
}

/// M-extension encodings under OP_REG decode via funct7 = 1.
#[test]
fn mul_decodes_as_m_extension() {
    let regs = RegisterFile::new();
    let op = decode(asm::mul(3, 1, 2), &regs).expect("mul must decode");
    assert_eq!(op.kind, InstKind::Mul);
}

// ══════════════════════════════════════════════════════════
// 2. Branch, jump, and memory formats
// ══════════════════════════════════════════════════════════

/// Branch offsets reassemble from the scattered SB-type fields, including
/// negative offsets.
#[test]
fn branch_offset_reassembles() {
    let regs = RegisterFile::new();

    let fwd = decode(asm::beq(1, 2, 16), &regs).expect("beq must decode");
    assert_eq!(fwd.kind, InstKind::Beq);
    assert_eq!(fwd.offset, 16);

    let back = decode(asm::bne(1, 2, -8), &regs).expect("bne must decode");
    assert_eq!(back.offset, -8);
}

/// JAL offsets reassemble from the UJ-type fields.
#[test]
fn jal_offset_reassembles() {
    let regs = RegisterFile::new();

    let fwd = decode(asm::jal(1, 2048), &regs).expect("jal must decode");
    assert_eq!(fwd.kind, InstKind::Jal);
    assert_eq!(fwd.op1, 2048);

    let back = decode(asm::jal(1, -4), &regs).expect("jal must decode");
    assert_eq!(back.op1, -4);
}

/// Loads carry the base register value and the I-type offset.
#[test]
fn load_decodes_base_and_offset() {
    let mut regs = RegisterFile::new();
    regs.write(6, 0x100);

    let op = decode(asm::lw(5, 6, -4), &regs).expect("lw must decode");
    assert_eq!(op.kind, InstKind::Lw);
    assert_eq!(op.op1, 0x100);
    assert_eq!(op.offset, -4);
    assert_eq!(op.dest_reg, 5);
}

/// Stores carry both register values and the S-type offset.
#[test]
fn store_decodes_both_sources() {
    let mut regs = RegisterFile::new();
    regs.write(6, 0x100);
    regs.write(7, 0xAB);

    let op = decode(asm::sd(7, 6, 24), &regs).expect("sd must decode");
    assert_eq!(op.kind, InstKind::Sd);
    assert_eq!((op.op1, op.op2), (0x100, 0xAB));
    assert_eq!(op.offset, 24);
}

// ══════════════════════════════════════════════════════════
// 3. System encodings
// ══════════════════════════════════════════════════════════

/// ECALL reads a0/a7 and targets a0 for write-back.
#[test]
fn ecall_follows_register_conventions() {
    let mut regs = RegisterFile::new();
    regs.write(10, 5);
    regs.write(17, 93);

    let op = decode(asm::ecall(), &regs).expect("ecall must decode");
    assert_eq!(op.kind, InstKind::Ecall);
    assert_eq!((op.op1, op.op2), (5, 93));
    assert_eq!((op.rs1, op.rs2, op.dest_reg), (10, 17, 10));
}

/// SRET (0x10200073) decodes with no destination.
#[test]
fn sret_decodes() {
    let regs = RegisterFile::new();
    let op = decode(0x1020_0073, &regs).expect("sret must decode");
    assert_eq!(op.kind, InstKind::Sret);
    assert_eq!(op.dest_reg, 0);
}

/// Any other OP_SYSTEM encoding (here EBREAK) is rejected.
#[test]
fn ebreak_is_rejected() {
    let regs = RegisterFile::new();
    let err = decode(0x0010_0073, &regs).expect_err("ebreak must not decode");
    assert!(matches!(err, Fault::IllegalInstruction { .. }));
}

// ══════════════════════════════════════════════════════════
// 4. Rejected encodings
// ══════════════════════════════════════════════════════════

/// A 16-bit encoding (low bits != 11) is rejected as compressed.
#[test]
fn compressed_encoding_is_rejected() {
    let regs = RegisterFile::new();
    let err = decode(0x0000_4501, &regs).expect_err("compressed must not decode");
    assert!(matches!(err, Fault::CompressedInstruction(_)));
}

/// Unknown opcodes fail with the offending fields attached.
#[test]
fn unknown_opcode_carries_fields() {
    let regs = RegisterFile::new();
    let inst = 0x0000_002B;
    let err = decode(inst, &regs).expect_err("unknown opcode must not decode");

    match err {
        Fault::IllegalInstruction { inst: i, opcode, .. } => {
            assert_eq!(i, inst);
            assert_eq!(opcode, 0x2B);
        }
        other => panic!("expected IllegalInstruction, got {:?}", other),
    }
}

/// A bad funct7 under OP_REG is rejected.
#[test]
fn bad_funct7_is_rejected() {
    let regs = RegisterFile::new();
    let inst = asm::encode_r(0x33, 5, 0x0, 6, 7, 0x11);
    assert!(decode(inst, &regs).is_err());
}
