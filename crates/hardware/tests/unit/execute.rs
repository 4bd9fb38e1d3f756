//! Functional Executor Tests.
//!
//! Verifies ALU semantics (including the W-forms and the RV64M division
//! conventions), branch/jump resolution, memory access setup, and the exit
//! syscall path.

use rvfive_core::common::Fault;
use rvfive_core::core::pipeline::op::PipeOp;
use rvfive_core::core::reg::RegisterFile;
use rvfive_core::isa::decode::decode_op;
use rvfive_core::isa::execute::execute_op;
use rvfive_core::mem::backing::BackingStore;

use crate::common::asm;

/// Decodes and executes one instruction at PC 0x1000.
fn run(inst: u32, regs: &RegisterFile) -> (PipeOp, bool) {
    let mut op = PipeOp::fetched(0x1000, inst);
    decode_op(&mut op, regs).expect("instruction must decode");

    let mem = BackingStore::new(64);
    let mut exit = false;
    execute_op(&mut op, &mut exit, &mem).expect("instruction must execute");
    (op, exit)
}

/// Register file with `pairs` of (index, value) applied.
fn regs_with(pairs: &[(usize, u64)]) -> RegisterFile {
    let mut regs = RegisterFile::new();
    for &(index, value) in pairs {
        regs.write(index, value);
    }
    regs
}

// ══════════════════════════════════════════════════════════
// 1. ALU semantics
// ══════════════════════════════════════════════════════════

/// `add x5, x6, x7` with 3 and 4 produces 7 into dest x5.
#[test]
fn add_computes_sum() {
    let regs = regs_with(&[(6, 3), (7, 4)]);
    let (op, _) = run(asm::add(5, 6, 7), &regs);

    assert_eq!(op.out, 7);
    assert_eq!(op.dest_reg, 5);
}

/// ADDW wraps at 32 bits and sign-extends the result.
#[test]
fn addw_sign_extends_low_word() {
    let regs = regs_with(&[(6, 0x7FFF_FFFF), (7, 1)]);
    let (op, _) = run(asm::encode_r(0x3B, 5, 0x0, 6, 7, 0x00), &regs);
    assert_eq!(op.out, i32::MIN as i64);
}

/// Division by zero yields -1; remainder by zero yields the dividend.
#[test]
fn division_by_zero_follows_riscv() {
    let regs = regs_with(&[(6, 42), (7, 0)]);

    let (div, _) = run(asm::encode_r(0x33, 5, 0x4, 6, 7, 0x01), &regs);
    assert_eq!(div.out, -1);

    let (rem, _) = run(asm::encode_r(0x33, 5, 0x6, 6, 7, 0x01), &regs);
    assert_eq!(rem.out, 42);
}

/// Signed division overflow wraps instead of trapping.
#[test]
fn division_overflow_wraps() {
    let regs = regs_with(&[(6, i64::MIN as u64), (7, -1i64 as u64)]);
    let (op, _) = run(asm::encode_r(0x33, 5, 0x4, 6, 7, 0x01), &regs);
    assert_eq!(op.out, i64::MIN);
}

/// W-form shifts use only the low five bits of the shift amount.
#[test]
fn w_shift_masks_to_five_bits() {
    // shamt encoding 33 → effective shift of 1 for SLLIW.
    let regs = regs_with(&[(6, 1)]);
    let (op, _) = run(asm::encode_i(0x1B, 5, 0x1, 6, 33), &regs);
    assert_eq!(op.out, 2);
}

/// SRLW operates on the low word and sign-extends the 32-bit result.
#[test]
fn srlw_sign_extends_result() {
    let regs = regs_with(&[(6, 0xFFFF_FFFF), (7, 0)]);
    let (op, _) = run(asm::encode_r(0x3B, 5, 0x5, 6, 7, 0x00), &regs);
    assert_eq!(op.out, -1);
}

/// LUI shifts the upper immediate into place.
#[test]
fn lui_shifts_immediate() {
    let regs = RegisterFile::new();
    let (op, _) = run(asm::lui(5, 0x12345), &regs);
    assert_eq!(op.out, 0x1234_5000);
}

// ══════════════════════════════════════════════════════════
// 2. Branches and jumps
// ══════════════════════════════════════════════════════════

/// A taken branch targets pc + offset.
#[test]
fn taken_branch_sets_target() {
    let regs = regs_with(&[(1, 7), (2, 7)]);
    let (op, _) = run(asm::beq(1, 2, 16), &regs);

    assert!(op.branch);
    assert_eq!(op.jump_pc, 0x1010);
}

/// A not-taken branch leaves the sequential PC and branch unset.
#[test]
fn not_taken_branch_stays_sequential() {
    let regs = regs_with(&[(1, 7), (2, 8)]);
    let (op, _) = run(asm::beq(1, 2, 16), &regs);

    assert!(!op.branch);
    assert_eq!(op.jump_pc, 0x1004);
}

/// JAL links pc + 4 and always reports taken.
#[test]
fn jal_links_and_jumps() {
    let regs = RegisterFile::new();
    let (op, _) = run(asm::jal(1, 32), &regs);

    assert!(op.branch);
    assert_eq!(op.out, 0x1004);
    assert_eq!(op.jump_pc, 0x1020);
}

/// JALR masks bit zero of the computed target.
#[test]
fn jalr_masks_target_low_bit() {
    let regs = regs_with(&[(6, 0x2001)]);
    let (op, _) = run(asm::jalr(1, 6, 2), &regs);

    assert!(op.branch);
    assert_eq!(op.jump_pc, 0x2002);
}

// ══════════════════════════════════════════════════════════
// 3. Memory setup
// ══════════════════════════════════════════════════════════

/// Loads do not read memory in Execute; they set the access flags and the
/// effective address.
#[test]
fn load_sets_flags_and_address() {
    let regs = regs_with(&[(6, 0x100)]);
    let (op, _) = run(asm::lw(5, 6, 8), &regs);

    assert!(op.read_mem);
    assert!(op.read_sign_ext);
    assert_eq!(op.mem_len, 4);
    assert_eq!(op.out, 0x108);
}

/// Stores mask the data operand to the access width.
#[test]
fn store_masks_data_to_width() {
    let regs = regs_with(&[(6, 0x100), (7, 0x1_0234)]);
    let (op, _) = run(asm::encode_s(0x23, 0x1, 6, 7, 0), &regs);

    assert!(op.write_mem);
    assert_eq!(op.mem_len, 2);
    assert_eq!(op.op2, 0x0234);
}

// ══════════════════════════════════════════════════════════
// 4. System calls
// ══════════════════════════════════════════════════════════

/// Syscall 93 requests exit; a0 flows back unchanged.
#[test]
fn exit_syscall_raises_exit() {
    let regs = regs_with(&[(10, 0), (17, 93)]);
    let (_, exit) = run(asm::ecall(), &regs);
    assert!(exit);
}

/// Reserved syscall 10 suppresses the register write and performs no I/O.
#[test]
fn reserved_syscall_zeroes_dest() {
    let regs = regs_with(&[(10, 5), (17, 10)]);
    let (op, exit) = run(asm::ecall(), &regs);

    assert!(!exit);
    assert_eq!(op.dest_reg, 0);
}

/// Unknown syscall numbers fault.
#[test]
fn unknown_syscall_faults() {
    let regs = regs_with(&[(10, 5), (17, 999)]);

    let mut op = PipeOp::fetched(0x1000, asm::ecall());
    decode_op(&mut op, &regs).expect("ecall must decode");

    let mem = BackingStore::new(64);
    let mut exit = false;
    let err = execute_op(&mut op, &mut exit, &mem).expect_err("syscall 999 must fault");
    assert_eq!(err, Fault::UnknownSyscall(999));
}
