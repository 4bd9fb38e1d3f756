//! Pipeline Tests.
//!
//! End-to-end programs through the five-stage pipeline: arithmetic with
//! data hazards, load-use stalls, branch prediction and recovery, jumps,
//! cached memory traffic, and fatal faults.

use rvfive_core::common::Fault;
use rvfive_core::config::{CacheLevelConfig, PredictorKind, ReplacementPolicy};
use rvfive_core::Pipeline;

use crate::common::asm::{self, exit_sequence};
use crate::common::harness::{pipeline_with_program, run_to_exit, test_config, PROGRAM_BASE};

/// Builds a program from body instructions plus the exit sequence.
fn program(body: &[u32]) -> Vec<u32> {
    let mut words = body.to_vec();
    words.extend(exit_sequence());
    words
}

// ══════════════════════════════════════════════════════════
// 1. Basic execution
// ══════════════════════════════════════════════════════════

/// Dependent arithmetic executes correctly through hazard stalls.
#[test]
fn arithmetic_with_hazards() {
    let config = test_config();
    let mut p = pipeline_with_program(
        &config,
        &program(&[asm::addi(5, 0, 3), asm::addi(6, 0, 4), asm::add(7, 5, 6)]),
    );

    assert_eq!(run_to_exit(&mut p), 0);
    assert_eq!(p.regs.read(7), 7);
    assert_eq!(p.stats.inst_count, 5);
    assert!(p.stats.cycle_count >= p.stats.inst_count);
}

/// Writes to x0 are suppressed; the zero invariant holds to exit.
#[test]
fn x0_writes_are_suppressed() {
    let config = test_config();
    let mut p = pipeline_with_program(&config, &program(&[asm::addi(0, 0, 5)]));

    run_to_exit(&mut p);
    assert_eq!(p.regs.read(0), 0);
}

/// The history records one entry per decode attempt.
#[test]
fn history_records_decodes() {
    let config = test_config();
    let mut p = pipeline_with_program(&config, &program(&[asm::addi(5, 0, 1)]));

    run_to_exit(&mut p);
    assert!(p.history.inst_records() >= 3);
}

// ══════════════════════════════════════════════════════════
// 2. Data hazards
// ══════════════════════════════════════════════════════════

/// A load-use pair stalls Decode until the load drains to write-back.
#[test]
fn load_use_hazard_stalls() {
    let config = test_config();

    let mut p = pipeline_with_program(
        &config,
        &program(&[
            asm::addi(6, 0, 0x100),
            asm::lw(5, 6, 0),
            asm::add(7, 5, 0),
        ]),
    );
    p.mem
        .backing_mut()
        .write_word(0x100, 42)
        .expect("data address in range");

    run_to_exit(&mut p);
    assert_eq!(p.regs.read(7), 42, "the add must see the loaded value");
    assert!(
        p.stats.data_hazard_count >= 2,
        "load-use stalls at least two cycles, counted {}",
        p.stats.data_hazard_count
    );
}

// ══════════════════════════════════════════════════════════
// 3. Branch prediction and recovery
// ══════════════════════════════════════════════════════════

/// Always-taken on a not-taken branch: one misprediction, two
/// control-hazard cycles, execution resumes at branch_pc + 4.
#[test]
fn always_taken_mispredicts_not_taken_branch() {
    let mut config = test_config();
    config.branch_predictor = PredictorKind::Taken;

    let mut p = pipeline_with_program(
        &config,
        &program(&[
            asm::addi(1, 0, 1),
            asm::beq(1, 0, 8),
            asm::addi(5, 0, 7),
        ]),
    );

    run_to_exit(&mut p);
    assert_eq!(p.regs.read(5), 7, "fall-through path must execute");
    assert_eq!(p.stats.branch_count, 1);
    assert_eq!(p.stats.mispredict_count, 1);
    assert_eq!(p.stats.control_hazard_count, 2);
}

/// Always-not-taken on the same branch predicts correctly: no penalty.
#[test]
fn not_taken_predicts_fall_through() {
    let mut config = test_config();
    config.branch_predictor = PredictorKind::NotTaken;

    let mut p = pipeline_with_program(
        &config,
        &program(&[
            asm::addi(1, 0, 1),
            asm::beq(1, 0, 8),
            asm::addi(5, 0, 7),
        ]),
    );

    run_to_exit(&mut p);
    assert_eq!(p.stats.mispredict_count, 0);
    assert_eq!(p.stats.control_hazard_count, 0);
}

/// A taken branch under not-taken prediction squashes the wrong-path op
/// and resumes at the target.
#[test]
fn taken_branch_squashes_wrong_path() {
    let config = test_config();

    let mut p = pipeline_with_program(
        &config,
        &program(&[
            asm::beq(0, 0, 8),
            asm::addi(5, 0, 99),
            asm::addi(5, 0, 7),
        ]),
    );

    run_to_exit(&mut p);
    assert_eq!(p.regs.read(5), 7, "wrong-path addi must not commit");
    assert_eq!(p.stats.mispredict_count, 1);
    assert_eq!(p.stats.control_hazard_count, 2);
}

/// A counted loop under the two-bit predictor mispredicts only the final
/// iteration.
#[test]
fn two_bit_predictor_on_counted_loop() {
    let mut config = test_config();
    config.branch_predictor = PredictorKind::TwoBit;
    config.bht_size = 16;

    let mut p = pipeline_with_program(
        &config,
        &program(&[
            asm::addi(5, 0, 10),
            asm::addi(5, 5, -1),
            asm::bne(5, 0, -4),
        ]),
    );

    run_to_exit(&mut p);
    assert_eq!(p.regs.read(5), 0);
    assert_eq!(p.stats.branch_count, 10);
    assert_eq!(p.stats.mispredict_count, 1, "only the loop exit mispredicts");
}

// ══════════════════════════════════════════════════════════
// 4. Jumps
// ══════════════════════════════════════════════════════════

/// JAL links the return address and skips the jumped-over instruction.
#[test]
fn jal_links_and_skips() {
    let config = test_config();

    let mut p = pipeline_with_program(
        &config,
        &program(&[asm::jal(1, 8), asm::addi(5, 0, 99)]),
    );

    run_to_exit(&mut p);
    assert_eq!(p.regs.read(1), PROGRAM_BASE + 4);
    assert_eq!(p.regs.read(5), 0, "jumped-over instruction must not run");
}

/// JALR computes the target from a register, masking the low bit.
#[test]
fn jalr_reaches_masked_target() {
    let config = test_config();

    // lui x6, 1 -> 0x1000; jalr to (0x1000 + 17) & ~1 = 0x1010, the exit
    // sequence four words in.
    let mut p = pipeline_with_program(
        &config,
        &program(&[
            asm::lui(6, 1),
            asm::jalr(7, 6, 17),
            asm::addi(5, 0, 99),
            asm::addi(5, 0, 98),
        ]),
    );

    run_to_exit(&mut p);
    assert_eq!(p.regs.read(7), PROGRAM_BASE + 8);
    assert_eq!(p.regs.read(5), 0, "skipped instructions must not run");
}

// ══════════════════════════════════════════════════════════
// 5. Memory traffic through the cache
// ══════════════════════════════════════════════════════════

/// Store-then-load through a cached hierarchy returns the stored value and
/// records cache traffic.
#[test]
fn cached_store_load_roundtrip() {
    let mut config = test_config();
    config.enable_cache = true;
    config.cache_levels = vec![CacheLevelConfig::new(1024, 2, 64, 1, ReplacementPolicy::Lru)];

    let mut p = pipeline_with_program(
        &config,
        &program(&[
            asm::addi(6, 0, 0x100),
            asm::addi(5, 0, 77),
            asm::sd(5, 6, 0),
            asm::ld(7, 6, 0),
        ]),
    );

    run_to_exit(&mut p);
    assert_eq!(p.regs.read(7), 77);

    let stats = p.mem.cache().expect("cache configured").levels()[0].stats;
    assert!(stats.hits >= 1, "the load should hit the line the store allocated");
    assert_eq!(stats.accesses, stats.hits + stats.misses);
    assert!(
        p.stats.memory_latency_total > 0,
        "data accesses accumulate informational latency"
    );
}

// ══════════════════════════════════════════════════════════
// 6. Fatal faults
// ══════════════════════════════════════════════════════════

/// Runs cycles until a fault surfaces, with a cap.
fn run_to_fault(p: &mut Pipeline) -> Fault {
    for _ in 0..1000 {
        if let Err(fault) = p.cycle() {
            return fault;
        }
    }
    panic!("expected a fault within 1000 cycles");
}

/// A misaligned entry PC faults at the first fetch.
#[test]
fn misaligned_pc_faults() {
    let config = test_config();
    let mut p = pipeline_with_program(&config, &program(&[]));
    p.pc = PROGRAM_BASE + 1;

    assert_eq!(run_to_fault(&mut p), Fault::MisalignedPc(PROGRAM_BASE + 1));
}

/// A load far outside memory faults in the memory stage.
#[test]
fn out_of_range_load_faults() {
    let config = test_config();
    let mut p = pipeline_with_program(
        &config,
        &program(&[asm::addi(6, 0, -8), asm::lw(5, 6, 0)]),
    );

    assert!(matches!(run_to_fault(&mut p), Fault::OutOfRange { .. }));
}

/// Dropping SP below the stack floor trips the prologue invariant.
#[test]
fn stack_overflow_faults() {
    let config = test_config();
    let mut p = pipeline_with_program(&config, &program(&[asm::addi(2, 0, 1)]));

    assert!(matches!(run_to_fault(&mut p), Fault::StackOverflow { .. }));
}

/// An undecodable word faults in Decode.
#[test]
fn illegal_instruction_faults() {
    let config = test_config();
    let mut p = pipeline_with_program(&config, &[0xFFFF_FFFF]);

    assert!(matches!(
        run_to_fault(&mut p),
        Fault::IllegalInstruction { .. }
    ));
}
