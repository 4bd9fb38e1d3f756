//! Statistics and History Tests.
//!
//! Verifies the derived metrics and the history dump format and bounds.

use std::fs;

use rvfive_core::stats::{History, SimStats};

/// Accuracy is 1 - mispredicts/branches, and zero with no branches.
#[test]
fn prediction_accuracy_derives() {
    let mut stats = SimStats::default();
    assert_eq!(stats.prediction_accuracy(), 0.0);

    stats.branch_count = 10;
    stats.mispredict_count = 2;
    assert!((stats.prediction_accuracy() - 0.8).abs() < 1e-9);
}

/// The dump pairs each instruction record with its register snapshot.
#[test]
fn dump_pairs_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("dump.txt");
    let path_str = path.to_str().expect("utf-8 path");

    let mut history = History::new();
    history.push_inst("0x00001000: addi t0,zero,1\n".to_string());
    history.push_regs("------------ CPU STATE ------------\n".to_string());

    history.dump(path_str).expect("dump must write");

    let text = fs::read_to_string(&path).expect("dump readable");
    assert!(text.starts_with("================== Execution History =================="));
    assert!(text.contains("0x00001000: addi t0,zero,1"));
    assert!(text.contains("CPU STATE"));
}

/// The history clears itself at the record cap instead of growing without
/// bound.
#[test]
fn history_clears_at_cap() {
    let mut history = History::new();
    for i in 0..100_000 {
        history.push_inst(format!("{}\n", i));
        history.push_regs("regs\n".to_string());
    }
    assert_eq!(history.inst_records(), 0, "cap reached, buffers cleared");

    history.push_inst("after\n".to_string());
    assert_eq!(history.inst_records(), 1);
}
