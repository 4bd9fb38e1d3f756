//! Simulation statistics and execution history.
//!
//! This module tracks the architectural metrics reported at exit:
//! 1. **Counts:** Instructions, cycles, and the derived CPI.
//! 2. **Hazards:** Data-hazard stall cycles and control-hazard penalty cycles.
//! 3. **Branch prediction:** Resolved branches, mispredictions, and accuracy.
//! 4. **Memory latency:** The informational latency accumulated by the cache.
//!
//! It also keeps the execution history: one disassembly record per decode
//! attempt and one register snapshot per cycle, dumped to `dump.txt` on
//! fatal faults, on demand in single-step mode, or at exit.

use std::fs::File;
use std::io::{self, Write};

/// Record cap; both history buffers are cleared when it is reached so a
/// long-running guest cannot exhaust host memory.
const HISTORY_LIMIT: usize = 100_000;

/// Counters reported by the statistics print-out.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimStats {
    /// Instructions that reached Execute.
    pub inst_count: u64,
    /// Simulated cycles.
    pub cycle_count: u64,
    /// Cycles spent stalled on data hazards.
    pub data_hazard_count: u64,
    /// Penalty cycles charged for control hazards.
    pub control_hazard_count: u64,
    /// Conditional branches resolved in Execute.
    pub branch_count: u64,
    /// Branches whose predicted direction was wrong.
    pub mispredict_count: u64,
    /// Informational memory latency accumulated across all data accesses.
    pub memory_latency_total: u64,
}

impl SimStats {
    /// Fraction of branches predicted correctly (1.0 when no branches ran).
    pub fn prediction_accuracy(&self) -> f64 {
        if self.branch_count == 0 {
            0.0
        } else {
            1.0 - self.mispredict_count as f64 / self.branch_count as f64
        }
    }

    /// Prints the statistics report to stdout.
    pub fn print(&self, predictor_name: &str) {
        println!("------------ STATISTICS -----------");
        println!("Number of Instructions: {}", self.inst_count);
        println!("Number of Cycles: {}", self.cycle_count);
        println!(
            "Avg Cycles per Instruction: {:.4}",
            self.cycle_count as f64 / self.inst_count.max(1) as f64
        );
        println!("Number of Control Hazards: {}", self.control_hazard_count);
        println!("Number of Data Hazards: {}", self.data_hazard_count);
        println!(
            "Branch Prediction Accuracy: {:.4} ({})",
            self.prediction_accuracy(),
            predictor_name
        );
        if self.memory_latency_total > 0 {
            println!(
                "Accumulated Memory Latency: {} cycles",
                self.memory_latency_total
            );
        }
        println!("-----------------------------------");
    }
}

/// Execution history: disassembly records paired with register snapshots.
#[derive(Clone, Debug, Default)]
pub struct History {
    inst_record: Vec<String>,
    reg_record: Vec<String>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one `PC: disassembly` record.
    pub fn push_inst(&mut self, record: String) {
        self.inst_record.push(record);
    }

    /// Appends one per-cycle register snapshot, clearing both buffers at the
    /// record cap.
    pub fn push_regs(&mut self, snapshot: String) {
        self.reg_record.push(snapshot);
        if self.reg_record.len() >= HISTORY_LIMIT {
            self.reg_record.clear();
            self.inst_record.clear();
        }
    }

    /// Number of instruction records currently held.
    pub fn inst_records(&self) -> usize {
        self.inst_record.len()
    }

    /// Writes the history to `path`, pairing each instruction record with
    /// the corresponding register snapshot.
    pub fn dump(&self, path: &str) -> io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "================== Execution History ==================")?;
        for (inst, regs) in self.inst_record.iter().zip(self.reg_record.iter()) {
            write!(file, "{}", inst)?;
            write!(file, "{}", regs)?;
        }
        writeln!(file, "========================================================")?;
        writeln!(file)?;
        Ok(())
    }
}
