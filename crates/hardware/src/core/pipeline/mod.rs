//! Five-stage in-order pipeline controller.
//!
//! This module owns the architectural and micro-architectural state:
//! 1. **Slots:** One optional op per stage boundary; forwarding is a move,
//!    and a full downstream slot stalls the upstream stage.
//! 2. **Hazard shadows:** Per-stage destination registers recorded each
//!    cycle for Decode's data-hazard check.
//! 3. **Recovery:** The branch recovery flag and target, consumed at the
//!    next cycle's prologue; later (older) stages override younger ones.
//!
//! The five stage functions run once per cycle in reverse order (WriteBack,
//! Memory, Execute, Decode, Fetch), so effects of older instructions are
//! visible to younger ones within the same cycle.

/// The pipeline operation record.
pub mod op;
/// The five stage functions.
pub mod stages;

use std::io::BufRead;

use log::{debug, trace, warn};

use crate::common::Fault;
use crate::config::Config;
use crate::core::reg::RegisterFile;
use crate::core::units::bru::{DirectionPredictor, PredictorUnit};
use crate::isa::abi;
use crate::mem::MemoryManager;
use crate::stats::{History, SimStats};
use op::PipeOp;

/// The five-stage pipeline.
pub struct Pipeline {
    /// Integer register file.
    pub regs: RegisterFile,
    /// Program counter.
    pub pc: u64,
    /// Memory system.
    pub mem: MemoryManager,
    /// Branch direction predictor.
    pub predictor: PredictorUnit,
    predictor_name: String,

    /// Op waiting to be decoded.
    pub decode_op: Option<Box<PipeOp>>,
    /// Op waiting to execute.
    pub execute_op: Option<Box<PipeOp>>,
    /// Op waiting for its memory access.
    pub mem_op: Option<Box<PipeOp>>,
    /// Op waiting for write-back.
    pub wb_op: Option<Box<PipeOp>>,

    /// Destination written by Execute this cycle (0 = none).
    pub hazard_execute_dest: usize,
    /// Destination written by Memory this cycle (0 = none).
    pub hazard_mem_dest: usize,
    /// Destination written by WriteBack this cycle (0 = none).
    pub hazard_wb_dest: usize,

    /// A recovery is scheduled for the next cycle's prologue.
    pub should_recover: bool,
    /// Target PC of the scheduled recovery.
    pub recover_pc: u64,
    /// Fetch is suppressed until the pending branch resolves.
    pub wait_for_branch: bool,

    stack_base: u64,
    stack_size: u64,

    single_step: bool,
    dump_history_at_exit: bool,

    /// Architectural counters.
    pub stats: SimStats,
    /// Execution history for the dump file.
    pub history: History,

    exit_code: Option<i32>,
}

impl Pipeline {
    /// Creates a pipeline over `mem`, starting execution at `entry_pc`.
    ///
    /// The stack occupies the top 1% of memory; SP is initialized to its
    /// base (the top of the region).
    pub fn new(config: &Config, mem: MemoryManager, entry_pc: u64) -> Self {
        let stack_size = (config.memory_size / 100) as u64;
        let stack_base = config.memory_size as u64 - stack_size;

        let mut regs = RegisterFile::new();
        regs.write(abi::REG_SP, stack_base);

        let predictor = PredictorUnit::new(config);
        let predictor_name = predictor.name();

        Self {
            regs,
            pc: entry_pc,
            mem,
            predictor,
            predictor_name,
            decode_op: None,
            execute_op: None,
            mem_op: None,
            wb_op: None,
            hazard_execute_dest: 0,
            hazard_mem_dest: 0,
            hazard_wb_dest: 0,
            should_recover: false,
            recover_pc: 0,
            wait_for_branch: false,
            stack_base,
            stack_size,
            single_step: config.single_step,
            dump_history_at_exit: config.dump_history,
            stats: SimStats::default(),
            history: History::new(),
            exit_code: None,
        }
    }

    /// Lowest legal stack address.
    pub fn stack_floor(&self) -> u64 {
        self.stack_base - self.stack_size
    }

    /// Runs one cycle: prologue checks, recovery, then the five stages in
    /// reverse order.
    ///
    /// When Execute signals a guest exit the cycle stops there, before
    /// Decode and Fetch and before the cycle counter advances.
    pub fn cycle(&mut self) -> Result<(), Fault> {
        let x0 = self.regs.read(0);
        if x0 != 0 {
            return Err(Fault::RegisterZeroCorrupted(x0));
        }
        let sp = self.regs.read(abi::REG_SP);
        if sp < self.stack_floor() {
            return Err(Fault::StackOverflow {
                sp,
                floor: self.stack_floor(),
            });
        }

        if self.should_recover {
            debug!("branch recovery: new pc {:#010x}", self.recover_pc);
            self.pc = self.recover_pc;
            self.should_recover = false;
            self.recover_pc = 0;
            self.wait_for_branch = false;
        }

        self.hazard_execute_dest = 0;
        self.hazard_mem_dest = 0;
        self.hazard_wb_dest = 0;

        // Downstream stages run first so their slots drain before the
        // upstream stages look at them.
        stages::write_back_stage(self);
        stages::memory_stage(self)?;
        stages::execute_stage(self)?;

        // A guest exit terminates the cycle at Execute: the younger ops in
        // Decode/Fetch never run, and the cycle is not counted.
        if self.exit_code.is_some() {
            return Ok(());
        }

        stages::decode_stage(self)?;
        stages::fetch_stage(self)?;

        self.stats.cycle_count += 1;
        let snapshot = self.reg_state_string();
        trace!("\n{}", snapshot);
        self.history.push_regs(snapshot);

        Ok(())
    }

    /// Runs cycles until the guest requests exit or a fault occurs.
    ///
    /// On guest exit the statistics report is printed here (and the history
    /// dumped when configured) before the exit code is returned.
    pub fn run(&mut self) -> Result<i32, Fault> {
        loop {
            self.cycle()?;

            if let Some(code) = self.exit_code {
                println!("Program exit from an exit() system call");
                if self.dump_history_at_exit {
                    println!("Dumping history to dump.txt...");
                    self.dump_history();
                }
                self.print_statistics();
                return Ok(code);
            }

            if self.single_step {
                self.single_step_prompt();
            }
        }
    }

    /// Exit code requested by the guest via syscall 3/93, if any.
    pub fn take_exit(&mut self) -> Option<i32> {
        self.exit_code.take()
    }

    /// Flags a guest-requested exit; observed by `run` after the cycle ends.
    pub(crate) fn request_exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }

    /// Installs a branch recovery.
    ///
    /// A recovery already scheduled this cycle came from an earlier-run
    /// stage, i.e. an older instruction, and wins; `overwrite` is set by
    /// Execute-detected mispredictions and jumps, which override a
    /// speculative recovery scheduled by Decode.
    pub(crate) fn schedule_recovery(&mut self, dest_pc: u64, overwrite: bool) {
        if overwrite || !self.should_recover {
            self.should_recover = true;
            self.recover_pc = dest_pc;
        }
    }

    /// Name of the configured branch predictor.
    pub fn predictor_name(&self) -> &str {
        &self.predictor_name
    }

    /// Prints pipeline statistics, then cache statistics when configured.
    pub fn print_statistics(&self) {
        self.stats.print(&self.predictor_name);
        self.mem.print_statistics();
    }

    /// Writes the execution history to `dump.txt`.
    pub fn dump_history(&self) {
        if let Err(e) = self.history.dump("dump.txt") {
            warn!("failed to write dump.txt: {}", e);
        }
    }

    /// Renders the CPU state block recorded after every cycle.
    pub fn reg_state_string(&self) -> String {
        let mut s = String::from("------------ CPU STATE ------------\n");
        s.push_str(&format!("PC: {:#x}\n", self.pc));
        for (i, (name, value)) in abi::REG_NAMES
            .iter()
            .zip(self.regs.as_slice().iter())
            .enumerate()
        {
            s.push_str(&format!("{}: {:#018x}({}) ", name, value, *value as i64));
            if i % 4 == 3 {
                s.push('\n');
            }
        }
        s.push_str("-----------------------------------\n");
        s
    }

    /// Single-step prompt: ENTER continues, a line containing `d` writes the
    /// history dump first.
    fn single_step_prompt(&self) {
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_ok() && line.contains('d') {
            self.dump_history();
        }
    }
}
