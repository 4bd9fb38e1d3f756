//! Write-Back (WB) stage.
//!
//! Commits the result to the register file (x0 writes are suppressed) and
//! retires the op. Runs first each cycle, so its register update and hazard
//! shadow are visible to this cycle's Decode.

use log::debug;

use crate::core::pipeline::Pipeline;

/// Executes the write-back stage for one cycle.
pub fn write_back_stage(p: &mut Pipeline) {
    let Some(op) = p.wb_op.take() else {
        debug!("WriteBack: Bubble");
        return;
    };

    debug!(
        "WriteBack instruction {:#010x} at address {:#x} as {}",
        op.inst, op.pc, op.disasm
    );

    if op.dest_reg > 0 {
        p.regs.write(op.dest_reg, op.out as u64);
    }

    p.hazard_wb_dest = op.dest_reg;
}
