//! Instruction Decode (ID) stage.
//!
//! Decodes the op in the decode slot, records its disassembly in the
//! execution history, and forwards it when the execute slot is free and no
//! data hazard is pending. Conditional branches consult the predictor here;
//! a taken prediction (or any jump) suppresses fetch until resolution.
//!
//! An op held across a stall is decoded again next cycle so its operands
//! pick up the register values written in the meantime.

use log::debug;

use crate::common::Fault;
use crate::core::pipeline::Pipeline;
use crate::core::units::bru::DirectionPredictor;
use crate::isa::decode::decode_op;

/// Executes the decode stage for one cycle.
pub fn decode_stage(p: &mut Pipeline) -> Result<(), Fault> {
    let Some(mut op) = p.decode_op.take() else {
        debug!("Decode: Bubble");
        return Ok(());
    };

    decode_op(&mut op, &p.regs)?;
    p.history
        .push_inst(format!("{:#010x}: {}\n", op.pc, op.disasm));
    debug!(
        "Decoded instruction {:#010x} at address {:#x} as {}",
        op.inst, op.pc, op.disasm
    );

    // Downstream stall: keep the op and retry next cycle.
    if p.execute_op.is_some() {
        p.decode_op = Some(op);
        return Ok(());
    }

    // Data hazard: a source register is being written by an older op still
    // in flight this cycle.
    let hazard = |rs: usize| {
        rs > 0
            && (rs == p.hazard_execute_dest || rs == p.hazard_mem_dest || rs == p.hazard_wb_dest)
    };
    if hazard(op.rs1) || hazard(op.rs2) {
        debug!("Decode: stalled for data hazard");
        p.stats.data_hazard_count += 1;
        p.decode_op = Some(op);
        return Ok(());
    }

    if op.kind.is_branch() {
        op.predicted_taken = p.predictor.predict(op.pc);
        debug!(
            "Branch prediction: {}",
            if op.predicted_taken { "taken" } else { "not taken" }
        );

        if op.predicted_taken {
            // Speculatively steer fetch at the target; Execute overrides if
            // the prediction turns out wrong.
            p.wait_for_branch = true;
            let target = op.pc.wrapping_add(op.offset as u64);
            p.schedule_recovery(target, false);
            debug!("Fetch: Bubble due to control hazard");
        }
    } else if op.kind.is_jump() {
        // Target resolves in Execute.
        p.wait_for_branch = true;
    }

    p.execute_op = Some(op);
    Ok(())
}
