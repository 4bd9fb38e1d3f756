//! Instruction Execute (EX) stage.
//!
//! Runs the functional executor, counts the instruction, and verifies the
//! branch prediction made in Decode. A misprediction (or any jump) installs
//! the correct PC, squashes the younger op in the decode slot, and charges
//! the control-hazard penalty. The predictor is trained here with the
//! architecturally resolved outcome only.

use log::debug;

use crate::common::Fault;
use crate::core::pipeline::Pipeline;
use crate::core::units::bru::DirectionPredictor;
use crate::isa::execute::execute_op;

/// Penalty cycles charged for a mispredicted branch.
const MISPREDICT_PENALTY: u64 = 2;

/// Executes the execute stage for one cycle.
pub fn execute_stage(p: &mut Pipeline) -> Result<(), Fault> {
    let Some(mut op) = p.execute_op.take() else {
        debug!("Execute: Bubble");
        return Ok(());
    };

    if p.mem_op.is_some() {
        debug!("Execute: Stall");
        p.execute_op = Some(op);
        return Ok(());
    }

    debug!(
        "Execute instruction {:#010x} at address {:#x} as {}",
        op.inst, op.pc, op.disasm
    );
    p.stats.inst_count += 1;

    let mut exit = false;
    execute_op(&mut op, &mut exit, p.mem.backing())?;
    if exit {
        p.request_exit(0);
    }

    let actual_taken = op.branch;
    let actual_target = op.jump_pc;
    let sequential_pc = op.pc.wrapping_add(4);

    if op.kind.is_branch() {
        p.stats.branch_count += 1;
        p.predictor.update(op.pc, actual_taken, actual_target);

        if op.predicted_taken != actual_taken {
            p.stats.mispredict_count += 1;
            p.stats.control_hazard_count += MISPREDICT_PENALTY;

            let correct_pc = if actual_taken {
                actual_target
            } else {
                sequential_pc
            };
            p.schedule_recovery(correct_pc, true);
            // Squash the younger op fetched down the wrong path.
            p.decode_op = None;
            p.wait_for_branch = true;

            debug!("Branch prediction result: mispredicted");
        } else {
            p.wait_for_branch = false;
            debug!("Branch prediction result: correct");
        }
    } else if op.kind.is_jump() {
        p.schedule_recovery(actual_target, true);
        p.decode_op = None;
    }

    p.hazard_execute_dest = op.dest_reg;
    p.mem_op = Some(op);
    Ok(())
}
