//! Instruction Fetch (IF) stage.
//!
//! Reads the next instruction word directly from the backing store
//! (instruction fetches bypass the data cache in this model), allocates a
//! fresh op, and places it in the decode slot. Fetch produces a bubble
//! while a branch is unresolved and stalls while the decode slot is full.

use log::debug;

use crate::common::Fault;
use crate::core::pipeline::op::PipeOp;
use crate::core::pipeline::Pipeline;

/// Executes the fetch stage for one cycle.
pub fn fetch_stage(p: &mut Pipeline) -> Result<(), Fault> {
    if p.wait_for_branch {
        debug!("Fetch: Bubble due to control hazard");
        return Ok(());
    }

    if p.decode_op.is_some() {
        debug!("Fetch: stalled at fetch");
        return Ok(());
    }

    if p.pc % 2 != 0 {
        return Err(Fault::MisalignedPc(p.pc));
    }

    let inst = p.mem.fetch_word(p.pc)?;
    debug!("Fetched instruction {:#010x} at address {:#x}", inst, p.pc);

    p.decode_op = Some(Box::new(PipeOp::fetched(p.pc, inst)));
    p.pc += 4;
    Ok(())
}
