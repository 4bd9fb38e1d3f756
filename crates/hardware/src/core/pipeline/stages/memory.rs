//! Memory Access (MEM) stage.
//!
//! Performs at most one load or store through the memory hierarchy at the
//! effective address computed in Execute, sign-extending signed loads. The
//! hierarchy's per-access latency is added to the informational statistics;
//! it never stalls the pipeline, which charges one cycle per stage
//! regardless. No downstream stall is possible.

use log::debug;

use crate::common::Fault;
use crate::core::pipeline::Pipeline;

/// Executes the memory stage for one cycle.
pub fn memory_stage(p: &mut Pipeline) -> Result<(), Fault> {
    let Some(mut op) = p.mem_op.take() else {
        debug!("Memory Access: Bubble");
        return Ok(());
    };

    debug!(
        "MemoryAccess instruction {:#010x} at address {:#x} as {}",
        op.inst, op.pc, op.disasm
    );

    p.hazard_mem_dest = op.dest_reg;

    let addr = op.out as u64;

    if op.write_mem {
        match op.mem_len {
            1 => p.mem.set_byte(addr, op.op2 as u8)?,
            2 => p.mem.set_half(addr, op.op2 as u16)?,
            4 => p.mem.set_word(addr, op.op2 as u32)?,
            8 => p.mem.set_long(addr, op.op2 as u64)?,
            other => return Err(Fault::BadAccessWidth(other)),
        }
    }

    if op.read_mem {
        op.out = match (op.mem_len, op.read_sign_ext) {
            (1, true) => p.mem.get_byte(addr)? as i8 as i64,
            (1, false) => p.mem.get_byte(addr)? as i64,
            (2, true) => p.mem.get_half(addr)? as i16 as i64,
            (2, false) => p.mem.get_half(addr)? as i64,
            (4, true) => p.mem.get_word(addr)? as i32 as i64,
            (4, false) => p.mem.get_word(addr)? as i64,
            (8, _) => p.mem.get_long(addr)? as i64,
            (other, _) => return Err(Fault::BadAccessWidth(other)),
        };
    }

    if op.read_mem || op.write_mem {
        p.stats.memory_latency_total += p.mem.last_access_latency();
    }

    p.wb_op = Some(op);
    Ok(())
}
