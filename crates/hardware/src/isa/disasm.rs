//! Disassembly of decoded operations.
//!
//! Renders a decoded `PipeOp` as assembly text for the execution history
//! and verbose logging. Operand layout follows the instruction format:
//! register-register ops print three register names, immediates print the
//! materialized value, and memory ops use the `offset(base)` form.

use crate::core::pipeline::op::PipeOp;
use crate::isa::abi::REG_NAMES;
use crate::isa::kind::InstKind;

/// Renders the decoded operation as `mnemonic operands`.
pub fn render(op: &PipeOp) -> String {
    let name = op.kind.mnemonic();
    match op.kind {
        InstKind::Lui | InstKind::Auipc | InstKind::Jal => {
            format!("{} {},{}", name, REG_NAMES[op.dest_reg], op.op1)
        }
        InstKind::Jalr => format!(
            "{} {},{},{}",
            name, REG_NAMES[op.dest_reg], REG_NAMES[op.rs1], op.op2
        ),
        k if k.is_branch() => format!(
            "{} {},{},{}",
            name, REG_NAMES[op.rs1], REG_NAMES[op.rs2], op.offset
        ),
        k if k.is_load() => format!(
            "{} {},{}({})",
            name, REG_NAMES[op.dest_reg], op.offset, REG_NAMES[op.rs1]
        ),
        k if k.is_store() => format!(
            "{} {},{}({})",
            name, REG_NAMES[op.rs2], op.offset, REG_NAMES[op.rs1]
        ),
        InstKind::Ecall | InstKind::Sret => name.to_string(),
        InstKind::Add
        | InstKind::Sub
        | InstKind::Sll
        | InstKind::Slt
        | InstKind::Sltu
        | InstKind::Xor
        | InstKind::Srl
        | InstKind::Sra
        | InstKind::Or
        | InstKind::And
        | InstKind::Mul
        | InstKind::Div
        | InstKind::Rem
        | InstKind::Addw
        | InstKind::Subw
        | InstKind::Sllw
        | InstKind::Srlw
        | InstKind::Sraw => format!(
            "{} {},{},{}",
            name, REG_NAMES[op.dest_reg], REG_NAMES[op.rs1], REG_NAMES[op.rs2]
        ),
        // Remaining I-type arithmetic: the immediate was materialized into op2.
        _ => format!(
            "{} {},{},{}",
            name, REG_NAMES[op.dest_reg], REG_NAMES[op.rs1], op.op2
        ),
    }
}
