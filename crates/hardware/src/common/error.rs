//! Runtime fault definitions.
//!
//! This module defines the error type raised while the simulation is running. It provides:
//! 1. **Decode faults:** Unknown encodings and rejected compressed instructions.
//! 2. **Architectural invariant faults:** x0 corruption, stack overflow, misaligned PC.
//! 3. **Memory and system faults:** Out-of-range accesses and unknown system calls.
//!
//! Faults are fatal: the pipeline controller surfaces them to the driver, which dumps
//! the execution history and exits with a non-zero status.

use std::fmt;

/// Fatal runtime faults raised by the decoder, executor, pipeline, or memory system.
///
/// Each variant carries the offending fields so the operator can identify the
/// failing instruction or access without re-running under a debugger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    /// A 16-bit (compressed) instruction encoding was fetched.
    ///
    /// Compressed instructions are not supported; the associated value is the
    /// raw instruction word.
    CompressedInstruction(u32),

    /// The instruction encoding is not recognized.
    ///
    /// Carries the raw instruction word plus the opcode/funct3/funct7 fields
    /// that failed to match any supported operation.
    IllegalInstruction {
        /// Raw 32-bit instruction word.
        inst: u32,
        /// Major opcode (bits 6-0).
        opcode: u32,
        /// funct3 field (bits 14-12).
        funct3: u32,
        /// funct7 field (bits 31-25).
        funct7: u32,
    },

    /// Register x0 was observed non-zero at a cycle boundary.
    RegisterZeroCorrupted(u64),

    /// The stack pointer dropped below the stack floor.
    StackOverflow {
        /// Current stack pointer value.
        sp: u64,
        /// Lowest legal stack address.
        floor: u64,
    },

    /// The program counter is not 2-byte aligned.
    MisalignedPc(u64),

    /// A memory access fell outside the backing store.
    OutOfRange {
        /// First byte of the failing access.
        addr: u64,
        /// Access width in bytes.
        len: usize,
        /// Total backing store size in bytes.
        memory_size: usize,
    },

    /// A memory operation carried an unsupported access width.
    BadAccessWidth(u32),

    /// An ECALL requested a system call number that is not implemented.
    UnknownSyscall(i64),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::CompressedInstruction(inst) => {
                write!(
                    f,
                    "16-bit compressed instruction {:#06x} is not supported",
                    inst & 0xFFFF
                )
            }
            Fault::IllegalInstruction {
                inst,
                opcode,
                funct3,
                funct7,
            } => write!(
                f,
                "illegal instruction {:#010x} (opcode={:#04x} funct3={:#x} funct7={:#04x})",
                inst, opcode, funct3, funct7
            ),
            Fault::RegisterZeroCorrupted(val) => {
                write!(f, "register x0 holds {:#x}, expected zero", val)
            }
            Fault::StackOverflow { sp, floor } => {
                write!(f, "stack overflow: sp={:#x} below floor {:#x}", sp, floor)
            }
            Fault::MisalignedPc(pc) => write!(f, "misaligned PC {:#x}", pc),
            Fault::OutOfRange {
                addr,
                len,
                memory_size,
            } => write!(
                f,
                "memory access out of range: addr={:#x} len={} memory_size={:#x}",
                addr, len, memory_size
            ),
            Fault::BadAccessWidth(len) => write!(f, "unsupported memory access width {}", len),
            Fault::UnknownSyscall(num) => write!(f, "unknown syscall {}", num),
        }
    }
}

impl std::error::Error for Fault {}
