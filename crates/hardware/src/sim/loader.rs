//! ELF binary loader.
//!
//! Parses a statically linked RISC-V ELF (class 32 or 64), copies every
//! loadable segment into the backing store at its virtual address with the
//! memory-size tail zero-filled, and returns the entry point used as the
//! initial PC. Segments reaching past the 32-bit address space are
//! rejected, as is any non-RISC-V machine.

use std::fmt;
use std::fs;

use goblin::elf::program_header::PT_LOAD;
use goblin::elf::{header, Elf};
use log::info;

use crate::mem::MemoryManager;

/// Errors raised while loading the guest binary; startup aborts on any of them.
#[derive(Debug)]
pub enum LoaderError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The bytes do not parse as an ELF image.
    Elf(goblin::error::Error),
    /// The ELF machine field is not RISC-V.
    WrongMachine(u16),
    /// A segment's file range lies outside the image.
    TruncatedSegment {
        /// Segment offset within the file.
        offset: u64,
        /// Segment size within the file.
        file_size: u64,
    },
    /// A segment reaches past the 32-bit address space this model supports.
    AddressTooHigh(u64),
    /// A segment does not fit in the configured backing store.
    OutsideMemory {
        /// Segment end address.
        end: u64,
        /// Backing store size.
        memory_size: usize,
    },
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderError::Io(e) => write!(f, "cannot read ELF file: {}", e),
            LoaderError::Elf(e) => write!(f, "cannot parse ELF file: {}", e),
            LoaderError::WrongMachine(m) => {
                write!(f, "ELF machine {:#x} is not RISC-V", m)
            }
            LoaderError::TruncatedSegment { offset, file_size } => write!(
                f,
                "segment at offset {:#x} (size {:#x}) lies outside the file",
                offset, file_size
            ),
            LoaderError::AddressTooHigh(end) => write!(
                f,
                "segment end {:#x} exceeds the 32-bit address space",
                end
            ),
            LoaderError::OutsideMemory { end, memory_size } => write!(
                f,
                "segment end {:#x} does not fit in {} bytes of memory",
                end, memory_size
            ),
        }
    }
}

impl std::error::Error for LoaderError {}

impl From<std::io::Error> for LoaderError {
    fn from(e: std::io::Error) -> Self {
        LoaderError::Io(e)
    }
}

impl From<goblin::error::Error> for LoaderError {
    fn from(e: goblin::error::Error) -> Self {
        LoaderError::Elf(e)
    }
}

/// Loads the ELF at `path` into the backing store and returns the entry PC.
///
/// Loader writes go directly to the backing store; they are architectural
/// initialization and do not touch the cache hierarchy.
pub fn load_elf(path: &str, mem: &mut MemoryManager, verbose: bool) -> Result<u64, LoaderError> {
    let bytes = fs::read(path)?;
    let elf = Elf::parse(&bytes)?;

    if elf.header.e_machine != header::EM_RISCV {
        return Err(LoaderError::WrongMachine(elf.header.e_machine));
    }

    if verbose {
        print_elf_info(&elf);
    }

    for ph in &elf.program_headers {
        if ph.p_type != PT_LOAD {
            continue;
        }

        let vaddr = ph.p_vaddr;
        let mem_size = ph.p_memsz;
        let file_size = ph.p_filesz;

        let end = vaddr
            .checked_add(mem_size)
            .ok_or(LoaderError::AddressTooHigh(u64::MAX))?;
        if end > u32::MAX as u64 {
            return Err(LoaderError::AddressTooHigh(end));
        }
        if end > mem.backing().len() as u64 {
            return Err(LoaderError::OutsideMemory {
                end,
                memory_size: mem.backing().len(),
            });
        }

        let file_end = ph
            .p_offset
            .checked_add(file_size)
            .filter(|&e| e <= bytes.len() as u64)
            .ok_or(LoaderError::TruncatedSegment {
                offset: ph.p_offset,
                file_size,
            })?;

        let segment = &bytes[ph.p_offset as usize..file_end as usize];
        let memory_size = mem.backing().len();
        let store = mem.backing_mut();
        store
            .write_span(vaddr, segment)
            .map_err(|_| LoaderError::OutsideMemory { end, memory_size })?;
        if mem_size > file_size {
            let zeros = vec![0u8; (mem_size - file_size) as usize];
            store
                .write_span(vaddr + file_size, &zeros)
                .map_err(|_| LoaderError::OutsideMemory { end, memory_size })?;
        }

        info!(
            "loaded segment: vaddr={:#x} filesz={:#x} memsz={:#x}",
            vaddr, file_size, mem_size
        );
    }

    Ok(elf.entry)
}

/// Prints the ELF information banner shown under `--verbose`.
fn print_elf_info(elf: &Elf<'_>) {
    println!("==========ELF Information==========");
    println!("Type: {}", if elf.is_64 { "ELF64" } else { "ELF32" });
    println!(
        "Encoding: {}",
        if elf.little_endian {
            "Little Endian"
        } else {
            "Big Endian"
        }
    );
    println!("ISA: RISC-V({:#x})", elf.header.e_machine);
    println!("Entry: {:#x}", elf.entry);

    println!("Number of Segments: {}", elf.program_headers.len());
    println!("ID\tFlags\tAddress\tFSize\tMSize");
    for (i, ph) in elf.program_headers.iter().enumerate() {
        println!(
            "[{}]\t{:#x}\t{:#x}\t{}\t{}",
            i, ph.p_flags, ph.p_vaddr, ph.p_filesz, ph.p_memsz
        );
    }
    println!("===================================");
}
