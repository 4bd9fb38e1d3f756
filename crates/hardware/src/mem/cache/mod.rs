//! Tiered cache hierarchy.
//!
//! This module orchestrates reads and writes across an ordered sequence of
//! set-associative levels sitting above the flat backing store. It enforces:
//! 1. **Write policy:** Write-back/write-allocate. Write misses fetch the
//!    line first; dirty evictions write the full line one level down.
//! 2. **Inclusion policy:** Inclusive hierarchies back-invalidate upper
//!    copies when a lower level evicts; exclusive hierarchies keep a single
//!    copy and demote clean victims instead of dropping them.
//! 3. **Latency accounting:** Every level touched charges its latency; the
//!    backing store charges the flat memory latency when enabled. The total
//!    is exposed per top-level access and never stalls the pipeline.
//!
//! When tracing is enabled, every cache event is appended to the trace file
//! stamped with the access counter.

/// Cache line, set, and level structures.
pub mod level;

use std::fs::File;
use std::io::Write;

use crate::common::Fault;
use crate::config::{Config, ConfigError, InclusionPolicy, ReplacementPolicy, WritePolicy};
use crate::mem::backing::BackingStore;

pub use level::{CacheLevel, CacheLine, CacheStats};

/// Multi-level cache in front of the backing store.
pub struct TieredCache {
    levels: Vec<CacheLevel>,
    backing: BackingStore,
    inclusion: InclusionPolicy,
    write_policy: WritePolicy,
    enable_latency: bool,
    memory_latency: u64,
    current_cycle: u64,
    last_access_latency: u64,
    trace: Option<File>,
}

impl TieredCache {
    /// Builds the hierarchy described by `config` on top of `backing`.
    ///
    /// Fails on malformed cache geometry or an unwritable trace file; both
    /// abort startup before any simulation state exists.
    pub fn new(config: &Config, backing: BackingStore) -> Result<Self, ConfigError> {
        let levels = config
            .cache_levels
            .iter()
            .cloned()
            .map(CacheLevel::new)
            .collect::<Result<Vec<_>, _>>()?;

        let trace = if config.enable_trace {
            let file = File::create(&config.trace_output_file)
                .map_err(|e| ConfigError::TraceFile(format!("{}: {}", config.trace_output_file, e)))?;
            Some(file)
        } else {
            None
        };

        Ok(Self {
            levels,
            backing,
            inclusion: config.inclusion_policy,
            write_policy: config.write_policy,
            enable_latency: config.enable_latency,
            memory_latency: config.memory_latency,
            current_cycle: 0,
            last_access_latency: 0,
            trace,
        })
    }

    /// Borrows the backing store under the hierarchy.
    pub fn backing(&self) -> &BackingStore {
        &self.backing
    }

    /// Mutably borrows the backing store, bypassing the cache levels.
    pub fn backing_mut(&mut self) -> &mut BackingStore {
        &mut self.backing
    }

    /// The configured cache levels, nearest first.
    pub fn levels(&self) -> &[CacheLevel] {
        &self.levels
    }

    /// Latency accumulated by the most recent top-level access.
    pub fn last_access_latency(&self) -> u64 {
        self.last_access_latency
    }

    /// Whether `addr` is resident at level `level_idx`.
    pub fn contains(&self, level_idx: usize, addr: u64) -> bool {
        self.levels[level_idx].lookup(addr).is_some()
    }

    /// Reads bytes at `addr` through the hierarchy into `out`.
    pub fn read_span(&mut self, addr: u64, out: &mut [u8]) -> Result<(), Fault> {
        self.current_cycle += 1;
        let mut latency = 0;
        self.last_access_latency = 0;

        if self.levels.is_empty() {
            self.read_from_memory(addr, out, &mut latency)?;
        } else {
            self.handle_read(0, addr, out, &mut latency, false)?;
        }

        self.last_access_latency = latency;
        Ok(())
    }

    /// Writes `input` at `addr` through the hierarchy.
    pub fn write_span(&mut self, addr: u64, input: &[u8]) -> Result<(), Fault> {
        self.current_cycle += 1;
        let mut latency = 0;
        self.last_access_latency = 0;

        if self.levels.is_empty() {
            self.write_to_memory(addr, input, &mut latency)?;
        } else {
            self.handle_write(0, addr, input, &mut latency)?;
        }

        self.last_access_latency = latency;
        Ok(())
    }

    /// Read protocol at one level.
    ///
    /// Accesses spanning a line boundary are split so every invocation
    /// touches exactly one line. On a miss the full line is fetched from the
    /// level below (or the backing store), a victim is processed first, and
    /// the inclusion policy's invalidations run. `is_write_alloc` marks
    /// write-allocate probes so the exclusive policy does not invalidate the
    /// line it is about to promote.
    fn handle_read(
        &mut self,
        level_idx: usize,
        addr: u64,
        out: &mut [u8],
        latency: &mut u64,
        is_write_alloc: bool,
    ) -> Result<(), Fault> {
        let line_size = self.levels[level_idx].config.line_size;
        let offset = self.levels[level_idx].offset(addr);
        let remaining_in_line = line_size - offset;

        if out.len() > remaining_in_line {
            let (head, tail) = out.split_at_mut(remaining_in_line);
            self.handle_read(level_idx, addr, head, latency, is_write_alloc)?;
            self.handle_read(
                level_idx,
                addr + remaining_in_line as u64,
                tail,
                latency,
                is_write_alloc,
            )?;
            return Ok(());
        }

        *latency += self.levels[level_idx].config.latency;
        self.levels[level_idx].stats.accesses += 1;

        if let Some((set, way)) = self.levels[level_idx].lookup(addr) {
            self.levels[level_idx].stats.hits += 1;
            self.log(format_args!("L{} Read Hit: addr={:#x}", level_idx + 1, addr));

            let cycle = self.current_cycle;
            self.levels[level_idx].touch(set, way, cycle);

            let line = self.levels[level_idx].line(set, way);
            out.copy_from_slice(&line.data[offset..offset + out.len()]);
            return Ok(());
        }

        self.levels[level_idx].stats.misses += 1;
        self.log(format_args!("L{} Read Miss: addr={:#x}", level_idx + 1, addr));

        let cycle = self.current_cycle;
        let tag = self.levels[level_idx].tag(addr);
        let (set, way, victim) = self.levels[level_idx].allocate(addr, cycle);

        if let Some(victim_line) = victim {
            let victim_addr = self.levels[level_idx].addr_of(victim_line.tag, set);
            if self.inclusion == InclusionPolicy::Inclusive {
                self.log(format_args!(
                    "L{} Inclusive Back-Invalidate: addr={:#x}",
                    level_idx + 1,
                    victim_addr
                ));
                self.back_invalidate(level_idx as isize - 1, victim_addr)?;
            }
            self.evict(level_idx, &victim_line, victim_addr, latency)?;
        }

        let line_addr = self.levels[level_idx].addr_of(tag, set);
        let mut line_buffer = vec![0u8; line_size];

        if level_idx + 1 < self.levels.len() {
            self.handle_read(level_idx + 1, line_addr, &mut line_buffer, latency, is_write_alloc)?;
        } else {
            self.read_from_memory(line_addr, &mut line_buffer, latency)?;
        }

        // Deeper-level evictions during the fetch may have back-invalidated
        // the slot; re-install unconditionally, as a fresh clean line.
        {
            let line = self.levels[level_idx].line_mut(set, way);
            line.data.copy_from_slice(&line_buffer);
            line.valid = true;
            line.dirty = false;
            line.tag = tag;
        }
        self.levels[level_idx].touch(set, way, cycle);

        if self.inclusion == InclusionPolicy::Exclusive && !is_write_alloc {
            self.invalidate_in_lower_levels(level_idx + 1, line_addr);
        }

        let line = self.levels[level_idx].line(set, way);
        out.copy_from_slice(&line.data[offset..offset + out.len()]);
        Ok(())
    }

    /// Write protocol at one level (write-back, write-allocate).
    ///
    /// A write hit dirties the line in place. A write miss first promotes
    /// the line with a write-allocate read probe, then applies the write.
    /// Under the exclusive policy every write invalidates deeper copies.
    fn handle_write(
        &mut self,
        level_idx: usize,
        addr: u64,
        input: &[u8],
        latency: &mut u64,
    ) -> Result<(), Fault> {
        let line_size = self.levels[level_idx].config.line_size;
        let offset = self.levels[level_idx].offset(addr);
        let remaining_in_line = line_size - offset;

        if input.len() > remaining_in_line {
            let (head, tail) = input.split_at(remaining_in_line);
            self.handle_write(level_idx, addr, head, latency)?;
            self.handle_write(level_idx, addr + remaining_in_line as u64, tail, latency)?;
            return Ok(());
        }

        *latency += self.levels[level_idx].config.latency;
        self.levels[level_idx].stats.accesses += 1;

        if let Some((set, way)) = self.levels[level_idx].lookup(addr) {
            self.levels[level_idx].stats.hits += 1;
            self.log(format_args!("L{} Write Hit: addr={:#x}", level_idx + 1, addr));

            let cycle = self.current_cycle;
            self.levels[level_idx].touch(set, way, cycle);

            let line = self.levels[level_idx].line_mut(set, way);
            line.data[offset..offset + input.len()].copy_from_slice(input);
            line.dirty = true;
            let line_addr = self.levels[level_idx].addr_of(self.levels[level_idx].tag(addr), set);

            if self.inclusion == InclusionPolicy::Exclusive {
                self.invalidate_in_lower_levels(level_idx + 1, line_addr);
            }
            return Ok(());
        }

        self.levels[level_idx].stats.misses += 1;
        self.log(format_args!("L{} Write Miss: addr={:#x}", level_idx + 1, addr));

        // Write-allocate: pull the affected bytes in via the read path. The
        // probe flag keeps the exclusive policy from invalidating the line
        // that is being promoted to this level.
        let mut dummy = vec![0u8; input.len()];
        self.handle_read(level_idx, addr, &mut dummy, latency, true)?;

        let (set, way) = self.levels[level_idx]
            .lookup(addr)
            .expect("line resident after write-allocate");
        self.log(format_args!(
            "L{} Write-Allocate complete, performing write: addr={:#x}",
            level_idx + 1,
            addr
        ));

        let cycle = self.current_cycle;
        self.levels[level_idx].touch(set, way, cycle);

        let line = self.levels[level_idx].line_mut(set, way);
        line.data[offset..offset + input.len()].copy_from_slice(input);
        line.dirty = true;
        let line_addr = self.levels[level_idx].addr_of(self.levels[level_idx].tag(addr), set);

        if self.inclusion == InclusionPolicy::Exclusive {
            self.invalidate_in_lower_levels(level_idx + 1, line_addr);
        }
        Ok(())
    }

    /// Eviction processing for a displaced valid line.
    ///
    /// Dirty victims write back one level down (or to the backing store).
    /// Clean victims are demoted under the exclusive policy so the single
    /// copy survives; under the inclusive policy they are simply dropped.
    fn evict(
        &mut self,
        level_idx: usize,
        victim_line: &CacheLine,
        victim_addr: u64,
        latency: &mut u64,
    ) -> Result<(), Fault> {
        self.levels[level_idx].stats.evictions += 1;
        self.log(format_args!(
            "L{} Evict: addr={:#x} (Dirty={})",
            level_idx + 1,
            victim_addr,
            victim_line.dirty
        ));

        if victim_line.dirty {
            self.levels[level_idx].stats.writebacks += 1;
            self.log(format_args!(
                "L{} Write-Back: addr={:#x}",
                level_idx + 1,
                victim_addr
            ));

            if level_idx + 1 < self.levels.len() {
                self.handle_write(level_idx + 1, victim_addr, &victim_line.data, latency)?;
            } else {
                self.write_to_memory(victim_addr, &victim_line.data, latency)?;
            }
        } else if self.inclusion == InclusionPolicy::Exclusive && level_idx + 1 < self.levels.len()
        {
            self.log(format_args!(
                "L{} Exclusive Push-Down: addr={:#x}",
                level_idx + 1,
                victim_addr
            ));
            self.handle_write(level_idx + 1, victim_addr, &victim_line.data, latency)?;
        }
        Ok(())
    }

    /// Invalidates `addr` at `level_idx` and every level toward the core.
    ///
    /// Dirty copies run the eviction path (write-back) before invalidation,
    /// preserving the inclusive invariant that a line at level k is resident
    /// at every level below it. Recursion terminates past level 0.
    fn back_invalidate(&mut self, level_idx: isize, addr: u64) -> Result<(), Fault> {
        if level_idx < 0 {
            return Ok(());
        }
        let idx = level_idx as usize;

        if let Some((set, way)) = self.levels[idx].lookup(addr) {
            self.log(format_args!(
                "L{} Back-Invalidated: addr={:#x}",
                idx + 1,
                addr
            ));

            let line = self.levels[idx].line(set, way).clone();
            if line.dirty {
                let victim_addr = self.levels[idx].addr_of(line.tag, set);
                let mut dummy_latency = 0;
                self.evict(idx, &line, victim_addr, &mut dummy_latency)?;
            }
            self.levels[idx].line_mut(set, way).valid = false;
        }

        self.back_invalidate(level_idx - 1, addr)
    }

    /// Invalidates `addr` at `level_idx` and every level away from the core.
    ///
    /// Used only by the exclusive policy; the dropped copies are stale by
    /// construction, so dirty state is cleared without a write-back.
    fn invalidate_in_lower_levels(&mut self, level_idx: usize, addr: u64) {
        if level_idx >= self.levels.len() {
            return;
        }

        if let Some((set, way)) = self.levels[level_idx].lookup(addr) {
            self.log(format_args!(
                "L{} Exclusive Invalidate: addr={:#x}",
                level_idx + 1,
                addr
            ));
            let line = self.levels[level_idx].line_mut(set, way);
            line.valid = false;
            line.dirty = false;
        }

        self.invalidate_in_lower_levels(level_idx + 1, addr)
    }

    /// CLDEMOTE hint: pushes the line holding `addr` out of L1.
    ///
    /// No-op without caches or on an L1 miss. Under the inclusive policy the
    /// L1 copy is dropped (deeper copies remain); under the exclusive policy
    /// the eviction path moves the line down to L2.
    pub fn demote(&mut self, addr: u64) -> Result<(), Fault> {
        if self.levels.is_empty() {
            return Ok(());
        }

        self.current_cycle += 1;
        self.log(format_args!("CLDEMOTE: addr={:#x}", addr));

        let Some((set, way)) = self.levels[0].lookup(addr) else {
            self.log(format_args!("CLDEMOTE: L1 Miss, no action."));
            return Ok(());
        };

        let line = self.levels[0].line(set, way).clone();
        let line_addr = self.levels[0].addr_of(line.tag, set);
        let mut dummy_latency = 0;

        match self.inclusion {
            InclusionPolicy::Inclusive => {
                self.log(format_args!("CLDEMOTE: Inclusive policy, evicting from L1."));
            }
            InclusionPolicy::Exclusive => {
                self.log(format_args!("CLDEMOTE: Exclusive policy, moving from L1 to L2."));
            }
        }
        self.evict(0, &line, line_addr, &mut dummy_latency)?;
        self.levels[0].line_mut(set, way).valid = false;
        Ok(())
    }

    /// Reads from the backing store below the last level.
    fn read_from_memory(&mut self, addr: u64, out: &mut [u8], latency: &mut u64) -> Result<(), Fault> {
        self.log(format_args!("Memory Read: addr={:#x}", addr));
        if self.enable_latency {
            *latency += self.memory_latency;
        }
        self.backing.read_span(addr, out)
    }

    /// Writes to the backing store below the last level.
    fn write_to_memory(&mut self, addr: u64, input: &[u8], latency: &mut u64) -> Result<(), Fault> {
        self.log(format_args!("Memory Write: addr={:#x}", addr));
        if self.enable_latency {
            *latency += self.memory_latency;
        }
        self.backing.write_span(addr, input)
    }

    /// Appends one stamped event line to the trace file, if tracing is on.
    fn log(&mut self, message: std::fmt::Arguments<'_>) {
        if let Some(file) = &mut self.trace {
            writeln!(file, "[Cycle {}] {}", self.current_cycle, message).ok();
        }
    }

    /// Prints the per-level statistics report.
    pub fn print_statistics(&self) {
        println!("---------- CACHE STATISTICS ----------");
        println!(
            "Global Policies: Inclusion={}, Write={}",
            match self.inclusion {
                InclusionPolicy::Inclusive => "Inclusive",
                InclusionPolicy::Exclusive => "Exclusive",
            },
            match self.write_policy {
                WritePolicy::Wbwa => "WBWA",
            }
        );

        for (i, level) in self.levels.iter().enumerate() {
            let stats = &level.stats;
            let hit_rate = if stats.accesses == 0 {
                0.0
            } else {
                stats.hits as f64 / stats.accesses as f64
            };
            println!(
                "L{} Cache ({}B, {}-way, {}B line, {} cycles, {})",
                i + 1,
                level.config.size,
                level.config.associativity,
                level.config.line_size,
                level.config.latency,
                match level.config.replacement_policy {
                    ReplacementPolicy::Lru => "LRU",
                    ReplacementPolicy::Random => "Random",
                }
            );
            println!(
                "\tAccesses: {}\n\tHits: {}\n\tMisses: {}\n\tHit Rate: {:.2}%",
                stats.accesses,
                stats.hits,
                stats.misses,
                hit_rate * 100.0
            );
            println!("\tEvictions: {}\n\tWritebacks: {}", stats.evictions, stats.writebacks);
        }
        println!("--------------------------------------");
    }
}
