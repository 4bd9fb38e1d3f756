//! One set-associative cache level.
//!
//! This module holds the storage structures of a single level:
//! 1. **Lines:** valid/dirty bits, tag, data bytes, and an LRU timestamp.
//! 2. **Sets:** exactly `associativity` lines with lookup and victim search.
//! 3. **Level:** address partitioning into (tag, index, offset) and the
//!    per-level hit/miss/eviction counters.
//!
//! Geometry is validated at construction: sizes must be powers of two, and
//! the level must hold at least one set.

use crate::config::{CacheLevelConfig, ConfigError, ReplacementPolicy};

/// Per-level access counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total lookups at this level.
    pub accesses: u64,
    /// Lookups that found the line resident.
    pub hits: u64,
    /// Lookups that missed.
    pub misses: u64,
    /// Valid lines displaced from this level.
    pub evictions: u64,
    /// Dirty evictions written to the next level or the backing store.
    pub writebacks: u64,
}

/// A single cache line.
#[derive(Clone, Debug)]
pub struct CacheLine {
    /// The line holds live data.
    pub valid: bool,
    /// The line has been written since it was filled.
    pub dirty: bool,
    /// Address tag.
    pub tag: u64,
    /// Line data (`line_size` bytes).
    pub data: Vec<u8>,
    /// Cycle of the most recent touch, used by LRU victim selection.
    pub lru_timestamp: u64,
}

impl CacheLine {
    /// Creates an invalid line with `line_size` zeroed data bytes.
    fn new(line_size: usize) -> Self {
        Self {
            valid: false,
            dirty: false,
            tag: 0,
            data: vec![0; line_size],
            lru_timestamp: 0,
        }
    }
}

/// A set of `associativity` lines.
#[derive(Clone, Debug)]
pub struct CacheSet {
    lines: Vec<CacheLine>,
}

impl CacheSet {
    /// Creates a set of invalid lines.
    fn new(associativity: usize, line_size: usize) -> Self {
        Self {
            lines: (0..associativity).map(|_| CacheLine::new(line_size)).collect(),
        }
    }

    /// Returns the way holding `tag`, if resident.
    fn find(&self, tag: u64) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }
}

/// Seed for the xorshift state of random victim selection.
const LFSR_SEED: u64 = 123_456_789;

/// One set-associative cache level.
pub struct CacheLevel {
    /// Geometry and timing for this level.
    pub config: CacheLevelConfig,
    /// Hit/miss/eviction counters.
    pub stats: CacheStats,
    sets: Vec<CacheSet>,
    num_sets: usize,
    index_bits: u32,
    offset_bits: u32,
    lfsr: u64,
}

/// Returns `log2(val)`, failing unless `val` is a non-zero power of two.
fn checked_log2(what: &'static str, val: usize) -> Result<u32, ConfigError> {
    if val == 0 || !val.is_power_of_two() {
        return Err(ConfigError::NotPowerOfTwo { what, value: val });
    }
    Ok(val.trailing_zeros())
}

impl CacheLevel {
    /// Builds a level from its configuration, validating the geometry.
    pub fn new(config: CacheLevelConfig) -> Result<Self, ConfigError> {
        let offset_bits = checked_log2("cache line size", config.line_size)?;
        checked_log2("cache size", config.size)?;
        checked_log2("cache associativity", config.associativity)?;

        let num_sets = config.size / (config.associativity * config.line_size);
        if num_sets == 0 {
            return Err(ConfigError::GeometryTooSmall {
                size: config.size,
                associativity: config.associativity,
                line_size: config.line_size,
            });
        }
        let index_bits = checked_log2("cache set count", num_sets)?;

        let sets = (0..num_sets)
            .map(|_| CacheSet::new(config.associativity, config.line_size))
            .collect();

        Ok(Self {
            config,
            stats: CacheStats::default(),
            sets,
            num_sets,
            index_bits,
            offset_bits,
            lfsr: LFSR_SEED,
        })
    }

    /// Number of sets at this level.
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Tag portion of `addr`.
    pub fn tag(&self, addr: u64) -> u64 {
        addr >> (self.index_bits + self.offset_bits)
    }

    /// Set index portion of `addr`.
    pub fn index(&self, addr: u64) -> usize {
        ((addr >> self.offset_bits) & (self.num_sets as u64 - 1)) as usize
    }

    /// Byte offset of `addr` within its line.
    pub fn offset(&self, addr: u64) -> usize {
        (addr & (self.config.line_size as u64 - 1)) as usize
    }

    /// Reconstructs the base address of the line at `(tag, index)`.
    pub fn addr_of(&self, tag: u64, index: usize) -> u64 {
        (tag << (self.index_bits + self.offset_bits)) | ((index as u64) << self.offset_bits)
    }

    /// Returns `(set, way)` of the line holding `addr`, if resident.
    pub fn lookup(&self, addr: u64) -> Option<(usize, usize)> {
        let index = self.index(addr);
        self.sets[index].find(self.tag(addr)).map(|way| (index, way))
    }

    /// Borrows the line at `(set, way)`.
    pub fn line(&self, set: usize, way: usize) -> &CacheLine {
        &self.sets[set].lines[way]
    }

    /// Mutably borrows the line at `(set, way)`.
    pub fn line_mut(&mut self, set: usize, way: usize) -> &mut CacheLine {
        &mut self.sets[set].lines[way]
    }

    /// Bumps the line's LRU timestamp (no-op under random replacement).
    pub fn touch(&mut self, set: usize, way: usize, cycle: u64) {
        if self.config.replacement_policy == ReplacementPolicy::Lru {
            self.sets[set].lines[way].lru_timestamp = cycle;
        }
    }

    /// Selects a victim way in `set`, preferring invalid lines.
    ///
    /// Valid victims are chosen by the replacement policy: the smallest LRU
    /// timestamp, or a xorshift-generated uniform pick.
    fn find_victim(&mut self, set: usize) -> usize {
        if let Some(way) = self.sets[set].lines.iter().position(|line| !line.valid) {
            return way;
        }

        match self.config.replacement_policy {
            ReplacementPolicy::Random => {
                let mut x = self.lfsr;
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                self.lfsr = x;
                (x as usize) % self.config.associativity
            }
            ReplacementPolicy::Lru => {
                let lines = &self.sets[set].lines;
                let mut victim = 0;
                for way in 1..lines.len() {
                    if lines[way].lru_timestamp < lines[victim].lru_timestamp {
                        victim = way;
                    }
                }
                victim
            }
        }
    }

    /// Installs a fresh line for `addr`, returning the chosen way and a
    /// snapshot of the displaced valid victim, if any.
    ///
    /// The victim's bytes are extracted before the new tag lands so the
    /// caller can run eviction processing on the snapshot. The new line is
    /// valid, clean, and zero-filled until the caller copies the fetched
    /// data in.
    pub fn allocate(&mut self, addr: u64, cycle: u64) -> (usize, usize, Option<CacheLine>) {
        let index = self.index(addr);
        let tag = self.tag(addr);
        let way = self.find_victim(index);

        let line = &mut self.sets[index].lines[way];
        let victim = if line.valid { Some(line.clone()) } else { None };

        line.valid = true;
        line.dirty = false;
        line.tag = tag;
        line.data.fill(0);
        self.touch(index, way, cycle);

        (index, way, victim)
    }
}
