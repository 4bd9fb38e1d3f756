//! Memory hierarchy.
//!
//! This module provides:
//! 1. **Backing store:** A flat, bounds-checked byte array.
//! 2. **Tiered cache:** The multi-level hierarchy in front of the store.
//! 3. **Memory manager:** The single facade the rest of the simulator talks
//!    to, routing data accesses through the configured hierarchy while
//!    instruction fetch and syscall string reads bypass it.

/// Flat backing store.
pub mod backing;
/// Multi-level cache hierarchy.
pub mod cache;

use crate::common::Fault;
use crate::config::{Config, ConfigError};
use backing::BackingStore;
use cache::TieredCache;

/// Storage behind the memory manager.
enum Backend {
    /// Flat backing store only.
    Flat(BackingStore),
    /// Cache hierarchy over the backing store.
    Tiered(TieredCache),
}

/// Facade over the configured memory system.
///
/// Owns the backing store (directly or through the tiered cache). Data
/// accesses from the Memory stage travel through the hierarchy; instruction
/// fetches and the ECALL string reader go straight to the backing store, as
/// does the ELF loader.
pub struct MemoryManager {
    backend: Backend,
    enable_latency: bool,
    memory_latency: u64,
}

impl MemoryManager {
    /// Builds the memory system described by `config`.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let store = BackingStore::new(config.memory_size);
        let backend = if config.enable_cache {
            Backend::Tiered(TieredCache::new(config, store)?)
        } else {
            Backend::Flat(store)
        };
        Ok(Self {
            backend,
            enable_latency: config.enable_latency,
            memory_latency: config.memory_latency,
        })
    }

    /// Borrows the backing store, bypassing any cache levels.
    pub fn backing(&self) -> &BackingStore {
        match &self.backend {
            Backend::Flat(store) => store,
            Backend::Tiered(cache) => cache.backing(),
        }
    }

    /// Mutably borrows the backing store, bypassing any cache levels.
    ///
    /// Used by the loader and stack setup; these writes are architectural
    /// initialization and must not warm the caches or count in their stats.
    pub fn backing_mut(&mut self) -> &mut BackingStore {
        match &mut self.backend {
            Backend::Flat(store) => store,
            Backend::Tiered(cache) => cache.backing_mut(),
        }
    }

    /// Borrows the tiered cache, when one is configured.
    pub fn cache(&self) -> Option<&TieredCache> {
        match &self.backend {
            Backend::Flat(_) => None,
            Backend::Tiered(cache) => Some(cache),
        }
    }

    /// Fetches a 32-bit instruction word directly from the backing store.
    ///
    /// Instruction fetches bypass the data cache in this model.
    pub fn fetch_word(&self, addr: u64) -> Result<u32, Fault> {
        self.backing().read_word(addr)
    }

    /// Reads `out.len()` bytes at `addr` through the hierarchy.
    pub fn read_span(&mut self, addr: u64, out: &mut [u8]) -> Result<(), Fault> {
        match &mut self.backend {
            Backend::Flat(store) => store.read_span(addr, out),
            Backend::Tiered(cache) => cache.read_span(addr, out),
        }
    }

    /// Writes `input` at `addr` through the hierarchy.
    pub fn write_span(&mut self, addr: u64, input: &[u8]) -> Result<(), Fault> {
        match &mut self.backend {
            Backend::Flat(store) => store.write_span(addr, input),
            Backend::Tiered(cache) => cache.write_span(addr, input),
        }
    }

    /// Reads one byte through the hierarchy.
    pub fn get_byte(&mut self, addr: u64) -> Result<u8, Fault> {
        let mut buf = [0u8; 1];
        self.read_span(addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Reads a little-endian 16-bit value through the hierarchy.
    pub fn get_half(&mut self, addr: u64) -> Result<u16, Fault> {
        let mut buf = [0u8; 2];
        self.read_span(addr, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Reads a little-endian 32-bit value through the hierarchy.
    pub fn get_word(&mut self, addr: u64) -> Result<u32, Fault> {
        let mut buf = [0u8; 4];
        self.read_span(addr, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a little-endian 64-bit value through the hierarchy.
    pub fn get_long(&mut self, addr: u64) -> Result<u64, Fault> {
        let mut buf = [0u8; 8];
        self.read_span(addr, &mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Writes one byte through the hierarchy.
    pub fn set_byte(&mut self, addr: u64, value: u8) -> Result<(), Fault> {
        self.write_span(addr, &[value])
    }

    /// Writes a little-endian 16-bit value through the hierarchy.
    pub fn set_half(&mut self, addr: u64, value: u16) -> Result<(), Fault> {
        self.write_span(addr, &value.to_le_bytes())
    }

    /// Writes a little-endian 32-bit value through the hierarchy.
    pub fn set_word(&mut self, addr: u64, value: u32) -> Result<(), Fault> {
        self.write_span(addr, &value.to_le_bytes())
    }

    /// Writes a little-endian 64-bit value through the hierarchy.
    pub fn set_long(&mut self, addr: u64, value: u64) -> Result<(), Fault> {
        self.write_span(addr, &value.to_le_bytes())
    }

    /// CLDEMOTE hint; no-op without a cache.
    pub fn demote(&mut self, addr: u64) -> Result<(), Fault> {
        match &mut self.backend {
            Backend::Flat(_) => Ok(()),
            Backend::Tiered(cache) => cache.demote(addr),
        }
    }

    /// Latency of the most recent access, for informational accounting.
    pub fn last_access_latency(&self) -> u64 {
        match &self.backend {
            Backend::Tiered(cache) => cache.last_access_latency(),
            Backend::Flat(_) => {
                if self.enable_latency {
                    self.memory_latency
                } else {
                    1
                }
            }
        }
    }

    /// Prints cache statistics, when a hierarchy is configured.
    pub fn print_statistics(&self) {
        if let Backend::Tiered(cache) = &self.backend {
            cache.print_statistics();
        }
    }
}
