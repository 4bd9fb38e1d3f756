//! Configuration system for the simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline constants (memory size, BHT size, memory latency, presets).
//! 2. **Structures:** The root `Config` plus per-level cache configuration.
//! 3. **Enums:** Write policy, inclusion policy, replacement policy, and predictor kind.
//! 4. **Validation:** Power-of-two geometry checks and cache spec parsing, raised as
//!    `ConfigError` before simulation starts.
//!
//! Configuration is built by the CLI from flags, or deserialized from a JSON file.

use serde::Deserialize;
use std::fmt;

/// Default configuration constants for the simulator.
mod defaults {
    /// Total backing store size (100 MiB).
    ///
    /// The stack occupies the top 1% of this region.
    pub const MEMORY_SIZE: usize = 100 * 1024 * 1024;

    /// Number of two-bit counters in the branch history table.
    pub const BHT_SIZE: usize = 16;

    /// Flat memory access latency in cycles (charged only when latency
    /// accounting is enabled).
    pub const MEMORY_LATENCY: u64 = 100;

    /// Default cache trace output path.
    pub const TRACE_FILE: &str = "cache.trace";

    /// The only supported pipeline organization.
    pub const PIPELINE_MODE: &str = "five-stage";
}

/// Write policy for the cache hierarchy.
///
/// Only write-back/write-allocate is modeled: dirty evictions write to the
/// next level, and write misses fetch the line before applying the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Write-back, write-allocate.
    #[default]
    Wbwa,
}

/// Inclusion policy shared by every level of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InclusionPolicy {
    /// A line resident at level k is resident at every level below it.
    #[default]
    Inclusive,
    /// A line is resident at exactly one level; victims are demoted, not dropped.
    Exclusive,
}

/// Victim selection algorithm for one cache level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacementPolicy {
    /// Least recently used (smallest timestamp).
    #[default]
    Lru,
    /// Uniform random over the ways.
    Random,
}

/// Branch direction predictor selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorKind {
    /// Always predict not-taken.
    #[default]
    #[serde(alias = "nt")]
    NotTaken,
    /// Always predict taken.
    #[serde(alias = "at")]
    Taken,
    /// Single global one-bit state.
    #[serde(alias = "1bit")]
    OneBit,
    /// Table of two-bit saturating counters indexed by `pc mod K`.
    #[serde(alias = "2bit")]
    TwoBit,
    /// Global-history single-layer perceptron.
    Perceptron,
}

impl PredictorKind {
    /// Parses the CLI spelling of a predictor kind.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "nt" => Ok(Self::NotTaken),
            "at" => Ok(Self::Taken),
            "1bit" => Ok(Self::OneBit),
            "2bit" => Ok(Self::TwoBit),
            "perceptron" => Ok(Self::Perceptron),
            other => Err(ConfigError::UnknownPredictor(other.to_string())),
        }
    }
}

/// Canned cache hierarchies selectable with `--cache_preset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePreset {
    /// No cache levels.
    #[default]
    None,
    /// A single L1.
    L1,
    /// L1 + L2.
    L1L2,
    /// L1 + L2 + L3.
    L1L2L3,
}

impl CachePreset {
    /// Parses the CLI spelling of a preset.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "none" => Ok(Self::None),
            "l1" => Ok(Self::L1),
            "l1l2" => Ok(Self::L1L2),
            "l1l2l3" => Ok(Self::L1L2L3),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// Returns the cache levels this preset stands for.
    ///
    /// The canonical hierarchy is 32 KiB 8-way L1, 256 KiB 8-way L2, and
    /// 8 MiB 16-way L3, all with 64-byte lines and LRU replacement.
    pub fn levels(self) -> Vec<CacheLevelConfig> {
        let table = [
            CacheLevelConfig::new(32 * 1024, 8, 64, 4, ReplacementPolicy::Lru),
            CacheLevelConfig::new(256 * 1024, 8, 64, 10, ReplacementPolicy::Lru),
            CacheLevelConfig::new(8 * 1024 * 1024, 16, 64, 40, ReplacementPolicy::Lru),
        ];
        let count = match self {
            Self::None => 0,
            Self::L1 => 1,
            Self::L1L2 => 2,
            Self::L1L2L3 => 3,
        };
        table[..count].to_vec()
    }
}

/// Geometry and timing for one cache level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheLevelConfig {
    /// Total capacity in bytes.
    pub size: usize,
    /// Number of ways per set.
    pub associativity: usize,
    /// Line size in bytes.
    pub line_size: usize,
    /// Access latency in cycles, charged on every touch of this level.
    pub latency: u64,
    /// Victim selection algorithm.
    #[serde(default)]
    pub replacement_policy: ReplacementPolicy,
}

impl CacheLevelConfig {
    /// Creates a cache level configuration.
    pub fn new(
        size: usize,
        associativity: usize,
        line_size: usize,
        latency: u64,
        replacement_policy: ReplacementPolicy,
    ) -> Self {
        Self {
            size,
            associativity,
            line_size,
            latency,
            replacement_policy,
        }
    }

    /// Parses a `SIZE,ASSOC,LINE,LATENCY,POLICY` cache level spec.
    ///
    /// `SIZE` accepts `K`/`M` suffixes (e.g. `32K,8,64,4,lru`); `POLICY` is
    /// `lru` or `random`.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let tokens: Vec<&str> = spec.split(',').map(str::trim).collect();
        if tokens.len() != 5 {
            return Err(ConfigError::BadCacheSpec(spec.to_string()));
        }

        let size = parse_size(tokens[0]).ok_or_else(|| ConfigError::BadCacheSpec(spec.to_string()))?;
        let associativity: usize = tokens[1]
            .parse()
            .map_err(|_| ConfigError::BadCacheSpec(spec.to_string()))?;
        let line_size: usize = tokens[2]
            .parse()
            .map_err(|_| ConfigError::BadCacheSpec(spec.to_string()))?;
        let latency: u64 = tokens[3]
            .parse()
            .map_err(|_| ConfigError::BadCacheSpec(spec.to_string()))?;
        let replacement_policy = match tokens[4] {
            "lru" => ReplacementPolicy::Lru,
            "random" => ReplacementPolicy::Random,
            other => return Err(ConfigError::UnknownReplacementPolicy(other.to_string())),
        };

        Ok(Self::new(size, associativity, line_size, latency, replacement_policy))
    }

    /// Validates that the level geometry is well formed.
    ///
    /// Size, associativity, and line size must be non-zero powers of two and
    /// must leave at least one set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_power_of_two("cache size", self.size)?;
        require_power_of_two("cache associativity", self.associativity)?;
        require_power_of_two("cache line size", self.line_size)?;
        let num_sets = self.size / (self.associativity * self.line_size);
        if num_sets == 0 {
            return Err(ConfigError::GeometryTooSmall {
                size: self.size,
                associativity: self.associativity,
                line_size: self.line_size,
            });
        }
        require_power_of_two("cache set count", num_sets)?;
        Ok(())
    }
}

/// Parses a byte count with an optional `K`/`M` suffix.
fn parse_size(s: &str) -> Option<usize> {
    let (digits, scale) = match *s.as_bytes().last()? {
        b'K' | b'k' => (&s[..s.len() - 1], 1024),
        b'M' | b'm' => (&s[..s.len() - 1], 1024 * 1024),
        _ => (s, 1),
    };
    digits.parse::<usize>().ok().map(|v| v * scale)
}

/// Returns an error unless `value` is a non-zero power of two.
fn require_power_of_two(what: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 || !value.is_power_of_two() {
        return Err(ConfigError::NotPowerOfTwo { what, value });
    }
    Ok(())
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use rvfive_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.memory_size, 100 * 1024 * 1024);
/// assert_eq!(config.bht_size, 16);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the RISC-V ELF binary to execute.
    #[serde(default)]
    pub input_file: String,

    /// Backing store size in bytes.
    #[serde(default = "Config::default_memory_size")]
    pub memory_size: usize,

    /// Pipeline organization; only `"five-stage"` is accepted.
    #[serde(default = "Config::default_pipeline_mode")]
    pub pipeline_mode: String,

    /// Emit per-stage commentary via the logging facade.
    #[serde(default)]
    pub verbose: bool,

    /// Pause after every cycle and wait for input.
    #[serde(default)]
    pub single_step: bool,

    /// Write the execution history to `dump.txt` at exit.
    #[serde(default)]
    pub dump_history: bool,

    /// Branch direction predictor.
    #[serde(default)]
    pub branch_predictor: PredictorKind,

    /// Number of counters in the two-bit predictor's table (0 falls back to 16).
    #[serde(default = "Config::default_bht_size")]
    pub bht_size: usize,

    /// Route data accesses through the cache hierarchy.
    #[serde(default)]
    pub enable_cache: bool,

    /// Write policy shared by every cache level.
    #[serde(default)]
    pub write_policy: WritePolicy,

    /// Inclusion policy shared by every cache level.
    #[serde(default)]
    pub inclusion_policy: InclusionPolicy,

    /// Cache levels, nearest first. Empty with `enable_cache` unset means no cache.
    #[serde(default)]
    pub cache_levels: Vec<CacheLevelConfig>,

    /// Charge the flat memory latency on accesses that reach the backing store.
    #[serde(default)]
    pub enable_latency: bool,

    /// Flat memory access latency in cycles.
    #[serde(default = "Config::default_memory_latency")]
    pub memory_latency: u64,

    /// Append cache events to the trace file.
    #[serde(default)]
    pub enable_trace: bool,

    /// Cache trace output path.
    #[serde(default = "Config::default_trace_file")]
    pub trace_output_file: String,
}

impl Config {
    /// Returns the default backing store size.
    fn default_memory_size() -> usize {
        defaults::MEMORY_SIZE
    }

    /// Returns the default pipeline mode string.
    fn default_pipeline_mode() -> String {
        defaults::PIPELINE_MODE.to_string()
    }

    /// Returns the default branch history table size.
    fn default_bht_size() -> usize {
        defaults::BHT_SIZE
    }

    /// Returns the default flat memory latency.
    fn default_memory_latency() -> u64 {
        defaults::MEMORY_LATENCY
    }

    /// Returns the default trace output path.
    fn default_trace_file() -> String {
        defaults::TRACE_FILE.to_string()
    }

    /// Validates the whole configuration.
    ///
    /// Checks the pipeline mode and every cache level's geometry. Called by
    /// the CLI before any simulation state is constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline_mode != defaults::PIPELINE_MODE {
            return Err(ConfigError::UnknownPipelineMode(self.pipeline_mode.clone()));
        }
        for level in &self.cache_levels {
            level.validate()?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: String::new(),
            memory_size: defaults::MEMORY_SIZE,
            pipeline_mode: defaults::PIPELINE_MODE.to_string(),
            verbose: false,
            single_step: false,
            dump_history: false,
            branch_predictor: PredictorKind::default(),
            bht_size: defaults::BHT_SIZE,
            enable_cache: false,
            write_policy: WritePolicy::default(),
            inclusion_policy: InclusionPolicy::default(),
            cache_levels: Vec::new(),
            enable_latency: false,
            memory_latency: defaults::MEMORY_LATENCY,
            enable_trace: false,
            trace_output_file: defaults::TRACE_FILE.to_string(),
        }
    }
}

/// Configuration errors raised before simulation starts.
///
/// Surfaced to the operator by the CLI, which exits with status 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A cache geometry parameter is zero or not a power of two.
    NotPowerOfTwo {
        /// Which parameter failed.
        what: &'static str,
        /// The offending value.
        value: usize,
    },
    /// The cache is too small for the requested associativity and line size.
    GeometryTooSmall {
        /// Total size in bytes.
        size: usize,
        /// Ways per set.
        associativity: usize,
        /// Line size in bytes.
        line_size: usize,
    },
    /// A `--cache_levels` spec did not parse.
    BadCacheSpec(String),
    /// Unknown replacement policy name.
    UnknownReplacementPolicy(String),
    /// Unknown branch predictor name.
    UnknownPredictor(String),
    /// Unknown cache preset name.
    UnknownPreset(String),
    /// Unsupported pipeline mode.
    UnknownPipelineMode(String),
    /// The cache trace file could not be created.
    TraceFile(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotPowerOfTwo { what, value } => {
                write!(f, "{} must be a power of two, got {}", what, value)
            }
            ConfigError::GeometryTooSmall {
                size,
                associativity,
                line_size,
            } => write!(
                f,
                "cache of {} bytes cannot hold a single {}-way set of {}-byte lines",
                size, associativity, line_size
            ),
            ConfigError::BadCacheSpec(spec) => write!(
                f,
                "invalid cache spec '{}', expected SIZE,ASSOC,LINE,LATENCY,POLICY",
                spec
            ),
            ConfigError::UnknownReplacementPolicy(name) => {
                write!(f, "unknown replacement policy '{}'", name)
            }
            ConfigError::UnknownPredictor(name) => {
                write!(f, "unknown branch predictor '{}'", name)
            }
            ConfigError::UnknownPreset(name) => write!(f, "unknown cache preset '{}'", name),
            ConfigError::UnknownPipelineMode(name) => {
                write!(f, "unknown pipeline mode '{}'", name)
            }
            ConfigError::TraceFile(detail) => {
                write!(f, "cannot create trace file {}", detail)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
