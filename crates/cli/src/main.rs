//! RISC-V five-stage pipeline simulator CLI.
//!
//! This binary is the single entry point for simulation. It performs:
//! 1. **Option parsing:** Flags for the pipeline, branch predictor, cache
//!    hierarchy, latency accounting, and tracing; or a JSON config file.
//! 2. **Setup:** Memory system construction and ELF loading.
//! 3. **Run loop:** Drives the pipeline until guest exit or a fatal fault
//!    (the pipeline itself reports statistics and dumps history on exit) and
//!    maps the outcome to the process exit status.
//!
//! Exit status is the guest's exit code on normal termination, or 1 on
//! configuration, loader, or runtime faults.

use clap::Parser;
use std::fs;
use std::process;

use rvfive_core::config::{CacheLevelConfig, CachePreset, Config, InclusionPolicy, PredictorKind};
use rvfive_core::sim::loader;
use rvfive_core::{MemoryManager, Pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "rvfive",
    author,
    version,
    about = "RISC-V five-stage pipeline simulator",
    long_about = "Cycle-accurate simulator for a user-mode RV64 core with a classic \
five-stage in-order pipeline and a configurable multi-level cache hierarchy.\n\n\
Examples:\n  rvfive -i tests/bin/quicksort.riscv\n  rvfive -i prog.riscv --branch_predictor 2bit --bht_size 64\n  rvfive -i prog.riscv --cache_preset l1l2 --inclusion_policy exclusive --enable_trace"
)]
struct Cli {
    /// RISC-V ELF binary file.
    #[arg(short, long)]
    input: Option<String>,

    /// JSON configuration file (flags other than -i are ignored when set).
    #[arg(long)]
    config: Option<String>,

    /// Memory size in bytes.
    #[arg(long = "memory_size")]
    memory_size: Option<usize>,

    /// Pipeline mode.
    #[arg(long = "pipeline_mode", default_value = "five-stage")]
    pipeline_mode: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Enable single-step execution.
    #[arg(short, long = "single_step")]
    single_step: bool,

    /// Dump execution history to dump.txt at exit.
    #[arg(short, long = "dump_history")]
    dump_history: bool,

    /// Branch predictor: nt, at, 1bit, 2bit, perceptron.
    #[arg(long = "branch_predictor", default_value = "nt")]
    branch_predictor: String,

    /// Branch history table size for the 2-bit predictor.
    #[arg(long = "bht_size")]
    bht_size: Option<usize>,

    /// Enable the cache hierarchy.
    #[arg(long = "enable_cache")]
    enable_cache: bool,

    /// Write policy: wbwa (write-back/write-allocate).
    #[arg(long = "write_policy", default_value = "wbwa", value_parser = ["wbwa"])]
    write_policy: String,

    /// Inclusion policy: inclusive or exclusive.
    #[arg(long = "inclusion_policy", default_value = "inclusive", value_parser = ["inclusive", "exclusive"])]
    inclusion_policy: String,

    /// Cache level spec SIZE,ASSOC,LINE,LATENCY,POLICY (repeat per level, e.g. 32K,8,64,4,lru).
    #[arg(long = "cache_levels")]
    cache_levels: Vec<String>,

    /// Cache preset: none, l1, l1l2, l1l2l3.
    #[arg(long = "cache_preset", default_value = "none")]
    cache_preset: String,

    /// Enable latency accounting for cache and memory.
    #[arg(long = "enable_latency")]
    enable_latency: bool,

    /// Plain memory access latency in cycles.
    #[arg(long = "memory_latency")]
    memory_latency: Option<u64>,

    /// Enable the cache event trace.
    #[arg(long = "enable_trace")]
    enable_trace: bool,

    /// Cache trace output file.
    #[arg(long = "trace", default_value = "cache.trace")]
    trace_output_file: String,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if cli.verbose { "debug" } else { "warn" },
    ))
    .format_timestamp(None)
    .init();

    let config = build_config(&cli).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    });

    if config.input_file.is_empty() {
        eprintln!("Error: specify an input ELF with -i/--input");
        process::exit(1);
    }

    let mut mem = MemoryManager::new(&config).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    });

    let entry_pc = loader::load_elf(&config.input_file, &mut mem, config.verbose)
        .unwrap_or_else(|e| {
            eprintln!("Failed to load {}: {}", config.input_file, e);
            process::exit(1);
        });

    let mut pipeline = Pipeline::new(&config, mem, entry_pc);

    match pipeline.run() {
        Ok(code) => process::exit(code),
        Err(fault) => {
            eprintln!("{}", fault);
            pipeline.dump_history();
            eprintln!("Execution history in dump.txt");
            process::exit(1);
        }
    }
}

/// Builds the simulator configuration from the command line.
///
/// With `--config` the JSON file supplies every setting and only `-i` is
/// merged on top. Otherwise flags are translated field by field; an explicit
/// `--cache_levels` spec wins over `--cache_preset`, and either implies
/// `--enable_cache`.
fn build_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if let Some(path) = &cli.config {
        let text = fs::read_to_string(path)?;
        serde_json::from_str::<Config>(&text)?
    } else {
        let mut config = Config::default();
        config.pipeline_mode = cli.pipeline_mode.clone();
        config.verbose = cli.verbose;
        config.single_step = cli.single_step;
        config.dump_history = cli.dump_history;
        config.branch_predictor = PredictorKind::parse(&cli.branch_predictor)?;
        if let Some(size) = cli.memory_size {
            config.memory_size = size;
        }
        if let Some(size) = cli.bht_size {
            config.bht_size = size;
        }

        config.inclusion_policy = match cli.inclusion_policy.as_str() {
            "exclusive" => InclusionPolicy::Exclusive,
            _ => InclusionPolicy::Inclusive,
        };

        if !cli.cache_levels.is_empty() {
            config.enable_cache = true;
            config.cache_levels = cli
                .cache_levels
                .iter()
                .map(|spec| CacheLevelConfig::parse(spec))
                .collect::<Result<Vec<_>, _>>()?;
        } else {
            let preset = CachePreset::parse(&cli.cache_preset)?;
            if cli.enable_cache || preset != CachePreset::None {
                config.enable_cache = true;
                config.cache_levels = preset.levels();
            }
        }

        config.enable_latency = cli.enable_latency;
        if let Some(latency) = cli.memory_latency {
            config.memory_latency = latency;
        }
        config.enable_trace = cli.enable_trace;
        config.trace_output_file = cli.trace_output_file.clone();
        config
    };

    if let Some(input) = &cli.input {
        config.input_file = input.clone();
    }

    config.validate()?;
    Ok(config)
}
