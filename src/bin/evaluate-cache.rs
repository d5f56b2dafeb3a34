//! Drive a two-level data cache with memory access traces.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use axon::cache::{Replacement, TwoLevelCacheConfig};
use axon::sim::Simulator;
use axon::trace::MemoryTrace;

#[derive(Parser)]
#[command(version, about = "Replay memory traces through a two-level cache")]
struct Cli {
    /// Memory trace files to replay
    #[arg(required = true)]
    traces: Vec<PathBuf>,

    /// Maximum number of records to replay per trace
    #[arg(long)]
    limit: Option<usize>,

    /// L1 capacity in bytes
    #[arg(long, default_value_t = 32 * 1024)]
    l1_size: usize,
    /// L1 block size in bytes
    #[arg(long, default_value_t = 64)]
    l1_block: usize,
    /// L1 associativity (0 disables the level)
    #[arg(long, default_value_t = 8)]
    l1_assoc: usize,

    /// L2 capacity in bytes
    #[arg(long, default_value_t = 1024 * 1024)]
    l2_size: usize,
    /// L2 block size in bytes
    #[arg(long, default_value_t = 128)]
    l2_block: usize,
    /// L2 associativity (0 disables the level)
    #[arg(long, default_value_t = 16)]
    l2_assoc: usize,

    /// Reserved prefetch knob, reported but inert
    #[arg(long, default_value_t = 0)]
    l2_prefetch_lines: usize,

    /// Per-set replacement policy
    #[arg(long, value_enum, default_value_t = ReplacementCli::Lru)]
    replacement: ReplacementCli,

    /// Do not install L1 lines on store misses
    #[arg(long)]
    store_no_allocate: bool,

    /// Do not back-invalidate L1 on L2 evictions
    #[arg(long)]
    non_inclusive: bool,

    #[arg(long, default_value_t = 1)]
    l1_hit_latency: u32,
    #[arg(long, default_value_t = 15)]
    l2_hit_latency: u32,
    #[arg(long, default_value_t = 250)]
    miss_latency: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReplacementCli {
    Lru,
    Lfu,
}

impl From<ReplacementCli> for Replacement {
    fn from(value: ReplacementCli) -> Self {
        match value {
            ReplacementCli::Lru => Replacement::Lru,
            ReplacementCli::Lfu => Replacement::Lfu,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let cfg = TwoLevelCacheConfig {
        l1_size: args.l1_size,
        l1_block: args.l1_block,
        l1_assoc: args.l1_assoc,
        l2_size: args.l2_size,
        l2_block: args.l2_block,
        l2_assoc: args.l2_assoc,
        l2_prefetch_lines: args.l2_prefetch_lines,
        replacement: args.replacement.into(),
        store_allocate: !args.store_no_allocate,
        l2_inclusive: !args.non_inclusive,
        l1_hit_latency: args.l1_hit_latency,
        l2_hit_latency: args.l2_hit_latency,
        miss_latency: args.miss_latency,
    };

    for path in &args.traces {
        let trace = MemoryTrace::from_file(path)?;
        log::info!("loaded {} ({} records)", trace.name(), trace.num_entries());
        println!("[*] {} ({} records)", trace.name(), trace.num_entries());

        let records = match args.limit {
            Some(limit) => trace.as_slice_trunc(limit),
            None => trace.as_slice(),
        };

        let mut sim = Simulator::new();
        sim.add_cache(cfg.clone().build());
        for record in records {
            sim.on_instruction();
            sim.on_memory_access(record.addr, record.kind());
        }

        sim.write_report(&mut io::stdout().lock())?;
    }

    Ok(())
}
