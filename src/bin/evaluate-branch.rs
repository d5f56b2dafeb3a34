//! Evaluate the reference predictor roster against branch traces.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use axon::config;
use axon::sim::Simulator;
use axon::stats::BranchProfile;
use axon::trace::BranchTrace;

#[derive(Parser)]
#[command(version, about = "Replay branch traces through the predictor roster")]
struct Cli {
    /// Branch trace files to replay
    #[arg(required = true)]
    traces: Vec<PathBuf>,

    /// Maximum number of records to replay per trace
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print a per-branch profile of each trace
    #[arg(long)]
    profile: bool,
}

fn build_simulator() -> Simulator {
    let mut sim = Simulator::new();
    for cfg in config::reference_predictors() {
        sim.add_predictor(cfg.build());
    }
    for cfg in config::reference_btbs() {
        sim.add_btb(cfg.build());
    }
    for cfg in config::reference_stacks() {
        sim.add_stack(cfg.build());
    }
    sim
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    for path in &args.traces {
        let trace = BranchTrace::from_file(path)?;
        log::info!("loaded {} ({} records)", trace.name(), trace.num_entries());
        println!("[*] {} ({} records)", trace.name(), trace.num_entries());

        let records = match args.limit {
            Some(limit) => trace.as_slice_trunc(limit),
            None => trace.as_slice(),
        };

        let mut sim = build_simulator();
        let mut profile = BranchProfile::new();
        for record in records {
            sim.on_instruction();
            if record.is_conditional() {
                sim.on_conditional_branch(record.pc, record.tgt, record.outcome());
                if args.profile {
                    profile.record(record.pc, record.outcome());
                }
            }
            if record.is_call() {
                sim.on_call(record.pc, record.tgt, record.ilen());
            }
            if record.is_return() {
                sim.on_return(record.pc, record.tgt);
            } else {
                sim.on_branch(record.pc, record.tgt, record.outcome());
            }
        }

        sim.write_report(&mut io::stdout().lock())?;

        if args.profile {
            println!("Unique branches: {}", profile.num_unique_branches());
            println!("Most executed:");
            for (pc, data) in profile.most_executed(8) {
                println!(
                    "  {:016x} {:10} executions, {:.2}% taken",
                    pc,
                    data.occ,
                    data.taken_rate() * 100.0
                );
            }
            println!("Mixed-direction branches:");
            for (pc, data) in profile.mixed_branches(8) {
                println!(
                    "  {:016x} {:10} executions, {:.2}% taken",
                    pc,
                    data.occ,
                    data.taken_rate() * 100.0
                );
            }
            println!();
        }
    }

    Ok(())
}
