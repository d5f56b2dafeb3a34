//! Event routing across the configured predictors and caches.

use std::io::{self, Write};

use crate::branch::Outcome;
use crate::cache::{AccessKind, DataCache};
use crate::predictor::{BtbPredictor, DirectionPredictor, ReturnAddressStack};

/// The registry of everything being evaluated over one trace.
///
/// Events arrive in trace order and drive a synchronous predict-then-update
/// transition in every registered component. Components never observe each
/// other's state.
pub struct Simulator {
    pub predictors: Vec<Box<dyn DirectionPredictor>>,
    pub btbs: Vec<BtbPredictor>,
    pub stacks: Vec<ReturnAddressStack>,
    pub caches: Vec<DataCache>,
    pub total_instructions: u64,
    pub total_cycles: u64,
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            predictors: Vec::new(),
            btbs: Vec::new(),
            stacks: Vec::new(),
            caches: Vec::new(),
            total_instructions: 0,
            total_cycles: 0,
        }
    }

    pub fn add_predictor(&mut self, p: Box<dyn DirectionPredictor>) {
        self.predictors.push(p);
    }
    pub fn add_btb(&mut self, btb: BtbPredictor) {
        self.btbs.push(btb);
    }
    pub fn add_stack(&mut self, ras: ReturnAddressStack) {
        self.stacks.push(ras);
    }
    pub fn add_cache(&mut self, cache: DataCache) {
        self.caches.push(cache);
    }

    pub fn on_instruction(&mut self) {
        self.total_instructions += 1;
    }

    /// Route a conditional branch to every direction predictor.
    pub fn on_conditional_branch(&mut self, pc: usize, target: usize, actual: Outcome) {
        for p in self.predictors.iter_mut() {
            let predicted = p.predict(pc, target);
            p.update(predicted, actual, pc, target);
        }
    }

    /// Route a branch (anything except a return) to every BTB.
    pub fn on_branch(&mut self, pc: usize, target: usize, actual: Outcome) {
        for btb in self.btbs.iter_mut() {
            let predicted = btb.predict(pc, target);
            btb.update(predicted, actual, pc, target);
        }
    }

    /// Route a call to every return-address stack.
    pub fn on_call(&mut self, pc: usize, _target: usize, insn_size: usize) {
        for ras in self.stacks.iter_mut() {
            ras.push(pc + insn_size);
        }
    }

    /// Route a return to every return-address stack.
    pub fn on_return(&mut self, _pc: usize, target: usize) {
        for ras in self.stacks.iter_mut() {
            ras.pop(target);
        }
    }

    /// Route a memory access to every cache.
    pub fn on_memory_access(&mut self, addr: usize, kind: AccessKind) {
        for cache in self.caches.iter_mut() {
            self.total_cycles += cache.access(addr, kind) as u64;
        }
    }

    /// Render the terminal report.
    pub fn write_report(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "Total Instructions: {}", self.total_instructions)?;
        if !self.caches.is_empty() {
            writeln!(w, "Total Cycles: {}", self.total_cycles)?;
        }
        writeln!(w)?;

        if !self.stacks.is_empty() {
            writeln!(w, "RAS: (Correct - Incorrect)")?;
            for ras in self.stacks.iter() {
                writeln!(
                    w,
                    "  {}: {} {}",
                    ras.name(),
                    ras.accuracy().correct(),
                    ras.accuracy().incorrect()
                )?;
            }
            writeln!(w)?;
        }

        if !self.predictors.is_empty() {
            writeln!(w, "Branch Predictors: (Name - Correct - Incorrect)")?;
            for p in self.predictors.iter() {
                writeln!(
                    w,
                    "  {}: {} {}",
                    p.name(),
                    p.accuracy().correct(),
                    p.accuracy().incorrect()
                )?;
            }
            writeln!(w)?;
        }

        if !self.btbs.is_empty() {
            writeln!(w, "BTB Predictors: (Name - Correct - Incorrect - TargetCorrect)")?;
            for btb in self.btbs.iter() {
                writeln!(
                    w,
                    "  {}: {} {} {}",
                    btb.name(),
                    btb.accuracy().correct(),
                    btb.accuracy().incorrect(),
                    btb.target_correct()
                )?;
            }
            writeln!(w)?;
        }

        for cache in self.caches.iter() {
            write!(w, "{}", cache.config_report())?;
            writeln!(w)?;
            write!(w, "{}", cache.stats_report())?;
        }
        Ok(())
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cache::{Replacement, TwoLevelCacheConfig};
    use crate::config::DirectionConfig;
    use rand::prelude::*;

    fn build() -> Simulator {
        let mut sim = Simulator::new();
        sim.add_predictor(DirectionConfig::AlwaysTaken.build());
        sim.add_predictor(DirectionConfig::Alpha21264.build());
        sim.add_predictor(
            DirectionConfig::Nbit { index_bits: 6, cntr_bits: 2, fsm: 2 }.build(),
        );
        sim.add_btb(BtbPredictor::new(16, 4));
        sim.add_stack(ReturnAddressStack::new(8));
        sim.add_cache(
            TwoLevelCacheConfig {
                l1_size: 1024,
                l1_block: 64,
                l1_assoc: 2,
                l2_size: 4096,
                l2_block: 64,
                l2_assoc: 4,
                l2_prefetch_lines: 0,
                replacement: Replacement::Lru,
                store_allocate: true,
                l2_inclusive: true,
                l1_hit_latency: 1,
                l2_hit_latency: 15,
                miss_latency: 250,
            }
            .build(),
        );
        sim
    }

    fn drive(sim: &mut Simulator, seed: u64, events: usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..events {
            sim.on_instruction();
            match rng.gen_range(0..4) {
                0 => {
                    let pc = rng.gen_range(0..0x100usize) << 2;
                    let target = rng.gen_range(0..0x100usize) << 2;
                    let actual = Outcome::from_bool(rng.gen());
                    sim.on_conditional_branch(pc, target, actual);
                    sim.on_branch(pc, target, actual);
                }
                1 => {
                    let pc = rng.gen_range(0..0x100usize) << 2;
                    sim.on_call(pc, pc + 0x40, 4);
                }
                2 => {
                    let pc = rng.gen_range(0..0x100usize) << 2;
                    sim.on_return(pc, pc + 4);
                }
                _ => {
                    let addr = rng.gen_range(0..0x4000usize) & !0x3;
                    let kind = if rng.gen() { AccessKind::Load } else { AccessKind::Store };
                    sim.on_memory_access(addr, kind);
                }
            }
        }
    }

    #[test]
    fn identical_streams_reproduce_identical_reports() {
        let mut a = build();
        let mut b = build();
        drive(&mut a, 0xfeed, 5000);
        drive(&mut b, 0xfeed, 5000);

        let mut ra = Vec::new();
        let mut rb = Vec::new();
        a.write_report(&mut ra).unwrap();
        b.write_report(&mut rb).unwrap();
        assert!(!ra.is_empty());
        assert_eq!(ra, rb);
    }

    #[test]
    fn accuracy_counters_account_every_event() {
        let mut sim = build();
        let mut rng = StdRng::seed_from_u64(7);
        let mut conditional = 0u64;
        for _ in 0..2000 {
            let pc = rng.gen_range(0..0x80usize) << 2;
            let target = rng.gen_range(0..0x80usize) << 2;
            let actual = Outcome::from_bool(rng.gen());
            sim.on_conditional_branch(pc, target, actual);
            sim.on_branch(pc, target, actual);
            conditional += 1;

            for p in sim.predictors.iter() {
                assert_eq!(p.accuracy().updates(), conditional);
            }
            for btb in sim.btbs.iter() {
                assert_eq!(btb.accuracy().updates(), conditional);
            }
        }
    }
}
