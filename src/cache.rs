//! A two-level set-associative data cache.

pub mod set;
pub use set::*;

use std::fmt::Write;

/// Classification of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    Load = 0,
    Store = 1,
}
impl AccessKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Load => "Load",
            Self::Store => "Store",
        }
    }
}

/// Which per-set replacement bookkeeping the cache levels use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Replacement {
    Lru,
    Lfu,
}

/// Parameters for a [TwoLevelCache].
///
/// Setting a level's associativity to zero disables that level: it is
/// always treated as a miss and keeps no counters.
#[derive(Clone, Debug)]
pub struct TwoLevelCacheConfig {
    pub l1_size: usize,
    pub l1_block: usize,
    pub l1_assoc: usize,
    pub l2_size: usize,
    pub l2_block: usize,
    pub l2_assoc: usize,

    /// Accepted for configuration parity; exercises no behavior.
    pub l2_prefetch_lines: usize,

    pub replacement: Replacement,

    /// Install a line in L1 on a store miss.
    pub store_allocate: bool,

    /// Evictions from L2 invalidate any L1 lines they cover.
    pub l2_inclusive: bool,

    pub l1_hit_latency: u32,
    pub l2_hit_latency: u32,
    pub miss_latency: u32,
}

impl TwoLevelCacheConfig {
    pub fn build(self) -> DataCache {
        match self.replacement {
            Replacement::Lru => DataCache::Lru(TwoLevelCache::new(self)),
            Replacement::Lfu => DataCache::Lfu(TwoLevelCache::new(self)),
        }
    }

    fn level_sets(size: usize, block: usize, assoc: usize) -> usize {
        if assoc == 0 {
            return 0;
        }
        assert!(block.is_power_of_two());
        assert!(size % (assoc * block) == 0);
        let num_sets = size / (assoc * block);
        assert!(num_sets.is_power_of_two());
        num_sets
    }
}

/// A two-level cache with the replacement policy selected at build time.
pub enum DataCache {
    Lru(TwoLevelCache<LruSet>),
    Lfu(TwoLevelCache<LfuSet>),
}
impl DataCache {
    pub fn name(&self) -> String {
        match self {
            Self::Lru(c) => c.name(),
            Self::Lfu(c) => c.name(),
        }
    }
    pub fn access(&mut self, addr: usize, kind: AccessKind) -> u32 {
        match self {
            Self::Lru(c) => c.access(addr, kind),
            Self::Lfu(c) => c.access(addr, kind),
        }
    }
    pub fn config_report(&self) -> String {
        match self {
            Self::Lru(c) => c.config_report(),
            Self::Lfu(c) => c.config_report(),
        }
    }
    pub fn stats_report(&self) -> String {
        match self {
            Self::Lru(c) => c.stats_report(),
            Self::Lfu(c) => c.stats_report(),
        }
    }
}

/// An inclusive-capable L1/L2 data cache.
///
/// Both levels share one address-split scheme: the block offset is shifted
/// away, the low bits index the set, and the remainder is the tag.
pub struct TwoLevelCache<S: ReplacementSet> {
    pub cfg: TwoLevelCacheConfig,

    l1_line_shift: u32,
    l2_line_shift: u32,
    l1_sets: Vec<S>,
    l2_sets: Vec<S>,

    /// Hit/miss counts per access kind: `[kind][hit]`
    l1_access: [[u64; 2]; 2],
    l2_access: [[u64; 2]; 2],
}

impl<S: ReplacementSet> TwoLevelCache<S> {
    pub fn new(cfg: TwoLevelCacheConfig) -> Self {
        let l1_num_sets = TwoLevelCacheConfig::level_sets(cfg.l1_size, cfg.l1_block, cfg.l1_assoc);
        let l2_num_sets = TwoLevelCacheConfig::level_sets(cfg.l2_size, cfg.l2_block, cfg.l2_assoc);

        if l2_num_sets > 0 {
            assert!(cfg.l1_size <= cfg.l2_size);
            assert!(cfg.l1_block <= cfg.l2_block);
        }

        let l1_line_shift = if l1_num_sets > 0 { cfg.l1_block.ilog2() } else { 0 };
        let l2_line_shift = if l2_num_sets > 0 { cfg.l2_block.ilog2() } else { 0 };
        let l1_sets = (0..l1_num_sets).map(|_| S::new(cfg.l1_assoc)).collect();
        let l2_sets = (0..l2_num_sets).map(|_| S::new(cfg.l2_assoc)).collect();

        Self {
            cfg,
            l1_line_shift,
            l2_line_shift,
            l1_sets,
            l2_sets,
            l1_access: [[0; 2]; 2],
            l2_access: [[0; 2]; 2],
        }
    }

    pub fn name(&self) -> String {
        format!(
            "TwoLevelCache(L1={}KB/{}B/{}way, L2={}KB/{}B/{}way, {})",
            self.cfg.l1_size / 1024,
            self.cfg.l1_block,
            self.cfg.l1_assoc,
            self.cfg.l2_size / 1024,
            self.cfg.l2_block,
            self.cfg.l2_assoc,
            S::NAME,
        )
    }

    fn split(addr: usize, line_shift: u32, num_sets: usize) -> (usize, usize) {
        let block = addr >> line_shift;
        let idx = block & (num_sets - 1);
        let tag = block >> num_sets.trailing_zeros();
        (tag, idx)
    }

    /// Run one access through the hierarchy, returning the cycle cost.
    pub fn access(&mut self, addr: usize, kind: AccessKind) -> u32 {
        let mut cycles = self.cfg.l1_hit_latency;

        let l1_enabled = !self.l1_sets.is_empty();
        let (l1_tag, l1_idx) = if l1_enabled {
            Self::split(addr, self.l1_line_shift, self.l1_sets.len())
        } else {
            (0, 0)
        };
        let mut l1_hit = false;
        if l1_enabled {
            l1_hit = self.l1_sets[l1_idx].find(l1_tag);
            self.l1_access[kind as usize][l1_hit as usize] += 1;
        }
        if l1_hit {
            return cycles;
        }

        // L1 allocates on a load miss, and on a store miss only when
        // store-allocation is enabled.
        if l1_enabled && (kind == AccessKind::Load || self.cfg.store_allocate) {
            self.l1_sets[l1_idx].replace(l1_tag);
        }

        if self.l2_sets.is_empty() {
            // No second level: the miss goes straight to memory
            cycles += self.cfg.l2_hit_latency;
            cycles += self.cfg.miss_latency;
            return cycles;
        }

        let (l2_tag, l2_idx) = Self::split(addr, self.l2_line_shift, self.l2_sets.len());
        let l2_hit = self.l2_sets[l2_idx].find(l2_tag);
        self.l2_access[kind as usize][l2_hit as usize] += 1;
        cycles += self.cfg.l2_hit_latency;
        if l2_hit {
            return cycles;
        }

        // L2 always allocates on a miss
        let evicted = self.l2_sets[l2_idx].replace(l2_tag);
        cycles += self.cfg.miss_latency;

        if self.cfg.l2_inclusive {
            if let Some(victim) = evicted {
                self.invalidate_l1_span(victim, l2_idx);
            }
        }
        cycles
    }

    /// Remove every L1 line covered by an evicted L2 block.
    fn invalidate_l1_span(&mut self, victim_tag: usize, l2_idx: usize) {
        if self.l1_sets.is_empty() {
            return;
        }
        let l2_set_bits = self.l2_sets.len().trailing_zeros();
        let base = ((victim_tag << l2_set_bits) | l2_idx) << self.l2_line_shift;

        let mut offset = 0;
        while offset < self.cfg.l2_block {
            let (tag, idx) = Self::split(base + offset, self.l1_line_shift, self.l1_sets.len());
            self.l1_sets[idx].delete_if_present(tag);
            offset += self.cfg.l1_block;
        }
    }

    /// Check that every resident L1 line is covered by a resident L2 block.
    pub fn inclusion_holds(&self) -> bool {
        if self.l2_sets.is_empty() {
            return true;
        }
        for (idx, set) in self.l1_sets.iter().enumerate() {
            let l1_set_bits = self.l1_sets.len().trailing_zeros();
            for tag in set.tags() {
                let addr = ((tag << l1_set_bits) | idx) << self.l1_line_shift;
                let (l2_tag, l2_idx) = Self::split(addr, self.l2_line_shift, self.l2_sets.len());
                if !self.l2_sets[l2_idx].tags().contains(&l2_tag) {
                    return false;
                }
            }
        }
        true
    }

    /// Whether the L1 block covering an address is resident.
    pub fn contains_l1(&self, addr: usize) -> bool {
        if self.l1_sets.is_empty() {
            return false;
        }
        let (tag, idx) = Self::split(addr, self.l1_line_shift, self.l1_sets.len());
        self.l1_sets[idx].tags().contains(&tag)
    }

    pub fn l1_hits(&self, kind: AccessKind) -> u64 {
        self.l1_access[kind as usize][1]
    }
    pub fn l1_misses(&self, kind: AccessKind) -> u64 {
        self.l1_access[kind as usize][0]
    }
    pub fn l1_accesses(&self, kind: AccessKind) -> u64 {
        self.l1_hits(kind) + self.l1_misses(kind)
    }
    pub fn l2_hits(&self, kind: AccessKind) -> u64 {
        self.l2_access[kind as usize][1]
    }
    pub fn l2_misses(&self, kind: AccessKind) -> u64 {
        self.l2_access[kind as usize][0]
    }
    pub fn l2_accesses(&self, kind: AccessKind) -> u64 {
        self.l2_hits(kind) + self.l2_misses(kind)
    }

    pub fn l1_total_hits(&self) -> u64 {
        self.l1_hits(AccessKind::Load) + self.l1_hits(AccessKind::Store)
    }
    pub fn l1_total_misses(&self) -> u64 {
        self.l1_misses(AccessKind::Load) + self.l1_misses(AccessKind::Store)
    }
    pub fn l2_total_hits(&self) -> u64 {
        self.l2_hits(AccessKind::Load) + self.l2_hits(AccessKind::Store)
    }
    pub fn l2_total_misses(&self) -> u64 {
        self.l2_misses(AccessKind::Load) + self.l2_misses(AccessKind::Store)
    }

    /// Render the configuration in the style of the terminal report.
    pub fn config_report(&self) -> String {
        let mut out = String::new();
        let w = &mut out;
        let _ = writeln!(w, "--------");
        let _ = writeln!(w, "{}", self.name());
        let _ = writeln!(w, "--------");
        if !self.l1_sets.is_empty() {
            let _ = writeln!(w, "  L1-Data Cache:");
            let _ = writeln!(w, "    Size(KB):       {:>5}", self.cfg.l1_size / 1024);
            let _ = writeln!(w, "    Block Size(B):  {:>5}", self.cfg.l1_block);
            let _ = writeln!(w, "    Associativity:  {:>5}", self.cfg.l1_assoc);
            let _ = writeln!(w, "    Sets:           {:>5} - {}", self.l1_sets.len(), S::NAME);
            let _ = writeln!(w);
        }
        if !self.l2_sets.is_empty() {
            let _ = writeln!(w, "  L2-Data Cache:");
            let _ = writeln!(w, "    Size(KB):       {:>5}", self.cfg.l2_size / 1024);
            let _ = writeln!(w, "    Block Size(B):  {:>5}", self.cfg.l2_block);
            let _ = writeln!(w, "    Associativity:  {:>5}", self.cfg.l2_assoc);
            let _ = writeln!(w, "    Sets:           {:>5} - {}", self.l2_sets.len(), S::NAME);
            let _ = writeln!(w);
        }
        let _ = writeln!(
            w,
            "Latencies: {:>4} {:>4} {:>4}",
            self.cfg.l1_hit_latency, self.cfg.l2_hit_latency, self.cfg.miss_latency
        );
        let _ = writeln!(
            w,
            "Store allocation: {}",
            if self.cfg.store_allocate { "Yes" } else { "No" }
        );
        let _ = writeln!(
            w,
            "L2 inclusive: {}",
            if self.cfg.l2_inclusive { "Yes" } else { "No" }
        );
        let _ = writeln!(w, "L2 prefetch lines: {}", self.cfg.l2_prefetch_lines);
        out
    }

    fn stat_line(out: &mut String, label: &str, value: u64, percent: f64) {
        let _ = writeln!(out, "{:<19}{:>12}  {:>6.2}%", label, value, percent);
    }

    fn percent(part: u64, whole: u64) -> f64 {
        if whole == 0 {
            return 0.0;
        }
        100.0 * part as f64 / whole as f64
    }

    /// Render the per-level, per-kind hit/miss/access counts.
    pub fn stats_report(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "L1 Cache Stats:");
        for kind in [AccessKind::Load, AccessKind::Store] {
            let accesses = self.l1_accesses(kind);
            let label = format!("L1-{}", kind.label());
            Self::stat_line(
                &mut out,
                &format!("{}-Hits:", label),
                self.l1_hits(kind),
                Self::percent(self.l1_hits(kind), accesses),
            );
            Self::stat_line(
                &mut out,
                &format!("{}-Misses:", label),
                self.l1_misses(kind),
                Self::percent(self.l1_misses(kind), accesses),
            );
            Self::stat_line(
                &mut out,
                &format!("{}-Accesses:", label),
                accesses,
                if accesses == 0 { 0.0 } else { 100.0 },
            );
            let _ = writeln!(out);
        }
        let l1_total = self.l1_total_hits() + self.l1_total_misses();
        Self::stat_line(
            &mut out,
            "L1-Total-Hits:",
            self.l1_total_hits(),
            Self::percent(self.l1_total_hits(), l1_total),
        );
        Self::stat_line(
            &mut out,
            "L1-Total-Misses:",
            self.l1_total_misses(),
            Self::percent(self.l1_total_misses(), l1_total),
        );
        Self::stat_line(
            &mut out,
            "L1-Total-Accesses:",
            l1_total,
            if l1_total == 0 { 0.0 } else { 100.0 },
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "L2 Cache Stats:");
        for kind in [AccessKind::Load, AccessKind::Store] {
            let accesses = self.l2_accesses(kind);
            let label = format!("L2-{}", kind.label());
            Self::stat_line(
                &mut out,
                &format!("{}-Hits:", label),
                self.l2_hits(kind),
                Self::percent(self.l2_hits(kind), accesses),
            );
            Self::stat_line(
                &mut out,
                &format!("{}-Misses:", label),
                self.l2_misses(kind),
                Self::percent(self.l2_misses(kind), accesses),
            );
            Self::stat_line(
                &mut out,
                &format!("{}-Accesses:", label),
                accesses,
                if accesses == 0 { 0.0 } else { 100.0 },
            );
            let _ = writeln!(out);
        }
        let l2_total = self.l2_total_hits() + self.l2_total_misses();
        Self::stat_line(
            &mut out,
            "L2-Total-Hits:",
            self.l2_total_hits(),
            Self::percent(self.l2_total_hits(), l2_total),
        );
        Self::stat_line(
            &mut out,
            "L2-Total-Misses:",
            self.l2_total_misses(),
            Self::percent(self.l2_total_misses(), l2_total),
        );
        Self::stat_line(
            &mut out,
            "L2-Total-Accesses:",
            l2_total,
            if l2_total == 0 { 0.0 } else { 100.0 },
        );
        let _ = writeln!(out);
        out
    }
}
