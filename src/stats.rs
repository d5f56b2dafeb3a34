//! Helpers for collecting statistics.

use std::collections::*;
use itertools::*;

use crate::branch::Outcome;

/// Correct/incorrect counters accumulated by a predictor.
#[derive(Clone, Copy, Debug, Default)]
pub struct Accuracy {
    correct: u64,
    incorrect: u64,
}
impl Accuracy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare a prediction against the resolved outcome.
    pub fn record(&mut self, predicted: Outcome, actual: Outcome) {
        self.record_hit(predicted == actual);
    }

    pub fn record_hit(&mut self, hit: bool) {
        if hit {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }

    pub fn correct(&self) -> u64 { self.correct }
    pub fn incorrect(&self) -> u64 { self.incorrect }

    /// Total number of recorded events.
    pub fn updates(&self) -> u64 {
        self.correct + self.incorrect
    }

    /// Fraction of correct predictions.
    pub fn hit_rate(&self) -> f64 {
        if self.updates() == 0 {
            return 0.0;
        }
        self.correct as f64 / self.updates() as f64
    }
}

/// Per-branch occurrence counts observed while replaying a trace.
pub struct BranchProfile {
    /// Per-branch data (indexed by program counter value).
    pub data: BTreeMap<usize, BranchData>,
}
impl BranchProfile {
    pub fn new() -> Self {
        Self { data: BTreeMap::new() }
    }

    pub fn record(&mut self, pc: usize, outcome: Outcome) {
        let data = self.data.entry(pc).or_insert(BranchData::new());
        data.occ += 1;
        if outcome == Outcome::T {
            data.taken += 1;
        }
    }

    /// Returns the number of unique observed branch instructions.
    pub fn num_unique_branches(&self) -> usize {
        self.data.len()
    }

    /// Returns the most frequently executed branches.
    pub fn most_executed(&self, n: usize) -> Vec<(usize, &BranchData)> {
        let iter = self.data.iter()
            .sorted_by(|x, y| { x.1.occ.cmp(&y.1.occ) })
            .rev()
            .take(n);
        iter.map(|(pc, s)| (*pc, s)).collect()
    }

    /// Returns branches without a strong bias in either direction.
    pub fn mixed_branches(&self, n: usize) -> Vec<(usize, &BranchData)> {
        let iter = self.data.iter()
            .filter(|(_, s)| {
                s.occ > 100 && s.taken_rate() > 0.2 && s.taken_rate() < 0.8
            })
            .sorted_by(|x, y| { x.1.occ.cmp(&y.1.occ) })
            .rev()
            .take(n);
        iter.map(|(pc, s)| (*pc, s)).collect()
    }
}

impl Default for BranchProfile {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for per-branch counts.
pub struct BranchData {
    /// Number of times this branch was encountered.
    pub occ: u64,

    /// Number of times this branch was taken.
    pub taken: u64,
}
impl BranchData {
    pub fn new() -> Self {
        Self { occ: 0, taken: 0 }
    }

    /// Fraction of executions where this branch was taken.
    pub fn taken_rate(&self) -> f64 {
        if self.occ == 0 {
            return 0.0;
        }
        self.taken as f64 / self.occ as f64
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accuracy_counts_updates() {
        let mut acc = Accuracy::new();
        acc.record(Outcome::T, Outcome::T);
        acc.record(Outcome::T, Outcome::N);
        acc.record(Outcome::N, Outcome::N);
        assert_eq!(acc.correct(), 2);
        assert_eq!(acc.incorrect(), 1);
        assert_eq!(acc.updates(), 3);
        assert!((acc.hit_rate() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn profile_orders_by_occurrence() {
        let mut profile = BranchProfile::new();
        for _ in 0..3 {
            profile.record(0x40, Outcome::T);
        }
        profile.record(0x80, Outcome::N);
        let top = profile.most_executed(2);
        assert_eq!(top[0].0, 0x40);
        assert_eq!(top[0].1.occ, 3);
        assert_eq!(top[0].1.taken, 3);
        assert_eq!(top[1].0, 0x80);
        assert_eq!(profile.num_unique_branches(), 2);
    }
}
