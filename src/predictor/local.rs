//! A two-level predictor keyed by per-branch local history.

use crate::branch::Outcome;
use crate::history::ShiftRegister;
use crate::predictor::counter::NbitPredictor;
use crate::predictor::DirectionPredictor;
use crate::stats::Accuracy;

/// A local-history two-level predictor.
///
/// A per-branch table of history registers (the BHT) feeds a single shared
/// pattern table (the PHT). The PHT index concatenates the low program
/// counter bits with the branch's recorded history:
///
/// ```text
///   index = (pc mod 2^(pht_entry_bits - bht_len)) << bht_len  |  history
/// ```
pub struct LocalHistoryPredictor {
    bht_entry_bits: usize,
    bht_len: usize,
    pht_entry_bits: usize,
    pub bht: Vec<ShiftRegister>,
    pub pht: NbitPredictor,
    acc: Accuracy,
}

impl LocalHistoryPredictor {
    /// Create a predictor with the default 8K-entry 2-bit PHT.
    pub fn new(bht_entry_bits: usize, bht_len: usize) -> Self {
        Self::with_pht(bht_entry_bits, bht_len, 13, 2)
    }

    pub fn with_pht(
        bht_entry_bits: usize,
        bht_len: usize,
        pht_entry_bits: usize,
        pht_cntr_bits: usize,
    ) -> Self {
        assert!(bht_len <= pht_entry_bits);
        let bht = (0..1usize << bht_entry_bits)
            .map(|_| ShiftRegister::new(bht_len))
            .collect();
        Self {
            bht_entry_bits,
            bht_len,
            pht_entry_bits,
            bht,
            pht: NbitPredictor::new(pht_entry_bits, pht_cntr_bits),
            acc: Accuracy::new(),
        }
    }

    fn bht_index(&self, pc: usize) -> usize {
        pc & ((1 << self.bht_entry_bits) - 1)
    }

    /// Concatenate the low pc bits with the branch's history.
    fn pht_index(&self, pc: usize) -> usize {
        let history = self.bht[self.bht_index(pc)].value();
        let pc_part = pc & ((1 << (self.pht_entry_bits - self.bht_len)) - 1);
        (pc_part << self.bht_len) | history
    }
}

impl DirectionPredictor for LocalHistoryPredictor {
    fn name(&self) -> String {
        format!(
            "LocalHistory(bht-entries={}, bht-len={})",
            1usize << self.bht_entry_bits,
            self.bht_len
        )
    }

    fn predict(&mut self, pc: usize, target: usize) -> Outcome {
        let index = self.pht_index(pc);
        self.pht.predict(index, target)
    }

    fn update(&mut self, predicted: Outcome, actual: Outcome, pc: usize, target: usize) {
        // The PHT index is formed from the history that was visible at
        // prediction time, before the new outcome is shifted in.
        let bht_index = self.bht_index(pc);
        let index = self.pht_index(pc);

        self.bht[bht_index].shift_in(actual);
        self.pht.update(predicted, actual, index, target);
        self.acc.record(predicted, actual);
    }

    fn accuracy(&self) -> &Accuracy {
        &self.acc
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pht_index_concatenates_pc_and_history() {
        let mut p = LocalHistoryPredictor::with_pht(2, 2, 4, 2);

        // pc = 0b101: bht entry 1, pc part 0b01, empty history
        let pred = p.predict(0b101, 0);
        assert_eq!(pred, Outcome::N);
        p.update(pred, Outcome::T, 0b101, 0);
        assert_eq!(p.pht.counter(0b0100), 1);
        assert_eq!(p.bht[1].value(), 0b10);

        // The next event for the same pc lands on a new pattern entry
        let pred = p.predict(0b101, 0);
        p.update(pred, Outcome::T, 0b101, 0);
        assert_eq!(p.pht.counter(0b0110), 1);
        assert_eq!(p.bht[1].value(), 0b11);
    }

    #[test]
    fn learns_an_alternating_branch() {
        let mut p = LocalHistoryPredictor::with_pht(4, 4, 8, 2);
        let pc = 0x24;
        let mut hits = 0;
        for i in 0..64u32 {
            let actual = Outcome::from_bool(i % 2 == 0);
            let pred = p.predict(pc, 0);
            if pred == actual {
                hits += 1;
            }
            p.update(pred, actual, pc, 0);
        }
        // Once each phase's pattern entry saturates, the branch is covered
        assert!(hits > 48, "only {} hits", hits);
        assert_eq!(p.accuracy().updates(), 64);
    }
}
