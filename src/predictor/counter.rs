//! Implementation of a table of saturating counters.

use crate::branch::Outcome;
use crate::predictor::DirectionPredictor;
use crate::stats::Accuracy;

/// A table of n-bit saturating counters indexed by the program counter.
///
/// The predicted direction is the most-significant bit of the selected
/// counter. The update rule is selected by `fsm`: rule 1 is the plain
/// saturating increment/decrement, rules 2-5 special-case transitions out
/// of the weak states of a 2-bit counter. Rules other than 1 are only
/// defined for 2-bit counters, so the table falls back to rule 1 for any
/// other counter width.
pub struct NbitPredictor {
    index_bits: usize,
    cntr_bits: usize,
    counter_max: u64,
    fsm: u8,
    table: Vec<u64>,
    acc: Accuracy,
}

impl NbitPredictor {
    pub fn new(index_bits: usize, cntr_bits: usize) -> Self {
        Self::with_fsm(index_bits, cntr_bits, 1)
    }

    pub fn with_fsm(index_bits: usize, cntr_bits: usize, fsm: u8) -> Self {
        assert!(index_bits < usize::BITS as usize);
        assert!(cntr_bits >= 1 && cntr_bits < 64);

        let mut fsm = fsm;
        if !(1..=5).contains(&fsm) {
            log::warn!("unknown counter update rule {}, falling back to rule 1", fsm);
            fsm = 1;
        }
        if cntr_bits != 2 {
            fsm = 1;
        }

        Self {
            index_bits,
            cntr_bits,
            counter_max: (1u64 << cntr_bits) - 1,
            fsm,
            table: vec![0; 1 << index_bits],
            acc: Accuracy::new(),
        }
    }

    fn index(&self, pc: usize) -> usize {
        pc & (self.table.len() - 1)
    }

    /// The update rule in effect for this table.
    pub fn fsm(&self) -> u8 {
        self.fsm
    }

    /// The raw value of a counter.
    pub fn counter(&self, idx: usize) -> u64 {
        self.table[self.index(idx)]
    }
}

impl DirectionPredictor for NbitPredictor {
    fn name(&self) -> String {
        let entries = (1u64 << self.index_bits) as f64 / 1024.0;
        let mut name = format!("Nbit-{}K-{}", entries, self.cntr_bits);
        if self.fsm > 1 {
            name.push_str(&format!(" (fsm={})", self.fsm));
        }
        name
    }

    fn predict(&mut self, pc: usize, _target: usize) -> Outcome {
        let value = self.table[self.index(pc)];
        Outcome::from_bool(value >> (self.cntr_bits - 1) != 0)
    }

    fn update(&mut self, predicted: Outcome, actual: Outcome, pc: usize, _target: usize) {
        let max = self.counter_max;
        let taken: bool = actual.into();
        let idx = self.index(pc);
        let s = &mut self.table[idx];
        match self.fsm {
            1 => {
                if taken {
                    if *s < max { *s += 1; }
                } else if *s > 0 {
                    *s -= 1;
                }
            }
            2 => {
                if taken {
                    if *s < max { *s += 1; }
                } else if *s == 2 {
                    // Weakly-taken drops straight to strongly-not-taken
                    *s = 0;
                } else if *s > 0 {
                    *s -= 1;
                }
            }
            3 => {
                if taken {
                    // Weakly-not-taken jumps straight to strongly-taken
                    if *s == 1 { *s = 3; } else if *s < max { *s += 1; }
                } else if *s > 0 {
                    *s -= 1;
                }
            }
            4 => {
                if taken {
                    if *s == 1 { *s = 3; } else if *s < max { *s += 1; }
                } else if *s == 2 {
                    *s = 0;
                } else if *s > 0 {
                    *s -= 1;
                }
            }
            5 => {
                if taken {
                    // Strongly-taken decays to weakly-taken even on a hit
                    if *s == 1 { *s = 3; } else if *s == 3 { *s = 2; } else if *s < max { *s += 1; }
                } else if *s > 0 {
                    *s -= 1;
                }
            }
            _ => unreachable!(),
        }
        self.acc.record(predicted, actual);
    }

    fn accuracy(&self) -> &Accuracy {
        &self.acc
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn rule_1_saturates() {
        let mut p = NbitPredictor::new(0, 2);
        let mut counters = Vec::new();
        let mut predictions = Vec::new();
        for _ in 0..4 {
            predictions.push(p.predict(0, 0));
            let pred = *predictions.last().unwrap();
            p.update(pred, Outcome::T, 0, 0);
            counters.push(p.counter(0));
        }
        assert_eq!(counters, vec![1, 2, 3, 3]);
        assert_eq!(predictions, vec![Outcome::N, Outcome::N, Outcome::T, Outcome::T]);
        assert_eq!(p.accuracy().correct(), 2);
        assert_eq!(p.accuracy().incorrect(), 2);
    }

    #[test]
    fn rule_2_resets_weakly_taken() {
        let mut p = NbitPredictor::with_fsm(0, 2, 2);
        // Walk the counter up to the weakly-taken state
        p.update(Outcome::N, Outcome::T, 0, 0);
        p.update(Outcome::N, Outcome::T, 0, 0);
        assert_eq!(p.counter(0), 2);

        let pred = p.predict(0, 0);
        assert_eq!(pred, Outcome::T);
        p.update(pred, Outcome::N, 0, 0);
        assert_eq!(p.counter(0), 0);
    }

    #[test]
    fn rule_3_promotes_weakly_not_taken() {
        let mut p = NbitPredictor::with_fsm(0, 2, 3);
        p.update(Outcome::N, Outcome::T, 0, 0);
        assert_eq!(p.counter(0), 1);
        p.update(Outcome::N, Outcome::T, 0, 0);
        assert_eq!(p.counter(0), 3);
    }

    #[test]
    fn rule_5_decays_strongly_taken() {
        let mut p = NbitPredictor::with_fsm(0, 2, 5);
        p.update(Outcome::N, Outcome::T, 0, 0);
        assert_eq!(p.counter(0), 1);
        p.update(Outcome::N, Outcome::T, 0, 0);
        assert_eq!(p.counter(0), 3);
        p.update(Outcome::T, Outcome::T, 0, 0);
        assert_eq!(p.counter(0), 2);
    }

    #[test]
    fn alternative_rules_require_two_bit_counters() {
        let p = NbitPredictor::with_fsm(4, 4, 3);
        assert_eq!(p.fsm(), 1);
        let p = NbitPredictor::with_fsm(4, 2, 9);
        assert_eq!(p.fsm(), 1);
        let p = NbitPredictor::with_fsm(4, 2, 4);
        assert_eq!(p.fsm(), 4);
    }

    #[test]
    fn taken_stream_saturates_any_width() {
        for cntr_bits in 1..=4 {
            let mut p = NbitPredictor::new(0, cntr_bits);
            for _ in 0..(1 << cntr_bits) {
                p.update(Outcome::N, Outcome::T, 0, 0);
            }
            assert_eq!(p.counter(0), (1 << cntr_bits) - 1);
            for _ in 0..8 {
                assert_eq!(p.predict(0, 0), Outcome::T);
                p.update(Outcome::T, Outcome::T, 0, 0);
                assert_eq!(p.counter(0), (1 << cntr_bits) - 1);
            }
        }
    }

    #[test]
    fn counters_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(0x1dea);
        for fsm in 1..=5u8 {
            let mut p = NbitPredictor::with_fsm(4, 2, fsm);
            for _ in 0..4096 {
                let pc: usize = rng.gen();
                let actual = Outcome::from_bool(rng.gen());
                let pred = p.predict(pc, 0);
                p.update(pred, actual, pc, 0);
                for idx in 0..16 {
                    assert!(p.counter(idx) <= 3);
                }
            }
        }
    }
}
