//! A two-level predictor keyed by global branch history.

use crate::branch::Outcome;
use crate::history::ShiftRegister;
use crate::predictor::counter::NbitPredictor;
use crate::predictor::DirectionPredictor;
use crate::stats::Accuracy;

/// A global-history two-level predictor.
///
/// A single history register selects one of `2^nbit` counter tables; the
/// selected table is indexed by the program counter. The history length is
/// tied to the counter width by construction.
pub struct GlobalHistoryPredictor {
    entry_bits: usize,
    nbit: usize,
    pub bhr: ShiftRegister,
    pub tables: Vec<NbitPredictor>,
    acc: Accuracy,
}

impl GlobalHistoryPredictor {
    pub fn new(entry_bits: usize, nbit: usize) -> Self {
        let tables = (0..1usize << nbit)
            .map(|_| NbitPredictor::new(entry_bits, nbit))
            .collect();
        Self {
            entry_bits,
            nbit,
            bhr: ShiftRegister::new(nbit),
            tables,
            acc: Accuracy::new(),
        }
    }

    /// The current global history value.
    pub fn history(&self) -> usize {
        self.bhr.value()
    }
}

impl DirectionPredictor for GlobalHistoryPredictor {
    fn name(&self) -> String {
        format!(
            "GlobalHistory(entries={}, nbit={})",
            1usize << self.entry_bits,
            self.nbit
        )
    }

    fn predict(&mut self, pc: usize, target: usize) -> Outcome {
        // Select the table for the current history and predict
        let selected = self.bhr.value();
        self.tables[selected].predict(pc, target)
    }

    fn update(&mut self, predicted: Outcome, actual: Outcome, pc: usize, target: usize) {
        // Update the table that provided the prediction, then the history
        let selected = self.bhr.value();
        self.tables[selected].update(predicted, actual, pc, target);
        self.bhr.shift_in(actual);
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
    fn history_selects_the_table() {
        let mut p = GlobalHistoryPredictor::new(2, 2);
        assert_eq!(p.history(), 0);

        // The first update trains the history-0 table
        let pred = p.predict(0, 0);
        p.update(pred, Outcome::T, 0, 0);
        assert_eq!(p.tables[0].counter(0), 1);
        assert_eq!(p.history(), 0b10);

        // The next event reads the history-2 table, still untrained
        let pred = p.predict(0, 0);
        assert_eq!(pred, Outcome::N);
        p.update(pred, Outcome::T, 0, 0);
        assert_eq!(p.tables[0b10].counter(0), 1);
        assert_eq!(p.history(), 0b11);
    }

    #[test]
    fn repeated_history_trains_to_taken() {
        let mut p = GlobalHistoryPredictor::new(4, 2);
        // All-taken stream: history saturates at 0b11 and the corresponding
        // table saturates toward taken.
        for _ in 0..8 {
            let pred = p.predict(0x40, 0);
            p.update(pred, Outcome::T, 0x40, 0);
        }
        assert_eq!(p.history(), 0b11);
        assert_eq!(p.predict(0x40, 0), Outcome::T);
        assert_eq!(p.accuracy().updates(), 8);
    }
}
