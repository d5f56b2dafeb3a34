//! The Alpha 21264 tournament predictor.

use crate::branch::Outcome;
use crate::history::ShiftRegister;
use crate::predictor::counter::NbitPredictor;
use crate::predictor::global::GlobalHistoryPredictor;
use crate::predictor::local::LocalHistoryPredictor;
use crate::predictor::DirectionPredictor;
use crate::stats::Accuracy;

/// The combined predictor of the Alpha 21264.
///
/// A 12-bit global history register indexes a 4K-entry choice table that
/// arbitrates between a local-history component (1K 10-bit histories into a
/// 1K-entry 3-bit pattern table) and a global-history component (4K 2-bit
/// counters).
pub struct Alpha21264Predictor {
    /// Global history over the last 12 outcomes
    pub ghr: ShiftRegister,

    /// Chooses between the two components, indexed by global history
    pub choice: NbitPredictor,

    /// Local-history component (pred0)
    pub lhp: LocalHistoryPredictor,

    /// Global-history component (pred1)
    pub ghp: GlobalHistoryPredictor,

    pred0: Outcome,
    pred1: Outcome,
    acc: Accuracy,
}

impl Alpha21264Predictor {
    pub fn new() -> Self {
        Self {
            ghr: ShiftRegister::new(12),
            choice: NbitPredictor::new(12, 2),
            lhp: LocalHistoryPredictor::with_pht(10, 10, 10, 3),
            ghp: GlobalHistoryPredictor::new(12, 2),
            pred0: Outcome::N,
            pred1: Outcome::N,
            acc: Accuracy::new(),
        }
    }
}

impl Default for Alpha21264Predictor {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectionPredictor for Alpha21264Predictor {
    fn name(&self) -> String {
        "Alpha21264".to_string()
    }

    fn predict(&mut self, pc: usize, target: usize) -> Outcome {
        let history = self.ghr.value();

        // The choice and the global component are both keyed by the
        // current global history, not by the program counter.
        let choice = self.choice.predict(history, 0);
        self.pred0 = self.lhp.predict(pc, target);
        self.pred1 = self.ghp.predict(history, target);

        if choice == Outcome::T { self.pred1 } else { self.pred0 }
    }

    fn update(&mut self, predicted: Outcome, actual: Outcome, pc: usize, target: usize) {
        // Steer the choice only when exactly one component was correct.
        // The direction bit is all that matters to the counter transition.
        if self.pred0 == actual && self.pred1 != actual {
            self.choice.update(predicted, Outcome::N, pc, target);
        }
        if self.pred0 != actual && self.pred1 == actual {
            self.choice.update(predicted, Outcome::T, pc, target);
        }

        // The global component is trained at the pre-shift history value
        let history = self.ghr.value();
        self.lhp.update(predicted, actual, pc, target);
        self.ghp.update(predicted, actual, history, target);

        self.ghr.shift_in(actual);
        self.acc.record(predicted, actual);
    }

    fn accuracy(&self) -> &Accuracy {
        &self.acc
    }
}
