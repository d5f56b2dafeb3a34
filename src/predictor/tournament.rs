//! A tournament predictor arbitrating between two arbitrary predictors.

use crate::branch::Outcome;
use crate::predictor::counter::NbitPredictor;
use crate::predictor::DirectionPredictor;
use crate::stats::Accuracy;

/// A hybrid predictor: a 2-bit meta table selects between two owned
/// sub-predictors, and is steered toward whichever one was correct when
/// they disagree with each other.
pub struct TournamentPredictor {
    meta_entry_bits: usize,
    pub meta: NbitPredictor,
    pub pred0: Box<dyn DirectionPredictor>,
    pub pred1: Box<dyn DirectionPredictor>,
    p0: Outcome,
    p1: Outcome,
    acc: Accuracy,
}

impl TournamentPredictor {
    pub fn new(
        meta_entry_bits: usize,
        pred0: Box<dyn DirectionPredictor>,
        pred1: Box<dyn DirectionPredictor>,
    ) -> Self {
        Self {
            meta_entry_bits,
            meta: NbitPredictor::new(meta_entry_bits, 2),
            pred0,
            pred1,
            p0: Outcome::N,
            p1: Outcome::N,
            acc: Accuracy::new(),
        }
    }
}

impl DirectionPredictor for TournamentPredictor {
    fn name(&self) -> String {
        format!(
            "Tournament(meta={}, {}, {})",
            1usize << self.meta_entry_bits,
            self.pred0.name(),
            self.pred1.name()
        )
    }

    fn predict(&mut self, pc: usize, target: usize) -> Outcome {
        // Both sub-predictions are computed up front so the meta update
        // later sees the pre-update outcomes.
        let choice = self.meta.predict(pc, target);
        self.p0 = self.pred0.predict(pc, target);
        self.p1 = self.pred1.predict(pc, target);

        if choice == Outcome::T { self.p1 } else { self.p0 }
    }

    fn update(&mut self, predicted: Outcome, actual: Outcome, pc: usize, target: usize) {
        if self.p0 == actual && self.p1 != actual {
            self.meta.update(predicted, Outcome::N, pc, target);
        }
        if self.p0 != actual && self.p1 == actual {
            self.meta.update(predicted, Outcome::T, pc, target);
        }

        self.pred0.update(predicted, actual, pc, target);
        self.pred1.update(predicted, actual, pc, target);
        self.acc.record(predicted, actual);
    }

    fn accuracy(&self) -> &Accuracy {
        &self.acc
    }
}
