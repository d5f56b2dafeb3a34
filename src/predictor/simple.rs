
use crate::branch::Outcome;
use crate::predictor::DirectionPredictor;
use crate::stats::Accuracy;

/// A static predictor: always predict 'taken'.
pub struct AlwaysTakenPredictor {
    acc: Accuracy,
}
impl AlwaysTakenPredictor {
    pub fn new() -> Self {
        Self { acc: Accuracy::new() }
    }
}
impl Default for AlwaysTakenPredictor {
    fn default() -> Self {
        Self::new()
    }
}
impl DirectionPredictor for AlwaysTakenPredictor {
    fn name(&self) -> String {
        "Static AlwaysTaken".to_string()
    }
    fn predict(&mut self, _pc: usize, _target: usize) -> Outcome {
        Outcome::T
    }
    fn update(&mut self, predicted: Outcome, actual: Outcome, _pc: usize, _target: usize) {
        self.acc.record(predicted, actual);
    }
    fn accuracy(&self) -> &Accuracy {
        &self.acc
    }
}

/// A static predictor: backward branches are taken, forward branches are not.
pub struct BtfntPredictor {
    acc: Accuracy,
}
impl BtfntPredictor {
    pub fn new() -> Self {
        Self { acc: Accuracy::new() }
    }
}
impl Default for BtfntPredictor {
    fn default() -> Self {
        Self::new()
    }
}
impl DirectionPredictor for BtfntPredictor {
    fn name(&self) -> String {
        "Static BTFNT".to_string()
    }
    fn predict(&mut self, pc: usize, target: usize) -> Outcome {
        Outcome::from_bool(pc > target)
    }
    fn update(&mut self, predicted: Outcome, actual: Outcome, _pc: usize, _target: usize) {
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
    fn always_taken() {
        let mut p = AlwaysTakenPredictor::new();
        assert_eq!(p.predict(0x1000, 0x2000), Outcome::T);
        assert_eq!(p.predict(0x2000, 0x1000), Outcome::T);
    }

    #[test]
    fn btfnt_direction() {
        let mut p = BtfntPredictor::new();

        // Backward branch: predicted taken
        let pred = p.predict(0x1000, 0x0f00);
        assert_eq!(pred, Outcome::T);
        p.update(pred, Outcome::T, 0x1000, 0x0f00);

        // Forward branch: predicted not-taken
        let pred = p.predict(0x1000, 0x2000);
        assert_eq!(pred, Outcome::N);
        p.update(pred, Outcome::T, 0x1000, 0x2000);

        assert_eq!(p.accuracy().correct(), 1);
        assert_eq!(p.accuracy().incorrect(), 1);
        assert_eq!(p.accuracy().updates(), 2);
    }
}
