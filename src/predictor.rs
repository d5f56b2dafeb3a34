//! Implementations of different branch predictors.

pub mod simple;
pub mod counter;
pub mod global;
pub mod local;
pub mod alpha;
pub mod tournament;
pub mod btb;
pub mod ras;

pub use simple::*;
pub use counter::*;
pub use global::*;
pub use local::*;
pub use alpha::*;
pub use tournament::*;
pub use btb::*;
pub use ras::*;

use crate::branch::Outcome;
use crate::stats::Accuracy;

/// Interface to a conditional branch direction predictor.
///
/// For every branch event, `predict` runs before `update`, and `update`
/// receives the value that `predict` returned. Composite predictors compute
/// all of their sub-predictions before applying any sub-update, so the
/// states observed while choosing are the pre-update ones.
pub trait DirectionPredictor {
    /// A name derived from the predictor's parameters.
    fn name(&self) -> String;

    /// Return the predicted direction for a branch.
    fn predict(&mut self, pc: usize, target: usize) -> Outcome;

    /// Update the internal state of the predictor with the resolved outcome.
    fn update(&mut self, predicted: Outcome, actual: Outcome, pc: usize, target: usize);

    /// Accumulated prediction accuracy.
    fn accuracy(&self) -> &Accuracy;
}
