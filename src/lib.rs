
pub mod branch;
pub mod history;
pub mod stats;
pub mod predictor;
pub mod cache;
pub mod config;
pub mod sim;
pub mod trace;

pub use branch::*;
pub use history::*;
pub use stats::*;
pub use predictor::*;

