//! Sampling module - Markov chain over Feynman diagrams and its statistics.

mod traits;
mod weights;
mod moves;
mod chain;
mod statistics;
mod exponential;

pub use traits::EnergyCalculator;
pub use weights::{add_phonon_ratio, remove_phonon_ratio, change_tau_ratio, WeightError};
pub use moves::{metropolis_accept, Update};
pub use chain::{DiagrammaticMonteCarlo, StepOutcome};
pub use statistics::{autocorrelation_time, blocking_error, DiagramStatistics, Histogram, MoveCounter, MoveStatistics};
pub use exponential::ExponentialSampler;
