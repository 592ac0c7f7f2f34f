//! Polaron DMC - Diagrammatic Monte Carlo for the Holstein polaron in Rust
//!
//! This crate samples Feynman diagrams of variable order with a
//! Metropolis-Hastings chain and collects the statistics needed to estimate
//! the polaron energy and the imaginary-time Green's function.

pub mod diagram;
pub mod sampling;
pub mod io;

// Re-export commonly used types at crate root
pub use diagram::{Diagram, DiagramParams, Phonon, PhononFactory};
pub use sampling::{EnergyCalculator, DiagrammaticMonteCarlo, DiagramStatistics, ExponentialSampler, Histogram, StepOutcome, Update, WeightError};
pub use io::{read_config, ConfigError, SimulationConfig};
