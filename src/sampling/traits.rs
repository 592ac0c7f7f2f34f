//! Traits for Monte Carlo sampling.

/// Trait for computing the energy estimator of the current configuration.
pub trait EnergyCalculator {
    fn local_energy(&self) -> f64;
}
