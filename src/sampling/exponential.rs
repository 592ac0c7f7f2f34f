//! Metropolis reconstruction of an exponentially decaying distribution.
//!
//! The single-variable version of the τ update: values are proposed uniformly
//! on `(0, max_value)` and accepted with probability `min(1, e^{-(x' - x)})`,
//! so the visited values follow `p(x) ∝ e^{-x}` restricted to that interval.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use super::moves::metropolis_accept;
use super::statistics::Histogram;

pub struct ExponentialSampler<R: Rng = ChaCha8Rng> {
    value: f64,
    max_value: f64,
    rng: R,
}

impl ExponentialSampler<ChaCha8Rng> {
    pub fn new(max_value: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(max_value, rng)
    }
}

impl<R: Rng> ExponentialSampler<R> {
    /// Start from a uniformly drawn value in `[0, max_value)`.
    pub fn with_rng(max_value: f64, mut rng: R) -> Self {
        let value = rng.gen_range(0.0..max_value);
        Self { value, max_value, rng }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Ratio of target densities `e^{-new} / e^{-current}`.
    fn detailed_balance(&self, new_value: f64) -> f64 {
        (self.value - new_value).exp()
    }

    /// One Metropolis update. Returns whether the proposal was accepted.
    pub fn step(&mut self) -> bool {
        let new_value = self.rng.gen_range(0.0..self.max_value);
        let ratio = self.detailed_balance(new_value);
        let accepted = metropolis_accept(ratio, &mut self.rng);
        if accepted {
            self.value = new_value;
        }
        accepted
    }

    /// Visited values of an `n_steps` long chain, starting value included.
    pub fn run(&mut self, n_steps: usize) -> Vec<f64> {
        let mut occurrences = Vec::with_capacity(n_steps);
        occurrences.push(self.value);
        for _ in 1..n_steps {
            self.step();
            occurrences.push(self.value);
        }
        occurrences
    }

    /// Density histogram of `occurrences` over the sampled interval.
    pub fn histogram(&self, occurrences: &[f64], n_bins: usize) -> Histogram {
        Histogram::from_samples(occurrences, 0.0, self.max_value, n_bins)
    }

    /// Target density `e^{-x} / (1 - e^{-max})`.
    pub fn target_density(&self, x: f64) -> f64 {
        (-x).exp() / (1.0 - (-self.max_value).exp())
    }
}
