//! Internal phonon propagators and the proposal distribution that creates them.

use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// An internal phonon line, stored as a pair of scaled times in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Phonon {
    /// Time at which the phonon is emitted
    pub gen_time: f64,
    /// Time at which the phonon is absorbed, never before `gen_time`
    pub rem_time: f64,
}

impl Phonon {
    /// Length of the propagator on the scaled time axis.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.rem_time - self.gen_time
    }
}

/// Proposal distribution for new phonon lines.
///
/// `gen_time ~ U(0, 1)` followed by `rem_time ~ U(gen_time, 1)`, so the
/// proposal density of a phonon is `1 / (1 - gen_time)`.
#[derive(Copy, Clone, Debug, Default)]
pub struct PhononFactory;

impl PhononFactory {
    pub fn new() -> Self {
        Self
    }

    /// Draw a new phonon from the proposal distribution.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Phonon {
        // gen_time < 1, so the second range is never empty
        let gen_time = Uniform::new(0.0, 1.0).sample(rng);
        let rem_time = Uniform::new(gen_time, 1.0).sample(rng);
        Phonon { gen_time, rem_time }
    }

    /// Proposal density of `phonon` under this factory.
    pub fn density(&self, phonon: &Phonon) -> f64 {
        1.0 / (1.0 - phonon.gen_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generated_times_are_ordered() {
        let factory = PhononFactory::new();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10_000 {
            let p = factory.generate(&mut rng);
            assert!((0.0..=1.0).contains(&p.gen_time));
            assert!((0.0..=1.0).contains(&p.rem_time));
            assert!(p.gen_time <= p.rem_time);
            assert!(p.duration() >= 0.0);
        }
    }

    #[test]
    fn test_gen_time_is_uniform() {
        let factory = PhononFactory::new();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let n = 200_000;
        let mean = (0..n).map(|_| factory.generate(&mut rng).gen_time).sum::<f64>() / n as f64;
        assert_relative_eq!(mean, 0.5, epsilon = 1e-2);
    }

    #[test]
    fn test_density() {
        let factory = PhononFactory::new();
        let p = Phonon { gen_time: 0.75, rem_time: 0.9 };
        assert_relative_eq!(factory.density(&p), 4.0, epsilon = 1e-12);
    }
}
