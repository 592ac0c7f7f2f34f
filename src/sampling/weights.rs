//! Acceptance ratios of the diagram updates.
//!
//! Each ratio is the product of the physical weight ratio between the proposed
//! and the current diagram and the ratio of reverse to forward proposal
//! probabilities. Ratios are non-negative by construction; a ratio that
//! evaluates to exactly zero or to a non-finite value is reported as an error
//! instead of being fed to the Metropolis test.

use thiserror::Error;
use crate::diagram::{Diagram, Phonon, PhononFactory};
use super::moves::Update;

/// Numeric failure while evaluating an acceptance ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WeightError {
    #[error("underflow in evaluating the {update} acceptance ratio")]
    NumericUnderflow { update: Update },
    #[error("overflow in evaluating the {update} acceptance ratio")]
    NumericOverflow { update: Update },
}

impl WeightError {
    /// Update whose ratio failed.
    pub fn update(&self) -> Update {
        match *self {
            WeightError::NumericUnderflow { update } | WeightError::NumericOverflow { update } => update,
        }
    }
}

/// Vertex factor (g τ)² contributed by one phonon line.
#[inline]
fn coupling_factor(diagram: &Diagram) -> f64 {
    (diagram.params().ep_coupling * diagram.time_scaling()).powi(2)
}

/// Ratio for inserting `phonon` into `diagram`.
///
/// Weight ratio `(g τ)² exp(-τ ω (t_rem - t_gen))`, proposal ratio
/// `(1 - t_gen) / (n + 1)`: the reverse move picks one of `n + 1` lines, the
/// forward move drew the phonon with the factory density `1 / (1 - t_gen)`.
pub fn add_phonon_ratio(
    diagram: &Diagram,
    phonon: &Phonon,
    factory: &PhononFactory,
) -> Result<f64, WeightError> {
    let tau = diagram.time_scaling();
    let propagator = (-tau * diagram.params().phonon_energy * phonon.duration()).exp();
    let proposal = 1.0 / (factory.density(phonon) * (diagram.order() + 1) as f64);
    let ratio = coupling_factor(diagram) * propagator * proposal;
    if !ratio.is_finite() {
        return Err(WeightError::NumericOverflow { update: Update::AddPhonon });
    }
    if ratio == 0.0 {
        return Err(WeightError::NumericUnderflow { update: Update::AddPhonon });
    }
    Ok(ratio)
}

/// Ratio for removing `phonon`, one of the lines currently in `diagram`.
pub fn remove_phonon_ratio(
    diagram: &Diagram,
    phonon: &Phonon,
    factory: &PhononFactory,
) -> Result<f64, WeightError> {
    let tau = diagram.time_scaling();
    let propagator = (tau * diagram.params().phonon_energy * phonon.duration()).exp();
    let proposal = diagram.order() as f64 * factory.density(phonon);
    let ratio = propagator / coupling_factor(diagram) * proposal;
    if !ratio.is_finite() {
        return Err(WeightError::NumericOverflow { update: Update::RemovePhonon });
    }
    Ok(ratio)
}

/// Ratio for rescaling the time axis of `diagram` to `new_tau`.
///
/// Every line carries two powers of τ, and the free electron plus all phonons
/// contribute `exp(-τ (ω Σ (t_rem - t_gen) + μ))`. The proposal is uniform and
/// cancels.
pub fn change_tau_ratio(diagram: &Diagram, new_tau: f64) -> Result<f64, WeightError> {
    let old_tau = diagram.time_scaling();
    let params = diagram.params();
    let power = (new_tau / old_tau).powf(2.0 * diagram.order() as f64);
    let action = params.phonon_energy * diagram.total_phonon_duration() + params.electron_energy;
    let ratio = power * (-(new_tau - old_tau) * action).exp();
    if !ratio.is_finite() {
        return Err(WeightError::NumericOverflow { update: Update::ChangeTau });
    }
    if ratio == 0.0 {
        return Err(WeightError::NumericUnderflow { update: Update::ChangeTau });
    }
    Ok(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::diagram::DiagramParams;

    fn params(ep_coupling: f64) -> DiagramParams {
        DiagramParams {
            phonon_energy: 1.0,
            electron_energy: 0.0,
            ep_coupling,
            max_time: 30.0,
        }
    }

    #[test]
    fn test_add_ratio_value() {
        let diagram = Diagram::new(params(0.5), 2.0);
        let phonon = Phonon { gen_time: 0.5, rem_time: 1.0 };
        // (0.5 * 2)^2 * exp(-2 * 0.5) * 0.5 / 1
        let expected = (-1.0f64).exp() * 0.5;
        assert_relative_eq!(add_phonon_ratio(&diagram, &phonon, &PhononFactory::new()).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_add_and_remove_are_reciprocal() {
        let phonon = Phonon { gen_time: 0.2, rem_time: 0.7 };
        let mut diagram = Diagram::new(params(0.3), 3.0);
        diagram.add_phonon(Phonon { gen_time: 0.1, rem_time: 0.4 });

        let forward = add_phonon_ratio(&diagram, &phonon, &PhononFactory::new()).unwrap();
        let mut extended = diagram.clone();
        extended.add_phonon(phonon);
        let backward = remove_phonon_ratio(&extended, &phonon, &PhononFactory::new()).unwrap();

        assert_relative_eq!(forward * backward, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_coupling_fails_both_ways() {
        let phonon = Phonon { gen_time: 0.2, rem_time: 0.7 };
        let mut diagram = Diagram::new(params(0.0), 1.0);
        assert_eq!(
            add_phonon_ratio(&diagram, &phonon, &PhononFactory::new()),
            Err(WeightError::NumericUnderflow { update: Update::AddPhonon })
        );
        diagram.add_phonon(phonon);
        assert_eq!(
            remove_phonon_ratio(&diagram, &phonon, &PhononFactory::new()),
            Err(WeightError::NumericOverflow { update: Update::RemovePhonon })
        );
    }

    #[test]
    fn test_add_ratio_nan_is_an_error() {
        // g = 0 with a negative phonon energy gives 0 * inf
        let mut p = params(0.0);
        p.phonon_energy = -2000.0;
        let diagram = Diagram::new(p, 1.0);
        let phonon = Phonon { gen_time: 0.1, rem_time: 0.9 };
        assert_eq!(
            add_phonon_ratio(&diagram, &phonon, &PhononFactory::new()),
            Err(WeightError::NumericOverflow { update: Update::AddPhonon })
        );
    }

    #[test]
    fn test_add_ratio_underflows_for_huge_tau() {
        let diagram = Diagram::new(params(0.3), 1e6);
        let phonon = Phonon { gen_time: 0.0, rem_time: 1.0 };
        let err = add_phonon_ratio(&diagram, &phonon, &PhononFactory::new()).unwrap_err();
        assert_eq!(err.update(), Update::AddPhonon);
    }

    #[test]
    fn test_tiny_ratio_is_not_an_underflow() {
        let diagram = Diagram::new(params(0.3), 500.0);
        let phonon = Phonon { gen_time: 0.0, rem_time: 1.0 };
        let ratio = add_phonon_ratio(&diagram, &phonon, &PhononFactory::new()).unwrap();
        assert!(ratio > 0.0 && ratio < 1e-200);
    }

    #[test]
    fn test_change_tau_at_order_zero_is_electron_weight() {
        let mut p = params(0.3);
        p.electron_energy = 0.5;
        let diagram = Diagram::new(p, 1.0);
        let ratio = change_tau_ratio(&diagram, 3.0).unwrap();
        assert_relative_eq!(ratio, (-1.0f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_change_tau_power_law() {
        let mut diagram = Diagram::new(params(0.3), 1.0);
        diagram.add_phonon(Phonon { gen_time: 0.0, rem_time: 0.0 });
        let ratio = change_tau_ratio(&diagram, 2.0).unwrap();
        assert_relative_eq!(ratio, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_change_tau_overflow() {
        let mut diagram = Diagram::new(params(0.3), 1e-300);
        for _ in 0..4 {
            diagram.add_phonon(Phonon { gen_time: 0.5, rem_time: 0.5 });
        }
        assert_eq!(
            change_tau_ratio(&diagram, 10.0),
            Err(WeightError::NumericOverflow { update: Update::ChangeTau })
        );
    }

    #[test]
    fn test_change_tau_underflow() {
        let mut p = params(0.3);
        p.electron_energy = 100.0;
        let diagram = Diagram::new(p, 0.5);
        assert_eq!(
            change_tau_ratio(&diagram, 29.0),
            Err(WeightError::NumericUnderflow { update: Update::ChangeTau })
        );
    }
}
