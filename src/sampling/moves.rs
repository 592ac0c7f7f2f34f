//! Metropolis-Hastings updates of a Feynman diagram.
//!
//! An update draws a candidate, evaluates its acceptance ratio and, when the
//! Metropolis test passes, mutates the diagram in place. A numeric failure of
//! the ratio leaves the diagram untouched and is returned to the caller.

use std::fmt;
use rand::Rng;
use crate::diagram::{Diagram, PhononFactory};
use super::weights::{add_phonon_ratio, change_tau_ratio, remove_phonon_ratio, WeightError};

/// The three updates of the diagram Markov chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Update {
    /// Insert an internal phonon line
    AddPhonon,
    /// Remove a uniformly chosen internal phonon line
    RemovePhonon,
    /// Resample the time scaling τ
    ChangeTau,
}

impl Update {
    pub const ALL: [Update; 3] = [Update::AddPhonon, Update::RemovePhonon, Update::ChangeTau];

    const ZERO_ORDER: [Update; 2] = [Update::AddPhonon, Update::ChangeTau];

    /// Updates that may be proposed on a diagram of the given order.
    pub fn eligible(order: usize) -> &'static [Update] {
        if order == 0 {
            &Self::ZERO_ORDER
        } else {
            &Self::ALL
        }
    }

    pub fn is_eligible(self, order: usize) -> bool {
        self != Update::RemovePhonon || order > 0
    }

    /// Attempt this update on `diagram`. Returns whether it was accepted.
    pub fn attempt<R: Rng + ?Sized>(
        self,
        diagram: &mut Diagram,
        factory: &PhononFactory,
        rng: &mut R,
    ) -> Result<bool, WeightError> {
        match self {
            Update::AddPhonon => add_phonon(diagram, factory, rng),
            Update::RemovePhonon => remove_phonon(diagram, factory, rng),
            Update::ChangeTau => change_tau(diagram, rng),
        }
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Update::AddPhonon => "add phonon",
            Update::RemovePhonon => "remove phonon",
            Update::ChangeTau => "change tau",
        };
        f.pad(name)
    }
}

/// Metropolis test with acceptance probability `min(1, ratio)`.
///
/// A NaN ratio is never accepted.
pub fn metropolis_accept<R: Rng + ?Sized>(ratio: f64, rng: &mut R) -> bool {
    if ratio.is_nan() {
        return false;
    }
    let acceptance = ratio.min(1.0);
    if acceptance == 1.0 {
        true
    } else if acceptance <= 0.0 {
        false
    } else {
        rng.gen::<f64>() <= acceptance
    }
}

fn add_phonon<R: Rng + ?Sized>(
    diagram: &mut Diagram,
    factory: &PhononFactory,
    rng: &mut R,
) -> Result<bool, WeightError> {
    let phonon = factory.generate(rng);
    let ratio = add_phonon_ratio(diagram, &phonon, factory)?;
    let accepted = metropolis_accept(ratio, rng);
    if accepted {
        diagram.add_phonon(phonon);
    }
    Ok(accepted)
}

fn remove_phonon<R: Rng + ?Sized>(
    diagram: &mut Diagram,
    factory: &PhononFactory,
    rng: &mut R,
) -> Result<bool, WeightError> {
    if diagram.order() == 0 {
        return Ok(false);
    }
    let index = rng.gen_range(0..diagram.order());
    let ratio = remove_phonon_ratio(diagram, &diagram.phonons()[index], factory)?;
    let accepted = metropolis_accept(ratio, rng);
    if accepted {
        diagram.remove_phonon(index);
    }
    Ok(accepted)
}

fn change_tau<R: Rng + ?Sized>(diagram: &mut Diagram, rng: &mut R) -> Result<bool, WeightError> {
    let old_tau = diagram.time_scaling();
    let max_time = diagram.params().max_time;
    let new_tau = loop {
        let candidate = rng.gen_range(0.0..max_time);
        if candidate > 0.0 && candidate != old_tau {
            break candidate;
        }
    };
    let ratio = change_tau_ratio(diagram, new_tau)?;
    let accepted = metropolis_accept(ratio, rng);
    if accepted {
        diagram.set_time_scaling(new_tau);
    }
    Ok(accepted)
}
