//! Feynman diagram of the Holstein polaron in the tight binding limit.
//!
//! The bare electron propagates from scaled time 0 to scaled time 1; every
//! internal phonon line lives on that interval and the whole time axis is
//! stretched by `time_scaling`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::sampling::EnergyCalculator;
use super::phonon::{Phonon, PhononFactory};

/// Physical constants of a diagram. Fixed for the lifetime of a chain.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagramParams {
    /// Phonon energy ω
    pub phonon_energy: f64,
    /// Electron energy μ
    pub electron_energy: f64,
    /// Electron-phonon coupling g
    pub ep_coupling: f64,
    /// Upper bound for resampled values of τ
    pub max_time: f64,
}

/// Current state of the Markov chain.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagram {
    params: DiagramParams,
    phonons: Vec<Phonon>,
    time_scaling: f64,
    total_energy: f64,
}

impl Diagram {
    /// Bare electron propagator of length `time_scaling`.
    pub fn new(params: DiagramParams, time_scaling: f64) -> Self {
        Self {
            params,
            phonons: Vec::new(),
            time_scaling,
            total_energy: 0.0,
        }
    }

    /// Diagram of the requested order, filled with phonons from `factory`.
    pub fn with_order<R: Rng + ?Sized>(
        params: DiagramParams,
        time_scaling: f64,
        order: usize,
        factory: &PhononFactory,
        rng: &mut R,
    ) -> Self {
        let mut diagram = Self::new(params, time_scaling);
        diagram.phonons = (0..order).map(|_| factory.generate(rng)).collect();
        diagram.refresh_energy();
        diagram
    }

    /// Number of internal phonon lines.
    #[inline]
    pub fn order(&self) -> usize {
        self.phonons.len()
    }

    pub fn phonons(&self) -> &[Phonon] {
        &self.phonons
    }

    pub fn params(&self) -> &DiagramParams {
        &self.params
    }

    pub fn time_scaling(&self) -> f64 {
        self.time_scaling
    }

    /// Energy cached by the last call to [`Diagram::refresh_energy`].
    pub fn total_energy(&self) -> f64 {
        self.total_energy
    }

    /// Σ (rem_time - gen_time) over all phonon lines.
    pub fn total_phonon_duration(&self) -> f64 {
        self.phonons.iter().map(Phonon::duration).sum()
    }

    /// Recompute the cached energy from the current phonon list.
    pub fn refresh_energy(&mut self) {
        self.total_energy = self.local_energy();
    }

    pub(crate) fn add_phonon(&mut self, phonon: Phonon) {
        self.phonons.push(phonon);
    }

    pub(crate) fn remove_phonon(&mut self, index: usize) -> Phonon {
        self.phonons.remove(index)
    }

    pub(crate) fn set_time_scaling(&mut self, time_scaling: f64) {
        self.time_scaling = time_scaling;
    }
}

impl EnergyCalculator for Diagram {
    fn local_energy(&self) -> f64 {
        if self.phonons.is_empty() {
            return 0.0;
        }
        let phonon_energy = self.params.phonon_energy * self.total_phonon_duration();
        (phonon_energy - self.order() as f64) / self.time_scaling
    }
}
