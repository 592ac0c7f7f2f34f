//! Diagrammatic Monte Carlo driver for the Holstein polaron.
//!
//! A single Markov chain walks the space of Feynman diagrams of variable
//! order. Every step picks one of the updates eligible at the current order,
//! attempts it, and records the resulting diagram. Steps whose acceptance
//! ratio fails numerically are rejected and counted, never fatal.
//!
//! Reference: Prokof'ev, N.V. and Svistunov, B.V. (1998) "Polaron problem by
//! diagrammatic quantum Monte Carlo", Phys. Rev. Lett. 81, 2514

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use crate::diagram::{Diagram, PhononFactory};
use crate::io::{ConfigError, SimulationConfig};
use super::moves::Update;
use super::statistics::DiagramStatistics;
use super::weights::WeightError;

/// Result of a valid step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    pub update: Update,
    pub accepted: bool,
}

/// Markov chain over polaron diagrams with its own random stream.
pub struct DiagrammaticMonteCarlo<R: Rng = ChaCha8Rng> {
    diagram: Diagram,
    factory: PhononFactory,
    rng: R,
    n_steps: usize,
    n_burn: usize,
}

impl DiagrammaticMonteCarlo<ChaCha8Rng> {
    /// Build a chain from `config`, seeding the stream from `config.seed`.
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> DiagrammaticMonteCarlo<R> {
    pub fn with_rng(config: &SimulationConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let factory = PhononFactory::new();
        let diagram = Diagram::with_order(
            config.diagram_params(),
            config.time_scaling,
            config.order,
            &factory,
            &mut rng,
        );
        Ok(Self {
            diagram,
            factory,
            rng,
            n_steps: config.nsteps,
            n_burn: config.nsteps_burn,
        })
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Attempt `update` on the current diagram.
    ///
    /// The cached energy is refreshed after a valid attempt, accepted or not.
    pub fn attempt(&mut self, update: Update) -> Result<bool, WeightError> {
        debug_assert!(update.is_eligible(self.diagram.order()), "{} at order 0", update);
        let accepted = update.attempt(&mut self.diagram, &self.factory, &mut self.rng)?;
        self.diagram.refresh_energy();
        Ok(accepted)
    }

    /// One Markov chain step with a uniformly chosen eligible update.
    pub fn step(&mut self) -> Result<StepOutcome, WeightError> {
        let updates = Update::eligible(self.diagram.order());
        let update = updates[self.rng.gen_range(0..updates.len())];
        let accepted = self.attempt(update)?;
        Ok(StepOutcome { update, accepted })
    }

    /// Run the thermalization steps. Returns the number of invalid steps.
    pub fn burn_in(&mut self) -> usize {
        let mut invalid = 0;
        for _ in 0..self.n_burn {
            if let Err(error) = self.step() {
                debug!("Invalid step during burn-in: {}", error);
                invalid += 1;
            }
        }
        invalid
    }

    /// Run burn-in followed by the recorded chain.
    pub fn run(&mut self) -> DiagramStatistics {
        let burn_in_invalid = self.burn_in();
        if self.n_burn > 0 {
            info!(
                "Burn-in finished after {} steps: order = {}, tau = {:.4}, {} invalid",
                self.n_burn,
                self.diagram.order(),
                self.diagram.time_scaling(),
                burn_in_invalid
            );
        }

        let mut stats = DiagramStatistics::with_capacity(self.n_steps);
        stats.burn_in_invalid = burn_in_invalid;
        self.diagram.refresh_energy();
        self.record(&mut stats);

        for _ in 1..self.n_steps {
            match self.step() {
                Ok(outcome) => {
                    stats.moves.record(outcome.update, outcome.accepted);
                    self.record(&mut stats);
                }
                Err(error) => {
                    debug!("Invalid step in DMC: {}", error);
                    stats.moves.record_invalid(error.update());
                    stats.invalid_diagrams += 1;
                }
            }
        }

        info!(
            "Recorded {} diagrams, {} invalid steps",
            stats.len(),
            stats.invalid_diagrams
        );
        stats
    }

    fn record(&self, stats: &mut DiagramStatistics) {
        stats.push(
            self.diagram.order(),
            self.diagram.total_energy(),
            self.diagram.time_scaling(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimulationConfig {
        SimulationConfig {
            nsteps: 1000,
            max_time: 30.0,
            seed: Some(17),
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_diagram_follows_config() {
        let config = SimulationConfig { order: 3, time_scaling: 2.0, ..config() };
        let chain = DiagrammaticMonteCarlo::new(&config).unwrap();
        assert_eq!(chain.diagram().order(), 3);
        assert_eq!(chain.diagram().phonons().len(), 3);
        assert_eq!(chain.diagram().time_scaling(), 2.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SimulationConfig { max_time: -1.0, ..config() };
        assert!(DiagrammaticMonteCarlo::new(&config).is_err());
    }

    #[test]
    fn test_remove_never_chosen_at_order_zero() {
        let mut chain = DiagrammaticMonteCarlo::new(&config()).unwrap();
        for _ in 0..5000 {
            let order = chain.diagram().order();
            if let Ok(outcome) = chain.step() {
                if order == 0 {
                    assert_ne!(outcome.update, Update::RemovePhonon);
                }
            }
            assert_eq!(chain.diagram().phonons().len(), chain.diagram().order());
        }
    }

    #[test]
    fn test_energy_refreshed_after_step() {
        let mut chain = DiagrammaticMonteCarlo::new(&config()).unwrap();
        for _ in 0..200 {
            if chain.step().is_ok() {
                let diagram = chain.diagram();
                let expected = crate::sampling::EnergyCalculator::local_energy(diagram);
                assert_eq!(diagram.total_energy(), expected);
                if diagram.order() == 0 {
                    assert_eq!(diagram.total_energy(), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_forced_add_with_zero_coupling() {
        let config = SimulationConfig { ep_coupling: 0.0, ..config() };
        let mut chain = DiagrammaticMonteCarlo::new(&config).unwrap();
        for _ in 0..1000 {
            assert!(chain.attempt(Update::AddPhonon).is_err());
            assert_eq!(chain.diagram().order(), 0);
        }
    }

    #[test]
    fn test_zero_coupling_chain_counts_invalid_steps() {
        let config = SimulationConfig { ep_coupling: 0.0, ..config() };
        let stats = DiagrammaticMonteCarlo::new(&config).unwrap().run();
        assert!(stats.order_sequence.iter().all(|&n| n == 0));
        assert!(stats.invalid_diagrams > 0);
        assert_eq!(stats.invalid_diagrams, stats.moves.get(Update::AddPhonon).invalid);
        assert_eq!(stats.len() + stats.invalid_diagrams, config.nsteps);
    }

    #[test]
    fn test_burn_in_is_not_recorded() {
        let config = SimulationConfig { nsteps: 100, nsteps_burn: 500, ..config() };
        let stats = DiagrammaticMonteCarlo::new(&config).unwrap().run();
        assert_eq!(stats.len() + stats.invalid_diagrams, 100);
        let attempted: usize = stats.moves.iter().map(|(_, c)| c.attempted).sum();
        assert_eq!(attempted, 99);
    }
}
