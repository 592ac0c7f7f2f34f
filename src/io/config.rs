//! YAML configuration of a diagrammatic Monte Carlo run.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::diagram::DiagramParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot open config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}

/// Parameters of one Markov chain. Missing fields take their default value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of Monte Carlo steps, including the starting diagram
    pub nsteps: usize,
    /// Thermalization steps run before recording
    pub nsteps_burn: usize,
    /// Order of the initial diagram
    pub order: usize,
    /// Energy of the electron μ
    pub electron_energy: f64,
    /// Phonon energy ω
    pub phonon_energy: f64,
    /// Electron-phonon coupling constant g
    pub ep_coupling: f64,
    /// Initial lifetime τ of the electron propagator
    pub time_scaling: f64,
    /// Upper bound for the lifetime of the electron propagator
    pub max_time: f64,
    /// Seed of the random stream; drawn from the OS when absent
    pub seed: Option<u64>,
    /// Number of bins of the τ histogram
    pub tau_bins: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            nsteps: 10000,
            nsteps_burn: 0,
            order: 0,
            electron_energy: 0.0,
            phonon_energy: 1.0,
            ep_coupling: 0.3,
            time_scaling: 1.0,
            max_time: 50.0,
            seed: None,
            tau_bins: 50,
        }
    }
}

impl SimulationConfig {
    pub fn diagram_params(&self) -> DiagramParams {
        DiagramParams {
            phonon_energy: self.phonon_energy,
            electron_energy: self.electron_energy,
            ep_coupling: self.ep_coupling,
            max_time: self.max_time,
        }
    }

    /// Reject parameters the chain cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nsteps == 0 {
            return Err(invalid("nsteps", "must be at least 1"));
        }
        if !(self.max_time.is_finite() && self.max_time > 0.0) {
            return Err(invalid("max_time", format!("{} is not a positive number", self.max_time)));
        }
        if !(self.time_scaling > 0.0 && self.time_scaling <= self.max_time) {
            return Err(invalid(
                "time_scaling",
                format!("{} is not in (0, {}]", self.time_scaling, self.max_time),
            ));
        }
        for (field, value) in [
            ("electron_energy", self.electron_energy),
            ("ep_coupling", self.ep_coupling),
        ] {
            if !value.is_finite() {
                return Err(invalid(field, format!("{} is not finite", value)));
            }
        }
        if !(self.phonon_energy.is_finite() && self.phonon_energy > 0.0) {
            return Err(invalid("phonon_energy", format!("{} is not a positive number", self.phonon_energy)));
        }
        if self.tau_bins == 0 {
            return Err(invalid("tau_bins", "must be at least 1"));
        }
        Ok(())
    }
}

/// Read and validate a [`SimulationConfig`] from a YAML file.
pub fn read_config<P: AsRef<Path>>(filename: P) -> Result<SimulationConfig, ConfigError> {
    let file = File::open(filename)?;
    let reader = BufReader::new(file);
    let config: SimulationConfig = serde_yaml::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}

// example of yaml file
// nsteps: 100000
// nsteps_burn: 10000
// order: 0
// electron_energy: 0.0
// phonon_energy: 1.0
// ep_coupling: 0.3
// time_scaling: 1.0
// max_time: 30.0
// seed: 42
