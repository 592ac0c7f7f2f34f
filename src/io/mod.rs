//! IO module - configuration and file handling for the diagram sampler.

mod config;

pub use config::{read_config, ConfigError, SimulationConfig};
