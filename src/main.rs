use std::error::Error;
use clap::Parser;
use log::info;
use polaron_dmc::{read_config, DiagrammaticMonteCarlo, ExponentialSampler, SimulationConfig};

/// Diagrammatic Monte Carlo for the Holstein polaron.
///
/// Parameters are read from an optional YAML file and can be overridden
/// from the command line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<String>,
    /// Number of Monte Carlo steps (samples)
    #[arg(long)]
    nsteps: Option<usize>,
    /// Number of thermalization steps for the Markov chain
    #[arg(long)]
    nsteps_burn: Option<usize>,
    /// Order of the initial diagram
    #[arg(long)]
    order: Option<usize>,
    /// Energy of the electron
    #[arg(long)]
    mu: Option<f64>,
    /// Phonon energy
    #[arg(long)]
    omega: Option<f64>,
    /// Electron phonon coupling constant
    #[arg(long)]
    g: Option<f64>,
    /// Initial lifetime of the electron propagator
    #[arg(long)]
    time: Option<f64>,
    /// Upper bound for the lifetime of the electron propagator
    #[arg(long)]
    max_time: Option<f64>,
    /// Seed of the random stream
    #[arg(long)]
    seed: Option<u64>,
    /// Reconstruct e^{-x} on (0, max_time) instead of sampling diagrams
    #[arg(long)]
    exponential: bool,
}

impl Args {
    fn into_config(self) -> Result<SimulationConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(nsteps) = self.nsteps { config.nsteps = nsteps; }
        if let Some(nsteps_burn) = self.nsteps_burn { config.nsteps_burn = nsteps_burn; }
        if let Some(order) = self.order { config.order = order; }
        if let Some(mu) = self.mu { config.electron_energy = mu; }
        if let Some(omega) = self.omega { config.phonon_energy = omega; }
        if let Some(g) = self.g { config.ep_coupling = g; }
        if let Some(time) = self.time { config.time_scaling = time; }
        if let Some(max_time) = self.max_time { config.max_time = max_time; }
        if let Some(seed) = self.seed { config.seed = Some(seed); }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let exponential = args.exponential;
    let config = args.into_config()?;

    if exponential {
        run_exponential(&config);
        return Ok(());
    }

    info!("Starting diagrammatic Monte Carlo: {:?}", config);
    let mut simulation = DiagrammaticMonteCarlo::new(&config)?;
    let stats = simulation.run();

    println!("DMC Simulation Results for the Holstein polaron");
    println!("-----------------------------------------------");
    println!("Number of steps: {}", config.nsteps);
    println!("Burn-in steps: {} ({} invalid)", config.nsteps_burn, stats.burn_in_invalid);
    println!("Recorded diagrams: {}", stats.len());
    println!("Number of invalid diagrams: {}", stats.invalid_diagrams);
    println!("Mean diagram order: {:.5}", stats.mean_order());
    println!("Mean energy: {:.5} ± {:.5}", stats.mean_energy(), stats.energy_error());
    println!("Autocorrelation time: {:.2} steps", stats.energy_autocorrelation_time());

    println!();
    println!("Acceptance rates:");
    for (update, counter) in stats.moves.iter() {
        println!(
            "  {:<14} {:6.2}%  ({} attempted, {} invalid)",
            update,
            100.0 * counter.acceptance_rate(),
            counter.attempted,
            counter.invalid
        );
    }

    println!();
    println!("Diagram order distribution:");
    for (order, fraction) in stats.order_histogram() {
        println!("  {:4} {:.6}", order, fraction);
    }

    println!();
    println!("Green's function estimate Q(tau):");
    let histogram = stats.tau_histogram(config.max_time, config.tau_bins);
    for (center, density) in histogram.bin_centers().iter().zip(histogram.densities.iter()) {
        println!("  {:8.4} {:.6}", center, density);
    }

    Ok(())
}

fn run_exponential(config: &SimulationConfig) {
    info!("Reconstructing exp(-x) on (0, {}) with {} steps", config.max_time, config.nsteps);
    let mut sampler = ExponentialSampler::new(config.max_time, config.seed);
    let occurrences = sampler.run(config.nsteps);
    let histogram = sampler.histogram(&occurrences, config.tau_bins);

    println!("{:>10} {:>12} {:>12}", "x", "sampled", "target");
    for (center, density) in histogram.bin_centers().iter().zip(histogram.densities.iter()) {
        println!("{:10.4} {:12.6} {:12.6}", center, density, sampler.target_density(*center));
    }
}
