//! Statistics collected along a diagram Markov chain.

use std::collections::BTreeMap;
use super::moves::Update;

/// Attempt counters for one kind of update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveCounter {
    pub attempted: usize,
    pub accepted: usize,
    pub invalid: usize,
}

impl MoveCounter {
    /// Fraction of attempts that were accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempted as f64
        }
    }
}

/// Per-update counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveStatistics {
    counters: BTreeMap<Update, MoveCounter>,
}

impl MoveStatistics {
    pub fn record(&mut self, update: Update, accepted: bool) {
        let counter = self.counters.entry(update).or_default();
        counter.attempted += 1;
        if accepted {
            counter.accepted += 1;
        }
    }

    pub fn record_invalid(&mut self, update: Update) {
        let counter = self.counters.entry(update).or_default();
        counter.attempted += 1;
        counter.invalid += 1;
    }

    pub fn get(&self, update: Update) -> MoveCounter {
        self.counters.get(&update).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Update, MoveCounter)> + '_ {
        self.counters.iter().map(|(update, counter)| (*update, *counter))
    }
}

/// Density histogram over `[lower, upper)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    pub lower: f64,
    pub upper: f64,
    /// Normalised so that Σ density · bin_width == 1 over the counted samples
    pub densities: Vec<f64>,
}

impl Histogram {
    /// Bin samples falling in `[lower, upper)` into `n_bins` bins.
    pub fn from_samples(samples: &[f64], lower: f64, upper: f64, n_bins: usize) -> Self {
        assert!(n_bins > 0 && upper > lower, "empty histogram range");
        let mut counts = vec![0usize; n_bins];
        let width = (upper - lower) / n_bins as f64;
        let mut total = 0usize;
        for &x in samples {
            if !(lower..upper).contains(&x) {
                continue;
            }
            let bin = (((x - lower) / width) as usize).min(n_bins - 1);
            counts[bin] += 1;
            total += 1;
        }
        let norm = if total == 0 { 0.0 } else { 1.0 / (total as f64 * width) };
        Self {
            lower,
            upper,
            densities: counts.into_iter().map(|c| c as f64 * norm).collect(),
        }
    }

    pub fn bin_width(&self) -> f64 {
        (self.upper - self.lower) / self.densities.len() as f64
    }

    pub fn bin_centers(&self) -> Vec<f64> {
        let width = self.bin_width();
        (0..self.densities.len())
            .map(|i| self.lower + (i as f64 + 0.5) * width)
            .collect()
    }
}

/// Sequences recorded along the chain.
///
/// The sequences are seeded with the starting diagram and grow by one entry
/// per valid step; steps whose acceptance ratio failed numerically are only
/// counted in `invalid_diagrams`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagramStatistics {
    pub order_sequence: Vec<usize>,
    pub energy_sequence: Vec<f64>,
    pub tau_sequence: Vec<f64>,
    pub invalid_diagrams: usize,
    /// Invalid steps met during burn-in, not part of the recorded chain
    pub burn_in_invalid: usize,
    pub moves: MoveStatistics,
}

impl DiagramStatistics {
    pub fn with_capacity(n_steps: usize) -> Self {
        Self {
            order_sequence: Vec::with_capacity(n_steps),
            energy_sequence: Vec::with_capacity(n_steps),
            tau_sequence: Vec::with_capacity(n_steps),
            ..Default::default()
        }
    }

    pub fn push(&mut self, order: usize, energy: f64, tau: f64) {
        self.order_sequence.push(order);
        self.energy_sequence.push(energy);
        self.tau_sequence.push(tau);
    }

    /// Number of recorded diagrams.
    pub fn len(&self) -> usize {
        self.order_sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order_sequence.is_empty()
    }

    pub fn mean_order(&self) -> f64 {
        mean(&self.order_sequence.iter().map(|&n| n as f64).collect::<Vec<_>>())
    }

    pub fn mean_energy(&self) -> f64 {
        mean(&self.energy_sequence)
    }

    /// Integrated autocorrelation time of the energy sequence.
    pub fn energy_autocorrelation_time(&self) -> f64 {
        autocorrelation_time(&self.energy_sequence)
    }

    /// Blocking estimate of the statistical error of the mean energy.
    pub fn energy_error(&self) -> f64 {
        blocking_error(&self.energy_sequence, self.energy_autocorrelation_time())
    }

    /// Fraction of recorded diagrams at each order.
    pub fn order_histogram(&self) -> BTreeMap<usize, f64> {
        let mut histogram = BTreeMap::new();
        for &order in &self.order_sequence {
            *histogram.entry(order).or_insert(0.0) += 1.0;
        }
        let n = self.order_sequence.len() as f64;
        for value in histogram.values_mut() {
            *value /= n;
        }
        histogram
    }

    /// Density of visited τ values, an estimate of the imaginary-time Green's function.
    pub fn tau_histogram(&self, max_time: f64, n_bins: usize) -> Histogram {
        Histogram::from_samples(&self.tau_sequence, 0.0, max_time, n_bins)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Estimate autocorrelation time using initial positive sequence.
pub fn autocorrelation_time(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 1.0;
    }
    let mean = mean(values);
    let var = values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n as f64;

    if var == 0.0 {
        return 1.0;
    }

    let mut autocorr = 1.0;
    for t in 1..n / 2 {
        let auto_t: f64 = values[..n - t].iter()
            .zip(values[t..].iter())
            .map(|(&x, &y)| (x - mean) * (y - mean))
            .sum::<f64>() / ((n - t) as f64 * var);

        if auto_t < 0.0 {
            break;
        }
        autocorr += 2.0 * auto_t;
    }
    autocorr
}

/// Standard error of the mean from blocks of size `2 τ_int`.
pub fn blocking_error(values: &[f64], autocorrelation_time: f64) -> f64 {
    let block_size = ((2.0 * autocorrelation_time).ceil() as usize).max(1);
    let n_blocks = values.len() / block_size;

    if n_blocks < 2 {
        return 0.0;
    }

    let block_means: Vec<f64> = values
        .chunks_exact(block_size)
        .map(|block| block.iter().sum::<f64>() / block_size as f64)
        .collect();

    let mean = mean(&block_means);
    let variance = block_means.iter()
        .map(|&x| (x - mean).powi(2))
        .sum::<f64>() / (n_blocks - 1) as f64;

    (variance / n_blocks as f64).sqrt()
}
