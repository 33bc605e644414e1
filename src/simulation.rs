//! Simulation of two independent population codes and their combination, followed by the statistical
//! analysis of the three codes.
//!
//! # Example
//!
//! ```rust
//! use rusty_popcode::config::SimulationConfig;
//! use rusty_popcode::simulation::Simulation;
//!
//! let config = SimulationConfig {
//!     num_steps: 20_000,
//!     bin_size: 100,
//!     seed: 42,
//!     ..Default::default()
//! };
//! let simulation = Simulation::build(config).unwrap();
//! let output = simulation.run().unwrap();
//! let analysis = simulation.analyze(&output).unwrap();
//!
//! assert_eq!(output.c.num_steps(), 20_000);
//! assert_eq!(analysis.c.firing_rates[0].len(), 200);
//! assert_eq!(analysis.near.neurons, (25, 26));
//! ```
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::combiner::Combiner;
use crate::config::{PairSelection, SimulationConfig};
use crate::error::PopCodeError;
use crate::firing_rate::firing_rates;
use crate::population::PopulationCode;
use crate::spike_train::SpikeTrain;
use crate::stats::{
    compare_histograms, correlation_profile, fit_ellipse, pearson, Correlation, EllipseFit,
    HistogramComparison,
};
use crate::tuning::{preferred_values, theoretical_code, TuningParameters};

/// The random stream of population A.
pub const STREAM_A: u64 = 0;
/// The random stream of population B.
pub const STREAM_B: u64 = 1;

/// The spike trains of a run. They are allocated once and owned here for the rest of the run.
#[derive(Debug, PartialEq, Clone)]
pub struct SimulationOutput {
    pub a: SpikeTrain,
    pub b: SpikeTrain,
    pub c: SpikeTrain,
}

/// Summary of one population code.
#[derive(Debug, Clone, Serialize)]
pub struct PopulationAnalysis {
    /// The (theoretical) tuning of the code.
    pub tuning: TuningParameters,
    /// The total number of spikes over the whole run.
    pub total_activation: u64,
    /// The empirical mean activation of every neuron over the histogram steps.
    pub histogram: Vec<f64>,
    /// The theoretical mean activation of every neuron.
    pub theoretical: Vec<f64>,
    pub comparison: HistogramComparison,
    /// The binned firing rates of every neuron.
    pub firing_rates: Vec<Vec<f64>>,
}

/// Joint statistics of a pair of neurons of the combined code.
#[derive(Debug, Clone, Serialize)]
pub struct PairAnalysis {
    pub neurons: (usize, usize),
    /// The correlation between the binned firing rates.
    pub binned: Correlation,
    /// The correlation between the raw spike counts (bin size 1).
    pub raw: Correlation,
    /// The covariance ellipse of the binned firing rates.
    pub ellipse: EllipseFit,
}

/// Everything the reporting stage needs, as plain arrays and numbers.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub preferred_values: Vec<f64>,
    pub bin_size: usize,
    pub a: PopulationAnalysis,
    pub b: PopulationAnalysis,
    pub c: PopulationAnalysis,
    /// Neurons of the combined code with nearby preferred values.
    pub near: PairAnalysis,
    /// Neurons of the combined code with distant preferred values.
    pub far: PairAnalysis,
    /// The correlation of the first neuron of the near pair with every neuron of the combined code (binned).
    pub near_profile: Vec<Correlation>,
}

/// A simulation with validated parameters.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    code_a: PopulationCode,
    code_b: PopulationCode,
    combiner: Combiner,
}

impl Simulation {
    /// Create a new simulation. The configuration is validated before anything else happens.
    pub fn build(config: SimulationConfig) -> Result<Self, PopCodeError> {
        config.validate()?;
        let code_a = PopulationCode::build(config.num_neurons, config.population_a)?;
        let code_b = PopulationCode::build(config.num_neurons, config.population_b)?;
        let combiner = Combiner::build(config.num_neurons)?;
        Ok(Simulation {
            config,
            code_a,
            code_b,
            combiner,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the simulation with the random streams derived from the configured seed:
    /// population A and B use distinct streams of the same ChaCha generator.
    pub fn run(&self) -> Result<SimulationOutput, PopCodeError> {
        let mut rng_a = ChaCha8Rng::seed_from_u64(self.config.seed);
        rng_a.set_stream(STREAM_A);
        let mut rng_b = ChaCha8Rng::seed_from_u64(self.config.seed);
        rng_b.set_stream(STREAM_B);
        self.run_with(&mut rng_a, &mut rng_b)
    }

    /// Run the simulation with the provided random streams for population A and B.
    /// The two populations are sampled concurrently, each from its own stream, then combined time step by time step.
    pub fn run_with<R: Rng + Send, S: Rng + Send>(
        &self,
        rng_a: &mut R,
        rng_b: &mut S,
    ) -> Result<SimulationOutput, PopCodeError> {
        let num_neurons = self.config.num_neurons;
        let num_steps = self.config.num_steps;

        log::info!(
            "Starting simulation of {} time steps with {} neurons per population...",
            num_steps,
            num_neurons
        );

        let (a, b) = rayon::join(
            || self.code_a.sample_train(num_steps, rng_a),
            || self.code_b.sample_train(num_steps, rng_b),
        );
        let (a, b) = (a?, b?);
        log::info!(
            "Sampling: done! {} spikes in A, {} spikes in B",
            a.total_activation(),
            b.total_activation()
        );

        let c = self.combiner.combine_trains(&a, &b)?;
        log::info!("Combination: done! {} spikes in C", c.total_activation());

        log::info!("Simulation completed successfully!");
        Ok(SimulationOutput { a, b, c })
    }

    fn analyze_population(
        &self,
        spike_train: &SpikeTrain,
        tuning: TuningParameters,
    ) -> Result<PopulationAnalysis, PopCodeError> {
        let histogram = spike_train.mean_activation(self.config.histogram_steps);
        let theoretical = theoretical_code(self.config.num_neurons, &tuning);
        let comparison = compare_histograms(&histogram, &theoretical)?;
        let firing_rates = firing_rates(spike_train, self.config.bin_size)?;
        Ok(PopulationAnalysis {
            tuning,
            total_activation: spike_train.total_activation(),
            histogram,
            theoretical,
            comparison,
            firing_rates,
        })
    }

    fn analyze_pair(
        &self,
        spike_train: &SpikeTrain,
        rates: &[Vec<f64>],
        pair: &PairSelection,
    ) -> Result<PairAnalysis, PopCodeError> {
        let (i, j) = pair.resolve(self.config.num_neurons)?;
        let binned = pearson(&rates[i], &rates[j])?;
        let raw = pearson(
            &spike_train.channel_values(i)?,
            &spike_train.channel_values(j)?,
        )?;
        let ellipse = fit_ellipse(&rates[i], &rates[j])?;

        log::info!(
            "Correlation between neurons {} and {}: {:.4} (bin size {}, p={:.3e}), {:.4} (bin size 1, p={:.3e})",
            i,
            j,
            binned.coefficient,
            self.config.bin_size,
            binned.p_value,
            raw.coefficient,
            raw.p_value
        );

        Ok(PairAnalysis {
            neurons: (i, j),
            binned,
            raw,
            ellipse,
        })
    }

    /// Compute the histograms, firing rates, correlations and covariance ellipses of a run.
    /// The spike trains are only read.
    ///
    /// Returns an error if the spike trains are too short to provide two firing rate bins.
    pub fn analyze(&self, output: &SimulationOutput) -> Result<Analysis, PopCodeError> {
        let a = self.analyze_population(&output.a, self.config.population_a)?;
        let b = self.analyze_population(&output.b, self.config.population_b)?;
        let c = self.analyze_population(&output.c, self.config.population_c())?;

        for (name, analysis) in [("A", &a), ("B", &b), ("C", &c)] {
            log::info!(
                "{} total activation: {} (max deviation from theory: {:.1}% of the peak)",
                name,
                analysis.total_activation,
                100.0 * analysis.comparison.normalized_deviation
            );
        }

        let near = self.analyze_pair(&output.c, &c.firing_rates, &self.config.near_pair)?;
        let far = self.analyze_pair(&output.c, &c.firing_rates, &self.config.far_pair)?;
        let near_profile = correlation_profile(&c.firing_rates, near.neurons.0)?;

        Ok(Analysis {
            preferred_values: preferred_values(self.config.num_neurons),
            bin_size: self.config.bin_size,
            a,
            b,
            c,
            near,
            far,
            near_profile,
        })
    }
}
