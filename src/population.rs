//! Stochastic population codes.
//!
//! At every time step, every neuron of a population independently emits a spike with a probability given by
//! its tuning curve, i.e., `p_i = 2 / N * g(x_i; mu, sigma)`. Averaged over many time steps, the activity
//! histogram of the population therefore converges to the (scaled) Gaussian tuning profile.
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};

use crate::error::PopCodeError;
use crate::spike_train::{SpikeCount, SpikeTrain};
use crate::tuning::{theoretical_code, TuningParameters};

/// A generator of spike vectors for a population with Gaussian tuning.
#[derive(Debug, Clone)]
pub struct PopulationCode {
    tuning: TuningParameters,
    probabilities: Vec<f64>,
    neurons: Vec<Bernoulli>,
}

impl PopulationCode {
    /// Create a new population code with the given number of neurons and tuning parameters.
    /// Returns an error if the number of neurons is not odd or smaller than 3.
    ///
    /// Probabilities exceeding one (very narrow tuning) are clamped, in which case the empirical activity
    /// can no longer match the tuning curve; a warning is logged.
    pub fn build(num_neurons: usize, tuning: TuningParameters) -> Result<Self, PopCodeError> {
        if num_neurons < 3 {
            return Err(PopCodeError::InvalidParameter(format!(
                "At least 3 neurons are required to span the preferred values, got {}",
                num_neurons
            )));
        }
        if num_neurons % 2 == 0 {
            return Err(PopCodeError::InvalidParameter(format!(
                "The number of neurons must be odd, got {}",
                num_neurons
            )));
        }

        let mut probabilities = theoretical_code(num_neurons, &tuning);
        let num_clamped = probabilities.iter().filter(|&&p| p > 1.0).count();
        if num_clamped > 0 {
            log::warn!(
                "{} firing probabilities exceed one for (mean={}, std={}) and are clamped",
                num_clamped,
                tuning.mean,
                tuning.std
            );
        }
        probabilities.iter_mut().for_each(|p| *p = p.min(1.0));

        let neurons = probabilities
            .iter()
            .map(|&p| {
                Bernoulli::new(p).map_err(|e| {
                    PopCodeError::InvalidParameter(format!("Invalid firing probability {}: {}", p, e))
                })
            })
            .collect::<Result<Vec<Bernoulli>, PopCodeError>>()?;

        log::debug!(
            "Population code (mean={}, std={}) over {} neurons: {:.4} expected spikes per time step",
            tuning.mean,
            tuning.std,
            num_neurons,
            probabilities.iter().sum::<f64>()
        );

        Ok(PopulationCode {
            tuning,
            probabilities,
            neurons,
        })
    }

    pub fn num_neurons(&self) -> usize {
        self.neurons.len()
    }

    pub fn tuning(&self) -> &TuningParameters {
        &self.tuning
    }

    /// Returns the firing probability of every neuron.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Returns the expected number of spikes emitted by the population in one time step.
    pub fn expected_total_activation(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// Sample a spike vector into `vector`, which must have one entry per neuron.
    pub fn sample_into<R: Rng>(&self, vector: &mut [SpikeCount], rng: &mut R) {
        vector
            .iter_mut()
            .zip(self.neurons.iter())
            .for_each(|(count, neuron)| *count = neuron.sample(rng) as SpikeCount);
    }

    /// Sample a new spike vector.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec<SpikeCount> {
        let mut vector = vec![0; self.num_neurons()];
        self.sample_into(&mut vector, rng);
        vector
    }

    /// Sample a spike train with `num_steps` independent time steps.
    pub fn sample_train<R: Rng>(
        &self,
        num_steps: usize,
        rng: &mut R,
    ) -> Result<SpikeTrain, PopCodeError> {
        let mut spike_train = SpikeTrain::build(self.num_neurons(), num_steps)?;
        self.fill_train(&mut spike_train, rng)?;
        Ok(spike_train)
    }

    /// Overwrite every time step of a (preallocated) spike train with new samples.
    /// Returns an error if the spike train does not have one channel per neuron.
    pub fn fill_train<R: Rng>(
        &self,
        spike_train: &mut SpikeTrain,
        rng: &mut R,
    ) -> Result<(), PopCodeError> {
        if spike_train.num_neurons() != self.num_neurons() {
            return Err(PopCodeError::IncompatibleSpikeTrains(format!(
                "The spike train has {} channels but the population has {} neurons",
                spike_train.num_neurons(),
                self.num_neurons()
            )));
        }
        spike_train
            .vectors_mut()
            .for_each(|vector| self.sample_into(vector, rng));
        Ok(())
    }
}
