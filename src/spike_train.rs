//! Module implementing the concept of a (discrete-time) spike train.
//!
//! A spike train stacks the spike vectors of a population along time. Entries are (small) spike counts,
//! mostly in {0, 1}. The storage is time-major: the spike vector of time step `t` is the contiguous slice
//! `[t * N, (t + 1) * N)`, which makes generation and combination cheap and keeps per-neuron reads strided.
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::slice::{ChunksExact, ChunksExactMut};

use crate::error::PopCodeError;

/// The number of spikes emitted by a neuron in one time step.
pub type SpikeCount = u8;

/// A multi-channel spike train with `num_neurons` channels and `num_steps` time steps.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SpikeTrain {
    num_neurons: usize,
    num_steps: usize,
    spikes: Vec<SpikeCount>,
}

impl SpikeTrain {
    /// Allocate a silent spike train for the whole run.
    /// Returns an error if the number of neurons is zero.
    pub fn build(num_neurons: usize, num_steps: usize) -> Result<Self, PopCodeError> {
        if num_neurons == 0 {
            return Err(PopCodeError::InvalidParameter(
                "A spike train needs at least one neuron".to_string(),
            ));
        }
        Ok(SpikeTrain {
            num_neurons,
            num_steps,
            spikes: vec![0; num_neurons * num_steps],
        })
    }

    /// Create a spike train from a sequence of spike vectors, one per time step.
    /// Returns an error if the vectors are empty or have different lengths.
    pub fn from_vectors(vectors: &[Vec<SpikeCount>]) -> Result<Self, PopCodeError> {
        let num_neurons = vectors.first().map(|v| v.len()).unwrap_or_default();
        let mut spike_train = SpikeTrain::build(num_neurons, vectors.len())?;
        for (t, vector) in vectors.iter().enumerate() {
            if vector.len() != num_neurons {
                return Err(PopCodeError::IncompatibleSpikeTrains(format!(
                    "The spike vector at time step {} has {} entries instead of {}",
                    t,
                    vector.len(),
                    num_neurons
                )));
            }
            spike_train.vector_mut(t).copy_from_slice(vector);
        }
        Ok(spike_train)
    }

    /// Create a spike train from per-neuron spike sequences.
    /// Returns an error if there is no channel or if the channels have different lengths.
    pub fn from_channels(channels: &[Vec<SpikeCount>]) -> Result<Self, PopCodeError> {
        let num_steps = channels.first().map(|c| c.len()).unwrap_or_default();
        let mut spike_train = SpikeTrain::build(channels.len(), num_steps)?;
        for (i, channel) in channels.iter().enumerate() {
            if channel.len() != num_steps {
                return Err(PopCodeError::IncompatibleSpikeTrains(format!(
                    "Channel {} has {} time steps instead of {}",
                    i,
                    channel.len(),
                    num_steps
                )));
            }
            for (t, &count) in channel.iter().enumerate() {
                spike_train.spikes[t * spike_train.num_neurons + i] = count;
            }
        }
        Ok(spike_train)
    }

    pub fn num_neurons(&self) -> usize {
        self.num_neurons
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Returns the spike vector at time step `t`. Panics if `t` is out of bounds.
    pub fn vector(&self, t: usize) -> &[SpikeCount] {
        &self.spikes[t * self.num_neurons..(t + 1) * self.num_neurons]
    }

    /// Returns the mutable spike vector at time step `t`. Panics if `t` is out of bounds.
    pub fn vector_mut(&mut self, t: usize) -> &mut [SpikeCount] {
        &mut self.spikes[t * self.num_neurons..(t + 1) * self.num_neurons]
    }

    /// Iterate over the spike vectors in time order.
    pub fn vectors(&self) -> ChunksExact<'_, SpikeCount> {
        self.spikes.chunks_exact(self.num_neurons)
    }

    pub fn vectors_mut(&mut self) -> ChunksExactMut<'_, SpikeCount> {
        self.spikes.chunks_exact_mut(self.num_neurons)
    }

    /// Parallel iterator over the spike vectors (indexed, hence order-preserving when collected or zipped).
    pub fn par_vectors(&self) -> rayon::slice::ChunksExact<'_, SpikeCount> {
        self.spikes.par_chunks_exact(self.num_neurons)
    }

    pub fn par_vectors_mut(&mut self) -> rayon::slice::ChunksExactMut<'_, SpikeCount> {
        self.spikes.par_chunks_exact_mut(self.num_neurons)
    }

    /// Returns the number of spikes of neuron `neuron_id` at time step `t`, if any.
    pub fn get(&self, neuron_id: usize, t: usize) -> Option<SpikeCount> {
        if neuron_id >= self.num_neurons || t >= self.num_steps {
            return None;
        }
        Some(self.spikes[t * self.num_neurons + neuron_id])
    }

    /// Iterate over the spike counts of one neuron in time order.
    /// Returns an error if the neuron does not exist.
    pub fn channel(
        &self,
        neuron_id: usize,
    ) -> Result<impl Iterator<Item = SpikeCount> + '_, PopCodeError> {
        if neuron_id >= self.num_neurons {
            return Err(PopCodeError::OutOfBounds(format!(
                "Neuron {} does not exist in a population of {} neurons",
                neuron_id, self.num_neurons
            )));
        }
        Ok(self
            .spikes
            .iter()
            .skip(neuron_id)
            .step_by(self.num_neurons)
            .copied())
    }

    /// Returns the spike counts of one neuron as floating-point values.
    pub fn channel_values(&self, neuron_id: usize) -> Result<Vec<f64>, PopCodeError> {
        Ok(self.channel(neuron_id)?.map(f64::from).collect())
    }

    /// Returns the total number of spikes in the train.
    pub fn total_activation(&self) -> u64 {
        self.spikes.iter().map(|&count| count as u64).sum()
    }

    /// Returns the mean activation of every neuron over the first `num_steps` time steps
    /// (clamped to the length of the train). The result is NaN everywhere if no time step is used.
    pub fn mean_activation(&self, num_steps: usize) -> Vec<f64> {
        let num_steps = num_steps.min(self.num_steps);
        let mut sums = vec![0_u64; self.num_neurons];
        self.vectors().take(num_steps).for_each(|vector| {
            sums.iter_mut()
                .zip(vector.iter())
                .for_each(|(sum, &count)| *sum += count as u64);
        });
        sums.into_iter()
            .map(|sum| sum as f64 / num_steps as f64)
            .collect()
    }
}
