//! Firing rate estimation by binning spike trains over non-overlapping time windows.
use itertools::Itertools;
use rayon::prelude::*;

use crate::error::PopCodeError;
use crate::spike_train::SpikeTrain;
use crate::MIN_PARALLEL_NEURONS;

/// Returns the average value of consecutive non-overlapping windows of `bin_size` samples.
/// The trailing samples which do not fill a complete window are dropped.
/// A zero bin size yields no window at all.
pub fn bin_average<I>(samples: I, bin_size: usize) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    if bin_size == 0 {
        return vec![];
    }
    samples
        .into_iter()
        .chunks(bin_size)
        .into_iter()
        .filter_map(|bin| {
            let (sum, len) = bin.fold((0.0, 0), |(sum, len), x| (sum + x, len + 1));
            (len == bin_size).then(|| sum / bin_size as f64)
        })
        .collect()
}

/// Returns the number of complete bins in a sequence of `num_steps` samples.
pub fn num_bins(num_steps: usize, bin_size: usize) -> usize {
    if bin_size == 0 {
        return 0;
    }
    num_steps / bin_size
}

/// Returns the firing rates of every neuron of the spike train, i.e., its spike counts averaged over
/// consecutive bins of `bin_size` time steps. Every neuron gets `num_steps / bin_size` rates (possibly none).
/// Returns an error if the bin size is zero.
pub fn firing_rates(spike_train: &SpikeTrain, bin_size: usize) -> Result<Vec<Vec<f64>>, PopCodeError> {
    if bin_size == 0 {
        return Err(PopCodeError::InvalidParameter(
            "The bin size must be positive".to_string(),
        ));
    }

    let rates = |neuron_id: usize| -> Result<Vec<f64>, PopCodeError> {
        Ok(bin_average(
            spike_train.channel(neuron_id)?.map(f64::from),
            bin_size,
        ))
    };

    if spike_train.num_neurons() >= MIN_PARALLEL_NEURONS {
        (0..spike_train.num_neurons())
            .into_par_iter()
            .map(rates)
            .collect()
    } else {
        (0..spike_train.num_neurons()).map(rates).collect()
    }
}
