//! Combination of two population codes.
//!
//! Every active neuron of code A is paired with every active neuron of code B, and the pair contributes to the
//! neuron of code C whose preferred value is the sum of their preferred values. On the regular grid of preferred
//! values, `x_i + x_j = x_k` with `k = i + j - (N - 1) / 2`; sums falling outside of [-1, 1] are lost.
//!
//! On average, code C is the discrete convolution of the activity profiles of A and B, i.e., the tuning curve
//! of the sum of two independent Gaussian estimates. Neighboring neurons of C share upstream spikes (the same
//! spike of A paired with neighboring spikes of B, or vice versa), which correlates them across time even
//! though A and B are independent.
use rayon::prelude::*;

use crate::error::PopCodeError;
use crate::spike_train::{SpikeCount, SpikeTrain};

/// Combines pairs of spike vectors of the same population size.
/// Coincident contributions to the same neuron add up, i.e., a neuron can emit several spikes per time step.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Combiner {
    num_neurons: usize,
}

impl Combiner {
    /// Create a new combiner.
    /// Returns an error if the number of neurons is not odd.
    pub fn build(num_neurons: usize) -> Result<Self, PopCodeError> {
        if num_neurons % 2 == 0 {
            return Err(PopCodeError::InvalidParameter(format!(
                "The number of neurons must be odd, got {}",
                num_neurons
            )));
        }
        Ok(Combiner { num_neurons })
    }

    pub fn num_neurons(&self) -> usize {
        self.num_neurons
    }

    /// Returns the index of the neuron encoding the sum of the preferred values of neurons `i` and `j`, if any.
    fn target(&self, i: usize, j: usize) -> Option<usize> {
        let half = (self.num_neurons - 1) / 2;
        (i + j)
            .checked_sub(half)
            .filter(|&k| k < self.num_neurons)
    }

    fn check_len(&self, len: usize, name: &str) -> Result<(), PopCodeError> {
        if len != self.num_neurons {
            return Err(PopCodeError::IncompatibleSpikeTrains(format!(
                "The spike vector {} has {} entries instead of {}",
                name, len, self.num_neurons
            )));
        }
        Ok(())
    }

    /// Combine two spike vectors into `out`, which is overwritten.
    /// Returns an error if one of the vectors does not have one entry per neuron.
    pub fn combine_into(
        &self,
        a: &[SpikeCount],
        b: &[SpikeCount],
        out: &mut [SpikeCount],
    ) -> Result<(), PopCodeError> {
        self.check_len(a.len(), "A")?;
        self.check_len(b.len(), "B")?;
        self.check_len(out.len(), "C")?;
        self.combine_unchecked(a, b, out);
        Ok(())
    }

    /// Combine two spike vectors into a new one.
    pub fn combine(
        &self,
        a: &[SpikeCount],
        b: &[SpikeCount],
    ) -> Result<Vec<SpikeCount>, PopCodeError> {
        let mut out = vec![0; self.num_neurons];
        self.combine_into(a, b, &mut out)?;
        Ok(out)
    }

    fn combine_unchecked(&self, a: &[SpikeCount], b: &[SpikeCount], out: &mut [SpikeCount]) {
        out.fill(0);
        // spike vectors are sparse: only visit the active neurons
        for (i, &count_a) in a.iter().enumerate().filter(|&(_, &count)| count > 0) {
            for (j, &count_b) in b.iter().enumerate().filter(|&(_, &count)| count > 0) {
                if let Some(k) = self.target(i, j) {
                    out[k] = out[k].saturating_add(count_a.saturating_mul(count_b));
                }
            }
        }
    }

    /// Combine two spike trains time step by time step.
    /// The time steps are processed in parallel; the result does not depend on the scheduling.
    /// Returns an error if the spike trains do not have the same shape as the combiner.
    pub fn combine_trains(
        &self,
        a: &SpikeTrain,
        b: &SpikeTrain,
    ) -> Result<SpikeTrain, PopCodeError> {
        if a.num_steps() != b.num_steps() {
            return Err(PopCodeError::IncompatibleSpikeTrains(format!(
                "The spike trains have {} and {} time steps",
                a.num_steps(),
                b.num_steps()
            )));
        }
        let mut c = SpikeTrain::build(self.num_neurons, a.num_steps())?;
        self.combine_trains_into(a, b, &mut c)?;
        Ok(c)
    }

    /// Same as [`Combiner::combine_trains`] but writes into a preallocated spike train.
    pub fn combine_trains_into(
        &self,
        a: &SpikeTrain,
        b: &SpikeTrain,
        c: &mut SpikeTrain,
    ) -> Result<(), PopCodeError> {
        self.check_len(a.num_neurons(), "train A")?;
        self.check_len(b.num_neurons(), "train B")?;
        self.check_len(c.num_neurons(), "train C")?;
        if a.num_steps() != b.num_steps() || a.num_steps() != c.num_steps() {
            return Err(PopCodeError::IncompatibleSpikeTrains(format!(
                "The spike trains have {}, {} and {} time steps",
                a.num_steps(),
                b.num_steps(),
                c.num_steps()
            )));
        }

        c.par_vectors_mut()
            .zip(a.par_vectors())
            .zip(b.par_vectors())
            .for_each(|((out, va), vb)| self.combine_unchecked(va, vb, out));
        Ok(())
    }

    /// Returns the exact expected activity of the combined code given the firing probabilities of the two input codes, i.e., their discrete convolution.
    pub fn expected_activation(&self, p_a: &[f64], p_b: &[f64]) -> Result<Vec<f64>, PopCodeError> {
        self.check_len(p_a.len(), "A")?;
        self.check_len(p_b.len(), "B")?;
        let mut expected = vec![0.0; self.num_neurons];
        for (i, pa) in p_a.iter().enumerate() {
            for (j, pb) in p_b.iter().enumerate() {
                if let Some(k) = self.target(i, j) {
                    expected[k] += pa * pb;
                }
            }
        }
        Ok(expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::PopulationCode;
    use crate::tuning::{theoretical_code, TuningParameters};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_build() {
        assert!(Combiner::build(51).is_ok());
        assert!(matches!(
            Combiner::build(4),
            Err(PopCodeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_target() {
        let combiner = Combiner::build(5).unwrap();
        // preferred values are [-1, -0.5, 0, 0.5, 1]
        assert_eq!(combiner.target(2, 2), Some(2));
        assert_eq!(combiner.target(1, 3), Some(2));
        assert_eq!(combiner.target(0, 2), Some(0));
        assert_eq!(combiner.target(0, 1), None);
        assert_eq!(combiner.target(3, 4), None);
        assert_eq!(combiner.target(4, 2), Some(4));
    }

    #[test]
    fn test_combine() {
        let combiner = Combiner::build(5).unwrap();
        assert_eq!(
            combiner.combine(&[0, 1, 0, 0, 0], &[0, 0, 0, 1, 0]).unwrap(),
            vec![0, 0, 1, 0, 0]
        );
        assert_eq!(
            combiner.combine(&[0, 1, 0, 1, 0], &[0, 0, 1, 1, 0]).unwrap(),
            vec![0, 1, 1, 1, 1]
        );
        assert_eq!(
            combiner.combine(&[0, 1, 0, 1, 0], &[0, 1, 0, 1, 0]).unwrap(),
            vec![1, 0, 2, 0, 1]
        );
        // no spike in one of the codes, no spike in the combination
        assert_eq!(
            combiner.combine(&[0, 0, 0, 0, 0], &[1, 1, 1, 1, 1]).unwrap(),
            vec![0, 0, 0, 0, 0]
        );
        // sums outside of [-1, 1] are lost
        assert_eq!(
            combiner.combine(&[1, 0, 0, 0, 0], &[1, 0, 0, 0, 0]).unwrap(),
            vec![0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_combine_incompatible() {
        let combiner = Combiner::build(5).unwrap();
        assert!(matches!(
            combiner.combine(&[0, 1, 0], &[0, 0, 0, 1, 0]),
            Err(PopCodeError::IncompatibleSpikeTrains(_))
        ));

        let a = SpikeTrain::build(5, 10).unwrap();
        let b = SpikeTrain::build(5, 11).unwrap();
        assert!(matches!(
            combiner.combine_trains(&a, &b),
            Err(PopCodeError::IncompatibleSpikeTrains(_))
        ));
    }

    #[test]
    fn test_combine_trains_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(7);
        let code_a = PopulationCode::build(51, TuningParameters::build(-0.2, 0.2).unwrap()).unwrap();
        let code_b = PopulationCode::build(51, TuningParameters::build(0.2, 0.3).unwrap()).unwrap();
        let a = code_a.sample_train(5_000, &mut rng).unwrap();
        let b = code_b.sample_train(5_000, &mut rng).unwrap();

        let combiner = Combiner::build(51).unwrap();
        let c = combiner.combine_trains(&a, &b).unwrap();
        for t in 0..5_000 {
            assert_eq!(
                c.vector(t),
                combiner.combine(a.vector(t), b.vector(t)).unwrap().as_slice()
            );
        }
    }

    #[test]
    fn test_expected_activation() {
        let tuning_a = TuningParameters::build(-0.2, 0.2).unwrap();
        let tuning_b = TuningParameters::build(0.2, 0.3).unwrap();
        let combiner = Combiner::build(51).unwrap();

        let expected = combiner
            .expected_activation(
                &theoretical_code(51, &tuning_a),
                &theoretical_code(51, &tuning_b),
            )
            .unwrap();
        let theoretical = theoretical_code(51, &tuning_a.sum(&tuning_b));

        // the discrete convolution matches the theoretical tuning curve up to the grid factor (N - 1) / N
        for k in 20..=30 {
            assert_relative_eq!(expected[k], theoretical[k] * 50.0 / 51.0, max_relative = 1e-3);
        }
    }
}
