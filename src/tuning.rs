//! Gaussian tuning curves of a population code.
//!
//! A population of `N` neurons covers the interval [-1, 1] with evenly spaced preferred values.
//! Every neuron responds to an encoded value with a Gaussian profile, so that the expected activation
//! of the whole population is a sampled Gaussian density.
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::PopCodeError;

/// Returns the Gaussian density with mean `mu` and spread `sigma` evaluated at `x`.
/// The spread must be positive, otherwise the result is meaningless (NaN or infinite).
pub fn gaussian_density(x: f64, mu: f64, sigma: f64) -> f64 {
    let dx = x - mu;
    (-dx * dx / (2.0 * sigma * sigma)).exp() / (sigma * (2.0 * PI).sqrt())
}

/// Returns the preferred value of the neuron with the given index, i.e., `i / ((N - 1) / 2) - 1`.
pub fn preferred_value(index: usize, num_neurons: usize) -> f64 {
    index as f64 / ((num_neurons - 1) as f64 / 2.0) - 1.0
}

/// Returns the preferred values of a population with the given number of neurons.
pub fn preferred_values(num_neurons: usize) -> Vec<f64> {
    (0..num_neurons)
        .map(|i| preferred_value(i, num_neurons))
        .collect()
}

/// Returns the index of the neuron whose tuning interval contains `value`, i.e., `floor(value * N / 2 + N / 2)`.
/// Values outside of [-1, 1] are mapped to the border neurons.
pub fn preferred_index(value: f64, num_neurons: usize) -> usize {
    let index = (value * num_neurons as f64 / 2.0 + num_neurons as f64 / 2.0).floor();
    if index <= 0.0 {
        0
    } else {
        (index as usize).min(num_neurons - 1)
    }
}

/// The parameters of a Gaussian tuning profile over the preferred values.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct TuningParameters {
    /// The encoded value, i.e., the center of the activation profile.
    pub mean: f64,
    /// The spread of the activation profile.
    pub std: f64,
}

impl TuningParameters {
    /// Create new tuning parameters.
    /// Returns an error if the mean is not finite or if the spread is not positive.
    pub fn build(mean: f64, std: f64) -> Result<Self, PopCodeError> {
        if !mean.is_finite() {
            return Err(PopCodeError::InvalidParameter(format!(
                "The mean must be finite, got {}",
                mean
            )));
        }
        if !std.is_finite() || std <= 0.0 {
            return Err(PopCodeError::InvalidParameter(format!(
                "The spread must be positive and finite, got {}",
                std
            )));
        }
        Ok(TuningParameters { mean, std })
    }

    /// Returns the tuning parameters of the sum of two independent Gaussian estimates,
    /// i.e., means add up and variances add up.
    pub fn sum(&self, other: &TuningParameters) -> TuningParameters {
        TuningParameters {
            mean: self.mean + other.mean,
            std: (self.std * self.std + other.std * other.std).sqrt(),
        }
    }

    /// Returns the Gaussian density of the profile at `x`.
    pub fn density(&self, x: f64) -> f64 {
        gaussian_density(x, self.mean, self.std)
    }

    /// Returns the expected activation (in spikes per time step) of a neuron with preferred value `x`
    /// in a population of `num_neurons` neurons, i.e., the density scaled by `2 / N`.
    pub fn expected_activation(&self, x: f64, num_neurons: usize) -> f64 {
        self.density(x) * 2.0 / num_neurons as f64
    }
}

/// Returns the theoretically expected activation of every neuron of a population code.
pub fn theoretical_code(num_neurons: usize, tuning: &TuningParameters) -> Vec<f64> {
    preferred_values(num_neurons)
        .into_iter()
        .map(|x| tuning.expected_activation(x, num_neurons))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gaussian_density() {
        assert_relative_eq!(
            gaussian_density(0.0, 0.0, 1.0),
            1.0 / (2.0 * PI).sqrt(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            gaussian_density(0.5, 0.2, 0.3),
            gaussian_density(-0.1, 0.2, 0.3),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            gaussian_density(1.0, 0.0, 1.0),
            (-0.5_f64).exp() / (2.0 * PI).sqrt(),
            epsilon = 1e-12
        );
        assert!(gaussian_density(0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn test_preferred_values() {
        let values = preferred_values(51);
        assert_eq!(values.len(), 51);
        assert_relative_eq!(values[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(values[25], 0.0, epsilon = 1e-12);
        assert_relative_eq!(values[50], 1.0, epsilon = 1e-12);
        assert_relative_eq!(values[26] - values[25], 0.04, epsilon = 1e-12);

        assert_eq!(preferred_values(1).len(), 1);
    }

    #[test]
    fn test_preferred_index() {
        assert_eq!(preferred_index(0.0, 51), 25);
        assert_eq!(preferred_index(0.02, 51), 26);
        assert_eq!(preferred_index(-1.0, 51), 0);
        assert_eq!(preferred_index(1.0, 51), 50);
        assert_eq!(preferred_index(-3.0, 51), 0);
        assert_eq!(preferred_index(3.0, 51), 50);
    }

    #[test]
    fn test_tuning_parameters_build() {
        assert!(TuningParameters::build(-0.2, 0.2).is_ok());
        assert!(matches!(
            TuningParameters::build(0.0, 0.0),
            Err(PopCodeError::InvalidParameter(_))
        ));
        assert!(matches!(
            TuningParameters::build(0.0, -0.1),
            Err(PopCodeError::InvalidParameter(_))
        ));
        assert!(matches!(
            TuningParameters::build(f64::NAN, 0.1),
            Err(PopCodeError::InvalidParameter(_))
        ));
        assert!(matches!(
            TuningParameters::build(0.0, f64::INFINITY),
            Err(PopCodeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_tuning_parameters_sum() {
        let a = TuningParameters::build(-0.2, 0.3).unwrap();
        let b = TuningParameters::build(0.5, 0.4).unwrap();
        let c = a.sum(&b);
        assert_relative_eq!(c.mean, 0.3, epsilon = 1e-12);
        assert_relative_eq!(c.std, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_theoretical_code() {
        let tuning = TuningParameters::build(0.0, 0.2).unwrap();
        let code = theoretical_code(51, &tuning);

        // symmetric around the middle neuron, with the peak at the encoded value
        assert_eq!(code.len(), 51);
        for i in 0..25 {
            assert_relative_eq!(code[i], code[50 - i], epsilon = 1e-12);
        }
        assert_relative_eq!(
            code[25],
            2.0 / 51.0 / (0.2 * (2.0 * PI).sqrt()),
            epsilon = 1e-12
        );

        // about one spike per time step for a profile well inside [-1, 1]
        assert_relative_eq!(code.iter().sum::<f64>(), 50.0 / 51.0, epsilon = 1e-6);
    }
}
