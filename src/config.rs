//! Configuration of a simulation run.
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::PopCodeError;
use crate::tuning::{preferred_index, TuningParameters};

/// Selection of a pair of neurons for the correlation analysis.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum PairSelection {
    /// The two neurons with the given indices.
    Indices(usize, usize),
    /// The neuron whose tuning interval contains `value` and its right neighbor.
    Preferred { value: f64 },
}

impl PairSelection {
    /// Returns the indices of the selected neurons in a population of `num_neurons` neurons.
    /// Returns an error if one of the neurons does not exist.
    pub fn resolve(&self, num_neurons: usize) -> Result<(usize, usize), PopCodeError> {
        let (i, j) = match *self {
            PairSelection::Indices(i, j) => (i, j),
            PairSelection::Preferred { value } => {
                let i = preferred_index(value, num_neurons);
                (i, i + 1)
            }
        };
        if i >= num_neurons || j >= num_neurons {
            return Err(PopCodeError::OutOfBounds(format!(
                "The neuron pair ({}, {}) does not exist in a population of {} neurons",
                i, j, num_neurons
            )));
        }
        Ok((i, j))
    }
}

/// All parameters of a simulation run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// The number of neurons per population (odd).
    pub num_neurons: usize,
    /// The number of simulated time steps.
    pub num_steps: usize,
    /// The number of (first) time steps used for the activity histograms.
    pub histogram_steps: usize,
    /// The tuning of population A.
    pub population_a: TuningParameters,
    /// The tuning of population B.
    pub population_b: TuningParameters,
    /// The number of time steps per firing rate bin.
    pub bin_size: usize,
    /// The pair of neurons with nearby preferred values.
    pub near_pair: PairSelection,
    /// The pair of neurons with distant preferred values.
    pub far_pair: PairSelection,
    /// The seed of the random streams.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let population_a = TuningParameters {
            mean: -0.2,
            std: 0.2,
        };
        let population_b = TuningParameters {
            mean: 0.2,
            std: 0.3,
        };
        SimulationConfig {
            num_neurons: 51,
            num_steps: 2_000_000,
            histogram_steps: 1_000,
            population_a,
            population_b,
            bin_size: 500,
            near_pair: PairSelection::Preferred {
                value: population_a.mean + population_b.mean,
            },
            far_pair: PairSelection::Indices(10, 40),
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Check every parameter before anything is allocated or sampled.
    pub fn validate(&self) -> Result<(), PopCodeError> {
        if self.num_neurons < 3 {
            return Err(PopCodeError::InvalidParameter(format!(
                "At least 3 neurons are required to span the preferred values, got {}",
                self.num_neurons
            )));
        }
        if self.num_neurons % 2 == 0 {
            return Err(PopCodeError::InvalidParameter(format!(
                "The number of neurons must be odd, got {}",
                self.num_neurons
            )));
        }
        if self.num_steps < 1 {
            return Err(PopCodeError::InvalidParameter(
                "The number of time steps must be positive".to_string(),
            ));
        }
        if self.histogram_steps < 1 {
            return Err(PopCodeError::InvalidParameter(
                "The number of histogram steps must be positive".to_string(),
            ));
        }
        if self.bin_size < 1 {
            return Err(PopCodeError::InvalidParameter(
                "The bin size must be positive".to_string(),
            ));
        }
        if self.num_steps / self.bin_size < 2 {
            return Err(PopCodeError::InvalidParameter(format!(
                "At least two firing rate bins are required, got {} time steps for a bin size of {}",
                self.num_steps, self.bin_size
            )));
        }
        for tuning in [&self.population_a, &self.population_b] {
            TuningParameters::build(tuning.mean, tuning.std)?;
        }
        self.near_pair.resolve(self.num_neurons)?;
        self.far_pair.resolve(self.num_neurons)?;
        Ok(())
    }

    /// The theoretical tuning of the combined code.
    pub fn population_c(&self) -> TuningParameters {
        self.population_a.sum(&self.population_b)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), PopCodeError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields take their default value.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, PopCodeError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.near_pair.resolve(51).unwrap(), (25, 26));
        assert_eq!(config.far_pair.resolve(51).unwrap(), (10, 40));
    }

    #[test]
    fn test_validate() {
        let config = SimulationConfig {
            num_neurons: 50,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PopCodeError::InvalidParameter(_))
        ));

        let config = SimulationConfig {
            num_steps: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PopCodeError::InvalidParameter(_))
        ));

        let config = SimulationConfig {
            bin_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PopCodeError::InvalidParameter(_))
        ));

        let config = SimulationConfig {
            num_neurons: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PopCodeError::InvalidParameter(_))
        ));

        // a single firing rate bin cannot be correlated
        let config = SimulationConfig {
            num_steps: 999,
            bin_size: 500,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PopCodeError::InvalidParameter(_))
        ));
        let config = SimulationConfig {
            num_steps: 1000,
            bin_size: 500,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = SimulationConfig {
            population_b: TuningParameters {
                mean: 0.2,
                std: 0.0,
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PopCodeError::InvalidParameter(_))
        ));

        let config = SimulationConfig {
            far_pair: PairSelection::Indices(10, 51),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PopCodeError::OutOfBounds(_))
        ));

        // the right neighbor of the last neuron does not exist
        let config = SimulationConfig {
            near_pair: PairSelection::Preferred { value: 1.0 },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PopCodeError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_save_load() {
        let config = SimulationConfig {
            num_steps: 1234,
            far_pair: PairSelection::Indices(3, 47),
            ..Default::default()
        };
        let file = NamedTempFile::new().unwrap();
        config.save_to(file.path()).unwrap();
        assert_eq!(SimulationConfig::load_from(file.path()).unwrap(), config);
    }

    #[test]
    fn test_load_partial() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"num_neurons": 21, "far_pair": {{"Indices": [2, 18]}}}}"#).unwrap();
        let config = SimulationConfig::load_from(file.path()).unwrap();
        assert_eq!(config.num_neurons, 21);
        assert_eq!(config.far_pair, PairSelection::Indices(2, 18));
        assert_eq!(config.num_steps, SimulationConfig::default().num_steps);

        assert!(matches!(
            SimulationConfig::load_from("/nonexistent/config.json"),
            Err(PopCodeError::IOError(_))
        ));
    }
}
