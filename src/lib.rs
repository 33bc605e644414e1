//! This crate simulates the addition of two neural population codes and measures the correlations it induces.
//!
//! Two independent populations A and B encode noisy values with Gaussian tuning curves over preferred values
//! in [-1, 1]. Adding the codes (every pair of spikes of A and B votes for the neuron tuned to the sum of their
//! preferred values) yields a code C for the sum of the values, whose neurons with nearby preferred values are
//! positively correlated.
//!
//! # Sampling Population Codes
//!
//! ```rust
//! use rusty_popcode::population::PopulationCode;
//! use rusty_popcode::tuning::TuningParameters;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let code = PopulationCode::build(51, TuningParameters::build(-0.2, 0.2).unwrap()).unwrap();
//!
//! // One spike vector per time step
//! let vector = code.sample(&mut rng);
//! assert_eq!(vector.len(), 51);
//!
//! // Or a whole spike train
//! let spike_train = code.sample_train(1000, &mut rng).unwrap();
//! assert_eq!(spike_train.num_steps(), 1000);
//! ```
//!
//! # Combining Population Codes
//!
//! ```rust
//! use rusty_popcode::combiner::Combiner;
//!
//! let combiner = Combiner::build(5).unwrap();
//!
//! // -0.5 + 0.5 = 0.0
//! let c = combiner.combine(&[0, 1, 0, 0, 0], &[0, 0, 0, 1, 0]).unwrap();
//! assert_eq!(c, vec![0, 0, 1, 0, 0]);
//! ```
//!
//! # Analyzing the Combined Code
//!
//! ```rust
//! use rusty_popcode::firing_rate::firing_rates;
//! use rusty_popcode::population::PopulationCode;
//! use rusty_popcode::combiner::Combiner;
//! use rusty_popcode::stats::{fit_ellipse, pearson};
//! use rusty_popcode::tuning::TuningParameters;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let code_a = PopulationCode::build(51, TuningParameters::build(-0.2, 0.2).unwrap()).unwrap();
//! let code_b = PopulationCode::build(51, TuningParameters::build(0.2, 0.3).unwrap()).unwrap();
//! let a = code_a.sample_train(10_000, &mut rng).unwrap();
//! let b = code_b.sample_train(10_000, &mut rng).unwrap();
//! let c = Combiner::build(51).unwrap().combine_trains(&a, &b).unwrap();
//!
//! let rates = firing_rates(&c, 100).unwrap();
//! let correlation = pearson(&rates[25], &rates[26]).unwrap();
//! let ellipse = fit_ellipse(&rates[25], &rates[26]).unwrap();
//! assert!(correlation.coefficient.abs() <= 1.0);
//! assert!(ellipse.width >= ellipse.height);
//! ```

pub mod combiner;
pub mod config;
pub mod error;
pub mod firing_rate;
pub mod population;
pub mod simulation;
pub mod spike_train;
pub mod stats;
pub mod tuning;

/// Minimum number of neurons to consider parallel processing.
pub const MIN_PARALLEL_NEURONS: usize = 16;
