//! Wolff cluster Monte Carlo for the two-dimensional Ising model.
//!
//! For every temperature of a schedule a fresh random lattice is equilibrated,
//! the integrated autocorrelation time of its magnetisation is measured and
//! configurations are recorded at an interval derived from it. The result is a
//! sample matrix with one flattened lattice per row and a matching vector of
//! temperature labels.

pub mod config;
pub mod error;
pub mod lattice;
pub mod monte_carlo;
pub mod utils;

pub use config::{SimulationConfig, TemperatureSchedule};
pub use error::{ConfigError, SamplerError};
pub use monte_carlo::mc_results::{SampleSet, TemperatureFailure, TemperatureReport};
pub use monte_carlo::sampler::sample_temperature_schedule;
