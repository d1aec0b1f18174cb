//! Run configuration.
//!
//! Every option has a default, so a YAML file only needs to name what it changes:
//!
//! ```yaml
//! lattice_width: 32
//! temperatures: { start: 1.6, stop: 3.0, step: 0.1 }
//! samples_per_temperature: 40
//! window: 50
//! seed: 7
//! ```

use crate::error::ConfigError;
use crate::monte_carlo::equilibration::EquilibrationSettings;
use crate::utils;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Temperatures to simulate, either listed or as an evenly spaced range with exclusive `stop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemperatureSchedule {
    List(Vec<f64>),
    Range { start: f64, stop: f64, step: f64 },
}

impl TemperatureSchedule {
    pub fn temperatures(&self) -> Result<Vec<f64>, ConfigError> {
        match *self {
            TemperatureSchedule::List(ref temperatures) => Ok(temperatures.clone()),
            TemperatureSchedule::Range { start, stop, step } => {
                utils::linspace_vector_from_step(start, stop, step)
            }
        }
    }
}

impl Default for TemperatureSchedule {
    fn default() -> Self {
        TemperatureSchedule::Range {
            start: 1.6,
            stop: 3.0,
            step: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub lattice_width: usize,
    pub temperatures: TemperatureSchedule,
    pub samples_per_temperature: usize,
    /// Cap on equilibration, counted in single-cluster updates.
    pub max_equilibration_sweeps: usize,
    pub window: usize,
    /// Defaults to `1e-3 * N` for `N` lattice sites.
    pub mean_threshold: Option<f64>,
    /// Defaults to `1e-4 * N^2` for `N` lattice sites.
    pub variance_threshold: Option<f64>,
    pub autocorrelation_sweeps: usize,
    /// Largest lag (exclusive) summed for the autocorrelation time, defaults to half the trajectory.
    pub autocorrelation_cutoff: Option<usize>,
    pub interval_factor: f64,
    pub seed: u64,
    pub threads: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            lattice_width: 80,
            temperatures: TemperatureSchedule::default(),
            samples_per_temperature: 80,
            max_equilibration_sweeps: 20_000,
            window: 100,
            mean_threshold: None,
            variance_threshold: None,
            autocorrelation_sweeps: 5_000,
            autocorrelation_cutoff: None,
            interval_factor: 10.,
            seed: 42,
            threads: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn number_sites(&self) -> usize {
        self.lattice_width * self.lattice_width
    }

    /// Check every option and expand the temperature schedule.
    pub fn validate(&self) -> Result<Vec<f64>, ConfigError> {
        if self.lattice_width == 0 {
            return Err(ConfigError::ZeroLatticeWidth);
        }
        for (name, value) in [
            ("samples_per_temperature", self.samples_per_temperature),
            ("window", self.window),
            ("autocorrelation_sweeps", self.autocorrelation_sweeps),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroCount(name));
            }
        }
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroCount("threads"));
        }

        let parameters = [
            ("interval_factor", Some(self.interval_factor)),
            ("mean_threshold", self.mean_threshold),
            ("variance_threshold", self.variance_threshold),
        ];
        for (name, value) in parameters {
            if let Some(value) = value {
                if !(value.is_finite() && value > 0.) {
                    return Err(ConfigError::InvalidParameter { name, value });
                }
            }
        }

        let temperatures = self.temperatures.temperatures()?;
        if temperatures.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        if let Some(&bad) = temperatures.iter().find(|t| !(t.is_finite() && **t > 0.)) {
            return Err(ConfigError::InvalidTemperature(bad));
        }

        Ok(temperatures)
    }

    pub fn equilibration_settings(&self) -> EquilibrationSettings {
        let mut settings =
            EquilibrationSettings::new(self.max_equilibration_sweeps, self.window, self.number_sites());
        if let Some(mean_threshold) = self.mean_threshold {
            settings = settings.with_mean_threshold(mean_threshold);
        }
        if let Some(variance_threshold) = self.variance_threshold {
            settings = settings.with_variance_threshold(variance_threshold);
        }
        settings
    }
}
