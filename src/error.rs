use thiserror::Error;

/// Problems with the run configuration. All of these are detected before any
/// lattice is simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("lattice width must be positive")]
    ZeroLatticeWidth,

    #[error("`{0}` must be positive")]
    ZeroCount(&'static str),

    #[error("temperature schedule is empty")]
    EmptySchedule,

    #[error("temperature {0} is not a positive finite number")]
    InvalidTemperature(f64),

    #[error("invalid temperature range: start {start}, stop {stop}, step {step}")]
    InvalidRange { start: f64, stop: f64, step: f64 },

    #[error("`{name}` must be a positive finite number, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("could not read configuration file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("could not parse configuration: {0}")]
    Parse(String),
}

/// Errors raised while simulating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("inverse temperature {0} is not a finite non-negative number")]
    InvalidBeta(f64),

    #[error("degenerate magnetisation trajectory of length {length}: {reason}")]
    DegenerateTrajectory { length: usize, reason: &'static str },
}
