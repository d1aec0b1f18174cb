use crate::config::SimulationConfig;
use crate::error::SamplerError;
use crate::lattice::square_lattice::SquareLattice;
use crate::lattice::{Lattice, K_BOLTZMANN};
use crate::monte_carlo::autocorrelation::integrated_autocorrelation_time;
use crate::monte_carlo::equilibration::{equilibrate, EquilibrationSettings};
use crate::monte_carlo::mc_results::{SampleSet, TemperatureFailure, TemperatureReport};
use crate::monte_carlo::wolff_cluster::WolffClusterFlipper;
use crate::utils;
use rayon::prelude::*;
use tracing::{debug, error, info, info_span, warn};

/// Per-temperature tuning shared by every temperature of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerSettings {
    pub lattice_width: usize,
    pub num_samples: usize,
    pub equilibration: EquilibrationSettings,
    pub autocorrelation_sweeps: usize,
    pub autocorrelation_cutoff: Option<usize>,
    pub interval_factor: f64,
}

impl SamplerSettings {
    pub fn from_config(config: &SimulationConfig) -> Self {
        SamplerSettings {
            lattice_width: config.lattice_width,
            num_samples: config.samples_per_temperature,
            equilibration: config.equilibration_settings(),
            autocorrelation_sweeps: config.autocorrelation_sweeps,
            autocorrelation_cutoff: config.autocorrelation_cutoff,
            interval_factor: config.interval_factor,
        }
    }
}

/// Cluster updates between two recorded samples, never less than one.
pub fn sampling_interval(autocorrelation_time: f64, interval_factor: f64) -> usize {
    ((interval_factor * autocorrelation_time).ceil() as usize).max(1)
}

/// Samples of a single temperature, flattened row after row.
#[derive(Debug)]
pub struct TemperatureSamples {
    pub report: TemperatureReport,
    pub flat_samples: Vec<i8>,
}

/// Equilibrate a fresh random lattice at `temperature`, measure its autocorrelation
/// time and record `settings.num_samples` configurations spaced accordingly.
pub fn sample_temperature<R: rand::Rng + ?Sized>(
    temperature: f64,
    settings: &SamplerSettings,
    rng: &mut R,
) -> Result<TemperatureSamples, SamplerError> {
    let beta = 1. / (K_BOLTZMANN * temperature);
    let mut lattice = SquareLattice::new_random(settings.lattice_width, rng);
    let mut flipper = WolffClusterFlipper::new(&lattice, beta)?;
    debug!(beta, p_add = flipper.inclusion_probability(), "initialised random lattice");

    let equilibration = equilibrate(&mut lattice, &mut flipper, &settings.equilibration, rng);
    if equilibration.converged {
        info!(sweeps = equilibration.sweeps, "equilibrated");
    } else {
        warn!(
            sweeps = equilibration.sweeps,
            "no convergence within the sweep cap, continuing with the capped equilibration"
        );
    }

    let mut magnetisations = Vec::with_capacity(settings.autocorrelation_sweeps);
    let mut magnetisation = lattice.get_sum_of_spins();
    for _ in 0..settings.autocorrelation_sweeps {
        magnetisation += flipper.flip_one_cluster(&mut lattice, rng);
        magnetisations.push(magnetisation as f64);
    }
    let autocorrelation_time =
        integrated_autocorrelation_time(&magnetisations, settings.autocorrelation_cutoff)?;
    let sampling_interval = sampling_interval(autocorrelation_time, settings.interval_factor);
    info!(
        tau_int = autocorrelation_time,
        interval = sampling_interval,
        "measured autocorrelation time"
    );

    let num_sites = lattice.number_sites();
    let mut flat_samples = Vec::with_capacity(settings.num_samples * num_sites);
    for sample in 0..settings.num_samples {
        for _ in 0..sampling_interval {
            flipper.flip_one_cluster(&mut lattice, rng);
        }
        flat_samples.extend_from_slice(lattice.spins());
        debug!(sample, magnetisation = lattice.get_magnetisation(), "recorded sample");
    }

    Ok(TemperatureSamples {
        report: TemperatureReport {
            temperature,
            equilibration,
            autocorrelation_time,
            sampling_interval,
            num_samples: settings.num_samples,
        },
        flat_samples,
    })
}

/// Sample every temperature of `config`.
///
/// Temperatures run in parallel, each on its own lattice and its own random stream
/// derived from the seed and the temperature's position in the schedule, so the
/// output does not depend on the number of threads. A temperature whose
/// magnetisation trajectory turns out degenerate is skipped and listed in
/// [`SampleSet::get_failures`]; configuration errors abort before any work.
pub fn sample_temperature_schedule(config: &SimulationConfig) -> Result<SampleSet, SamplerError> {
    let temperatures = config.validate()?;
    let settings = SamplerSettings::from_config(config);
    info!(
        width = settings.lattice_width,
        temperatures = temperatures.len(),
        samples = settings.num_samples,
        seed = config.seed,
        "sampling temperature schedule"
    );

    let run = || -> Vec<(f64, Result<TemperatureSamples, SamplerError>)> {
        temperatures
            .par_iter()
            .enumerate()
            .map(|(idx, &temperature)| {
                let _span = info_span!("temperature", t = temperature).entered();
                let mut rng = utils::temperature_rng(config.seed, idx);
                (temperature, sample_temperature(temperature, &settings, &mut rng))
            })
            .collect()
    };
    let outcomes = match config.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map(|pool| pool.install(run))
            .unwrap_or_else(|e| {
                warn!("could not build a pool of {threads} threads ({e}), using the global pool");
                run()
            }),
        None => run(),
    };

    let num_sites = config.number_sites();
    let mut flat_samples = Vec::with_capacity(outcomes.len() * settings.num_samples * num_sites);
    let mut labels = Vec::with_capacity(outcomes.len() * settings.num_samples);
    let mut reports = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for (temperature, outcome) in outcomes {
        match outcome {
            Ok(samples) => {
                flat_samples.extend(samples.flat_samples);
                labels.extend(std::iter::repeat(temperature).take(samples.report.num_samples));
                reports.push(samples.report);
            }
            Err(err) => {
                error!(temperature, %err, "skipping temperature");
                failures.push(TemperatureFailure {
                    temperature,
                    error: err,
                });
            }
        }
    }

    Ok(SampleSet::new(
        num_sites,
        flat_samples,
        labels,
        reports,
        failures,
        SquareLattice::new_with_ones(config.lattice_width).describe(),
    ))
}
