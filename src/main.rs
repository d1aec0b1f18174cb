use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use ising::config::{SimulationConfig, TemperatureSchedule};
use ising::monte_carlo::sampler::sample_temperature_schedule;
use tracing::{info, Level};

/// Sample equilibrium configurations of the 2D Ising model with the Wolff algorithm.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// YAML configuration file, defaults are used for missing keys
    #[arg(short, long)]
    config: Option<String>,

    /// Override the lattice side length
    #[arg(long)]
    width: Option<usize>,

    /// Override the temperature schedule with explicit values
    #[arg(long, value_delimiter = ',')]
    temperatures: Option<Vec<f64>>,

    /// Override the number of samples per temperature
    #[arg(long)]
    samples: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of worker threads
    #[arg(long)]
    threads: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn apply_overrides(&self, config: &mut SimulationConfig) {
        if let Some(width) = self.width {
            config.lattice_width = width;
        }
        if let Some(temperatures) = &self.temperatures {
            config.temperatures = TemperatureSchedule::List(temperatures.clone());
        }
        if let Some(samples) = self.samples {
            config.samples_per_temperature = samples;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_yaml_file(path)
            .wrap_err_with(|| format!("Unable to load configuration from {path}"))?,
        None => SimulationConfig::default(),
    };
    args.apply_overrides(&mut config);
    info!("Configuration loaded:\n{:?}", config);

    let sample_set = sample_temperature_schedule(&config).wrap_err("Sampling failed")?;
    let (rows, columns) = sample_set.get_samples().shape();
    info!(
        rows,
        columns,
        lattice = %sample_set.get_lattice_description(),
        "sample matrix ready"
    );
    if !sample_set.get_failures().is_empty() {
        info!(
            skipped = sample_set.get_failures().len(),
            "some temperatures were skipped, see the summary"
        );
    }

    let summary = serde_yaml::to_string(&sample_set.summary()).wrap_err("Unable to write summary")?;
    println!("{summary}");
    Ok(())
}
