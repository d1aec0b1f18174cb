use crate::error::SamplerError;
use crate::monte_carlo::equilibration::EquilibrationOutcome;
use nalgebra::DMatrix;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::cell::OnceCell;

fn binder_cumulant(magnetisation_sample: &[f64]) -> f64 {
    1. - magnetisation_sample.iter().map(|m| m.powi(4)).mean()
        / (3. * magnetisation_sample.iter().map(|m| m.powi(2)).mean().powi(2))
}

/// What happened while sampling one temperature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReport {
    pub temperature: f64,
    pub equilibration: EquilibrationOutcome,
    pub autocorrelation_time: f64,
    pub sampling_interval: usize,
    pub num_samples: usize,
}

/// A temperature whose sampling was aborted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureFailure {
    pub temperature: f64,
    #[serde(serialize_with = "serialize_display")]
    pub error: SamplerError,
}

fn serialize_display<S: serde::Serializer>(
    error: &SamplerError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Sample matrix and labels of a whole temperature schedule.
///
/// Row `r` of the matrix is one lattice flattened row-major and `labels[r]` the
/// temperature it was sampled at. Rows are ordered by schedule position first and
/// sample index second.
#[derive(Debug)]
pub struct SampleSet {
    samples: DMatrix<i8>,
    labels: Vec<f64>,
    reports: Vec<TemperatureReport>,
    failures: Vec<TemperatureFailure>,
    lattice_description: String,
    // the following are caches for values that are calculated lazily
    avg_abs_magnetisations: OnceCell<Vec<f64>>,
    binder_cumulants: OnceCell<Vec<f64>>,
}

impl SampleSet {
    /// Assemble a sample set from row-major `flat_samples` of `num_sites` spins each.
    pub fn new(
        num_sites: usize,
        flat_samples: Vec<i8>,
        labels: Vec<f64>,
        reports: Vec<TemperatureReport>,
        failures: Vec<TemperatureFailure>,
        lattice_description: String,
    ) -> Self {
        debug_assert_eq!(flat_samples.len(), labels.len() * num_sites);
        debug_assert_eq!(
            labels.len(),
            reports.iter().map(|r| r.num_samples).sum::<usize>()
        );

        SampleSet {
            samples: DMatrix::from_row_slice(labels.len(), num_sites, &flat_samples),
            labels,
            reports,
            failures,
            lattice_description,
            avg_abs_magnetisations: OnceCell::new(),
            binder_cumulants: OnceCell::new(),
        }
    }

    pub fn get_samples(&self) -> &DMatrix<i8> {
        &self.samples
    }

    pub fn get_labels(&self) -> &Vec<f64> {
        &self.labels
    }

    pub fn into_parts(self) -> (DMatrix<i8>, Vec<f64>) {
        (self.samples, self.labels)
    }

    pub fn get_reports(&self) -> &Vec<TemperatureReport> {
        &self.reports
    }

    /// Temperatures that were skipped, together with the reason.
    pub fn get_failures(&self) -> &Vec<TemperatureFailure> {
        &self.failures
    }

    pub fn get_lattice_description(&self) -> &String {
        &self.lattice_description
    }

    pub fn num_sites(&self) -> usize {
        self.samples.ncols()
    }

    /// Magnetisation per spin of every sample, grouped by reported temperature.
    fn magnetisations_per_temperature(&self) -> Vec<Vec<f64>> {
        let num_sites = self.num_sites() as f64;
        let mut row = 0;
        self.reports
            .iter()
            .map(|report| {
                let rows = row..row + report.num_samples;
                row += report.num_samples;
                rows.map(|r| {
                    self.samples.row(r).iter().map(|s| *s as f64).sum::<f64>() / num_sites
                })
                .collect()
            })
            .collect()
    }

    /// Mean of `|m|` per spin, one entry per reported temperature.
    pub fn get_avg_abs_magnetisations(&self) -> &Vec<f64> {
        self.avg_abs_magnetisations.get_or_init(|| {
            self.magnetisations_per_temperature()
                .iter()
                .map(|ms| ms.iter().map(|m| m.abs()).mean())
                .collect()
        })
    }

    /// Binder cumulant `1 - <m^4> / (3 <m^2>^2)`, one entry per reported temperature.
    pub fn get_binder_cumulants(&self) -> &Vec<f64> {
        self.binder_cumulants.get_or_init(|| {
            self.magnetisations_per_temperature()
                .iter()
                .map(|ms| binder_cumulant(ms))
                .collect()
        })
    }

    /// Serialisable overview of the run without the sample matrix.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            lattice: self.lattice_description.clone(),
            rows: self.samples.nrows(),
            columns: self.samples.ncols(),
            temperatures: self
                .reports
                .iter()
                .zip(self.get_avg_abs_magnetisations())
                .zip(self.get_binder_cumulants())
                .map(|((report, &avg_abs_magnetisation), &binder_cumulant)| {
                    TemperatureSummary {
                        report: report.clone(),
                        avg_abs_magnetisation,
                        binder_cumulant,
                    }
                })
                .collect(),
            failures: self.failures.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureSummary {
    #[serde(flatten)]
    pub report: TemperatureReport,
    pub avg_abs_magnetisation: f64,
    pub binder_cumulant: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub lattice: String,
    pub rows: usize,
    pub columns: usize,
    pub temperatures: Vec<TemperatureSummary>,
    pub failures: Vec<TemperatureFailure>,
}
