//! Windowed equilibration detection.
//!
//! Throughout this module a *sweep* is one single-cluster Wolff update, not a
//! pass over every lattice site. Sweep caps and window widths are counted in
//! that unit.
//!
//! Convergence is judged by comparing the mean and the variance of the last
//! `W` magnetisations with the `W` before them. This is a heuristic stopping
//! rule that only detects the absence of drift, it does not prove the chain is
//! in equilibrium.

use crate::lattice::SupportsWolfAlgorithm;
use crate::monte_carlo::wolff_cluster::WolffClusterFlipper;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibrationSettings {
    max_sweeps: usize,
    window: usize,
    mean_threshold: f64,
    variance_threshold: f64,
}

impl EquilibrationSettings {
    /// Settings with thresholds scaled to `number_sites` spins:
    /// `1e-3 * N` for the mean and `1e-4 * N^2` for the variance.
    pub fn new(max_sweeps: usize, window: usize, number_sites: usize) -> Self {
        let n = number_sites as f64;
        EquilibrationSettings {
            max_sweeps,
            window,
            mean_threshold: 1e-3 * n,
            variance_threshold: 1e-4 * n * n,
        }
    }

    pub fn with_mean_threshold(mut self, mean_threshold: f64) -> Self {
        self.mean_threshold = mean_threshold;
        self
    }

    pub fn with_variance_threshold(mut self, variance_threshold: f64) -> Self {
        self.variance_threshold = variance_threshold;
        self
    }

    pub fn get_max_sweeps(&self) -> usize {
        self.max_sweeps
    }

    pub fn get_window(&self) -> usize {
        self.window
    }

    pub fn get_mean_threshold(&self) -> f64 {
        self.mean_threshold
    }

    pub fn get_variance_threshold(&self) -> f64 {
        self.variance_threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquilibrationOutcome {
    /// Sweep at which convergence was first seen, or the cap.
    pub sweeps: usize,
    pub converged: bool,
}

/// Sliding two-window comparison over a stream of magnetisations.
#[derive(Debug)]
pub struct ConvergenceMonitor {
    window: usize,
    mean_threshold: f64,
    variance_threshold: f64,
    recent: VecDeque<f64>,
}

impl ConvergenceMonitor {
    pub fn new(settings: &EquilibrationSettings) -> Self {
        ConvergenceMonitor {
            window: settings.window,
            mean_threshold: settings.mean_threshold,
            variance_threshold: settings.variance_threshold,
            recent: VecDeque::with_capacity(2 * settings.window),
        }
    }

    /// Record the next magnetisation and report whether the last two windows agree.
    pub fn observe(&mut self, magnetisation: f64) -> bool {
        if self.recent.len() == 2 * self.window {
            self.recent.pop_front();
        }
        self.recent.push_back(magnetisation);
        if self.window == 0 || self.recent.len() < 2 * self.window {
            return false;
        }

        let older = self.recent.range(..self.window);
        let newer = self.recent.range(self.window..);
        let mean_diff = (newer.clone().mean() - older.clone().mean()).abs();
        let var_diff = (newer.population_variance() - older.population_variance()).abs();

        mean_diff < self.mean_threshold && var_diff < self.variance_threshold
    }
}

/// Apply cluster updates until the magnetisation windows agree or the sweep cap is hit.
pub fn equilibrate<L: SupportsWolfAlgorithm, R: rand::Rng + ?Sized>(
    lattice: &mut L,
    flipper: &mut WolffClusterFlipper<L>,
    settings: &EquilibrationSettings,
    rng: &mut R,
) -> EquilibrationOutcome {
    let mut monitor = ConvergenceMonitor::new(settings);
    let mut magnetisation = lattice.get_sum_of_spins();

    for sweep in 1..=settings.max_sweeps {
        magnetisation += flipper.flip_one_cluster(lattice, rng);
        if monitor.observe(magnetisation as f64) {
            return EquilibrationOutcome {
                sweeps: sweep,
                converged: true,
            };
        }
    }

    EquilibrationOutcome {
        sweeps: settings.max_sweeps,
        converged: false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lattice::square_lattice::SquareLattice;
    use crate::lattice::Lattice;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn default_thresholds_scale_with_system_size() {
        let settings = EquilibrationSettings::new(100, 10, 64);
        approx::assert_relative_eq!(settings.get_mean_threshold(), 0.064);
        approx::assert_relative_eq!(settings.get_variance_threshold(), 0.4096);

        let overridden = settings
            .with_mean_threshold(2.)
            .with_variance_threshold(3.);
        assert_eq!(overridden.get_mean_threshold(), 2.);
        assert_eq!(overridden.get_variance_threshold(), 3.);
        assert_eq!(overridden.get_window(), 10);
    }

    #[test]
    fn constant_trajectory_converges_at_twice_the_window() {
        for window in [1, 3, 10, 50] {
            let settings = EquilibrationSettings::new(1000, window, 16);
            let mut monitor = ConvergenceMonitor::new(&settings);
            let first = (1..=1000)
                .find(|_| monitor.observe(7.))
                .unwrap();
            assert_eq!(first, 2 * window);
        }
    }

    #[test]
    fn drifting_trajectory_does_not_converge() {
        let settings = EquilibrationSettings::new(1000, 10, 16);
        let mut monitor = ConvergenceMonitor::new(&settings);
        assert!((0..500).all(|i| !monitor.observe(i as f64)));
    }

    #[test]
    fn old_values_leave_the_window() {
        let settings = EquilibrationSettings::new(1000, 5, 16);
        let mut monitor = ConvergenceMonitor::new(&settings);
        for i in 0..20 {
            assert!(!monitor.observe(100. * i as f64));
        }
        // a jump is followed by 2W constant values before the windows agree again
        let first = (1..=100).find(|_| monitor.observe(-3.)).unwrap();
        assert_eq!(first, 10);
    }

    #[test]
    fn single_site_lattice_converges_at_twice_the_window() {
        // magnetisation alternates -1, +1, so even windows have identical statistics
        let mut rng = SmallRng::seed_from_u64(5);
        let mut lattice = SquareLattice::new_with_ones(1);
        let mut flipper = WolffClusterFlipper::new(&lattice, 100.).unwrap();
        let settings = EquilibrationSettings::new(10_000, 4, lattice.number_sites());

        let outcome = equilibrate(&mut lattice, &mut flipper, &settings, &mut rng);

        assert_eq!(
            outcome,
            EquilibrationOutcome {
                sweeps: 8,
                converged: true
            }
        );
    }

    #[test]
    fn never_exceeds_the_sweep_cap() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut lattice = SquareLattice::new_random(8, &mut rng);
        let mut flipper = WolffClusterFlipper::new(&lattice, 0.44).unwrap();
        // thresholds of zero can never be undercut
        let settings = EquilibrationSettings::new(300, 20, lattice.number_sites())
            .with_mean_threshold(0.)
            .with_variance_threshold(0.);

        let outcome = equilibrate(&mut lattice, &mut flipper, &settings, &mut rng);

        assert_eq!(
            outcome,
            EquilibrationOutcome {
                sweeps: 300,
                converged: false
            }
        );
    }

    #[test]
    fn cap_below_two_windows_reports_non_convergence() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut lattice = SquareLattice::new_with_ones(1);
        let mut flipper = WolffClusterFlipper::new(&lattice, 1.).unwrap();
        let settings = EquilibrationSettings::new(5, 10, 1);

        let outcome = equilibrate(&mut lattice, &mut flipper, &settings, &mut rng);

        assert!(!outcome.converged);
        assert_eq!(outcome.sweeps, 5);
    }

    #[test]
    fn outcome_is_bounded_by_the_windows_and_the_cap() {
        let mut rng = SmallRng::seed_from_u64(77);
        let mut lattice = SquareLattice::new_random(16, &mut rng);
        let mut flipper = WolffClusterFlipper::new(&lattice, 1. / 5.).unwrap();
        let settings = EquilibrationSettings::new(20_000, 100, lattice.number_sites());

        let outcome = equilibrate(&mut lattice, &mut flipper, &settings, &mut rng);

        if outcome.converged {
            assert!((200..=20_000).contains(&outcome.sweeps));
        } else {
            assert_eq!(outcome.sweeps, 20_000);
        }
    }
}
