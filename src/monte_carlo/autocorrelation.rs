use crate::error::SamplerError;

/// Estimate the integrated autocorrelation time of `trajectory`.
///
/// The normalised autocovariance is summed over lags `1..cutoff` (default `N / 2`)
/// and the sum stops at the first negative value, past which the estimate is
/// dominated by noise. Returns `1 + 2 * sum`.
///
/// Trajectories shorter than two entries or without variance have no defined
/// autocorrelation and are rejected.
pub fn integrated_autocorrelation_time(
    trajectory: &[f64],
    cutoff: Option<usize>,
) -> Result<f64, SamplerError> {
    let n = trajectory.len();
    if n < 2 {
        return Err(SamplerError::DegenerateTrajectory {
            length: n,
            reason: "at least two values are needed",
        });
    }

    let mean = trajectory.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = trajectory.iter().map(|m| m - mean).collect();
    let var = dot(&centered, &centered) / n as f64;

    // constant input leaves only rounding noise around the mean
    if !(var > f64::EPSILON * (mean * mean).max(f64::MIN_POSITIVE)) {
        return Err(SamplerError::DegenerateTrajectory {
            length: n,
            reason: "the trajectory has zero variance",
        });
    }

    let cutoff = cutoff.unwrap_or(n / 2).min(n - 1);
    let mut sum = 0.;
    for tau in 1..cutoff {
        let c = dot(&centered[..n - tau], &centered[tau..]) / (n - tau) as f64 / var;
        if c < 0. {
            break;
        }
        sum += c;
    }

    Ok(1. + 2. * sum)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
