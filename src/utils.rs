use crate::error::ConfigError;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Create a vector starting at `start` and increasing by `step` to generate the next element until `stop` is reached.
/// The first value in the vector is always `start` and `stop` is always strictly bigger than the last entry in the vector.
pub fn linspace_vector_from_step(start: f64, stop: f64, step: f64) -> Result<Vec<f64>, ConfigError> {
    if !(start.is_finite() && stop.is_finite() && step.is_finite() && stop > start && step > 0.) {
        return Err(ConfigError::InvalidRange { start, stop, step });
    }

    let n = ((stop - start) / step - 1.).ceil() as usize;
    Ok((0..n + 1).map(|i| start + i as f64 * step).collect())
}

/// Deterministic random stream for the temperature at `temperature_idx` in the schedule.
///
/// All streams share the key derived from `master_seed` and differ in the ChaCha
/// stream id, so they never overlap and do not depend on which thread draws from them.
pub fn temperature_rng(master_seed: u64, temperature_idx: usize) -> ChaCha20Rng {
    let mut rng = ChaCha20Rng::seed_from_u64(master_seed);
    rng.set_stream(temperature_idx as u64);
    rng
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn linspace_vector_from_step_excludes_stop() {
        assert_eq!(linspace_vector_from_step(1., 2., 0.5).unwrap(), vec![1., 1.5]);
        assert_eq!(linspace_vector_from_step(0., 1., 0.3).unwrap().len(), 4);
        assert_eq!(linspace_vector_from_step(2.5, 2.6, 1.).unwrap(), vec![2.5]);
    }

    #[test]
    fn linspace_vector_from_step_rejects_bad_ranges() {
        for (start, stop, step) in [(2., 1., 0.1), (1., 1., 0.1), (1., 2., 0.), (1., 2., -0.5), (f64::NAN, 2., 0.1)] {
            assert!(
                matches!(
                    linspace_vector_from_step(start, stop, step),
                    Err(ConfigError::InvalidRange { .. })
                ),
                "({start}, {stop}, {step}) should be rejected"
            );
        }
    }

    #[test]
    fn temperature_rng_is_deterministic_and_distinct() {
        let draw = |seed, idx| -> Vec<u64> {
            let mut rng = temperature_rng(seed, idx);
            (0..8).map(|_| rng.random()).collect()
        };

        assert_eq!(draw(42, 3), draw(42, 3));
        assert_ne!(draw(42, 3), draw(42, 4));
        assert_ne!(draw(42, 3), draw(43, 3));
    }
}
