//! Anomaly score calculation
//!
//! Converts mean path lengths into scores and provides the percentile used to
//! calibrate the decision offset.

use crate::average_path_length;

/// Raw score from a mean path length over trees grown on `sample_size` samples
///
/// Uses `-2^(-E[h(x)] / c(psi))`, so the result lies in `[-1, 0)` and lower
/// means more anomalous. A degenerate sub-sample (one row) yields the neutral
/// `-0.5`.
pub fn raw_score(mean_path_length: f64, sample_size: usize) -> f64 {
    let expected_path = average_path_length(sample_size);
    if expected_path == 0.0 {
        return -0.5;
    }

    -(2.0_f64.powf(-mean_path_length / expected_path))
}

/// Percentile `q` (0..=100) of `values` with linear interpolation between
/// closest ranks
///
/// Returns `None` for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}
