use crate::structs::{FeaturePoint, FeatureSet};

/// Intervals at or above this many nanoseconds are initialization artifacts
pub const DEFAULT_INIT_THRESHOLD_NS: f64 = 1e9;

/// Build (HR, ΔHR) pairs for one run
///
/// Intervals `>= init_threshold` are dropped first. The remaining sequence
/// of length n yields n-1 pairs: HR truncated to its first n-1 values,
/// paired with the first differences.
#[must_use]
pub fn run_features(intervals: &[f64], init_threshold: f64) -> Vec<FeaturePoint> {
    let hrs: Vec<f64> = intervals
        .iter()
        .copied()
        .filter(|&hr| hr < init_threshold)
        .collect();

    hrs.windows(2)
        .map(|w| FeaturePoint::new(w[0], w[1] - w[0]))
        .collect()
}

impl FeatureSet {
    /// Concatenate the feature pairs of every run of a workload
    ///
    /// Differences are never taken across run boundaries.
    #[must_use]
    pub fn from_runs<R: AsRef<[f64]>>(workload: &str, runs: &[R], init_threshold: f64) -> Self {
        let points = runs
            .iter()
            .flat_map(|run| run_features(run.as_ref(), init_threshold))
            .collect();

        Self {
            workload: workload.to_string(),
            points,
            runs: runs.len(),
        }
    }
}
