use crate::structs::{AxisStats, FeaturePoint, FeatureSet, FilterStage, Result, TwoCycleError};

/// Points farther than this many standard deviations are rejected
pub const DEFAULT_OUTLIER_SIGMA: f64 = 5.0;

/// Minimum points a workload needs before and after filtering
pub const DEFAULT_MIN_POINTS: usize = 10;

/// Arithmetic mean, 0 for an empty slice
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator), 0 when n < 2
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

impl AxisStats {
    #[must_use]
    pub fn calculate(values: &[f64]) -> Self {
        Self {
            mean: mean(values),
            std_dev: sample_std(values),
        }
    }

    /// Strictly within `sigma` standard deviations of the mean
    #[must_use]
    pub fn within(&self, value: f64, sigma: f64) -> bool {
        (value - self.mean).abs() < sigma * self.std_dev
    }
}

/// Reject points beyond `sigma` standard deviations on either axis
///
/// # Errors
/// Returns `InsufficientData` if fewer than `min_points` exist before or
/// remain after filtering
pub fn filter_outliers(
    features: &FeatureSet,
    sigma: f64,
    min_points: usize,
) -> Result<Vec<FeaturePoint>> {
    if features.len() < min_points {
        return Err(TwoCycleError::InsufficientData {
            workload: features.workload.clone(),
            stage: FilterStage::BeforeFiltering,
            count: features.len(),
        });
    }

    let hr = AxisStats::calculate(&features.hrs());
    let delta = AxisStats::calculate(&features.delta_hrs());

    let filtered: Vec<FeaturePoint> = features
        .points
        .iter()
        .copied()
        .filter(|p| hr.within(p.hr, sigma) && delta.within(p.delta_hr, sigma))
        .collect();

    if filtered.len() < min_points {
        return Err(TwoCycleError::InsufficientData {
            workload: features.workload.clone(),
            stage: FilterStage::AfterFiltering,
            count: filtered.len(),
        });
    }

    Ok(filtered)
}
