//! Covariance-based cluster spread
//!
//! Each cluster is summarised by the area of its confidence ellipse,
//! `π · r² · √(λ1·λ2)`, where λ are the eigenvalues of the 2×2 sample
//! covariance matrix and `r` is the confidence radius in standard deviations.

use crate::structs::{Cluster, ClusterStatistics, FeaturePoint, Result, TwoCycleError};
use ndarray::{Array2, Axis};
use std::f64::consts::PI;

/// Confidence radius of the scoring ellipse, in standard deviations
pub const DEFAULT_ELLIPSE_RADIUS: f64 = 2.0;

fn to_array(points: &[FeaturePoint]) -> Result<Array2<f64>> {
    let flat: Vec<f64> = points.iter().flat_map(|p| [p.hr, p.delta_hr]).collect();
    Array2::from_shape_vec((points.len(), 2), flat)
        .map_err(|e| TwoCycleError::Ml(format!("Failed to create array: {e}")))
}

/// Symmetric 2×2 sample covariance (n-1 denominator)
///
/// # Errors
/// Returns error if fewer than 2 points are given
#[allow(clippy::cast_precision_loss)]
pub fn covariance_matrix(points: &[FeaturePoint]) -> Result<[[f64; 2]; 2]> {
    if points.len() < 2 {
        return Err(TwoCycleError::Ml(format!(
            "Need at least 2 points for covariance, got {}",
            points.len()
        )));
    }

    let data = to_array(points)?;
    let mean = data
        .mean_axis(Axis(0))
        .ok_or_else(|| TwoCycleError::Ml("Cannot take mean of empty array".into()))?;
    let centered = &data - &mean;
    let cov = centered.t().dot(&centered) / (points.len() - 1) as f64;

    let cxy = cov[[0, 1]];
    Ok([[cov[[0, 0]], cxy], [cxy, cov[[1, 1]]]])
}

/// Closed-form eigenvalues of a symmetric 2×2 matrix, largest first
///
/// A slightly negative discriminant from rounding is treated as 0 and both
/// eigenvalues are clamped to be non-negative.
#[must_use]
pub fn eigenvalues_2x2(cov: &[[f64; 2]; 2]) -> (f64, f64) {
    let trace = cov[0][0] + cov[1][1];
    let det = cov[0][0] * cov[1][1] - cov[0][1] * cov[1][0];
    let discriminant = (trace * trace - 4.0 * det).max(0.0);
    let root = discriminant.sqrt();

    let lambda1 = (trace + root) / 2.0;
    let lambda2 = (trace - root) / 2.0;
    (lambda1.max(0.0), lambda2.max(0.0))
}

/// Area of the `radius`-sigma ellipse for the given eigenvalues
#[must_use]
pub fn ellipse_area(eigenvalues: (f64, f64), radius: f64) -> f64 {
    PI * radius * radius * (eigenvalues.0 * eigenvalues.1).sqrt()
}

impl ClusterStatistics {
    /// Spread of one cluster; fewer than 2 members gives zero area
    ///
    /// # Errors
    /// Returns error if the member array cannot be built
    pub fn calculate(cluster: &Cluster, radius: f64) -> Result<Self> {
        if cluster.members.len() < 2 {
            return Ok(Self::default());
        }

        let covariance = covariance_matrix(&cluster.members)?;
        let eigenvalues = eigenvalues_2x2(&covariance);

        Ok(Self {
            covariance,
            eigenvalues,
            area: ellipse_area(eigenvalues, radius),
        })
    }
}
