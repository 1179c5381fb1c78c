use crate::structs::{ClusterResult, FeaturePoint, Result, TwoCycleError};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed used for center initialization unless overridden
pub const DEFAULT_SEED: u64 = 42;

/// Iteration cap for the assignment/update loop
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Index of the nearer center; exact ties go to cluster 0
fn nearest(point: &FeaturePoint, centers: &[FeaturePoint; 2]) -> usize {
    let d0 = point.distance(&centers[0]);
    let d1 = point.distance(&centers[1]);
    usize::from(d1 < d0)
}

fn assign(points: &[FeaturePoint], centers: &[FeaturePoint; 2]) -> Vec<usize> {
    points.iter().map(|p| nearest(p, centers)).collect()
}

/// Componentwise mean of each cluster; an empty cluster keeps its center
#[allow(clippy::cast_precision_loss)]
fn update_centers(
    points: &[FeaturePoint],
    labels: &[usize],
    previous: &[FeaturePoint; 2],
) -> [FeaturePoint; 2] {
    let mut sums = [FeaturePoint::default(); 2];
    let mut counts = [0usize; 2];

    for (point, &label) in points.iter().zip(labels) {
        sums[label].hr += point.hr;
        sums[label].delta_hr += point.delta_hr;
        counts[label] += 1;
    }

    let mut centers = *previous;
    for (cluster, center) in centers.iter_mut().enumerate() {
        if counts[cluster] > 0 {
            let n = counts[cluster] as f64;
            *center = FeaturePoint::new(sums[cluster].hr / n, sums[cluster].delta_hr / n);
        }
    }
    centers
}

/// Deterministic two-cluster k-means
///
/// Centers start at two distinct points drawn with a ChaCha RNG seeded from
/// `seed`, so identical input and seed always give identical labels.
///
/// # Errors
/// Returns error if fewer than 2 points are given
pub fn kmeans_binary(
    points: &[FeaturePoint],
    seed: u64,
    max_iterations: usize,
) -> Result<ClusterResult> {
    if points.len() < 2 {
        return Err(TwoCycleError::Ml(format!(
            "Cannot create 2 clusters with only {} points",
            points.len()
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let picks = index::sample(&mut rng, points.len(), 2);
    let mut centers = [points[picks.index(0)], points[picks.index(1)]];

    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;
        let labels = assign(points, &centers);
        let updated = update_centers(points, &labels, &centers);

        if updated == centers {
            converged = true;
            break;
        }
        centers = updated;
    }

    Ok(ClusterResult {
        labels: assign(points, &centers),
        centers,
        iterations,
        converged,
    })
}
