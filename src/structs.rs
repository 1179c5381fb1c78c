//! Consolidated public types for the twocycle crate
//!
//! This module contains all public structs and enums used across the crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum TwoCycleError {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{workload}: insufficient data {stage} ({count} points)")]
    InsufficientData {
        workload: String,
        stage: FilterStage,
        count: usize,
    },

    #[error("ML error: {0}")]
    Ml(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TwoCycleError>;

/// Which side of the outlier filter ran short of points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    BeforeFiltering,
    AfterFiltering,
}

impl std::fmt::Display for FilterStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BeforeFiltering => f.write_str("before filtering"),
            Self::AfterFiltering => f.write_str("after filtering"),
        }
    }
}

// ============================================================================
// Input Types
// ============================================================================

/// One heartbeat tick as exported by the VM
///
/// Only the interval is required; row position in the table is the row index.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HeartbeatSample {
    #[serde(default)]
    pub tick_number: Option<u64>,
    #[serde(default)]
    pub elapsed_ns: Option<f64>,
    pub tick_interval_ns: f64,
}

/// Row range of the heartbeat table belonging to one (workload, replicate) run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunSegment {
    #[serde(default)]
    pub run_id: String,
    pub init_script: String,
    #[serde(default)]
    pub replicate: String,
    /// First row, 1-indexed, inclusive
    pub hb_start_row: usize,
    /// Last row, 1-indexed, inclusive
    pub hb_end_row: usize,
}

impl RunSegment {
    /// Whether this run was executed under the named workload
    #[must_use]
    pub fn matches(&self, workload: &str) -> bool {
        self.init_script.contains(workload)
    }
}

// ============================================================================
// Feature Types
// ============================================================================

/// A point in (HR, ΔHR) phase space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FeaturePoint {
    pub hr: f64,
    pub delta_hr: f64,
}

impl FeaturePoint {
    #[must_use]
    pub const fn new(hr: f64, delta_hr: f64) -> Self {
        Self { hr, delta_hr }
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.hr - other.hr).hypot(self.delta_hr - other.delta_hr)
    }
}

/// Combined feature pairs for one workload across all of its runs
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    pub workload: String,
    pub points: Vec<FeaturePoint>,
    /// Number of runs that contributed
    pub runs: usize,
}

impl FeatureSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// HR axis values
    #[must_use]
    pub fn hrs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.hr).collect()
    }

    /// ΔHR axis values
    #[must_use]
    pub fn delta_hrs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.delta_hr).collect()
    }
}

// ============================================================================
// ML Types
// ============================================================================

/// Mean and sample standard deviation of one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Result of two-cluster k-means
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterResult {
    /// Cluster assignment (0 or 1) for each point
    pub labels: Vec<usize>,
    pub centers: [FeaturePoint; 2],
    /// Rounds executed before convergence or the iteration cap
    pub iterations: usize,
    pub converged: bool,
}

impl ClusterResult {
    /// Member counts per cluster
    #[must_use]
    pub fn sizes(&self) -> [usize; 2] {
        let mut sizes = [0usize; 2];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    /// Split `points` into the two clusters described by this result
    #[must_use]
    pub fn clusters(&self, points: &[FeaturePoint]) -> [Cluster; 2] {
        let mut members: [Vec<FeaturePoint>; 2] = [Vec::new(), Vec::new()];
        for (point, &label) in points.iter().zip(&self.labels) {
            members[label].push(*point);
        }
        let [m0, m1] = members;
        [
            Cluster {
                id: 0,
                center: self.centers[0],
                members: m0,
            },
            Cluster {
                id: 1,
                center: self.centers[1],
                members: m1,
            },
        ]
    }
}

/// One side of the binary partition
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: usize,
    pub center: FeaturePoint,
    pub members: Vec<FeaturePoint>,
}

/// Covariance-based spread of one cluster
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ClusterStatistics {
    /// Row-major [[Cxx, Cxy], [Cxy, Cyy]]
    pub covariance: [[f64; 2]; 2],
    /// Eigenvalues, largest first
    pub eigenvalues: (f64, f64),
    pub area: f64,
}

/// Separation/spread composite for one workload
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClarityScore {
    pub separation: f64,
    pub avg_area: f64,
    pub avg_spread: f64,
    pub binary_clarity: f64,
}

/// Complete analysis of one workload that had enough data
#[derive(Debug, Clone)]
pub struct WorkloadResult {
    pub workload: String,
    /// Points kept by the outlier filter
    pub n_points: usize,
    pub centers: [FeaturePoint; 2],
    pub separation: f64,
    pub areas: [f64; 2],
    pub avg_area: f64,
    pub avg_spread: f64,
    pub binary_clarity: f64,
    pub statistics: [ClusterStatistics; 2],
    pub points: Vec<FeaturePoint>,
    pub labels: Vec<usize>,
    pub clusters: [Cluster; 2],
}

/// Outcome of one workload's analysis pass
#[derive(Debug, Clone)]
pub struct WorkloadAnalysis {
    pub workload: String,
    /// Feature pairs before outlier filtering
    pub total_points: usize,
    pub result: Option<WorkloadResult>,
    pub warning: Option<String>,
}

/// Everything the pipeline produces, in workload order
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub workloads: Vec<WorkloadAnalysis>,
}

impl AnalysisReport {
    /// Valid results in insertion order
    pub fn results(&self) -> impl Iterator<Item = &WorkloadResult> {
        self.workloads.iter().filter_map(|w| w.result.as_ref())
    }

    /// Warnings recorded for skipped workloads
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.workloads.iter().filter_map(|w| w.warning.as_deref())
    }
}

/// A ranked entry of the clarity ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedWorkload {
    pub rank: usize,
    pub workload: String,
    pub binary_clarity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_point_distance() {
        let a = FeaturePoint::new(0.0, 0.0);
        let b = FeaturePoint::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_segment_matches_substring() {
        let segment = RunSegment {
            run_id: "r1".into(),
            init_script: "conf/init-stable.4th".into(),
            replicate: "1".into(),
            hb_start_row: 1,
            hb_end_row: 10,
        };
        assert!(segment.matches("stable"));
        assert!(!segment.matches("volatile"));
    }

    #[test]
    fn test_cluster_split() {
        let points = vec![
            FeaturePoint::new(1.0, 0.0),
            FeaturePoint::new(9.0, 0.0),
            FeaturePoint::new(2.0, 0.0),
        ];
        let result = ClusterResult {
            labels: vec![0, 1, 0],
            centers: [FeaturePoint::new(1.5, 0.0), FeaturePoint::new(9.0, 0.0)],
            iterations: 2,
            converged: true,
        };
        let [c0, c1] = result.clusters(&points);
        assert_eq!(c0.members.len(), 2);
        assert_eq!(c1.members, vec![FeaturePoint::new(9.0, 0.0)]);
        assert_eq!(result.sizes(), [2, 1]);
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = TwoCycleError::InsufficientData {
            workload: "omni".into(),
            stage: FilterStage::AfterFiltering,
            count: 9,
        };
        assert_eq!(
            err.to_string(),
            "omni: insufficient data after filtering (9 points)"
        );
    }
}
