//! Analysis pipeline that orchestrates the per-workload computations

use super::clustering::{kmeans_binary, DEFAULT_MAX_ITERATIONS, DEFAULT_SEED};
use super::features::DEFAULT_INIT_THRESHOLD_NS;
use super::spread::DEFAULT_ELLIPSE_RADIUS;
use super::stats::{filter_outliers, DEFAULT_MIN_POINTS, DEFAULT_OUTLIER_SIGMA};
use crate::csv_reader::TelemetryTables;
use crate::structs::{
    AnalysisReport, ClarityScore, ClusterStatistics, FeatureSet, Result, TwoCycleError,
    WorkloadAnalysis, WorkloadResult,
};
use tracing::{debug, info, warn};

/// Workloads of the L8 attractor experiment, in panel order
pub const DEFAULT_WORKLOADS: [&str; 6] = [
    "omni",
    "stable",
    "transition",
    "temporal",
    "diverse",
    "volatile",
];

/// Configuration for the analysis pipeline
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub workloads: Vec<String>,
    pub init_threshold: f64,
    pub outlier_sigma: f64,
    pub min_points: usize,
    pub seed: u64,
    pub max_iterations: usize,
    pub ellipse_radius: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            workloads: DEFAULT_WORKLOADS.iter().map(ToString::to_string).collect(),
            init_threshold: DEFAULT_INIT_THRESHOLD_NS,
            outlier_sigma: DEFAULT_OUTLIER_SIGMA,
            min_points: DEFAULT_MIN_POINTS,
            seed: DEFAULT_SEED,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            ellipse_radius: DEFAULT_ELLIPSE_RADIUS,
        }
    }
}

impl AnalysisConfig {
    /// Reject configurations the pipeline cannot run
    ///
    /// # Errors
    /// Returns `Config` for an empty or blank workload name, an empty
    /// workload list, or a non-positive initialization threshold
    pub fn validate(&self) -> Result<()> {
        if self.workloads.is_empty() {
            return Err(TwoCycleError::Config("No workloads to analyze".into()));
        }
        // A blank name would substring-match every segment
        if let Some(pos) = self.workloads.iter().position(|w| w.trim().is_empty()) {
            return Err(TwoCycleError::Config(format!(
                "Workload name {} is empty",
                pos + 1
            )));
        }
        if !self.init_threshold.is_finite() || self.init_threshold <= 0.0 {
            return Err(TwoCycleError::Config(format!(
                "Initialization threshold must be positive, got {}",
                self.init_threshold
            )));
        }
        Ok(())
    }
}

/// Filter, cluster and score one workload's feature pairs
///
/// # Errors
/// Returns `InsufficientData` if the workload has too few points before or
/// after outlier filtering
pub fn analyze_workload(features: &FeatureSet, config: &AnalysisConfig) -> Result<WorkloadResult> {
    let points = filter_outliers(features, config.outlier_sigma, config.min_points)?;
    debug!(
        workload = %features.workload,
        kept = points.len(),
        dropped = features.len() - points.len(),
        "outlier filter"
    );

    let clustering = kmeans_binary(&points, config.seed, config.max_iterations)?;
    debug!(
        workload = %features.workload,
        iterations = clustering.iterations,
        converged = clustering.converged,
        sizes = ?clustering.sizes(),
        "k-means finished"
    );

    let clusters = clustering.clusters(&points);
    let statistics = [
        ClusterStatistics::calculate(&clusters[0], config.ellipse_radius)?,
        ClusterStatistics::calculate(&clusters[1], config.ellipse_radius)?,
    ];
    let areas = [statistics[0].area, statistics[1].area];
    let score = ClarityScore::calculate(&clustering.centers, areas);

    Ok(WorkloadResult {
        workload: features.workload.clone(),
        n_points: points.len(),
        centers: clustering.centers,
        separation: score.separation,
        areas,
        avg_area: score.avg_area,
        avg_spread: score.avg_spread,
        binary_clarity: score.binary_clarity,
        statistics,
        points,
        labels: clustering.labels,
        clusters,
    })
}

/// Analyze one workload from its raw run interval sequences
///
/// Insufficient data is not an error here: it is logged and recorded as a
/// warning on the returned analysis.
///
/// # Errors
/// Returns error for anything other than insufficient data
pub fn analyze_runs<R: AsRef<[f64]>>(
    workload: &str,
    runs: &[R],
    config: &AnalysisConfig,
) -> Result<WorkloadAnalysis> {
    let features = FeatureSet::from_runs(workload, runs, config.init_threshold);
    if features.is_empty() {
        debug!(workload, runs = features.runs, "no feature pairs extracted");
    }
    info!(
        workload,
        runs = features.runs,
        points = features.len(),
        "extracted features"
    );

    let (result, warning) = match analyze_workload(&features, config) {
        Ok(result) => {
            info!(
                workload,
                separation = result.separation,
                avg_area = result.avg_area,
                binary_clarity = result.binary_clarity,
                "workload analyzed"
            );
            (Some(result), None)
        }
        Err(e @ TwoCycleError::InsufficientData { .. }) => {
            warn!("{e}");
            (None, Some(e.to_string()))
        }
        Err(e) => return Err(e),
    };

    Ok(WorkloadAnalysis {
        workload: workload.to_string(),
        total_points: features.len(),
        result,
        warning,
    })
}

/// Run the full analysis over every configured workload
///
/// # Errors
/// Returns error if any workload fails for a reason other than
/// insufficient data
pub fn run_pipeline(tables: &TelemetryTables, config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;

    let mut report = AnalysisReport::default();
    for workload in &config.workloads {
        let runs = tables.workload_runs(workload);
        report.workloads.push(analyze_runs(workload, &runs, config)?);
    }
    Ok(report)
}
