//! Report writers for the analyze phase

use crate::structs::{AnalysisReport, ClusterStatistics, FeaturePoint, RankedWorkload, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Scientific notation with two fractional digits and a signed two-digit
/// exponent, e.g. `1.23e+04`
#[must_use]
pub fn format_sci(value: f64) -> String {
    let raw = format!("{value:.2e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => raw,
    }
}

/// Ranking report: one line per ranked workload, clearest 2-cycle first
#[must_use]
pub fn format_ranking(ranked: &[RankedWorkload]) -> String {
    let mut content = String::from("BINARY CLARITY RANKING (highest = clearest 2-cycle):\n");
    for entry in ranked {
        let _ = writeln!(
            content,
            "{}. {:<12} → {}",
            entry.rank,
            entry.workload.to_uppercase(),
            format_sci(entry.binary_clarity)
        );
    }
    content
}

/// Per-workload summary in analysis order
#[must_use]
pub fn format_summary(report: &AnalysisReport) -> String {
    let mut content = String::new();
    for analysis in &report.workloads {
        let _ = writeln!(content, "{}:", analysis.workload.to_uppercase());
        let _ = writeln!(content, "  Total points: {}", analysis.total_points);

        if let Some(result) = &analysis.result {
            let _ = writeln!(content, "  Filtered points: {}", result.n_points);
            let _ = writeln!(content, "  Separation: {:.2} ns", result.separation);
            let _ = writeln!(
                content,
                "  Cluster areas: {:.2} / {:.2} ns²",
                result.areas[0], result.areas[1]
            );
            let _ = writeln!(content, "  Avg ellipse area: {:.2} ns²", result.avg_area);
            let _ = writeln!(
                content,
                "  Binary clarity: {}",
                format_sci(result.binary_clarity)
            );
        }
        if let Some(warning) = &analysis.warning {
            let _ = writeln!(content, "  Warning: {warning}");
        }
    }
    content
}

/// Write `ranking.txt`
///
/// # Errors
/// Returns error if file cannot be written
pub fn write_ranking(output_dir: &Path, ranked: &[RankedWorkload]) -> Result<()> {
    fs::write(output_dir.join("ranking.txt"), format_ranking(ranked))?;
    Ok(())
}

/// Write `summary.txt`
///
/// # Errors
/// Returns error if file cannot be written
pub fn write_summary(output_dir: &Path, report: &AnalysisReport) -> Result<()> {
    fs::write(output_dir.join("summary.txt"), format_summary(report))?;
    Ok(())
}

/// Write `results.json` - machine-readable metrics
///
/// # Errors
/// Returns error if serialization or the write fails
pub fn write_results_json(
    output_dir: &Path,
    report: &AnalysisReport,
    ranked: &[RankedWorkload],
) -> Result<()> {
    let workloads = report
        .workloads
        .iter()
        .map(|analysis| WorkloadEntry {
            workload: &analysis.workload,
            total_points: analysis.total_points,
            warning: analysis.warning.as_deref(),
            result: analysis.result.as_ref().map(|r| {
                ResultEntry {
                    n_points: r.n_points,
                    separation: r.separation,
                    avg_area: r.avg_area,
                    avg_spread: r.avg_spread,
                    binary_clarity: r.binary_clarity,
                    clusters: [0, 1].map(|i| ClusterEntry {
                        id: r.clusters[i].id,
                        size: r.clusters[i].members.len(),
                        center: r.clusters[i].center,
                        statistics: r.statistics[i],
                    }),
                }
            }),
        })
        .collect();

    let output = ResultsOutput { workloads, ranking: ranked };
    let json = serde_json::to_string_pretty(&output)?;
    fs::write(output_dir.join("results.json"), json)?;
    Ok(())
}

// JSON output structures

#[derive(Serialize)]
struct ResultsOutput<'a> {
    workloads: Vec<WorkloadEntry<'a>>,
    ranking: &'a [RankedWorkload],
}

#[derive(Serialize)]
struct WorkloadEntry<'a> {
    workload: &'a str,
    total_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'a str>,
    result: Option<ResultEntry>,
}

#[derive(Serialize)]
struct ResultEntry {
    n_points: usize,
    separation: f64,
    avg_area: f64,
    avg_spread: f64,
    binary_clarity: f64,
    clusters: [ClusterEntry; 2],
}

#[derive(Serialize)]
struct ClusterEntry {
    id: usize,
    size: usize,
    center: FeaturePoint,
    statistics: ClusterStatistics,
}
