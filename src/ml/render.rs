//! SVG rendering of the per-workload phase-space panels
//!
//! The document is built as a string and written in one pass. All numbers
//! are printed with fixed precision so identical reports render to
//! byte-identical files.
//!
//! Panel ellipses are drawn from per-axis standard deviations of each
//! cluster. This is intentionally a different notion of spread than the
//! covariance-eigenvalue area used for scoring.

use super::stats::{mean, sample_std};
use crate::structs::{AnalysisReport, Cluster, Result, WorkloadResult};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const PLOT_WIDTH: f64 = 280.0;
const PLOT_HEIGHT: f64 = 350.0;
const MARGIN: f64 = 20.0;
const COLUMNS: usize = 3;
const TOP: f64 = 60.0;
const GRID_DIVISIONS: u32 = 4;
const MARKER_HALF: f64 = 8.0;
/// Per-axis standard deviations spanned by a drawn ellipse
const DRAWN_ELLIPSE_SIGMA: f64 = 2.0;

const STYLE: &str = r"<style>
  .plot-title { font: bold 14px sans-serif; }
  .axis-label { font: 11px sans-serif; }
  .metrics { font: 9px monospace; }
  .main-title { font: bold 20px sans-serif; }
  .cluster-0 { fill: #FF6B6B; opacity: 0.4; }
  .cluster-1 { fill: #4ECDC4; opacity: 0.4; }
  .center { stroke: black; stroke-width: 3; }
  .grid { stroke: #ccc; stroke-width: 0.5; opacity: 0.5; }
  .ellipse-0 { stroke: #FF6B6B; fill: none; stroke-width: 2; }
  .ellipse-1 { stroke: #4ECDC4; fill: none; stroke-width: 2; }
</style>";

/// Maps data coordinates into one panel's pixel box
struct PanelScale {
    x0: f64,
    y0: f64,
    min_hr: f64,
    max_hr: f64,
    min_dhr: f64,
    max_dhr: f64,
}

impl PanelScale {
    /// Fit the data range plus 10% padding; a flat axis gets a unit range
    fn fit(result: &WorkloadResult, x0: f64, y0: f64) -> Self {
        let (mut min_hr, mut max_hr) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_dhr, mut max_dhr) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in &result.points {
            min_hr = min_hr.min(p.hr);
            max_hr = max_hr.max(p.hr);
            min_dhr = min_dhr.min(p.delta_hr);
            max_dhr = max_dhr.max(p.delta_hr);
        }

        let hr_range = if max_hr > min_hr { max_hr - min_hr } else { 1.0 };
        let dhr_range = if max_dhr > min_dhr { max_dhr - min_dhr } else { 1.0 };

        Self {
            x0,
            y0,
            min_hr: min_hr - hr_range * 0.1,
            max_hr: max_hr + hr_range * 0.1,
            min_dhr: min_dhr - dhr_range * 0.1,
            max_dhr: max_dhr + dhr_range * 0.1,
        }
    }

    fn x(&self, hr: f64) -> f64 {
        self.x0 + (hr - self.min_hr) / (self.max_hr - self.min_hr) * PLOT_WIDTH
    }

    fn y(&self, delta_hr: f64) -> f64 {
        self.y0 + PLOT_HEIGHT
            - (delta_hr - self.min_dhr) / (self.max_dhr - self.min_dhr) * PLOT_HEIGHT
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[allow(clippy::cast_precision_loss)]
fn panel_origin(index: usize) -> (f64, f64) {
    let row = (index / COLUMNS) as f64;
    let col = (index % COLUMNS) as f64;
    (
        MARGIN + col * (PLOT_WIDTH + MARGIN + 20.0),
        TOP + row * (PLOT_HEIGHT + MARGIN + 40.0),
    )
}

fn render_placeholder(svg: &mut String, workload: &str, x0: f64, y0: f64) {
    let cx = x0 + PLOT_WIDTH / 2.0;
    let cy = y0 + PLOT_HEIGHT / 2.0;
    let _ = writeln!(
        svg,
        r#"<text x="{cx:.2}" y="{cy:.2}" text-anchor="middle" class="plot-title">{}<tspan x="{cx:.2}" dy="1.2em">Insufficient data</tspan></text>"#,
        escape(&workload.to_uppercase())
    );
}

fn render_grid(svg: &mut String, x0: f64, y0: f64) {
    for i in 0..=GRID_DIVISIONS {
        let step = f64::from(i) / f64::from(GRID_DIVISIONS);
        let x = x0 + step * PLOT_WIDTH;
        let _ = writeln!(
            svg,
            r#"<line x1="{x:.2}" y1="{y0:.2}" x2="{x:.2}" y2="{:.2}" class="grid"/>"#,
            y0 + PLOT_HEIGHT
        );
        let y = y0 + step * PLOT_HEIGHT;
        let _ = writeln!(
            svg,
            r#"<line x1="{x0:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" class="grid"/>"#,
            x0 + PLOT_WIDTH
        );
    }
}

fn render_cluster_ellipse(svg: &mut String, scale: &PanelScale, cluster: &Cluster) {
    if cluster.members.len() <= 2 {
        return;
    }
    let hrs: Vec<f64> = cluster.members.iter().map(|p| p.hr).collect();
    let dhrs: Vec<f64> = cluster.members.iter().map(|p| p.delta_hr).collect();
    let (mean_hr, mean_dhr) = (mean(&hrs), mean(&dhrs));

    let cx = scale.x(mean_hr);
    let cy = scale.y(mean_dhr);
    let rx = (scale.x(mean_hr + DRAWN_ELLIPSE_SIGMA * sample_std(&hrs)) - cx).abs();
    let ry = (scale.y(mean_dhr + DRAWN_ELLIPSE_SIGMA * sample_std(&dhrs)) - cy).abs();

    let _ = writeln!(
        svg,
        r#"<ellipse cx="{cx:.2}" cy="{cy:.2}" rx="{rx:.2}" ry="{ry:.2}" class="ellipse-{}"/>"#,
        cluster.id
    );
}

fn render_panel(svg: &mut String, result: &WorkloadResult, x0: f64, y0: f64) {
    let scale = PanelScale::fit(result, x0, y0);
    render_grid(svg, x0, y0);

    for (point, label) in result.points.iter().zip(&result.labels) {
        let _ = writeln!(
            svg,
            r#"<circle cx="{:.2}" cy="{:.2}" r="1.5" class="cluster-{label}"/>"#,
            scale.x(point.hr),
            scale.y(point.delta_hr)
        );
    }

    for center in &result.centers {
        let cx = scale.x(center.hr);
        let cy = scale.y(center.delta_hr);
        let (l, r) = (cx - MARKER_HALF, cx + MARKER_HALF);
        let (t, b) = (cy - MARKER_HALF, cy + MARKER_HALF);
        let _ = writeln!(
            svg,
            r#"<line x1="{l:.2}" y1="{t:.2}" x2="{r:.2}" y2="{b:.2}" class="center"/>"#
        );
        let _ = writeln!(
            svg,
            r#"<line x1="{l:.2}" y1="{b:.2}" x2="{r:.2}" y2="{t:.2}" class="center"/>"#
        );
    }

    for cluster in &result.clusters {
        render_cluster_ellipse(svg, &scale, cluster);
    }

    let mid_x = x0 + PLOT_WIDTH / 2.0;
    let mid_y = y0 + PLOT_HEIGHT / 2.0;
    let _ = writeln!(
        svg,
        r#"<text x="{mid_x:.2}" y="{:.2}" text-anchor="middle" class="plot-title">{} (n={})</text>"#,
        y0 - 10.0,
        escape(&result.workload.to_uppercase()),
        result.n_points
    );
    let _ = writeln!(
        svg,
        r#"<text x="{mid_x:.2}" y="{:.2}" text-anchor="middle" class="axis-label">HR (tick_interval_ns)</text>"#,
        y0 + PLOT_HEIGHT + 20.0
    );
    let label_x = x0 - 10.0;
    let _ = writeln!(
        svg,
        r#"<text x="{label_x:.2}" y="{mid_y:.2}" text-anchor="middle" transform="rotate(-90 {label_x:.2} {mid_y:.2})" class="axis-label">ΔHR (ns)</text>"#
    );

    let box_y = y0 + 15.0;
    let _ = writeln!(
        svg,
        r#"<rect x="{:.2}" y="{box_y:.2}" width="160" height="50" fill="wheat" opacity="0.7" rx="5"/>"#,
        x0 + 5.0
    );
    let text_x = x0 + 10.0;
    let lines = [
        format!("Separation: {:.1} ns", result.separation),
        format!("Avg Area: {:.1} ns²", result.avg_area),
        format!("Binary Clarity: {}", super::output::format_sci(result.binary_clarity)),
    ];
    for (offset, line) in [15.0, 28.0, 41.0].iter().zip(&lines) {
        let _ = writeln!(
            svg,
            r#"<text x="{text_x:.2}" y="{:.2}" class="metrics">{line}</text>"#,
            box_y + offset
        );
    }
}

/// Render every workload of the report as one SVG document
///
/// Panels follow report order in a three-column grid. Workloads without a
/// valid result get an "insufficient data" placeholder.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn render_svg(report: &AnalysisReport) -> String {
    let rows = report.workloads.len().div_ceil(COLUMNS).max(1);
    let width = MARGIN + COLUMNS as f64 * (PLOT_WIDTH + MARGIN + 20.0);
    let height = TOP + rows as f64 * (PLOT_HEIGHT + MARGIN + 40.0);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg width="{width:.0}" height="{height:.0}" xmlns="http://www.w3.org/2000/svg">"#
    );
    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(STYLE);
    svg.push('\n');
    let _ = writeln!(
        svg,
        r#"<text x="{:.2}" y="30" text-anchor="middle" class="main-title">Binary 2-Cycle Analysis: (HR, ΔHR) Phase Space Clustering</text>"#,
        width / 2.0
    );

    for (index, analysis) in report.workloads.iter().enumerate() {
        let (x0, y0) = panel_origin(index);
        match &analysis.result {
            Some(result) => render_panel(&mut svg, result, x0, y0),
            None => render_placeholder(&mut svg, &analysis.workload, x0, y0),
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render and write the SVG document in a single write
///
/// # Errors
/// Returns error if the file cannot be written
pub fn write_svg(path: &Path, report: &AnalysisReport) -> Result<()> {
    fs::write(path, render_svg(report))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::pipeline::{run_pipeline, tests::tables, AnalysisConfig};
    use tempfile::TempDir;

    fn report() -> AnalysisReport {
        let config = AnalysisConfig {
            workloads: vec!["omni".into(), "stable".into(), "volatile".into(), "diverse".into()],
            ..AnalysisConfig::default()
        };
        run_pipeline(&tables(), &config).expect("pipeline")
    }

    #[test]
    fn test_panels_and_placeholders() {
        let report = report();
        let svg = render_svg(&report);

        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("OMNI (n="));
        assert!(svg.contains("STABLE (n="));
        assert_eq!(svg.matches("Insufficient data").count(), 2);
        // One scatter dot per filtered point
        let dots: usize = report.results().map(|r| r.n_points).sum();
        assert_eq!(svg.matches("<circle ").count(), dots);
        assert_eq!(svg.matches("Binary Clarity: ").count(), 2);
        assert_eq!(svg.matches(r#"class="center""#).count(), 8);
    }

    #[test]
    fn test_grid_layout() {
        assert_eq!(panel_origin(0), (20.0, 60.0));
        assert_eq!(panel_origin(2), (660.0, 60.0));
        assert_eq!(panel_origin(3), (20.0, 470.0));
    }

    #[test]
    fn test_render_is_byte_identical() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("analysis.svg");

        write_svg(&path, &report()).expect("write svg");
        let first = fs::read(&path).expect("read");
        write_svg(&path, &report()).expect("write svg");
        let second = fs::read(&path).expect("read");

        assert_eq!(first, second);
    }

    #[test]
    fn test_escape_workload_name() {
        assert_eq!(escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
