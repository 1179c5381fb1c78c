#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::uninlined_format_args)]

mod csv_reader;
mod ml;
mod structs;

use clap::{Parser, Subcommand};
use csv_reader::TelemetryTables;
use ml::pipeline::{AnalysisConfig, DEFAULT_WORKLOADS};
use std::path::{Path, PathBuf};
use structs::{Result, TwoCycleError};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// File name of the rendered panel grid inside the output directory
const SVG_FILE: &str = "binary_2cycle_analysis.svg";

/// twocycle - binary 2-cycle analysis of heartbeat telemetry
#[derive(Parser, Debug)]
#[command(name = "twocycle")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Cluster each workload in (HR, ΔHR) space and rank by binary clarity
    Analyze {
        /// Heartbeat CSV with a tick_interval_ns column
        #[arg(long)]
        heartbeat: PathBuf,

        /// Workload mapping CSV with init_script, hb_start_row, hb_end_row
        #[arg(short, long)]
        mapping: PathBuf,

        /// Output directory for the SVG and reports
        #[arg(short, long, default_value = "./twocycle_output")]
        output_dir: PathBuf,

        /// Workloads to analyze, in panel order (substring match on init_script)
        #[arg(short, long, value_delimiter = ',', default_values_t = DEFAULT_WORKLOADS.map(String::from))]
        workloads: Vec<String>,

        /// Seed for k-means center initialization
        #[arg(long, default_value_t = ml::clustering::DEFAULT_SEED)]
        seed: u64,

        /// Intervals at or above this many ns are dropped as initialization artifacts
        #[arg(long, default_value_t = ml::features::DEFAULT_INIT_THRESHOLD_NS)]
        init_threshold: f64,

        /// Treat inputs as TSV instead of CSV
        #[arg(long)]
        tsv: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Commands::Analyze {
            heartbeat,
            mapping,
            output_dir,
            workloads,
            seed,
            init_threshold,
            tsv,
        }) => run_analyze(
            &heartbeat,
            &mapping,
            &output_dir,
            &AnalysisConfig {
                workloads,
                seed,
                init_threshold,
                ..AnalysisConfig::default()
            },
            tsv,
        ),

        None => {
            eprintln!("No subcommand provided. Use 'twocycle analyze'.");
            eprintln!("Run 'twocycle --help' for usage information.");
            std::process::exit(1);
        }
    }
}

/// Run the analysis and write every output once all workloads are done
fn run_analyze(
    heartbeat: &Path,
    mapping: &Path,
    output_dir: &Path,
    config: &AnalysisConfig,
    tsv: bool,
) -> Result<()> {
    for (label, path) in [("Heartbeat", heartbeat), ("Mapping", mapping)] {
        if !path.exists() {
            return Err(TwoCycleError::Config(format!(
                "{label} file not found: {}",
                path.display()
            )));
        }
    }
    config.validate()?;

    std::fs::create_dir_all(output_dir)?;

    info!(heartbeat = %heartbeat.display(), mapping = %mapping.display(), "loading data");
    let tables = TelemetryTables::from_files(heartbeat, mapping, tsv)?;
    info!(
        samples = tables.samples.len(),
        segments = tables.segments.len(),
        "loaded tables"
    );

    let report = ml::pipeline::run_pipeline(&tables, config)?;
    let ranked = ml::ranking::rank_workloads(report.results());

    let svg_path = output_dir.join(SVG_FILE);
    ml::render::write_svg(&svg_path, &report)?;
    ml::output::write_ranking(output_dir, &ranked)?;
    ml::output::write_summary(output_dir, &report)?;
    ml::output::write_results_json(output_dir, &report, &ranked)?;

    let skipped = report.warnings().count();
    if skipped > 0 {
        eprintln!("{skipped} workload(s) skipped for insufficient data");
    }
    print!("{}", ml::output::format_ranking(&ranked));

    eprintln!("Output written to {}", output_dir.display());
    eprintln!("  - {SVG_FILE}");
    eprintln!("  - ranking.txt");
    eprintln!("  - summary.txt");
    eprintln!("  - results.json");

    Ok(())
}
