//! CLI entry point for the attendance trends tool.
//!
//! Provides subcommands for turning a directory of per-event attendance
//! tables into chart data and for ranking events by peak attendance.

use anyhow::Result;
use attendance_trends::analyzers::analyzer::{load_series_dir, run};
use attendance_trends::analyzers::rank::rank_series_by_peak_attendance;
use attendance_trends::config::MetricsConfig;
use attendance_trends::output::print_json;
use attendance_trends::window::WindowStrategy;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "attendance_trends")]
#[command(about = "Turns yearly event attendance tables into growth and market share series", long_about = None)]
struct Cli {
    /// JSON config file (blackout interval, column layout, markers)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every table in a directory into chart JSON
    Process {
        /// Directory holding one table per event
        #[arg(short, long, default_value = "raw_data")]
        input_dir: String,

        /// Chart JSON file to write
        #[arg(short, long, default_value = "viz_data.json")]
        output: String,

        /// Optional: directory to write per-year CSV tables into
        #[arg(short, long)]
        tables_dir: Option<String>,

        /// Optional: override the configured window strategy
        #[arg(short = 's', long, value_enum)]
        strategy: Option<WindowStrategy>,
    },
    /// Rank events by their highest recorded attendance
    Rank {
        /// Directory holding one table per event
        #[arg(short, long, default_value = "raw_data")]
        input_dir: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/attendance_trends.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("attendance_trends.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MetricsConfig::load(path)?,
        None => MetricsConfig::default(),
    };

    match cli.command {
        Commands::Process {
            input_dir,
            output,
            tables_dir,
            strategy,
        } => {
            if let Some(strategy) = strategy {
                config.window_strategy = strategy;
            }

            let chart = run(
                Path::new(&input_dir),
                Path::new(&output),
                tables_dir.as_deref().map(Path::new),
                &config,
            )?;
            print_json(&chart)?;

            info!(
                series = chart.sort_order.len(),
                min_year = ?chart.min_year,
                max_year = ?chart.max_year,
                output = %output,
                "Chart data ready"
            );
        }
        Commands::Rank { input_dir } => {
            let collection = load_series_dir(Path::new(&input_dir), &config)?;

            for (rank, name) in rank_series_by_peak_attendance(&collection).iter().enumerate() {
                let peak = collection.get(name).and_then(|s| s.peak_attendance());
                info!(rank = rank + 1, series = %name, peak = ?peak, "Ranked");
            }
        }
    }

    Ok(())
}
