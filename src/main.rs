//! CLI entry point for the macroseismic questionnaire rater.
//!
//! Provides subcommands for running the full analysis of one event, logging
//! the category breakdown only, and checking a sheet's column layout.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use macroseis_rater::{
    config::AnalysisConfig,
    output::print_json,
    parser::{ColumnPresence, read_headers},
    pipeline::{analyze_file, run},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "macroseis_rater")]
#[command(about = "Rates citizen earthquake reports and derives isoseismal regions", long_about = None)]
struct Cli {
    /// JSON config file (defaults to $MACROSEIS_CONFIG, then built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify observations around the event and write all artifacts
    Analyze {
        /// Exported observation sheet (delimited text)
        #[arg(value_name = "SHEET")]
        source: PathBuf,

        /// Directory to write artifacts into
        #[arg(short, long, default_value = "analysis_output")]
        output_dir: PathBuf,
    },
    /// Log the category breakdown without writing anything
    Report {
        #[arg(value_name = "SHEET")]
        source: PathBuf,

        /// Also log the whole summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Check which configured columns the sheet contains
    Columns {
        #[arg(value_name = "SHEET")]
        source: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/macroseis_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("macroseis_rater.log"));

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

    let config_path = cli
        .config
        .or_else(|| std::env::var_os("MACROSEIS_CONFIG").map(PathBuf::from));
    let config = AnalysisConfig::load_or_default(config_path.as_deref())?;
    info!(
        event_id = config.event.id,
        origin_time = %config.event.origin_time,
        window_hours = config.window_hours,
        timezone = %config.source_timezone,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Analyze { source, output_dir } => {
            if run(&source, &config, &output_dir)?.is_some() {
                info!(output_dir = %output_dir.display(), "Analysis complete");
            }
        }
        Commands::Report { source, json } => {
            let analysis = analyze_file(&source, &config)?;
            analysis.summary.log();
            if json {
                print_json(&analysis.summary)?;
            }
        }
        Commands::Columns { source } => {
            let headers = read_headers(&source, &config)?;
            let presence = ColumnPresence::check(&headers, &config.columns);

            for name in &presence.present {
                info!(column = %name, "Column present");
            }
            for name in &presence.missing_optional {
                warn!(column = %name, "Optional column missing");
            }
            if !presence.missing_required.is_empty() {
                bail!(
                    "required columns missing: {}",
                    presence.missing_required.join(", ")
                );
            }
        }
    }

    Ok(())
}
