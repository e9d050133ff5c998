//! yband — keep G-code Y-axis speeds out of a resonance band.
//!
//! Reads a whole G-code file, rescales the feed rate (and extrusion) of moves
//! whose Y-speed falls inside the avoidance window, and writes the file back
//! in one piece.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use yband::kinematics::TieBreak;
use yband::{AvoidanceConfig, Program, RewriteReport, Rewriter};

const DEFAULT_LOG_FILE: &str = "yband.log";

#[derive(Parser)]
#[command(name = "yband")]
#[command(about = "Modify G-code to avoid a range of Y-axis speeds", long_about = None)]
#[command(version)]
struct Cli {
    /// G-code file to rewrite
    file: PathBuf,

    /// Lower edge of the Y-speed band to avoid (mm/s)
    #[arg(long)]
    min: Option<f64>,

    /// Upper edge of the Y-speed band to avoid (mm/s)
    #[arg(long)]
    max: Option<f64>,

    /// How far past the band edge corrected speeds land (mm/s)
    #[arg(long)]
    margin: Option<f64>,

    /// Edge to use when a speed is exactly mid-band
    #[arg(long, value_enum)]
    tie_break: Option<TieBreak>,

    /// Leave the corrected feed rate in effect for following moves
    #[arg(long)]
    no_restore_feed: bool,

    /// Configuration file (default: ~/.yband/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the result here instead of rewriting FILE in place
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Report format printed on stdout
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,

    /// Append a modification log to this file
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Do not write a modification log file
    #[arg(long)]
    no_log_file: bool,

    /// Enable debug output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(&cli) {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    let file_layer = if cli.no_log_file {
        None
    } else {
        match open_log(&cli.log_file) {
            Ok(file) => Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            ),
            Err(e) => {
                eprintln!(
                    "warning: cannot open log file {}: {e}",
                    cli.log_file.display()
                );
                None
            }
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();
}

fn open_log(path: &Path) -> std::io::Result<std::fs::File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn run(cli: &Cli) -> yband::Result<()> {
    let config = resolve_config(cli)?;
    let rewriter = Rewriter::new(&config)?;

    info!("processing {}", cli.file.display());
    info!(
        "avoiding Y speeds between {} and {} mm/s",
        config.min, config.max
    );

    let mut program = Program::load(&cli.file)?;
    let report = rewriter.rewrite(&mut program);

    for change in &report.changes {
        info!("{change}");
    }

    if cli.dry_run {
        info!("dry run, nothing written");
    } else {
        let target = cli.output.as_deref().unwrap_or(cli.file.as_path());
        program.save(target)?;
        info!("wrote {}", target.display());
    }

    print_report(&report, cli.report);
    Ok(())
}

/// Config file first, then command-line overrides.
fn resolve_config(cli: &Cli) -> yband::Result<AvoidanceConfig> {
    let mut config = AvoidanceConfig::load(cli.config.as_deref())?;
    if let Some(min) = cli.min {
        config.min = min;
    }
    if let Some(max) = cli.max {
        config.max = max;
    }
    if let Some(margin) = cli.margin {
        config.margin = margin;
    }
    if let Some(tie_break) = cli.tie_break {
        config.tie_break = tie_break;
    }
    if cli.no_restore_feed {
        config.restore_feed_rate = false;
    }
    Ok(config)
}

fn print_report(report: &RewriteReport, format: ReportFormat) {
    match format {
        ReportFormat::Text => println!("{}", report.summary()),
        ReportFormat::Json => match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to encode report: {e}"),
        },
    }
}
