//! orgcheck CLI
//!
//! Loads the KU, FS and OE XML exports, links them, and reports every
//! missing, dangling or cyclic reference.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

use orgcheck_core::{analyze, AnalysisOptions};
use orgcheck_ingest_xml::{load_stores, ExportPaths};

mod report;

use report::{Report, ReportFormat};

/// Exit status when `--fail-on-findings` is set and findings exist.
const FINDINGS_EXIT: u8 = 2;

#[derive(Parser)]
#[command(name = "orgcheck")]
#[command(
    author,
    version,
    about = "Referential integrity checks for KU/FS/OE exports"
)]
struct Cli {
    /// FS (Führungsstruktur) export
    #[arg(long, default_value = "XML_FS.xml")]
    fs: PathBuf,

    /// KU (Konzernunternehmen) export
    #[arg(long, default_value = "XML_KU.xml")]
    ku: PathBuf,

    /// OE export
    #[arg(long, default_value = "XML_OE.xml")]
    oe: PathBuf,

    /// Log level; `RUST_LOG` takes precedence when set
    #[arg(long, value_enum, default_value = "info")]
    log: LogLevel,

    #[arg(long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Write the report here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Run the analysis on the rayon thread pool
    #[arg(long)]
    parallel: bool,

    /// Exit non-zero when any finding exists
    #[arg(long)]
    fail_on_findings: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let paths = ExportPaths {
        ku: cli.ku.clone(),
        fs: cli.fs.clone(),
        oe: cli.oe.clone(),
    };
    let mut stores = load_stores(&paths).context("failed to load exports")?;

    let options = AnalysisOptions {
        parallel: cli.parallel,
    };
    let summary = analyze(&mut stores, &options);

    let report = Report::new(&stores, summary);
    report.log_findings();
    let rendered = report.render(cli.format)?;

    match &cli.out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("{} {}", "wrote".green(), path.display());
        }
        None => println!("{rendered}"),
    }

    if cli.fail_on_findings && !summary.is_clean() {
        eprintln!(
            "{}",
            format!("{} record(s) with errors", summary.records_with_errors()).red()
        );
        return Ok(ExitCode::from(FINDINGS_EXIT));
    }
    Ok(ExitCode::SUCCESS)
}
