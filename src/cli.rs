//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvAdapter, DEFAULT_MAX_UPLOAD_BYTES, IngestConfig};
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{
    BacktestConfig, BacktestResult, DEFAULT_INITIAL_CAPITAL, DEFAULT_TRADES_SAMPLE_SIZE,
};
use crate::domain::config_validation::{double_value, int_value, validate_config};
use crate::domain::error::SispError;
use crate::domain::ohlcv::MIN_BARS;
use crate::domain::pipeline::{self, UploadSummary};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sisp", about = "OHLCV indicator engine and signal backtester")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest a CSV file and report rows, columns and timeframe
    Upload { file: PathBuf },
    /// Compute the indicator frame for a CSV file
    Indicators {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Run the signal backtest on a CSV file
    Backtest {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        initial_capital: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Default log filter for a `-v` count.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load and validate configuration, then run the subcommand.
pub fn execute(cli: Cli) -> Result<(), SispError> {
    let config = load_config(cli.config.as_ref())?;
    validate_config(&config)?;
    dispatch(cli.command, &config)
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, SispError> {
    match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn dispatch(command: Command, config: &dyn ConfigPort) -> Result<(), SispError> {
    let data_port = CsvAdapter::new(build_ingest_config(config)?);

    match command {
        Command::Upload { file } => {
            let reporter = build_reporter(OutputFormat::Json, config);
            let mut out = open_output(None)?;
            let summary = upload(&data_port, reporter.as_ref(), &file, &mut out)?;
            eprintln!(
                "Ingested {} rows ({})",
                summary.rows,
                summary.inferred_timeframe.as_deref().unwrap_or("unknown")
            );
            Ok(())
        }
        Command::Indicators {
            file,
            output,
            format,
        } => {
            let format = resolve_format(format, config)?;
            let reporter = build_reporter(format, config);
            let mut out = open_output(output.as_deref())?;
            let rows = indicators(&data_port, reporter.as_ref(), &file, &mut out)?;
            if let Some(path) = &output {
                eprintln!("Wrote {} rows to {}", rows, path.display());
            }
            Ok(())
        }
        Command::Backtest {
            file,
            output,
            initial_capital,
        } => {
            let mut bt_config = build_backtest_config(config)?;
            if let Some(capital) = initial_capital {
                if !capital.is_finite() || capital <= 0.0 {
                    return Err(SispError::ConfigInvalid {
                        section: "backtest".into(),
                        key: "initial_capital".into(),
                        reason: "initial_capital must be positive".into(),
                    });
                }
                bt_config.initial_capital = capital;
            }
            let reporter = build_reporter(OutputFormat::Json, config);
            let mut out = open_output(output.as_deref())?;
            let result = backtest(&data_port, reporter.as_ref(), &file, &bt_config, &mut out)?;
            eprintln!(
                "Backtest complete: {} trades, final value {:.2}, win rate {:.2}",
                result.n_trades, result.final_portfolio_value, result.win_rate
            );
            Ok(())
        }
    }
}

/// Load `source` and write its upload summary.
pub fn upload(
    data_port: &dyn DataPort,
    reporter: &dyn ReportPort,
    source: &Path,
    out: &mut dyn Write,
) -> Result<UploadSummary, SispError> {
    eprintln!("Loading {}", source.display());
    let series = data_port.load_series(source)?;
    let summary = pipeline::summarize(&series);
    reporter.write_summary(&summary, out)?;
    out.flush()?;
    Ok(summary)
}

/// Load `source`, compute indicators and write the frame. Returns the row count.
pub fn indicators(
    data_port: &dyn DataPort,
    reporter: &dyn ReportPort,
    source: &Path,
    out: &mut dyn Write,
) -> Result<usize, SispError> {
    eprintln!("Loading {}", source.display());
    let series = data_port.load_series(source)?;
    eprintln!("Computing indicators over {} bars...", series.len());
    let frame = pipeline::run_indicators(&series);
    reporter.write_indicators(&frame, out)?;
    out.flush()?;
    Ok(frame.len())
}

/// Load `source`, run the backtest and write the result.
pub fn backtest(
    data_port: &dyn DataPort,
    reporter: &dyn ReportPort,
    source: &Path,
    config: &BacktestConfig,
    out: &mut dyn Write,
) -> Result<BacktestResult, SispError> {
    eprintln!("Loading {}", source.display());
    let series = data_port.load_series(source)?;
    eprintln!("Running backtest over {} bars...", series.len());
    let result = pipeline::run_backtest_pipeline(&series, config);
    reporter.write_backtest(&result, out)?;
    out.flush()?;
    Ok(result)
}

fn non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, SispError> {
    let value = int_value(config, section, key, default)?;
    if value < 0 {
        return Err(SispError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: format!("{key} must be non-negative"),
        });
    }
    Ok(value)
}

pub fn build_ingest_config(config: &dyn ConfigPort) -> Result<IngestConfig, SispError> {
    let max_upload_bytes = non_negative(
        config,
        "ingest",
        "max_upload_bytes",
        DEFAULT_MAX_UPLOAD_BYTES as i64,
    )?;
    let min_bars = int_value(config, "ingest", "min_bars", MIN_BARS as i64)?;
    if min_bars < MIN_BARS as i64 {
        return Err(SispError::ConfigInvalid {
            section: "ingest".into(),
            key: "min_bars".into(),
            reason: format!("min_bars must be at least {MIN_BARS}"),
        });
    }

    Ok(IngestConfig {
        max_upload_bytes: max_upload_bytes as u64,
        min_bars: min_bars as usize,
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SispError> {
    let trades_sample_size = non_negative(
        config,
        "backtest",
        "trades_sample_size",
        DEFAULT_TRADES_SAMPLE_SIZE as i64,
    )?;

    let initial_capital =
        double_value(config, "backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)?;

    Ok(BacktestConfig {
        initial_capital,
        trades_sample_size: trades_sample_size as usize,
    })
}

/// Command-line flag first, then `[output] format`, then JSON.
pub fn resolve_format(
    flag: Option<OutputFormat>,
    config: &dyn ConfigPort,
) -> Result<OutputFormat, SispError> {
    if let Some(format) = flag {
        return Ok(format);
    }
    match config.get_string("output", "format") {
        None => Ok(OutputFormat::Json),
        Some(value) => <OutputFormat as ValueEnum>::from_str(value.trim(), true).map_err(|_| {
            SispError::ConfigInvalid {
                section: "output".into(),
                key: "format".into(),
                reason: format!("unknown format '{}'", value),
            }
        }),
    }
}

pub fn build_reporter(format: OutputFormat, config: &dyn ConfigPort) -> Box<dyn ReportPort> {
    match format {
        OutputFormat::Json => Box::new(JsonReportAdapter::new(
            config.get_bool("output", "pretty", true),
        )),
        OutputFormat::Csv => Box::new(CsvReportAdapter::new()),
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, SispError> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| SispError::Output {
                reason: format!("cannot create {}: {}", path.display(), e),
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
