//! Shared entry-point logic for the `empty-calls` and `read-write-calls` binaries.
//!
//! With no arguments each binary runs the reference configuration and prints
//! one result line on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use callcost_common::config::{BenchConfig, EmptyCallVariant, ReadWriteVariant};
use callcost_common::report::{emit, BenchmarkResult, ReportFormat};
use callcost_common::time::{ProcessCpuClock, Timer};
use callcost_runtime::empty_call::EmptyCallWorkload;
use callcost_runtime::read_write::open_read_write_workload;
use callcost_runtime::workload::run_benchmark;
use clap::{Args, Parser};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV_VAR: &str = "CALLCOST_CONFIG";

/// Flags shared by both binaries.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to a benchmark configuration file (TOML).
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Iteration count (overrides config file).
    #[arg(long, short = 'n')]
    pub iterations: Option<u64>,

    /// Result format (text, json).
    #[arg(long, short = 'f', default_value = "text")]
    pub format: ReportFormat,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "warn")]
    pub log_level: String,
}

/// `empty-calls` command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "empty-calls",
    about = "Measure the cost of calling an empty function",
    version,
    long_about = None
)]
pub struct EmptyCallsArgs {
    /// Flags shared with `read-write-calls`.
    #[command(flatten)]
    pub common: CommonArgs,

    /// Callee calling convention (c, rust).
    #[arg(long, value_parser = parse_empty_call_variant)]
    pub variant: Option<EmptyCallVariant>,
}

/// `read-write-calls` command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "read-write-calls",
    about = "Measure the cost of a write/read round trip over a socket pair",
    version,
    long_about = None
)]
pub struct ReadWriteCallsArgs {
    /// Flags shared with `empty-calls`.
    #[command(flatten)]
    pub common: CommonArgs,

    /// Endpoint implementation (pure_c, std).
    #[arg(long, value_parser = parse_read_write_variant)]
    pub variant: Option<ReadWriteVariant>,

    /// Loop reads until the whole payload has arrived
    /// (`--read-to-completion=false` turns it off).
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub read_to_completion: Option<bool>,
}

fn parse_empty_call_variant(s: &str) -> Result<EmptyCallVariant, String> {
    match s {
        "c" => Ok(EmptyCallVariant::C),
        "rust" => Ok(EmptyCallVariant::Rust),
        other => Err(format!("unknown variant '{other}' (expected c or rust)")),
    }
}

fn parse_read_write_variant(s: &str) -> Result<ReadWriteVariant, String> {
    match s {
        "pure_c" => Ok(ReadWriteVariant::PureC),
        "std" => Ok(ReadWriteVariant::Std),
        other => Err(format!("unknown variant '{other}' (expected pure_c or std)")),
    }
}

/// Initialize logging on stderr with the specified log level.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_logging(level: &str) {
    let filter = format!("callcost_cli={level},callcost_runtime={level},callcost_common={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Resolution priority (first existing file wins):
/// 1. Command-line `--config` argument
/// 2. `CALLCOST_CONFIG` environment variable
/// 3. Built-in defaults (the reference configuration)
///
/// # Errors
///
/// Returns an error if a selected file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&Path>) -> Result<BenchConfig> {
    if let Some(config_path) = path {
        info!(?config_path, "Loading config from command-line argument");
        return BenchConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        let config_path = PathBuf::from(&env_path);
        if config_path.exists() {
            info!(?config_path, "Loading config from {CONFIG_ENV_VAR}");
            return BenchConfig::from_file(&config_path).with_context(|| {
                format!("Failed to load config from {CONFIG_ENV_VAR}={env_path}")
            });
        }
        warn!(
            path = %env_path,
            "{CONFIG_ENV_VAR} set but file does not exist, using built-in defaults"
        );
    }

    debug!("No config file given, using built-in defaults");
    Ok(BenchConfig::default())
}

/// Resolve the configuration for `empty-calls`, applying flag overrides.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the overrides
/// are out of range.
pub fn empty_calls_config(args: &EmptyCallsArgs) -> Result<BenchConfig> {
    let mut config = load_config(args.common.config.as_deref())?;
    if let Some(iterations) = args.common.iterations {
        config.empty_call.iterations = iterations;
    }
    if let Some(variant) = args.variant {
        config.empty_call.variant = variant;
    }
    config.validate().context("Invalid command-line override")?;
    Ok(config)
}

/// Resolve the configuration for `read-write-calls`, applying flag overrides.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the overrides
/// are out of range.
pub fn read_write_calls_config(args: &ReadWriteCallsArgs) -> Result<BenchConfig> {
    let mut config = load_config(args.common.config.as_deref())?;
    if let Some(iterations) = args.common.iterations {
        config.read_write.iterations = iterations;
    }
    if let Some(variant) = args.variant {
        config.read_write.variant = variant;
    }
    if let Some(enabled) = args.read_to_completion {
        config.read_write.read_to_completion = enabled;
    }
    config.validate().context("Invalid command-line override")?;
    Ok(config)
}

/// Run the empty-call benchmark.
///
/// # Errors
///
/// Returns an error if the clock cannot be read.
pub fn run_empty_calls(config: &BenchConfig) -> Result<BenchmarkResult> {
    let timer = Timer::process_cpu();
    log_clock_resolution(timer.clock());

    let mut workload = EmptyCallWorkload::from_config(&config.empty_call);
    run_benchmark(&mut workload, config.empty_call.iterations, &timer)
        .inspect_err(|e| error!(error = %e, "Empty-call benchmark failed"))
        .context("Empty-call benchmark failed")
}

/// Run the read/write benchmark.
///
/// # Errors
///
/// Returns an error if the socket pair cannot be set up, or on any clock,
/// write, or (under `fail_fast`) read failure.
pub fn run_read_write_calls(config: &BenchConfig) -> Result<BenchmarkResult> {
    let timer = Timer::process_cpu();
    log_clock_resolution(timer.clock());

    let mut workload = open_read_write_workload(&config.read_write)
        .inspect_err(|e| error!(error = %e, "Socket pair setup failed"))
        .context("Failed to set up socket pair")?;
    run_benchmark(&mut workload, config.read_write.iterations, &timer)
        .inspect_err(|e| error!(error = %e, "Read/write benchmark failed"))
        .context("Read/write benchmark failed")
}

/// Print `result` on stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn print_result(result: &BenchmarkResult, format: ReportFormat) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    emit(result, format, &mut out).context("Failed to write result")
}

fn log_clock_resolution(clock: &ProcessCpuClock) {
    match clock.resolution() {
        Ok(res) => debug!(resolution_ns = res.as_nanos(), "Process CPU clock resolution"),
        Err(e) => warn!(error = %e, "Could not query clock resolution"),
    }
}
