//! Benchmark result formatting.
//!
//! The text format is one tab-separated line per run, compatible with tools
//! that parse `go test -bench` output:
//!
//! ```text
//! BenchmarkEmptyCCalls\t1000000000\t1.52 ns/op
//! ```

use crate::error::{CallcostError, CallcostResult};
use crate::time::ElapsedDuration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Outcome of one benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Benchmark name, e.g. `BenchmarkEmptyCCalls`.
    pub name: String,
    /// Number of operations inside the timed region.
    pub iterations: u64,
    /// Total process CPU time of the timed region in nanoseconds.
    pub elapsed_ns: i64,
    /// `elapsed_ns / iterations`.
    pub average_ns_per_op: f64,
}

impl BenchmarkResult {
    /// Derive a result from a measured region.
    ///
    /// # Errors
    ///
    /// Returns [`CallcostError::ZeroIterations`] if `iterations` is zero.
    pub fn new(
        name: impl Into<String>,
        iterations: u64,
        elapsed: &ElapsedDuration,
    ) -> CallcostResult<Self> {
        let average_ns_per_op = elapsed
            .per_op(iterations)
            .ok_or(CallcostError::ZeroIterations)?;
        Ok(Self {
            name: name.into(),
            iterations,
            elapsed_ns: elapsed.as_nanos(),
            average_ns_per_op,
        })
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{:.2} ns/op",
            self.name, self.iterations, self.average_ns_per_op
        )
    }
}

/// Output format for [`emit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Single tab-separated line.
    #[default]
    Text,
    /// Single-line JSON object.
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = CallcostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CallcostError::Config(format!(
                "unknown report format '{other}' (expected text or json)"
            ))),
        }
    }
}

/// Write `result` to `out` in the requested format, newline terminated.
///
/// # Errors
///
/// Returns any I/O error from `out`.
pub fn emit<W: Write>(
    result: &BenchmarkResult,
    format: ReportFormat,
    out: &mut W,
) -> std::io::Result<()> {
    match format {
        ReportFormat::Text => writeln!(out, "{result}")?,
        ReportFormat::Json => {
            serde_json::to_writer(&mut *out, result)?;
            writeln!(out)?;
        }
    }
    out.flush()
}
