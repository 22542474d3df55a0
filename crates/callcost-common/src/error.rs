use thiserror::Error;

/// Benchmark error types covering clock access, channel setup, and workload I/O.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CallcostError {
    /// The process CPU clock could not be read.
    #[error("clock failure: {0}")]
    Clock(String),

    /// The stop timestamp precedes the start timestamp.
    #[error("negative elapsed time: {elapsed_ns}ns (clock misuse)")]
    NegativeElapsed {
        /// Computed elapsed time in nanoseconds.
        elapsed_ns: i64,
    },

    /// The local socket pair could not be created or configured.
    #[error("channel setup failed: {0}")]
    ChannelSetup(String),

    /// A write call reported an error.
    #[error("write failed at iteration {iteration}: {reason}")]
    WriteFailure {
        /// Zero-based iteration at which the write failed.
        iteration: u64,
        /// Underlying error description.
        reason: String,
    },

    /// Writes stopped making progress.
    #[error("write stalled at iteration {iteration}: {attempts} consecutive zero-byte writes")]
    WriteStalled {
        /// Zero-based iteration at which the write stalled.
        iteration: u64,
        /// Number of consecutive zero-byte writes observed.
        attempts: u32,
    },

    /// A read call reported an error, end of stream, or timed out.
    #[error("read failed at iteration {iteration}: {reason}")]
    ReadFailure {
        /// Zero-based iteration at which the read failed.
        iteration: u64,
        /// Underlying error description.
        reason: String,
    },

    /// A benchmark was requested with zero iterations; the per-op average is undefined.
    #[error("iteration count must be at least 1")]
    ZeroIterations,

    /// Invalid benchmark configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for benchmark operations.
pub type CallcostResult<T> = Result<T, CallcostError>;
