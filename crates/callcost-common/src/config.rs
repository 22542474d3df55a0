//! Configuration structures for the benchmarks.
//!
//! Supports TOML deserialization. Every field defaults to the reference
//! configuration, so an empty file (or no file at all) reproduces the
//! reference runs.

use crate::error::CallcostError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Payload written on every read/write iteration: 13 visible bytes plus a NUL.
pub const DEFAULT_PAYLOAD: &str = "hello, world!\0";

/// Reference iteration count for the empty-call benchmark.
pub const DEFAULT_EMPTY_CALL_ITERATIONS: u64 = 1_000_000_000;

/// Reference iteration count for the read/write benchmark.
pub const DEFAULT_READ_WRITE_ITERATIONS: u64 = 500_000;

/// Largest payload accepted for the read/write benchmark.
///
/// One thread drives both ends of the socket pair, so a write must fit in the
/// socket's send buffer or it blocks with nobody left to drain it. Linux
/// defaults give an `AF_UNIX` stream well over this much room.
pub const MAX_PAYLOAD_LEN: usize = 64 * 1024;

/// Top-level benchmark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BenchConfig {
    /// Empty-call benchmark settings.
    pub empty_call: EmptyCallConfig,

    /// Read/write benchmark settings.
    pub read_write: ReadWriteConfig,
}

/// Empty-call benchmark configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmptyCallConfig {
    /// Number of calls inside the timed region.
    pub iterations: u64,

    /// Calling convention of the no-op callee.
    pub variant: EmptyCallVariant,
}

impl Default for EmptyCallConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_EMPTY_CALL_ITERATIONS,
            variant: EmptyCallVariant::C,
        }
    }
}

/// Calling convention used by the empty-call benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyCallVariant {
    /// `extern "C"` no-op.
    #[default]
    C,
    /// Rust-ABI no-op.
    Rust,
}

/// Read/write benchmark configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadWriteConfig {
    /// Number of write/read round trips inside the timed region.
    pub iterations: u64,

    /// Bytes written on each iteration. The read buffer has the same length.
    pub payload: String,

    /// Endpoint implementation driving the socket pair.
    pub variant: ReadWriteVariant,

    /// Consecutive zero-byte writes tolerated before the write is declared stalled.
    pub max_stalled_writes: u32,

    /// Loop reads until the buffer is full instead of issuing a single read.
    pub read_to_completion: bool,

    /// What to do when a read fails.
    pub on_read_error: ReadErrorPolicy,

    /// Receive timeout on the reading endpoint. `None` blocks forever.
    #[serde(default, with = "humantime_serde_opt", skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<Duration>,
}

impl Default for ReadWriteConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_READ_WRITE_ITERATIONS,
            payload: String::from(DEFAULT_PAYLOAD),
            variant: ReadWriteVariant::PureC,
            max_stalled_writes: 16,
            read_to_completion: false,
            on_read_error: ReadErrorPolicy::FailFast,
            read_timeout: None,
        }
    }
}

/// Endpoint implementation used by the read/write benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadWriteVariant {
    /// Raw `write(2)`/`read(2)` on the socket descriptors.
    #[default]
    PureC,
    /// `std::os::unix::net::UnixStream` through `std::io`.
    Std,
}

/// Policy for failed reads inside the timed loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadErrorPolicy {
    /// Abort the run with a read failure.
    #[default]
    FailFast,
    /// Log a warning, count the failure, and keep going.
    LogAndContinue,
}

impl BenchConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.empty_call.iterations == 0 {
            return Err(ConfigError::Invalid(
                "empty_call.iterations must be at least 1".into(),
            ));
        }
        if self.read_write.iterations == 0 {
            return Err(ConfigError::Invalid(
                "read_write.iterations must be at least 1".into(),
            ));
        }
        if self.read_write.payload.is_empty() {
            return Err(ConfigError::Invalid(
                "read_write.payload must not be empty".into(),
            ));
        }
        if self.read_write.payload.len() > MAX_PAYLOAD_LEN {
            return Err(ConfigError::Invalid(format!(
                "read_write.payload is {} bytes, at most {MAX_PAYLOAD_LEN} allowed",
                self.read_write.payload.len()
            )));
        }
        if self.read_write.max_stalled_writes == 0 {
            return Err(ConfigError::Invalid(
                "read_write.max_stalled_writes must be at least 1".into(),
            ));
        }
        if let Some(timeout) = self.read_write.read_timeout {
            if timeout.is_zero() {
                return Err(ConfigError::Invalid(
                    "read_write.read_timeout must be non-zero".into(),
                ));
            }
            if nix::libc::time_t::try_from(timeout.as_secs()).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "read_write.read_timeout of {}s is out of range",
                    timeout.as_secs()
                )));
            }
        }
        Ok(())
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for CallcostError {
    fn from(e: ConfigError) -> Self {
        CallcostError::Config(e.to_string())
    }
}

/// Serde helper module for `Option<Duration>` using humantime format.
mod humantime_serde_opt {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::ref_option)] // signature fixed by serde's `with`
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_str(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
