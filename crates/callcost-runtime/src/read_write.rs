//! Socket pair write/read workload.
//!
//! Each iteration writes the whole payload from the sender, then reads up
//! to payload-length bytes on the receiver. Writes loop until every byte is
//! sent; reads are a single call unless `read_to_completion` is set. A short
//! read leaves the remainder in the socket for the next iteration.

use crate::endpoint::{Endpoint, RawEndpoint, SocketPair};
use crate::workload::Workload;
use callcost_common::config::{
    ReadErrorPolicy, ReadWriteConfig, ReadWriteVariant, MAX_PAYLOAD_LEN,
};
use callcost_common::error::{CallcostError, CallcostResult};
use std::io;
use std::os::unix::net::UnixStream;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result-line name for the raw syscall variant.
pub const READ_WRITE_PURE_C_CALLS: &str = "BenchmarkReadWritePureCCalls";

/// Result-line name for the `std::io` variant.
pub const READ_WRITE_STD_CALLS: &str = "BenchmarkReadWriteStdCalls";

/// Write all of `buf`, retrying partial and interrupted writes.
///
/// Zero-byte writes make no progress; more than `max_stalled` of them in a
/// row fail with [`CallcostError::WriteStalled`].
///
/// # Errors
///
/// Returns [`CallcostError::WriteFailure`] on the first write error, or
/// [`CallcostError::WriteStalled`] when writes stop making progress.
pub fn write_all<E: Endpoint + ?Sized>(
    endpoint: &mut E,
    mut buf: &[u8],
    max_stalled: u32,
    iteration: u64,
) -> CallcostResult<()> {
    let mut stalled = 0u32;
    while !buf.is_empty() {
        match endpoint.write_some(buf) {
            Ok(0) => {
                stalled += 1;
                if stalled > max_stalled {
                    return Err(CallcostError::WriteStalled {
                        iteration,
                        attempts: stalled,
                    });
                }
            }
            Ok(n) => {
                stalled = 0;
                buf = &buf[n..];
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                return Err(CallcostError::WriteFailure {
                    iteration,
                    reason: e.to_string(),
                })
            }
        }
    }
    Ok(())
}

/// Issue one read into `buf`, retrying only on `EINTR`.
///
/// # Errors
///
/// Returns the read error; end of stream is reported as
/// [`io::ErrorKind::UnexpectedEof`].
pub fn read_once<E: Endpoint + ?Sized>(endpoint: &mut E, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match endpoint.read_some(buf) {
            Ok(0) if !buf.is_empty() => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// Read until `buf` is full.
///
/// # Errors
///
/// Returns the first read error, or [`io::ErrorKind::UnexpectedEof`] if the
/// stream ends before `buf` is full.
pub fn read_full<E: Endpoint + ?Sized>(endpoint: &mut E, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        filled += read_once(endpoint, &mut buf[filled..])?;
    }
    Ok(filled)
}

/// Writes a fixed payload and reads it back once per iteration.
#[derive(Debug)]
pub struct ReadWriteWorkload<E: Endpoint> {
    name: &'static str,
    channel: SocketPair<E>,
    payload: Vec<u8>,
    buffer: Vec<u8>,
    max_stalled_writes: u32,
    read_to_completion: bool,
    on_read_error: ReadErrorPolicy,
    bytes_read: u64,
    read_errors: u64,
    last_len: usize,
}

impl<E: Endpoint> ReadWriteWorkload<E> {
    /// Total bytes received across all runs.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Read failures tolerated under [`ReadErrorPolicy::LogAndContinue`].
    pub fn read_errors(&self) -> u64 {
        self.read_errors
    }

    /// Bytes received by the most recent read. Empty after a failed read.
    pub fn last_read(&self) -> &[u8] {
        &self.buffer[..self.last_len]
    }

    fn read_step(&mut self, iteration: u64) -> CallcostResult<()> {
        let result = if self.read_to_completion {
            read_full(&mut self.channel.receiver, &mut self.buffer)
        } else {
            read_once(&mut self.channel.receiver, &mut self.buffer)
        };

        match result {
            Ok(n) => {
                self.last_len = n;
                self.bytes_read += n as u64;
                Ok(())
            }
            Err(e) => {
                self.last_len = 0;
                self.read_failed(iteration, &e)
            }
        }
    }

    fn read_failed(&mut self, iteration: u64, e: &io::Error) -> CallcostResult<()> {
        match self.on_read_error {
            ReadErrorPolicy::FailFast => Err(CallcostError::ReadFailure {
                iteration,
                reason: read_error_reason(e),
            }),
            ReadErrorPolicy::LogAndContinue => {
                self.read_errors += 1;
                warn!(iteration, error = %read_error_reason(e), "Read failed, continuing");
                Ok(())
            }
        }
    }
}

fn read_error_reason(e: &io::Error) -> String {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => "end of stream".to_string(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => format!("read timed out ({e})"),
        _ => e.to_string(),
    }
}

impl<E: Endpoint> Workload for ReadWriteWorkload<E> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&mut self, iterations: u64) -> CallcostResult<()> {
        for iteration in 0..iterations {
            write_all(
                &mut self.channel.sender,
                &self.payload,
                self.max_stalled_writes,
                iteration,
            )?;
            self.read_step(iteration)?;
        }
        Ok(())
    }
}

/// Builder for configuring a [`ReadWriteWorkload`].
#[derive(Debug, Clone)]
pub struct ReadWriteWorkloadBuilder {
    name: &'static str,
    payload: Vec<u8>,
    max_stalled_writes: u32,
    read_to_completion: bool,
    on_read_error: ReadErrorPolicy,
    read_timeout: Option<Duration>,
}

impl ReadWriteWorkloadBuilder {
    /// Create a builder with the reference settings.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        let defaults = ReadWriteConfig::default();
        Self {
            name,
            payload: defaults.payload.into_bytes(),
            max_stalled_writes: defaults.max_stalled_writes,
            read_to_completion: defaults.read_to_completion,
            on_read_error: defaults.on_read_error,
            read_timeout: defaults.read_timeout,
        }
    }

    /// Create a builder from a configuration section. The name follows the variant.
    #[must_use]
    pub fn from_config(config: &ReadWriteConfig) -> Self {
        let name = match config.variant {
            ReadWriteVariant::PureC => READ_WRITE_PURE_C_CALLS,
            ReadWriteVariant::Std => READ_WRITE_STD_CALLS,
        };
        Self {
            name,
            payload: config.payload.as_bytes().to_vec(),
            max_stalled_writes: config.max_stalled_writes,
            read_to_completion: config.read_to_completion,
            on_read_error: config.on_read_error,
            read_timeout: config.read_timeout,
        }
    }

    /// Set the bytes written per iteration.
    #[must_use]
    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Set the tolerated run of zero-byte writes.
    #[must_use]
    pub fn max_stalled_writes(mut self, max: u32) -> Self {
        self.max_stalled_writes = max;
        self
    }

    /// Loop reads until the buffer is full.
    #[must_use]
    pub fn read_to_completion(mut self, enabled: bool) -> Self {
        self.read_to_completion = enabled;
        self
    }

    /// Set the read failure policy.
    #[must_use]
    pub fn on_read_error(mut self, policy: ReadErrorPolicy) -> Self {
        self.on_read_error = policy;
        self
    }

    /// Set the receive timeout.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Build the workload over an already connected channel.
    ///
    /// # Errors
    ///
    /// Returns [`CallcostError::Config`] for an empty or oversized payload, a
    /// zero stall limit, or an out-of-range receive timeout, and
    /// [`CallcostError::ChannelSetup`] if the timeout cannot be applied.
    pub fn build<E: Endpoint>(
        self,
        channel: SocketPair<E>,
    ) -> CallcostResult<ReadWriteWorkload<E>> {
        if self.payload.is_empty() {
            return Err(CallcostError::Config("payload must not be empty".into()));
        }
        if self.payload.len() > MAX_PAYLOAD_LEN {
            return Err(CallcostError::Config(format!(
                "payload is {} bytes, at most {MAX_PAYLOAD_LEN} allowed",
                self.payload.len()
            )));
        }
        if self.max_stalled_writes == 0 {
            return Err(CallcostError::Config(
                "max_stalled_writes must be at least 1".into(),
            ));
        }

        if let Some(timeout) = self.read_timeout {
            if libc::time_t::try_from(timeout.as_secs()).is_err() {
                return Err(CallcostError::Config(format!(
                    "read timeout of {}s is out of range",
                    timeout.as_secs()
                )));
            }
            channel
                .receiver
                .set_read_timeout(self.read_timeout)
                .map_err(|e| {
                    CallcostError::ChannelSetup(format!("failed to set read timeout: {e}"))
                })?;
        }

        debug!(
            benchmark = self.name,
            payload_len = self.payload.len(),
            read_to_completion = self.read_to_completion,
            policy = ?self.on_read_error,
            timeout = ?self.read_timeout,
            "Read/write workload configured"
        );

        let buffer = vec![0u8; self.payload.len()];
        Ok(ReadWriteWorkload {
            name: self.name,
            channel,
            payload: self.payload,
            buffer,
            max_stalled_writes: self.max_stalled_writes,
            read_to_completion: self.read_to_completion,
            on_read_error: self.on_read_error,
            bytes_read: 0,
            read_errors: 0,
            last_len: 0,
        })
    }
}

/// Open a socket pair of the configured variant and build the workload on it.
///
/// # Errors
///
/// Returns [`CallcostError::ChannelSetup`] if the socket pair cannot be
/// created, or a configuration error from the builder.
pub fn open_read_write_workload(config: &ReadWriteConfig) -> CallcostResult<Box<dyn Workload>> {
    let builder = ReadWriteWorkloadBuilder::from_config(config);
    info!(variant = ?config.variant, "Opening socket pair");
    let workload: Box<dyn Workload> = match config.variant {
        ReadWriteVariant::PureC => {
            Box::new(builder.build(SocketPair::<RawEndpoint>::open_raw()?)?)
        }
        ReadWriteVariant::Std => Box::new(builder.build(SocketPair::<UnixStream>::open_std()?)?),
    };
    Ok(workload)
}
