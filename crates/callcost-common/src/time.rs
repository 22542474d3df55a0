//! Process CPU-time timer.
//!
//! Reads `CLOCK_PROCESS_CPUTIME_ID`, which only advances while the calling
//! process is executing. Time spent descheduled is excluded, so the measured
//! region reflects computational and syscall cost rather than scheduler noise.

use crate::error::{CallcostError, CallcostResult};
use nix::time::{clock_getres, clock_gettime, ClockId};
use std::fmt;
use std::time::Duration;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Opaque point in process CPU time with nanosecond resolution.
///
/// Only meaningful as a difference between two captures taken in the same
/// process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: i64,
    nanos: i64,
}

impl Timestamp {
    /// Build a timestamp from its seconds and sub-second nanosecond parts.
    #[must_use]
    pub const fn from_parts(secs: i64, nanos: i64) -> Self {
        Self { secs, nanos }
    }

    /// Whole seconds component.
    #[must_use]
    pub const fn secs(&self) -> i64 {
        self.secs
    }

    /// Sub-second nanoseconds component.
    #[must_use]
    pub const fn subsec_nanos(&self) -> i64 {
        self.nanos
    }

    /// Total nanoseconds since the clock's origin.
    #[must_use]
    pub fn as_nanos(&self) -> i128 {
        i128::from(self.secs) * i128::from(NANOS_PER_SEC) + i128::from(self.nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}s", self.secs, self.nanos)
    }
}

/// Signed nanosecond difference between two timestamps.
///
/// Construction rejects negative differences, so a value of this type is
/// always a valid measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElapsedDuration {
    start: Timestamp,
    end: Timestamp,
    nanos: i64,
}

impl ElapsedDuration {
    /// Compute the elapsed time between `start` and `end`.
    ///
    /// The seconds difference is scaled to nanoseconds and the sub-second
    /// difference added, which carries across the seconds boundary.
    ///
    /// # Errors
    ///
    /// Returns [`CallcostError::NegativeElapsed`] if `end` precedes `start`.
    pub fn between(start: Timestamp, end: Timestamp) -> CallcostResult<Self> {
        let nanos = (end.secs - start.secs) * NANOS_PER_SEC + (end.nanos - start.nanos);
        if nanos < 0 {
            return Err(CallcostError::NegativeElapsed { elapsed_ns: nanos });
        }
        Ok(Self { start, end, nanos })
    }

    /// Elapsed nanoseconds (never negative).
    #[must_use]
    pub const fn as_nanos(&self) -> i64 {
        self.nanos
    }

    /// Elapsed time as a [`Duration`].
    #[must_use]
    pub fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.nanos.unsigned_abs())
    }

    /// Timestamp that opened the measured region.
    #[must_use]
    pub const fn start(&self) -> Timestamp {
        self.start
    }

    /// Timestamp that closed the measured region.
    #[must_use]
    pub const fn end(&self) -> Timestamp {
        self.end
    }

    /// Average nanoseconds per operation over `iterations` operations.
    ///
    /// Returns `None` for zero iterations, where the average is undefined.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn per_op(&self, iterations: u64) -> Option<f64> {
        if iterations == 0 {
            return None;
        }
        Some(self.nanos as f64 / iterations as f64)
    }
}

/// Source of process CPU timestamps.
pub trait CpuClock {
    /// Read the current timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`CallcostError::Clock`] if the clock cannot be read.
    fn now(&self) -> CallcostResult<Timestamp>;
}

/// `CLOCK_PROCESS_CPUTIME_ID` clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCpuClock;

impl ProcessCpuClock {
    /// Resolution reported by the kernel for this clock.
    ///
    /// # Errors
    ///
    /// Returns [`CallcostError::Clock`] if `clock_getres` fails.
    pub fn resolution(&self) -> CallcostResult<Duration> {
        let res = clock_getres(ClockId::CLOCK_PROCESS_CPUTIME_ID)
            .map_err(|e| CallcostError::Clock(format!("clock_getres failed: {e}")))?;
        Ok(Duration::new(
            u64::try_from(res.tv_sec()).unwrap_or(0),
            u32::try_from(res.tv_nsec()).unwrap_or(0),
        ))
    }
}

impl CpuClock for ProcessCpuClock {
    #[inline]
    #[allow(clippy::useless_conversion)] // time_t and c_long are i32 on some targets
    fn now(&self) -> CallcostResult<Timestamp> {
        let ts = clock_gettime(ClockId::CLOCK_PROCESS_CPUTIME_ID)
            .map_err(|e| CallcostError::Clock(format!("clock_gettime failed: {e}")))?;
        Ok(Timestamp::from_parts(
            i64::from(ts.tv_sec()),
            i64::from(ts.tv_nsec()),
        ))
    }
}

/// Brackets a measured region with two clock reads.
///
/// Holds no state between calls; every `start`/`stop` pair is independent.
#[derive(Debug, Clone, Default)]
pub struct Timer<C: CpuClock = ProcessCpuClock> {
    clock: C,
}

impl Timer<ProcessCpuClock> {
    /// Timer on the process CPU clock.
    #[must_use]
    pub fn process_cpu() -> Self {
        Self {
            clock: ProcessCpuClock,
        }
    }
}

impl<C: CpuClock> Timer<C> {
    /// Timer on a custom clock source.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Capture the start of a measured region.
    ///
    /// # Errors
    ///
    /// Returns [`CallcostError::Clock`] if the clock cannot be read.
    #[inline]
    pub fn start(&self) -> CallcostResult<Timestamp> {
        self.clock.now()
    }

    /// Capture the end of a measured region and compute the elapsed time.
    ///
    /// # Errors
    ///
    /// Returns [`CallcostError::Clock`] if the clock cannot be read, or
    /// [`CallcostError::NegativeElapsed`] if the clock went backwards.
    #[inline]
    pub fn stop(&self, start: Timestamp) -> CallcostResult<ElapsedDuration> {
        let end = self.clock.now()?;
        ElapsedDuration::between(start, end)
    }

    /// Underlying clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
