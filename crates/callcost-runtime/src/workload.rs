//! Timed benchmark harness.
//!
//! A [`Workload`] owns its iteration loop; the harness only brackets that
//! loop with two process CPU clock reads. Setup happens before the workload
//! is handed to the harness and is never part of the measured region.

use callcost_common::error::{CallcostError, CallcostResult};
use callcost_common::report::BenchmarkResult;
use callcost_common::time::{CpuClock, Timer};
use tracing::{debug, error, info};

/// An operation under test, repeated a fixed number of times.
pub trait Workload {
    /// Name reported on the result line.
    fn name(&self) -> &'static str;

    /// Execute the operation exactly `iterations` times.
    ///
    /// Called inside the timed region. Must not log or allocate per
    /// iteration on the success path.
    ///
    /// # Errors
    ///
    /// Returns the first failure; remaining iterations are not executed.
    fn run(&mut self, iterations: u64) -> CallcostResult<()>;
}

impl<W: Workload + ?Sized> Workload for Box<W> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn run(&mut self, iterations: u64) -> CallcostResult<()> {
        (**self).run(iterations)
    }
}

/// Time `iterations` runs of `workload` on `timer`.
///
/// # Errors
///
/// Returns [`CallcostError::ZeroIterations`] before touching the clock if
/// `iterations` is zero, otherwise any clock or workload failure. No partial
/// result is produced on failure.
pub fn run_benchmark<W, C>(
    workload: &mut W,
    iterations: u64,
    timer: &Timer<C>,
) -> CallcostResult<BenchmarkResult>
where
    W: Workload + ?Sized,
    C: CpuClock,
{
    let name = workload.name();
    if iterations == 0 {
        return Err(CallcostError::ZeroIterations);
    }

    info!(benchmark = name, iterations, "Starting benchmark");

    let start = timer.start()?;
    if let Err(e) = workload.run(iterations) {
        error!(benchmark = name, error = %e, "Workload failed");
        return Err(e);
    }
    let elapsed = timer.stop(start)?;

    debug!(
        benchmark = name,
        start = %elapsed.start(),
        end = %elapsed.end(),
        elapsed_ns = elapsed.as_nanos(),
        "Timed region closed"
    );

    let result = BenchmarkResult::new(name, iterations, &elapsed)?;
    info!(
        benchmark = name,
        iterations,
        avg_ns = result.average_ns_per_op,
        "Benchmark complete"
    );
    Ok(result)
}
