//! Common utilities for integration tests.
//!
//! Provides helpers for:
//! - Reading the process CPU-time clock without going through the crate
//! - Burning a known amount of CPU
//! - Checking and printing benchmark results

#![allow(dead_code)]

use callcost_common::report::BenchmarkResult;
use std::hint::black_box;
use std::time::Duration;

/// Read `CLOCK_PROCESS_CPUTIME_ID` directly through libc, in nanoseconds.
pub fn raw_process_cpu_ns() -> i128 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
    assert_eq!(rc, 0, "clock_gettime failed: {}", std::io::Error::last_os_error());
    i128::from(ts.tv_sec) * 1_000_000_000 + i128::from(ts.tv_nsec)
}

/// Spin on the CPU until at least `cpu` of process CPU time has been consumed.
pub fn burn_cpu(cpu: Duration) {
    let target = raw_process_cpu_ns() + i128::try_from(cpu.as_nanos()).unwrap();
    let mut acc = 0u64;
    while raw_process_cpu_ns() < target {
        for i in 0..1_000u64 {
            acc = black_box(acc.wrapping_mul(31).wrapping_add(i));
        }
    }
    black_box(acc);
}

/// Bounds a benchmark result must satisfy.
#[derive(Debug, Clone)]
pub struct AcceptanceCriteria {
    /// Expected benchmark name.
    pub name: &'static str,
    /// Expected iteration count.
    pub iterations: u64,
    /// Upper bound on the average cost per operation.
    pub max_avg_ns: f64,
}

impl AcceptanceCriteria {
    /// Check a result against the criteria.
    pub fn check(&self, result: &BenchmarkResult) -> bool {
        result.name == self.name
            && result.iterations == self.iterations
            && result.elapsed_ns >= 0
            && result.average_ns_per_op >= 0.0
            && result.average_ns_per_op <= self.max_avg_ns
    }
}

/// Print a result the way the binaries do, for `--nocapture` runs.
pub fn print_result(result: &BenchmarkResult) {
    println!("  {result}");
    println!(
        "  elapsed: {:?}",
        Duration::from_nanos(u64::try_from(result.elapsed_ns).unwrap_or(0))
    );
}
