//! Process CPU-time timer acceptance tests.
//!
//! # Acceptance Criteria
//!
//! - Readings are bracketed by direct `clock_gettime` reads
//! - Elapsed time covers CPU work done in the timed region
//! - Readings never go backwards

use super::common::{burn_cpu, raw_process_cpu_ns};
use callcost_common::time::{CpuClock, ProcessCpuClock, Timer};
use std::time::Duration;

#[test]
fn test_timer_agrees_with_clock_gettime() {
    let timer = Timer::process_cpu();

    let before = raw_process_cpu_ns();
    let start = timer.start().expect("start failed");
    burn_cpu(Duration::from_millis(20));
    let elapsed = timer.stop(start).expect("stop failed");
    let after = raw_process_cpu_ns();

    assert!(before <= elapsed.start().as_nanos());
    assert!(elapsed.end().as_nanos() <= after);
    assert!(i128::from(elapsed.as_nanos()) <= after - before);
}

#[test]
fn test_elapsed_covers_cpu_work() {
    let timer = Timer::process_cpu();
    let start = timer.start().unwrap();
    burn_cpu(Duration::from_millis(50));
    let elapsed = timer.stop(start).unwrap();

    println!("Burned 50ms of CPU, timer saw {:?}", elapsed.as_duration());
    assert!(elapsed.as_duration() >= Duration::from_millis(50));
}

#[test]
fn test_readings_are_monotonic() {
    let clock = ProcessCpuClock;
    let mut previous = clock.now().unwrap();
    for _ in 0..100_000 {
        let now = clock.now().unwrap();
        assert!(now >= previous, "clock went backwards: {previous} -> {now}");
        assert!((0..1_000_000_000).contains(&now.subsec_nanos()));
        previous = now;
    }
}

#[test]
fn test_clock_resolution_is_fine_grained() {
    let resolution = ProcessCpuClock.resolution().unwrap();
    println!("Process CPU clock resolution: {resolution:?}");
    assert!(resolution > Duration::ZERO);
    assert!(resolution <= Duration::from_millis(1));
}
