//! Empty-call benchmark acceptance tests.
//!
//! # Acceptance Criteria
//!
//! - Result carries the requested iteration count and the variant's name
//! - Average cost per call stays within a loose sanity bound
//! - Zero iterations is rejected before any measurement

use super::common::{print_result, AcceptanceCriteria};
use callcost_common::config::{EmptyCallVariant, DEFAULT_EMPTY_CALL_ITERATIONS};
use callcost_common::error::CallcostError;
use callcost_common::time::Timer;
use callcost_runtime::empty_call::{EmptyCallWorkload, EMPTY_C_CALLS, EMPTY_RUST_CALLS};
use callcost_runtime::workload::run_benchmark;

#[test]
fn test_empty_c_calls_small() {
    let mut workload = EmptyCallWorkload::new(EmptyCallVariant::C);
    let result = run_benchmark(&mut workload, 1_000_000, &Timer::process_cpu())
        .expect("benchmark failed");
    print_result(&result);

    let criteria = AcceptanceCriteria {
        name: EMPTY_C_CALLS,
        iterations: 1_000_000,
        max_avg_ns: 1_000.0,
    };
    assert!(criteria.check(&result), "unexpected result: {result:?}");
}

#[test]
fn test_empty_rust_calls_small() {
    let mut workload = EmptyCallWorkload::new(EmptyCallVariant::Rust);
    let result = run_benchmark(&mut workload, 1_000_000, &Timer::process_cpu()).unwrap();

    let criteria = AcceptanceCriteria {
        name: EMPTY_RUST_CALLS,
        iterations: 1_000_000,
        max_avg_ns: 1_000.0,
    };
    assert!(criteria.check(&result), "unexpected result: {result:?}");
}

#[test]
fn test_single_iteration() {
    let mut workload = EmptyCallWorkload::new(EmptyCallVariant::C);
    let result = run_benchmark(&mut workload, 1, &Timer::process_cpu()).unwrap();
    assert_eq!(result.iterations, 1);
    #[allow(clippy::cast_precision_loss)]
    let elapsed = result.elapsed_ns as f64;
    assert!((result.average_ns_per_op - elapsed).abs() < f64::EPSILON);
}

#[test]
fn test_zero_iterations_rejected() {
    let mut workload = EmptyCallWorkload::new(EmptyCallVariant::C);
    let err = run_benchmark(&mut workload, 0, &Timer::process_cpu()).unwrap_err();
    assert_eq!(err, CallcostError::ZeroIterations);
}

/// Full reference run: one billion calls.
#[test]
#[ignore = "Reference-size run, use --release"]
fn test_empty_c_calls_reference() {
    let mut workload = EmptyCallWorkload::new(EmptyCallVariant::C);
    let result = run_benchmark(
        &mut workload,
        DEFAULT_EMPTY_CALL_ITERATIONS,
        &Timer::process_cpu(),
    )
    .unwrap();
    print_result(&result);

    let criteria = AcceptanceCriteria {
        name: EMPTY_C_CALLS,
        iterations: DEFAULT_EMPTY_CALL_ITERATIONS,
        max_avg_ns: 50.0,
    };
    assert!(criteria.check(&result), "unexpected result: {result:?}");
    assert!(result.elapsed_ns > 0);
}
