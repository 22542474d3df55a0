//! Socket pair read/write benchmark acceptance tests.
//!
//! # Acceptance Criteria
//!
//! - Every iteration writes the whole payload and reads it back intact
//! - A closed receiver fails the run with a write error, never a result
//! - The reference configuration runs end to end

use super::common::{print_result, AcceptanceCriteria};
use callcost_common::config::{
    ReadWriteConfig, ReadWriteVariant, DEFAULT_PAYLOAD, DEFAULT_READ_WRITE_ITERATIONS,
};
use callcost_common::error::CallcostError;
use callcost_common::time::Timer;
use callcost_runtime::endpoint::{RawEndpoint, SocketPair};
use callcost_runtime::read_write::{
    open_read_write_workload, ReadWriteWorkloadBuilder, READ_WRITE_PURE_C_CALLS,
    READ_WRITE_STD_CALLS,
};
use callcost_runtime::workload::run_benchmark;
use std::os::unix::net::UnixStream;

#[test]
fn test_round_trip_ten_iterations() {
    let channel = SocketPair::open_raw().expect("socketpair failed");
    let mut workload = ReadWriteWorkloadBuilder::new(READ_WRITE_PURE_C_CALLS)
        .read_to_completion(true)
        .build(channel)
        .unwrap();

    let result = run_benchmark(&mut workload, 10, &Timer::process_cpu()).unwrap();
    print_result(&result);

    assert_eq!(result.iterations, 10);
    assert_eq!(workload.bytes_read(), 10 * DEFAULT_PAYLOAD.len() as u64);
    assert_eq!(workload.last_read(), DEFAULT_PAYLOAD.as_bytes());
    assert_eq!(workload.read_errors(), 0);
}

#[test]
fn test_std_variant_from_config() {
    let config = ReadWriteConfig {
        iterations: 10_000,
        variant: ReadWriteVariant::Std,
        ..ReadWriteConfig::default()
    };
    let mut workload = open_read_write_workload(&config).unwrap();
    let result = run_benchmark(&mut workload, config.iterations, &Timer::process_cpu()).unwrap();

    let criteria = AcceptanceCriteria {
        name: READ_WRITE_STD_CALLS,
        iterations: 10_000,
        max_avg_ns: 1_000_000.0,
    };
    assert!(criteria.check(&result), "unexpected result: {result:?}");
    assert!(result.elapsed_ns > 0);
}

#[test]
fn test_closed_receiver_fails_run() {
    let SocketPair { sender, receiver } = SocketPair::open_raw().unwrap();
    drop(receiver);

    // Any readable descriptor will do for the receiving side; the write fails first.
    let (_spare_writer, spare_reader) = UnixStream::pair().unwrap();
    let channel = SocketPair {
        sender,
        receiver: RawEndpoint::new(spare_reader.into()),
    };
    let mut workload = ReadWriteWorkloadBuilder::new(READ_WRITE_PURE_C_CALLS)
        .build(channel)
        .unwrap();

    let err = run_benchmark(&mut workload, 10, &Timer::process_cpu()).unwrap_err();
    match err {
        CallcostError::WriteFailure { iteration, reason } => {
            assert_eq!(iteration, 0);
            assert!(!reason.is_empty());
        }
        other => panic!("expected WriteFailure, got {other:?}"),
    }
    assert_eq!(workload.bytes_read(), 0);
}

#[test]
fn test_zero_iterations_rejected() {
    let mut workload = open_read_write_workload(&ReadWriteConfig::default()).unwrap();
    let err = run_benchmark(&mut workload, 0, &Timer::process_cpu()).unwrap_err();
    assert_eq!(err, CallcostError::ZeroIterations);
}

/// Full reference run: 500,000 round trips on the raw variant.
#[test]
#[ignore = "Reference-size run, use --release"]
fn test_pure_c_calls_reference() {
    let mut workload = open_read_write_workload(&ReadWriteConfig::default()).unwrap();
    let result = run_benchmark(
        &mut workload,
        DEFAULT_READ_WRITE_ITERATIONS,
        &Timer::process_cpu(),
    )
    .unwrap();
    print_result(&result);

    let criteria = AcceptanceCriteria {
        name: READ_WRITE_PURE_C_CALLS,
        iterations: DEFAULT_READ_WRITE_ITERATIONS,
        max_avg_ns: 100_000.0,
    };
    assert!(criteria.check(&result), "unexpected result: {result:?}");
}
