//! Integration tests for callcost acceptance testing.
//!
//! - Timer accuracy and monotonicity
//! - Empty-call workload
//! - Socket pair read/write workload

mod common;
mod empty_call_test;
mod read_write_test;
mod timer_test;
