#![doc = "Benchmark harness and call-overhead workloads."]

pub mod empty_call;
pub mod endpoint;
pub mod read_write;
pub mod workload;

pub use empty_call::*;
pub use endpoint::*;
pub use read_write::*;
pub use workload::*;
