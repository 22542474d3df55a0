//! Empty-call workload.
//!
//! Measures bare call/return overhead. The callee is `#[inline(never)]` and
//! the loop calls it through a function pointer laundered by
//! [`std::hint::black_box`], so the optimizer can neither inline nor drop
//! any of the calls.

use crate::workload::Workload;
use callcost_common::config::{EmptyCallConfig, EmptyCallVariant};
use callcost_common::error::CallcostResult;
use std::hint::black_box;

/// Result-line name for the `extern "C"` variant.
pub const EMPTY_C_CALLS: &str = "BenchmarkEmptyCCalls";

/// Result-line name for the Rust-ABI variant.
pub const EMPTY_RUST_CALLS: &str = "BenchmarkEmptyRustCalls";

/// No-op with the C calling convention.
#[inline(never)]
pub extern "C" fn empty_c() {}

/// No-op with the Rust calling convention.
#[inline(never)]
pub fn empty_rust() {}

#[derive(Debug, Clone, Copy)]
enum Callee {
    C(extern "C" fn()),
    Rust(fn()),
}

/// Calls a no-op function once per iteration.
#[derive(Debug, Clone)]
pub struct EmptyCallWorkload {
    name: &'static str,
    callee: Callee,
}

impl EmptyCallWorkload {
    /// Workload for one of the built-in no-op callees.
    #[must_use]
    pub fn new(variant: EmptyCallVariant) -> Self {
        match variant {
            EmptyCallVariant::C => Self::with_c_callee(EMPTY_C_CALLS, empty_c),
            EmptyCallVariant::Rust => Self::with_rust_callee(EMPTY_RUST_CALLS, empty_rust),
        }
    }

    /// Workload for the variant selected in `config`.
    #[must_use]
    pub fn from_config(config: &EmptyCallConfig) -> Self {
        Self::new(config.variant)
    }

    /// Workload calling an arbitrary `extern "C"` function.
    #[must_use]
    pub fn with_c_callee(name: &'static str, callee: extern "C" fn()) -> Self {
        Self {
            name,
            callee: Callee::C(callee),
        }
    }

    /// Workload calling an arbitrary Rust function.
    #[must_use]
    pub fn with_rust_callee(name: &'static str, callee: fn()) -> Self {
        Self {
            name,
            callee: Callee::Rust(callee),
        }
    }
}

impl Workload for EmptyCallWorkload {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&mut self, iterations: u64) -> CallcostResult<()> {
        match self.callee {
            Callee::C(f) => {
                let f = black_box(f);
                for _ in 0..iterations {
                    f();
                }
            }
            Callee::Rust(f) => {
                let f = black_box(f);
                for _ in 0..iterations {
                    f();
                }
            }
        }
        Ok(())
    }
}
