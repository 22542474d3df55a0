//! `empty-calls`: time a loop of empty function calls on the process CPU clock.

use anyhow::Result;
use callcost_cli::{
    empty_calls_config, init_logging, print_result, run_empty_calls, EmptyCallsArgs,
};
use clap::Parser;
use tracing::info;

fn main() -> Result<()> {
    let args = EmptyCallsArgs::parse();

    init_logging(&args.common.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting empty-calls");

    let config = empty_calls_config(&args)?;
    info!(
        iterations = config.empty_call.iterations,
        variant = ?config.empty_call.variant,
        "Configuration loaded"
    );

    let result = run_empty_calls(&config)?;
    print_result(&result, args.common.format)
}
