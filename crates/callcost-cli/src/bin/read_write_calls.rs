//! `read-write-calls`: time write/read round trips over a local socket pair.

use anyhow::Result;
use callcost_cli::{
    init_logging, print_result, read_write_calls_config, run_read_write_calls, ReadWriteCallsArgs,
};
use clap::Parser;
use tracing::info;

fn main() -> Result<()> {
    let args = ReadWriteCallsArgs::parse();

    init_logging(&args.common.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting read-write-calls");

    let config = read_write_calls_config(&args)?;
    info!(
        iterations = config.read_write.iterations,
        variant = ?config.read_write.variant,
        payload_len = config.read_write.payload.len(),
        "Configuration loaded"
    );

    let result = run_read_write_calls(&config)?;
    print_result(&result, args.common.format)
}
