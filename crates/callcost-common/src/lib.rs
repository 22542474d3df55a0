#![doc = "Common types shared across the callcost workspace."]

pub mod config;
pub mod error;
pub mod report;
pub mod time;

pub use config::*;
pub use error::*;
pub use report::*;
pub use time::*;
