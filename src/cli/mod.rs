//! Command-line interface for seedwatch.

mod commands;
mod helpers;

pub use commands::{is_verbose, run};
