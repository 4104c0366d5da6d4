//! Command-line interface for mail-forge.
//!
//! Provides the generate, benchmark and evaluate commands.

mod commands;

pub use commands::{parse_cli, parse_dataset_spec, run, run_with_cli, Cli, Commands, DatasetSpec};
