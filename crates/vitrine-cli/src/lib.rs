//! Vitrine CLI library
//!
//! Command-line front end for the Vitrine storefront scenario catalog:
//! argument parsing, console output and the run loop behind `vitrine test`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ConfigFormat, ListArgs, OverrideArgs, SelectArgs,
    TestArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult, EXIT_ERROR, EXIT_PASSED, EXIT_TESTS_FAILED};
pub use output::ProgressReporter;
pub use runner::TestRunner;
