//! peopleops CLI library
//!
//! Command-line front end for the PeopleOps end-to-end suite: argument
//! parsing, console output and the bridge to the scenario runner.

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ConfigFormat, DataArgs, DataKind, ReporterArg, SetupArgs,
    TestArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use runner::TestRunner;
