//! peopleops: browser end-to-end suite for PeopleOps and OrangeHRM
//!
//! ## Usage
//!
//! ```bash
//! peopleops test                       # Run every project
//! peopleops test employee --tag smoke  # Filter by id substring and tag
//! peopleops test --list                # Show the plan without a browser
//! peopleops setup                      # Refresh the stored session
//! peopleops config --format json       # Print the resolved configuration
//! peopleops data employee --count 3    # Print generated fixtures
//! ```
//!
//! Exit code 0 when every selected test passes (flaky counts as a pass),
//! 1 on test failures, 2 on usage or configuration errors.

use clap::Parser;
use peopleops_cli::{
    Cli, CliConfig, CliError, CliResult, Commands, ConfigArgs, ConfigFormat, DataArgs, DataKind,
    SetupArgs, TestArgs, TestRunner, Verbosity,
};
use peopleops_e2e::{logging, E2eError, RunnerConfig, Selection, TestDataGenerator};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(cli.color.into());
    logging::init(config.verbosity.log_level(), false);

    match run(cli.command, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(command: Commands, config: CliConfig) -> CliResult<ExitCode> {
    match command {
        Commands::Test(args) => run_tests(config, &args),
        Commands::Setup(args) => run_setup(config, &args),
        Commands::Config(args) => {
            print_config(&args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Data(args) => {
            print_data(&args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// File, discovery and environment, with load failures reported as config errors
fn load_config(path: Option<&Path>) -> CliResult<RunnerConfig> {
    let config = RunnerConfig::resolve(path).map_err(|e| CliError::config(e.to_string()))?;
    debug!(base_url = %config.base_url, hrm_base_url = %config.hrm_base_url, "configuration resolved");
    Ok(config)
}

fn run_tests(config: CliConfig, args: &TestArgs) -> CliResult<ExitCode> {
    let mut runner_config = load_config(args.config.as_deref())?;
    args.apply(&mut runner_config);
    runner_config.validate()?;
    let selection = args.selection()?;

    if args.list {
        let lines = TestRunner::list(&runner_config, selection)?;
        for line in &lines {
            println!("{line}");
        }
        println!("Total: {} tests", lines.len());
        return Ok(ExitCode::SUCCESS);
    }

    execute(config, runner_config, selection)
}

fn run_setup(config: CliConfig, args: &SetupArgs) -> CliResult<ExitCode> {
    let mut runner_config = load_config(args.config.as_deref())?;
    if args.headed {
        runner_config.headless = false;
    }
    execute(config, runner_config, Selection::new().project("setup"))
}

fn execute(config: CliConfig, runner_config: RunnerConfig, selection: Selection) -> CliResult<ExitCode> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let mut runner = TestRunner::new(config);
    let report = runtime.block_on(runner.run(runner_config, selection))?;
    TestRunner::ensure_passed(&report)?;
    Ok(ExitCode::SUCCESS)
}

fn print_config(args: &ConfigArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let rendered = match args.format {
        ConfigFormat::Yaml => config.to_yaml()?,
        ConfigFormat::Json => config.to_json()?,
    };
    println!("{rendered}");
    Ok(())
}

fn records<T: Serialize>(count: usize, mut next: impl FnMut() -> T) -> CliResult<Vec<serde_json::Value>> {
    (0..count)
        .map(|_| serde_json::to_value(next()).map_err(|e| CliError::from(E2eError::from(e))))
        .collect()
}

fn print_data(args: &DataArgs) -> CliResult<()> {
    let mut generator = match args.seed {
        Some(seed) => TestDataGenerator::seeded(seed),
        None => TestDataGenerator::new(),
    };
    let values = match args.kind {
        DataKind::Employee => records(args.count, || generator.employee_data())?,
        DataKind::Skill => generator
            .multiple_skills(args.count)?
            .into_iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()
            .map_err(E2eError::from)?,
        DataKind::Designation => records(args.count, || generator.designation_data())?,
        DataKind::Leave => records(args.count, || generator.leave_request())?,
        DataKind::Portfolio => records(args.count, || generator.portfolio_company_data())?,
    };
    let json = serde_json::to_string_pretty(&values).map_err(E2eError::from)?;
    println!("{json}");
    Ok(())
}
