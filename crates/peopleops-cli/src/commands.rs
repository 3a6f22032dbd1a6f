//! CLI command definitions using clap

use crate::config::ColorChoice;
use crate::error::{CliError, CliResult};
use clap::{Parser, Subcommand, ValueEnum};
use peopleops_e2e::{ReporterKind, RunnerConfig, Selection};
use std::path::PathBuf;

/// peopleops: browser end-to-end suite for PeopleOps and OrangeHRM
#[derive(Parser, Debug)]
#[command(name = "peopleops")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run tests
    Test(TestArgs),

    /// Log in once and store the session for later runs
    Setup(SetupArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),

    /// Print generated test data
    Data(DataArgs),
}

/// Arguments for the test command
#[derive(Parser, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct TestArgs {
    /// Substrings of test ids to run
    pub filters: Vec<String>,

    /// Only run tests whose full title matches this regex
    #[arg(short, long)]
    pub grep: Option<String>,

    /// Only run tests with this tag (repeatable)
    #[arg(long)]
    pub tag: Vec<String>,

    /// Only run this project and its dependencies (repeatable)
    #[arg(long)]
    pub project: Vec<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Retries per failed test
    #[arg(long)]
    pub retries: Option<u32>,

    /// Per-test timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long)]
    pub reporter: Option<ReporterArg>,

    /// Output directory for reports and artifacts
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail if any test is focused
    #[arg(long)]
    pub forbid_only: bool,

    /// List the planned tests without running them
    #[arg(long)]
    pub list: bool,

    /// PeopleOps base URL
    #[arg(long)]
    pub base_url: Option<String>,
}

impl TestArgs {
    /// Layer the command-line overrides on top of `config`
    pub fn apply(&self, config: &mut RunnerConfig) {
        if self.headed {
            config.headless = false;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_ms = timeout;
        }
        if let Some(reporter) = self.reporter {
            config.reporter = reporter.into();
        }
        if let Some(output) = &self.output {
            config.output_dir.clone_from(output);
        }
        if self.forbid_only {
            config.forbid_only = true;
        }
        if let Some(url) = &self.base_url {
            config.base_url.clone_from(url);
        }
    }

    /// Scenario selection from filters, grep, tags and projects
    pub fn selection(&self) -> CliResult<Selection> {
        let mut selection = Selection::new();
        for filter in &self.filters {
            selection = selection.filter(filter.as_str());
        }
        if let Some(pattern) = &self.grep {
            selection = selection
                .grep(pattern)
                .map_err(|e| CliError::invalid_argument(e.to_string()))?;
        }
        for tag in &self.tag {
            selection = selection.tag(tag.as_str());
        }
        for project in &self.project {
            selection = selection.project(project.as_str());
        }
        Ok(selection)
    }
}

/// Arguments for the setup command
#[derive(Parser, Debug)]
pub struct SetupArgs {
    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Configuration output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML
    #[default]
    Yaml,
    /// JSON
    Json,
}

/// Arguments for the data command
#[derive(Parser, Debug)]
pub struct DataArgs {
    /// Kind of record to generate
    pub kind: DataKind,

    /// Number of records
    #[arg(long, default_value = "1")]
    pub count: usize,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Generated record kinds
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataKind {
    /// Employee master data
    Employee,
    /// Employee skill
    Skill,
    /// Designation
    Designation,
    /// Leave request
    Leave,
    /// Portfolio company
    Portfolio,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReporterArg {
    /// Console list only
    List,
    /// Self-contained HTML page
    Html,
    /// `JUnit` XML
    Junit,
    /// JSON
    Json,
}

impl From<ReporterArg> for ReporterKind {
    fn from(arg: ReporterArg) -> Self {
        match arg {
            ReporterArg::List => Self::List,
            ReporterArg::Html => Self::Html,
            ReporterArg::Junit => Self::Junit,
            ReporterArg::Json => Self::Json,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_test_command() {
            let cli = Cli::parse_from([
                "peopleops", "-vv", "test", "employee", "--tag", "smoke", "-j", "4", "--retries",
                "1", "--reporter", "junit",
            ]);
            assert_eq!(cli.verbose, 2);
            let Commands::Test(args) = cli.command else {
                panic!("expected test command");
            };
            assert_eq!(args.filters, vec!["employee"]);
            assert_eq!(args.tag, vec!["smoke"]);
            assert_eq!(args.workers, Some(4));
            assert_eq!(args.reporter, Some(ReporterArg::Junit));
        }

        #[test]
        fn test_parse_data_command() {
            let cli = Cli::parse_from(["peopleops", "data", "skill", "--count", "3", "--seed", "9"]);
            let Commands::Data(args) = cli.command else {
                panic!("expected data command");
            };
            assert_eq!(args.kind, DataKind::Skill);
            assert_eq!(args.count, 3);
            assert_eq!(args.seed, Some(9));
        }

        #[test]
        fn test_unknown_reporter_rejected() {
            let result = Cli::try_parse_from(["peopleops", "test", "--reporter", "tap"]);
            assert!(result.is_err());
        }
    }

    mod override_tests {
        use super::*;

        #[test]
        fn test_apply_overrides() {
            let args = TestArgs {
                headed: true,
                workers: Some(2),
                timeout: Some(1000),
                reporter: Some(ReporterArg::Json),
                forbid_only: true,
                base_url: Some("http://staging:3000".into()),
                ..TestArgs::default()
            };
            let mut config = RunnerConfig::default();
            args.apply(&mut config);
            assert!(!config.headless);
            assert_eq!(config.workers, 2);
            assert_eq!(config.timeout_ms, 1000);
            assert_eq!(config.reporter, ReporterKind::Json);
            assert!(config.forbid_only);
            assert_eq!(config.base_url, "http://staging:3000");
        }

        #[test]
        fn test_apply_keeps_unset_values() {
            let mut config = RunnerConfig::default();
            let before = config.retries;
            TestArgs::default().apply(&mut config);
            assert_eq!(config.retries, before);
            assert!(config.headless);
        }

        #[test]
        fn test_invalid_grep_is_an_argument_error() {
            let args = TestArgs {
                grep: Some("(".into()),
                ..TestArgs::default()
            };
            let err = args.selection().unwrap_err();
            assert_eq!(err.exit_code(), 2);
        }

        #[test]
        fn test_selection_collects_tags() {
            let args = TestArgs {
                tag: vec!["@smoke".into()],
                project: vec!["chromium".into()],
                ..TestArgs::default()
            };
            let selection = args.selection().unwrap();
            assert_eq!(selection.tags, vec!["smoke"]);
            assert_eq!(selection.projects, vec!["chromium"]);
        }
    }
}
