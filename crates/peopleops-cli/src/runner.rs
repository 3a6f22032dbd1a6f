//! Test runner: plans and runs the registered scenarios

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use peopleops_e2e::browser::launch_factory;
use peopleops_e2e::runner::ProgressFn;
use peopleops_e2e::{
    scenarios, DriverFactory, MockDriver, MockDriverFactory, Registry, Reporter, RunPlan, Runner,
    RunnerConfig, Selection, TestResultEntry,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Runs scenarios for one CLI invocation
#[derive(Debug)]
pub struct TestRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl TestRunner {
    /// Create a new test runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// Console output
    #[must_use]
    pub const fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }

    /// Resolve what a run would execute, without launching a browser
    pub fn plan(runner_config: &RunnerConfig, selection: Selection) -> CliResult<(Registry, RunPlan)> {
        let registry = scenarios::registry()?;
        let factory: Arc<dyn DriverFactory> = Arc::new(MockDriverFactory::new(|_| MockDriver::new()));
        let plan = Runner::new(runner_config.clone(), factory)
            .with_selection(selection)
            .plan(&registry)?;
        Ok((registry, plan))
    }

    /// Planned test titles, one per line, prefixed with their project
    pub fn list(runner_config: &RunnerConfig, selection: Selection) -> CliResult<Vec<String>> {
        let (_, plan) = Self::plan(runner_config, selection)?;
        Ok(plan
            .projects
            .iter()
            .flat_map(|project| {
                project
                    .scenarios
                    .iter()
                    .map(move |s| format!("[{}] {}", project.config.name, s.full_title()))
            })
            .collect())
    }

    /// Failed tests become [`CliError::TestExecution`]; flaky tests pass
    pub fn ensure_passed(report: &Reporter) -> CliResult<()> {
        if report.all_passed() {
            return Ok(());
        }
        Err(CliError::test_execution(format!(
            "{} of {} tests failed",
            report.failed_count(),
            report.total_count()
        )))
    }

    /// Run the selection against Chromium and write the configured report
    pub async fn run(&mut self, runner_config: RunnerConfig, selection: Selection) -> CliResult<Reporter> {
        let start = Instant::now();
        let (registry, plan) = Self::plan(&runner_config, selection.clone())?;
        if plan.test_count() == 0 {
            self.reporter.warning("No tests match the selection");
            return Ok(Reporter::new());
        }
        self.reporter.header(&format!(
            "Running {} tests in {} project(s) with {} worker(s)",
            plan.test_count(),
            plan.projects.len(),
            runner_config.workers
        ));

        let factory = launch_factory(runner_config.driver_config()).await?;
        let bar = self
            .reporter
            .start_progress(plan.test_count() as u64, "running");
        let verbose = self.config.verbosity.is_verbose();
        let use_color = self.reporter.use_color;
        let progress: ProgressFn = Arc::new(move |entry: &TestResultEntry| {
            if let Some(bar) = &bar {
                bar.inc(1);
                bar.set_message(entry.title.clone());
                if entry.status.is_failed() || verbose {
                    bar.suspend(|| ProgressReporter::new(use_color, false).result(entry));
                }
            } else if entry.status.is_failed() {
                ProgressReporter::new(use_color, true).result(entry);
            }
        });

        let kind = runner_config.reporter;
        let output_dir = runner_config.output_dir.clone();
        let runner = Runner::new(runner_config, factory.clone())
            .with_selection(selection)
            .with_progress(progress);
        let outcome = runner.run(&registry).await;
        self.reporter.finish();
        if let Err(e) = factory.shutdown().await {
            warn!(error = %e, "browser shutdown failed");
        }
        let report = outcome?;

        let written = report
            .write(kind, &output_dir)
            .map_err(|e| CliError::report_generation(e.to_string()))?;
        if let Some(path) = written {
            self.reporter.info(&format!("Report written to {}", path.display()));
        }
        self.reporter.summary(&report);
        info!(elapsed_ms = start.elapsed().as_millis() as u64, "run finished");
        Ok(report)
    }
}
