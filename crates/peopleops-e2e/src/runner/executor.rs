//! Scenario execution.
//!
//! Projects run in dependency order. Inside a project, `workers` tokio tasks
//! drain a shared job queue; a job is one test when `fully_parallel` is set,
//! otherwise one suite whose tests run in declaration order. Each attempt
//! gets a fresh page and runs under the per-test timeout.

use super::context::TestContext;
use super::registry::{slug, Registry, Scenario, Selection};
use crate::config::{ProjectConfig, RunnerConfig};
use crate::data::ReferenceData;
use crate::driver::{DriverFactory, PageDriver, PageOptions};
use crate::listener::ErrorListener;
use crate::reporter::{Reporter, TestResultEntry, TestStatus};
use crate::result::{E2eError, E2eResult};
use crate::session::{SessionStore, StorageState};
use crate::trace::TracingDriver;
use futures::future::join_all;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Called once per finished test
pub type ProgressFn = Arc<dyn Fn(&TestResultEntry) + Send + Sync>;

/// `<output_dir>/<test-id>[-retryN]`
#[must_use]
pub fn artifact_dir(output_dir: &Path, test_id: &str, retry: u32) -> PathBuf {
    let mut name = slug(test_id);
    if retry > 0 {
        name.push_str(&format!("-retry{retry}"));
    }
    output_dir.join(name)
}

/// `scheme://host[:port]` of `url`
fn origin_of(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let host = rest.split(['/', '?', '#']).next()?;
    (!host.is_empty()).then(|| format!("{scheme}://{host}"))
}

/// One project and the scenarios it will run
#[derive(Debug, Clone)]
pub struct PlannedProject {
    /// Project settings as resolved from the configuration
    pub config: ProjectConfig,
    /// Scenarios in registration order
    pub scenarios: Vec<Scenario>,
}

/// What a run will execute, in order
#[derive(Debug, Clone, Default)]
pub struct RunPlan {
    /// Projects in dependency order
    pub projects: Vec<PlannedProject>,
}

impl RunPlan {
    /// Scenarios across every planned project
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.projects.iter().map(|p| p.scenarios.len()).sum()
    }
}

/// Schedules scenarios against pages from a [`DriverFactory`]
#[derive(Clone)]
pub struct Runner {
    config: Arc<RunnerConfig>,
    factory: Arc<dyn DriverFactory>,
    reference: Arc<ReferenceData>,
    selection: Selection,
    progress: Option<ProgressFn>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .field("factory", &self.factory)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Runner with default reference data, no selection and no progress callback
    #[must_use]
    pub fn new(config: RunnerConfig, factory: Arc<dyn DriverFactory>) -> Self {
        Self {
            config: Arc::new(config),
            factory,
            reference: Arc::default(),
            selection: Selection::default(),
            progress: None,
        }
    }

    /// Replace the reference data handed to every test
    #[must_use]
    pub fn with_reference(mut self, reference: ReferenceData) -> Self {
        self.reference = Arc::new(reference);
        self
    }

    /// Narrow the requested projects to matching scenarios
    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Call `progress` once for every finished test
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Configuration the run was built from
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Resolve projects, selection and focus into an ordered plan.
    ///
    /// Dependency projects always run in full; the selection and focus only
    /// narrow the projects that were asked for.
    pub fn plan(&self, registry: &Registry) -> E2eResult<RunPlan> {
        self.config.validate()?;
        let focused = registry.focused();
        if !focused.is_empty() {
            if self.config.forbid_only {
                return Err(E2eError::FocusedTestsForbidden { tests: focused });
            }
            warn!(tests = ?focused, "focused tests present, running only those");
        }

        let order = self.config.project_order()?;
        for name in &self.selection.projects {
            if self.config.project(name).is_none() {
                return Err(E2eError::config(format!("unknown project '{name}'")));
            }
        }

        // Requested projects plus everything they transitively need
        let mut wanted: HashSet<&str> = if self.selection.projects.is_empty() {
            order.iter().map(|p| p.name.as_str()).collect()
        } else {
            self.selection.projects.iter().map(String::as_str).collect()
        };
        let requested = wanted.clone();
        for project in order.iter().rev() {
            if wanted.contains(project.name.as_str()) {
                wanted.extend(project.dependencies.iter().map(String::as_str));
            }
        }
        let dependencies: HashSet<&str> = order
            .iter()
            .filter(|p| wanted.contains(p.name.as_str()))
            .flat_map(|p| p.dependencies.iter().map(String::as_str))
            .collect();

        let mut projects: Vec<PlannedProject> = Vec::new();
        for project in order.iter().filter(|p| wanted.contains(p.name.as_str())) {
            let narrowed = requested.contains(project.name.as_str())
                && !dependencies.contains(project.name.as_str());
            let scenarios: Vec<Scenario> = registry
                .scenarios()
                .iter()
                .filter(|s| project.matches(&s.suite))
                .filter(|s| {
                    !narrowed || (self.selection.matches(s) && (focused.is_empty() || s.only))
                })
                .cloned()
                .collect();
            projects.push(PlannedProject {
                config: (*project).clone(),
                scenarios,
            });
        }

        // Drop dependency projects nothing needs any more
        let mut needed: HashSet<String> = HashSet::new();
        for planned in projects.iter().rev() {
            let name = &planned.config.name;
            let runs = !planned.scenarios.is_empty()
                && (!dependencies.contains(name.as_str()) || needed.contains(name));
            if runs {
                needed.insert(name.clone());
                needed.extend(planned.config.dependencies.iter().cloned());
            }
        }
        projects.retain(|p| needed.contains(&p.config.name) && !p.scenarios.is_empty());
        Ok(RunPlan { projects })
    }

    /// Execute the plan for `registry` and collect results
    pub async fn run(&self, registry: &Registry) -> E2eResult<Reporter> {
        let plan = self.plan(registry)?;
        info!(
            projects = plan.projects.len(),
            tests = plan.test_count(),
            workers = self.config.workers,
            "starting run"
        );
        let mut reporter = Reporter::new();
        reporter.start();
        let mut failed_projects: HashSet<String> = HashSet::new();

        for project in plan.projects {
            let name = project.config.name.clone();
            let blocked = project
                .config
                .dependencies
                .iter()
                .find(|d| failed_projects.contains(*d))
                .cloned();
            let (results, failed) = match blocked {
                Some(dependency) => {
                    warn!(project = %name, %dependency, "dependency failed, skipping project");
                    let reason = format!("dependency project '{dependency}' failed");
                    let skipped: Vec<TestResultEntry> = project
                        .scenarios
                        .iter()
                        .map(|s| self.entry(s, &name).skipped(reason.clone()))
                        .collect();
                    skipped.iter().for_each(|entry| self.report(entry));
                    (skipped, true)
                }
                None => {
                    let results = self.run_project(&project).await?;
                    let failed = results.iter().any(|r| r.status.is_failed());
                    (results, failed)
                }
            };
            if failed {
                failed_projects.insert(name);
            }
            for result in results {
                reporter.record(result);
            }
        }

        info!(summary = %reporter.summary(), "run finished");
        Ok(reporter)
    }

    fn entry(&self, scenario: &Scenario, project: &str) -> TestResultEntry {
        TestResultEntry::new(&scenario.id, &scenario.title, &scenario.suite, project)
    }

    /// Forward one finished entry to the progress callback.
    ///
    /// Every entry is reported exactly once: executed tests by their worker,
    /// entries that never reach a worker where they are created.
    fn report(&self, result: &TestResultEntry) {
        if let Some(progress) = &self.progress {
            progress(result);
        }
    }

    async fn run_project(&self, project: &PlannedProject) -> E2eResult<Vec<TestResultEntry>> {
        let name = project.config.name.clone();
        info!(project = %name, tests = project.scenarios.len(), "running project");

        let storage = if project.config.use_storage_state {
            match SessionStore::new(&self.config.storage_state).load() {
                Ok(state) => Some(state),
                Err(err) => {
                    warn!(project = %name, error = %err, "session snapshot unavailable");
                    let failed: Vec<TestResultEntry> = project
                        .scenarios
                        .iter()
                        .map(|s| {
                            self.entry(s, &name)
                                .with_status(TestStatus::Failed)
                                .with_error(err.to_string())
                        })
                        .collect();
                    failed.iter().for_each(|entry| self.report(entry));
                    return Ok(failed);
                }
            }
        } else {
            None
        };

        let mut finished: Vec<(usize, TestResultEntry)> = Vec::new();
        let mut jobs: VecDeque<Vec<(usize, Scenario)>> = VecDeque::new();
        for (index, scenario) in project.scenarios.iter().enumerate() {
            if let Some(reason) = &scenario.skip {
                let entry = self.entry(scenario, &name).skipped(reason.clone());
                self.report(&entry);
                finished.push((index, entry));
                continue;
            }
            let job = (index, scenario.clone());
            if self.config.fully_parallel {
                jobs.push_back(vec![job]);
            } else {
                match jobs.iter_mut().find(|j| j[0].1.suite == scenario.suite) {
                    Some(existing) => existing.push(job),
                    None => jobs.push_back(vec![job]),
                }
            }
        }

        let workers = self.config.workers.min(jobs.len()).max(1);
        let run = Arc::new(ProjectRun {
            runner: self.clone(),
            project: name,
            options: self.page_options(storage),
            queue: Mutex::new(jobs),
            results: Mutex::new(Vec::new()),
        });
        let handles = (0..workers).map(|worker| {
            let run = Arc::clone(&run);
            tokio::spawn(async move { run.work(worker).await })
        });
        for joined in join_all(handles).await {
            joined.map_err(|e| E2eError::page(format!("worker stopped unexpectedly: {e}")))?;
        }

        finished.extend(run.results.lock().await.drain(..));
        finished.sort_by_key(|(index, _)| *index);
        Ok(finished.into_iter().map(|(_, entry)| entry).collect())
    }

    fn page_options(&self, storage_state: Option<StorageState>) -> PageOptions {
        let origins = [&self.config.base_url, &self.config.hrm_base_url]
            .iter()
            .filter_map(|url| origin_of(url))
            .collect();
        PageOptions {
            storage_state,
            viewport: self.config.viewport,
            origins,
        }
    }
}

struct ProjectRun {
    runner: Runner,
    project: String,
    options: PageOptions,
    queue: Mutex<VecDeque<Vec<(usize, Scenario)>>>,
    results: Mutex<Vec<(usize, TestResultEntry)>>,
}

impl ProjectRun {
    async fn work(&self, worker: usize) {
        loop {
            let job = self.queue.lock().await.pop_front();
            let Some(job) = job else { break };
            for (index, scenario) in job {
                let entry = self.run_test(&scenario, worker).await;
                self.runner.report(&entry);
                self.results.lock().await.push((index, entry));
            }
        }
        debug!(worker, project = %self.project, "worker drained queue");
    }

    async fn run_test(&self, scenario: &Scenario, worker: usize) -> TestResultEntry {
        let config = &self.runner.config;
        let started = Instant::now();
        let mut entry = self.runner.entry(scenario, &self.project);
        let mut first_error: Option<String> = None;
        let mut status = TestStatus::Failed;
        let mut attempts = 0;

        for retry in 0..=config.retries {
            attempts += 1;
            if retry > 0 {
                info!(test = %scenario.id, retry, "retrying");
            }
            let (outcome, artifacts) = self.run_attempt(scenario, worker, retry).await;
            entry.artifacts.extend(artifacts);
            match outcome {
                Ok(()) => {
                    status = if retry == 0 {
                        TestStatus::Passed
                    } else {
                        TestStatus::Flaky
                    };
                    break;
                }
                Err(err) => {
                    warn!(test = %scenario.id, retry, error = %err, "attempt failed");
                    entry.error = Some(err.to_string());
                    first_error.get_or_insert_with(|| err.to_string());
                }
            }
        }

        if status == TestStatus::Flaky {
            entry.error = first_error;
        }
        entry.with_status(status).with_duration(started.elapsed(), attempts)
    }

    async fn run_attempt(
        &self,
        scenario: &Scenario,
        worker: usize,
        retry: u32,
    ) -> (E2eResult<()>, Vec<PathBuf>) {
        let config = &self.runner.config;
        let page = match self.runner.factory.new_page(worker, &self.options).await {
            Ok(page) => page,
            Err(err) => return (Err(err), Vec::new()),
        };
        let tracer = config
            .trace
            .records(retry)
            .then(|| Arc::new(TracingDriver::new(Arc::clone(&page), &scenario.id, retry)));
        let driver: Arc<dyn PageDriver> = match &tracer {
            Some(tracer) => Arc::clone(tracer) as Arc<dyn PageDriver>,
            None => Arc::clone(&page),
        };
        let ctx = TestContext::new(
            Arc::clone(&driver),
            Arc::clone(config),
            Arc::clone(&self.runner.reference),
            &scenario.id,
        )
        .with_project(&self.project)
        .with_worker(worker, retry);

        debug!(test = %scenario.id, worker, retry, "attempt start");
        let outcome = self.execute(scenario, ctx, driver).await;
        let failed = outcome.is_err();

        let dir = artifact_dir(&config.output_dir, &scenario.id, retry);
        let mut artifacts = Vec::new();
        if config.screenshot.should_capture(failed) {
            let name = if failed { "test-failed.png" } else { "test-finished.png" };
            match write_screenshot(page.as_ref(), &dir.join(name)).await {
                Ok(path) => artifacts.push(path),
                Err(err) => warn!(test = %scenario.id, error = %err, "screenshot capture failed"),
            }
        }
        if let Some(tracer) = tracer.filter(|_| config.trace.keeps(failed)) {
            let path = dir.join("trace.json");
            match tracer.trace().save_json(&path) {
                Ok(()) => artifacts.push(path),
                Err(err) => warn!(test = %scenario.id, error = %err, "trace write failed"),
            }
        }
        if let Err(err) = page.close().await {
            debug!(test = %scenario.id, error = %err, "page close failed");
        }
        (outcome, artifacts)
    }

    async fn execute(
        &self,
        scenario: &Scenario,
        ctx: TestContext,
        driver: Arc<dyn PageDriver>,
    ) -> E2eResult<()> {
        let config = &self.runner.config;
        let listener = if config.fail_on_page_errors {
            Some(ErrorListener::attach(driver).await?)
        } else {
            None
        };
        let limit = Duration::from_millis(config.timeout_ms);
        match tokio::time::timeout(limit, scenario.run(ctx)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(E2eError::Timeout {
                    what: format!("test {}", scenario.id),
                    ms: config.timeout_ms,
                })
            }
        }
        if let Some(listener) = listener {
            listener.assert_clean().await?;
        }
        Ok(())
    }
}

async fn write_screenshot(page: &dyn PageDriver, path: &Path) -> E2eResult<PathBuf> {
    let png = page.screenshot(true).await?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, png)?;
    Ok(path.to_path_buf())
}
