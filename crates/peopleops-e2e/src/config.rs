//! Runner configuration.
//!
//! Loaded from `peopleops.yaml` or `peopleops.json` (chosen by extension),
//! then overridden from the environment, then by CLI flags. Every field has
//! a default so partial files are valid.

use crate::driver::{DriverConfig, Viewport};
use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// PeopleOps platform default
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// OrangeHRM demo instance default
pub const DEFAULT_HRM_BASE_URL: &str = "https://opensource-demo.orangehrmlive.com/web/index.php";

/// Default session snapshot location
pub const DEFAULT_STORAGE_STATE: &str = "playwright/.auth/user.json";

/// Suite exercising the login form itself
pub const LOGIN_SUITE: &str = "login";

/// File names tried when no config path is given
pub const CONFIG_FILE_NAMES: [&str; 3] = ["peopleops.yaml", "peopleops.yml", "peopleops.json"];

/// When to keep a failure screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenshotMode {
    Off,
    On,
    #[default]
    OnlyOnFailure,
}

impl ScreenshotMode {
    #[must_use]
    pub const fn should_capture(self, failed: bool) -> bool {
        match self {
            Self::Off => false,
            Self::On => true,
            Self::OnlyOnFailure => failed,
        }
    }
}

/// When to record and keep an action trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraceMode {
    Off,
    On,
    #[default]
    OnFirstRetry,
    RetainOnFailure,
}

impl TraceMode {
    /// Whether attempt `retry` (0 = first run) records a trace
    #[must_use]
    pub const fn records(self, retry: u32) -> bool {
        match self {
            Self::Off => false,
            Self::On | Self::RetainOnFailure => true,
            Self::OnFirstRetry => retry == 1,
        }
    }

    /// Whether a recorded trace is written for an attempt with this outcome
    #[must_use]
    pub const fn keeps(self, failed: bool) -> bool {
        match self {
            Self::Off => false,
            Self::On | Self::OnFirstRetry => true,
            Self::RetainOnFailure => failed,
        }
    }
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReporterKind {
    List,
    #[default]
    Html,
    Junit,
    Json,
}

impl std::str::FromStr for ReporterKind {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "list" => Ok(Self::List),
            "html" => Ok(Self::Html),
            "junit" => Ok(Self::Junit),
            "json" => Ok(Self::Json),
            other => Err(E2eError::config(format!("unknown reporter '{other}'"))),
        }
    }
}

/// Login used by the auth setup scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "Admin".into(),
            password: "admin123".into(),
        }
    }
}

/// A named group of suites sharing dependencies and session handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    /// Glob patterns over suite names
    pub test_match: Vec<String>,
    pub test_ignore: Vec<String>,
    /// Projects that must finish cleanly first
    pub dependencies: Vec<String>,
    /// Load the session snapshot into every page
    pub use_storage_state: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            test_match: vec!["*".into()],
            test_ignore: Vec::new(),
            dependencies: Vec::new(),
            use_storage_state: false,
        }
    }
}

impl ProjectConfig {
    /// Auth bootstrap project
    #[must_use]
    pub fn setup() -> Self {
        Self {
            name: "setup".into(),
            test_match: vec!["*.setup".into()],
            ..Self::default()
        }
    }

    /// Main project, after `setup`, with the stored session
    #[must_use]
    pub fn chromium() -> Self {
        Self {
            name: "chromium".into(),
            test_ignore: vec!["*.setup".into(), LOGIN_SUITE.into()],
            dependencies: vec!["setup".into()],
            use_storage_state: true,
            ..Self::default()
        }
    }

    /// Login-form suite on pages without a session.
    ///
    /// OrangeHRM redirects an authenticated `/auth/login` to the dashboard,
    /// so the form is only reachable logged out.
    #[must_use]
    pub fn logged_out() -> Self {
        Self {
            name: "logged-out".into(),
            test_match: vec![LOGIN_SUITE.into()],
            ..Self::default()
        }
    }

    /// Whether `suite` belongs to this project
    #[must_use]
    pub fn matches(&self, suite: &str) -> bool {
        let hit = |patterns: &[String]| {
            patterns
                .iter()
                .any(|p| glob::Pattern::new(p).is_ok_and(|g| g.matches(suite)))
        };
        hit(&self.test_match) && !hit(&self.test_ignore)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub base_url: String,
    pub hrm_base_url: String,
    /// Per-attempt budget
    pub timeout_ms: u64,
    /// Auto-wait budget for actions and expectations
    pub expect_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    pub retries: u32,
    pub workers: usize,
    pub fully_parallel: bool,
    pub forbid_only: bool,
    pub reporter: ReporterKind,
    pub output_dir: PathBuf,
    pub screenshot: ScreenshotMode,
    pub trace: TraceMode,
    pub storage_state: PathBuf,
    pub headless: bool,
    pub viewport: Viewport,
    pub fail_on_page_errors: bool,
    pub credentials: Credentials,
    pub projects: Vec<ProjectConfig>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            hrm_base_url: DEFAULT_HRM_BASE_URL.into(),
            timeout_ms: 30_000,
            expect_timeout_ms: 5_000,
            navigation_timeout_ms: 30_000,
            retries: 0,
            workers: 1,
            fully_parallel: true,
            forbid_only: false,
            reporter: ReporterKind::Html,
            output_dir: PathBuf::from("test-results"),
            screenshot: ScreenshotMode::OnlyOnFailure,
            trace: TraceMode::OnFirstRetry,
            storage_state: PathBuf::from(DEFAULT_STORAGE_STATE),
            headless: true,
            viewport: Viewport::default(),
            fail_on_page_errors: false,
            credentials: Credentials::default(),
            projects: vec![
                ProjectConfig::setup(),
                ProjectConfig::chromium(),
                ProjectConfig::logged_out(),
            ],
        }
    }
}

fn truthy(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no" | "off")
}

impl RunnerConfig {
    /// Load from a YAML or JSON file, by extension
    pub fn load(path: &Path) -> E2eResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            E2eError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config = match ext.as_deref() {
            Some("yaml" | "yml") => serde_yaml_ng::from_str(&raw)?,
            Some("json") => serde_json::from_str(&raw)?,
            _ => {
                return Err(E2eError::config(format!(
                    "{}: expected a .yaml, .yml or .json file",
                    path.display()
                )))
            }
        };
        debug!(path = %path.display(), "loaded runner config");
        Ok(config)
    }

    /// First known config file in `dir`, if any
    #[must_use]
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// File (explicit, discovered in the working directory, or defaults)
    /// with process environment overrides applied
    pub fn resolve(path: Option<&Path>) -> E2eResult<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::discover(Path::new(".")),
        };
        let mut config = match file {
            Some(p) => Self::load(&p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// A truthy `CI` raises retries to at least 2 and forbids focused tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> E2eResult<()> {
        if lookup("CI").is_some_and(|v| truthy(&v)) {
            self.retries = self.retries.max(2);
            self.forbid_only = true;
        }
        if let Some(url) = lookup("BASE_URL") {
            self.base_url = url;
        }
        if let Some(url) = lookup("HRM_BASE_URL") {
            self.hrm_base_url = url;
        }
        if let Some(v) = lookup("HEADLESS") {
            self.headless = truthy(&v);
        }
        if let Some(user) = lookup("E2E_USERNAME") {
            self.credentials.username = user;
        }
        if let Some(pass) = lookup("E2E_PASSWORD") {
            self.credentials.password = pass;
        }
        if let Some(n) = lookup("E2E_WORKERS") {
            self.workers = n
                .trim()
                .parse()
                .map_err(|_| E2eError::config(format!("E2E_WORKERS must be a number, got '{n}'")))?;
        }
        Ok(())
    }

    /// Reject settings the runner cannot honor
    pub fn validate(&self) -> E2eResult<()> {
        if self.workers == 0 {
            return Err(E2eError::config("workers must be at least 1"));
        }
        for (name, value) in [
            ("timeout_ms", self.timeout_ms),
            ("expect_timeout_ms", self.expect_timeout_ms),
            ("navigation_timeout_ms", self.navigation_timeout_ms),
        ] {
            if value == 0 {
                return Err(E2eError::config(format!("{name} must be greater than zero")));
            }
        }
        self.project_order().map(|_| ())
    }

    /// Projects in dependency order.
    ///
    /// Fails on duplicate names, unknown dependencies and cycles.
    pub fn project_order(&self) -> E2eResult<Vec<&ProjectConfig>> {
        let mut seen = HashSet::new();
        for project in &self.projects {
            if !seen.insert(project.name.as_str()) {
                return Err(E2eError::config(format!("duplicate project '{}'", project.name)));
            }
        }
        for project in &self.projects {
            if let Some(missing) = project.dependencies.iter().find(|d| !seen.contains(d.as_str())) {
                return Err(E2eError::config(format!(
                    "project '{}' depends on unknown project '{missing}'",
                    project.name
                )));
            }
        }

        // Kahn's algorithm, stable in declaration order
        let mut pending: BTreeMap<usize, usize> = self
            .projects
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.dependencies.len()))
            .collect();
        let mut order = Vec::with_capacity(self.projects.len());
        loop {
            let Some(next) = pending.iter().find(|(_, deps)| **deps == 0).map(|(i, _)| *i) else {
                break;
            };
            pending.remove(&next);
            let done = &self.projects[next];
            for (&i, deps) in &mut pending {
                let waits = self.projects[i]
                    .dependencies
                    .iter()
                    .filter(|d| **d == done.name)
                    .count();
                *deps -= waits;
            }
            order.push(done);
        }
        if !pending.is_empty() {
            let names: Vec<_> = pending.keys().map(|&i| self.projects[i].name.as_str()).collect();
            return Err(E2eError::config(format!(
                "project dependency cycle among: {}",
                names.join(", ")
            )));
        }
        Ok(order)
    }

    #[must_use]
    pub fn project(&self, name: &str) -> Option<&ProjectConfig> {
        self.projects.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig::new()
            .headless(self.headless)
            .viewport(self.viewport.width, self.viewport.height)
    }

    pub fn to_yaml(&self) -> E2eResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn to_json(&self) -> E2eResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod default_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = RunnerConfig::default();
            assert_eq!(config.base_url, "http://localhost:3000");
            assert_eq!(config.expect_timeout_ms, 5000);
            assert_eq!(config.retries, 0);
            assert!(config.fully_parallel);
            assert_eq!(config.screenshot, ScreenshotMode::OnlyOnFailure);
            assert_eq!(config.trace, TraceMode::OnFirstRetry);
            assert_eq!(config.storage_state, PathBuf::from("playwright/.auth/user.json"));
            config.validate().unwrap();
        }

        #[test]
        fn test_default_projects() {
            let config = RunnerConfig::default();
            let setup = config.project("setup").unwrap();
            let chromium = config.project("chromium").unwrap();
            assert!(setup.matches("auth.setup"));
            assert!(!setup.matches("login"));
            assert!(chromium.matches("employee"));
            assert!(!chromium.matches("auth.setup"));
            assert!(chromium.use_storage_state);
            let order: Vec<_> = config.project_order().unwrap().iter().map(|p| p.name.as_str()).collect();
            assert_eq!(order, vec!["setup", "chromium", "logged-out"]);
        }

        #[test]
        fn test_login_form_runs_without_session() {
            let config = RunnerConfig::default();
            let chromium = config.project("chromium").unwrap();
            let logged_out = config.project("logged-out").unwrap();
            assert!(!chromium.matches(LOGIN_SUITE));
            assert!(logged_out.matches(LOGIN_SUITE));
            assert!(!logged_out.matches("employee"));
            assert!(!logged_out.use_storage_state);
            assert!(logged_out.dependencies.is_empty());
        }

        #[test]
        fn test_policies() {
            assert!(TraceMode::OnFirstRetry.records(1));
            assert!(!TraceMode::OnFirstRetry.records(0));
            assert!(!TraceMode::RetainOnFailure.keeps(false));
            assert!(ScreenshotMode::OnlyOnFailure.should_capture(true));
            assert!(!ScreenshotMode::Off.should_capture(true));
        }
    }

    mod env_tests {
        use super::*;

        #[test]
        fn test_ci_raises_retries_and_forbids_only() {
            let mut config = RunnerConfig::default();
            config.apply_env(env(&[("CI", "true")])).unwrap();
            assert_eq!(config.retries, 2);
            assert!(config.forbid_only);
        }

        #[test]
        fn test_ci_false_is_ignored() {
            let mut config = RunnerConfig::default();
            config.apply_env(env(&[("CI", "false")])).unwrap();
            assert_eq!(config.retries, 0);
            assert!(!config.forbid_only);
        }

        #[test]
        fn test_overrides() {
            let mut config = RunnerConfig::default();
            config
                .apply_env(
                    env(&[
                        ("BASE_URL", "http://staging:3000"),
                        ("HEADLESS", "false"),
                        ("E2E_USERNAME", "qa@peopleops.test"),
                        ("E2E_WORKERS", "4"),
                    ]),
                )
                .unwrap();
            assert_eq!(config.base_url, "http://staging:3000");
            assert!(!config.headless);
            assert_eq!(config.credentials.username, "qa@peopleops.test");
            assert_eq!(config.workers, 4);
        }

        #[test]
        fn test_bad_worker_count() {
            let mut config = RunnerConfig::default();
            let err = config.apply_env(env(&[("E2E_WORKERS", "many")])).unwrap_err();
            assert!(matches!(err, E2eError::ConfigError { .. }));
        }
    }

    mod validate_tests {
        use super::*;

        #[test]
        fn test_zero_workers() {
            let config = RunnerConfig {
                workers: 0,
                ..RunnerConfig::default()
            };
            assert!(config.validate().unwrap_err().to_string().contains("workers"));
        }

        #[test]
        fn test_zero_timeout() {
            let config = RunnerConfig {
                expect_timeout_ms: 0,
                ..RunnerConfig::default()
            };
            assert!(config.validate().unwrap_err().to_string().contains("expect_timeout_ms"));
        }

        #[test]
        fn test_unknown_dependency() {
            let mut config = RunnerConfig::default();
            config.projects[1].dependencies = vec!["auth".into()];
            assert!(config.validate().unwrap_err().to_string().contains("unknown project 'auth'"));
        }

        #[test]
        fn test_cycle() {
            let mut config = RunnerConfig::default();
            config.projects[0].dependencies = vec!["chromium".into()];
            let msg = config.validate().unwrap_err().to_string();
            assert!(msg.contains("cycle"));
            assert!(msg.contains("setup"));
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn test_load_partial_yaml() {
            let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
            writeln!(file, "workers: 3\nreporter: junit\ntrace: retain-on-failure").unwrap();
            let config = RunnerConfig::load(file.path()).unwrap();
            assert_eq!(config.workers, 3);
            assert_eq!(config.reporter, ReporterKind::Junit);
            assert_eq!(config.trace, TraceMode::RetainOnFailure);
            assert_eq!(config.timeout_ms, 30_000);
        }

        #[test]
        fn test_load_json() {
            let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
            write!(file, r#"{{"base_url": "http://x", "fail_on_page_errors": true}}"#).unwrap();
            let config = RunnerConfig::load(file.path()).unwrap();
            assert_eq!(config.base_url, "http://x");
            assert!(config.fail_on_page_errors);
        }

        #[test]
        fn test_unknown_extension() {
            let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
            let err = RunnerConfig::load(file.path()).unwrap_err();
            assert!(err.to_string().contains(".yaml"));
        }

        #[test]
        fn test_yaml_round_trip_keeps_projects() {
            let config = RunnerConfig::default();
            let back: RunnerConfig = serde_yaml_ng::from_str(&config.to_yaml().unwrap()).unwrap();
            assert_eq!(back, config);
        }

        #[test]
        fn test_discover() {
            let dir = tempfile::tempdir().unwrap();
            assert_eq!(RunnerConfig::discover(dir.path()), None);
            std::fs::write(dir.path().join("peopleops.json"), "{}").unwrap();
            assert_eq!(
                RunnerConfig::discover(dir.path()),
                Some(dir.path().join("peopleops.json"))
            );
        }

        #[test]
        fn test_reporter_from_str() {
            assert_eq!("JUnit".parse::<ReporterKind>().unwrap(), ReporterKind::Junit);
            assert!("tap".parse::<ReporterKind>().is_err());
        }
    }
}
