//! Run reporting.
//!
//! The runner records one [`TestResultEntry`] per test. [`Reporter`] turns
//! them into a console list, a self-contained HTML page, JUnit XML for CI,
//! or JSON.

use crate::config::ReporterKind;
use crate::result::E2eResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Final status of a test after all attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    /// Failed at least once, then passed on retry
    Flaky,
    Skipped,
}

impl TestStatus {
    /// Passed or flaky
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed | Self::Flaky)
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Passed => "✓",
            Self::Failed => "✘",
            Self::Flaky => "±",
            Self::Skipped => "-",
        }
    }

    const fn css_class(self) -> &'static str {
        match self {
            Self::Passed => "pass",
            Self::Failed => "fail",
            Self::Flaky => "flaky",
            Self::Skipped => "skip",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Flaky => "flaky",
            Self::Skipped => "skipped",
        };
        write!(f, "{name}")
    }
}

/// Outcome of one test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResultEntry {
    /// `suite::slug`
    pub id: String,
    pub title: String,
    pub suite: String,
    pub project: String,
    pub status: TestStatus,
    /// Wall time over all attempts
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    /// Attempts made, zero when skipped
    pub attempts: u32,
    /// Last error, for failed and flaky tests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Screenshots and traces written for this test
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<PathBuf>,
    pub finished_at: DateTime<Utc>,
}

impl TestResultEntry {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        suite: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            suite: suite.into(),
            project: project.into(),
            status: TestStatus::Passed,
            duration: Duration::ZERO,
            attempts: 0,
            error: None,
            artifacts: Vec::new(),
            finished_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: TestStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn with_duration(mut self, duration: Duration, attempts: u32) -> Self {
        self.duration = duration;
        self.attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Skipped with a reason
    #[must_use]
    pub fn skipped(mut self, reason: impl Into<String>) -> Self {
        self.status = TestStatus::Skipped;
        self.error = Some(reason.into());
        self
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    name: &'a str,
    started_at: Option<DateTime<Utc>>,
    stats: Stats,
    results: &'a [TestResultEntry],
}

#[derive(Debug, Clone, Copy, Serialize)]
struct Stats {
    total: usize,
    passed: usize,
    failed: usize,
    flaky: usize,
    skipped: usize,
    duration_ms: u64,
}

/// Collects results and renders reports
#[derive(Debug, Default)]
pub struct Reporter {
    results: Vec<TestResultEntry>,
    suite_name: String,
    start_time: Option<DateTime<Utc>>,
}

impl Reporter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            suite_name: "PeopleOps E2E".to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    pub fn start(&mut self) {
        self.start_time = Some(Utc::now());
    }

    pub fn record(&mut self, result: TestResultEntry) {
        self.results.push(result);
    }

    fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Passed tests, flaky ones included
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_passed()).count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    #[must_use]
    pub fn flaky_count(&self) -> usize {
        self.count(TestStatus::Flaky)
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Share of executed tests that passed; 1.0 when nothing ran
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let executed = self.total_count() - self.skipped_count();
        if executed == 0 {
            return 1.0;
        }
        self.passed_count() as f64 / executed as f64
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }

    #[must_use]
    pub fn results(&self) -> &[TestResultEntry] {
        &self.results
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&TestResultEntry> {
        self.results.iter().filter(|r| r.status.is_failed()).collect()
    }

    fn stats(&self) -> Stats {
        Stats {
            total: self.total_count(),
            passed: self.count(TestStatus::Passed),
            failed: self.failed_count(),
            flaky: self.flaky_count(),
            skipped: self.skipped_count(),
            duration_ms: u64::try_from(self.total_duration().as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// One-line summary, e.g. `12 passed, 1 failed, 2 flaky, 0 skipped (3.2s)`
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} flaky, {} skipped ({:.1}s)",
            self.count(TestStatus::Passed),
            self.failed_count(),
            self.flaky_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        )
    }

    /// Plain-text list, one line per test plus error details
    #[must_use]
    pub fn render_list(&self) -> String {
        let mut out = String::new();
        for r in &self.results {
            let _ = writeln!(
                out,
                "  {} [{}] {} ({}ms)",
                r.status.symbol(),
                r.project,
                r.id,
                r.duration.as_millis()
            );
            if let (Some(error), false) = (&r.error, r.status.is_passed()) {
                for line in error.lines() {
                    let _ = writeln!(out, "      {line}");
                }
            }
        }
        let _ = writeln!(out, "\n  {}", self.summary());
        out
    }

    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();
        html.push_str(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>PeopleOps E2E Report</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .progress-bar { background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }
        .passed { background: #4caf50; height: 100%; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .test.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .test.flaky { background: #fffde7; border-left: 4px solid #fbc02d; }
        .test.skip { background: #fff3e0; border-left: 4px solid #ff9800; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
        .artifacts a { margin-right: 10px; }
    </style>
</head>
<body>
"#,
        );

        let _ = write!(
            html,
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>{}</h2>
    <div class="progress-bar">
        <div class="passed" style="width: {:.1}%"></div>
    </div>
</div>
"#,
            escape_xml(&self.suite_name),
            escape_xml(&self.summary()),
            self.pass_rate() * 100.0
        );

        for (suite, results) in self.by_suite() {
            let _ = writeln!(html, "<h2>{}</h2>", escape_xml(suite));
            for r in results {
                let _ = write!(
                    html,
                    r#"<div class="test {}">
    <strong>{}</strong> [{}] {} ({}ms, {} attempt(s))
"#,
                    r.status.css_class(),
                    escape_xml(&r.title),
                    escape_xml(&r.project),
                    r.status,
                    r.duration.as_millis(),
                    r.attempts
                );
                if let Some(error) = &r.error {
                    let _ = writeln!(html, r#"    <div class="error">{}</div>"#, escape_xml(error));
                }
                if !r.artifacts.is_empty() {
                    html.push_str(r#"    <div class="artifacts">"#);
                    for path in &r.artifacts {
                        let shown = escape_xml(&path.display().to_string());
                        let _ = write!(html, r#"<a href="{shown}">{shown}</a>"#);
                    }
                    html.push_str("</div>\n");
                }
                html.push_str("</div>\n");
            }
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    /// JUnit XML with one `<testsuite>` per suite
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        let _ = writeln!(
            xml,
            r#"<testsuites name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
            escape_xml(&self.suite_name),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        );

        for (suite, results) in self.by_suite() {
            let failures = results.iter().filter(|r| r.status.is_failed()).count();
            let skipped = results
                .iter()
                .filter(|r| r.status == TestStatus::Skipped)
                .count();
            let time: Duration = results.iter().map(|r| r.duration).sum();
            let _ = writeln!(
                xml,
                r#"  <testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
                escape_xml(suite),
                results.len(),
                failures,
                skipped,
                time.as_secs_f64()
            );
            for r in results {
                let _ = writeln!(
                    xml,
                    r#"    <testcase name="{}" classname="{}" time="{:.3}">"#,
                    escape_xml(&r.title),
                    escape_xml(&r.id),
                    r.duration.as_secs_f64()
                );
                match (r.status, &r.error) {
                    (TestStatus::Failed, Some(error)) => {
                        let first = error.lines().next().unwrap_or_default();
                        let _ = writeln!(
                            xml,
                            r#"      <failure message="{}">{}</failure>"#,
                            escape_xml(first),
                            escape_xml(error)
                        );
                    }
                    (TestStatus::Failed, None) => xml.push_str("      <failure/>\n"),
                    (TestStatus::Skipped, _) => xml.push_str("      <skipped/>\n"),
                    (TestStatus::Flaky, Some(error)) => {
                        let _ = writeln!(
                            xml,
                            "      <system-out>flaky: {}</system-out>",
                            escape_xml(error)
                        );
                    }
                    _ => {}
                }
                xml.push_str("    </testcase>\n");
            }
            xml.push_str("  </testsuite>\n");
        }

        xml.push_str("</testsuites>\n");
        xml
    }

    pub fn render_json(&self) -> E2eResult<String> {
        let report = JsonReport {
            name: &self.suite_name,
            started_at: self.start_time,
            stats: self.stats(),
            results: &self.results,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// Write the report for `kind` under `output_dir`.
    ///
    /// Returns the written file, or `None` for the list reporter, which only
    /// prints.
    pub fn write(&self, kind: ReporterKind, output_dir: &Path) -> E2eResult<Option<PathBuf>> {
        let (name, body) = match kind {
            ReporterKind::List => return Ok(None),
            ReporterKind::Html => ("index.html", self.render_html()),
            ReporterKind::Junit => ("results.xml", self.render_junit()),
            ReporterKind::Json => ("results.json", self.render_json()?),
        };
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(name);
        fs::write(&path, body)?;
        Ok(Some(path))
    }

    fn by_suite(&self) -> BTreeMap<&str, Vec<&TestResultEntry>> {
        let mut suites: BTreeMap<&str, Vec<&TestResultEntry>> = BTreeMap::new();
        for r in &self.results {
            suites.entry(r.suite.as_str()).or_default().push(r);
        }
        suites
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
