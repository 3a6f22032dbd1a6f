//! Scenario registration and selection.

use super::context::TestContext;
use crate::result::{E2eError, E2eResult};
use futures::future::BoxFuture;
use regex::Regex;
use std::future::Future;
use std::sync::Arc;

/// Boxed scenario body
pub type ScenarioFn = Arc<dyn Fn(TestContext) -> BoxFuture<'static, E2eResult<()>> + Send + Sync>;

/// Lowercase, dash-separated form of `text`
#[must_use]
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if c == '.' {
            out.push(c);
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

/// One registered test
#[derive(Clone)]
pub struct Scenario {
    /// `suite::slug(title)`
    pub id: String,
    pub title: String,
    pub suite: String,
    pub tags: Vec<String>,
    /// Focused: when any scenario is focused, only focused ones run
    pub only: bool,
    /// Skip reason
    pub skip: Option<String>,
    body: ScenarioFn,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("tags", &self.tags)
            .field("only", &self.only)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    pub fn new<F, Fut>(suite: &str, title: &str, body: F) -> Self
    where
        F: Fn(TestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = E2eResult<()>> + Send + 'static,
    {
        Self {
            id: format!("{suite}::{}", slug(title)),
            title: title.to_string(),
            suite: suite.to_string(),
            tags: Vec::new(),
            only: false,
            skip: None,
            body: Arc::new(move |ctx| Box::pin(body(ctx))),
        }
    }

    #[must_use]
    pub fn tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.trim_start_matches('@').to_string());
        self
    }

    #[must_use]
    pub const fn only(mut self) -> Self {
        self.only = true;
        self
    }

    #[must_use]
    pub fn skip(mut self, reason: &str) -> Self {
        self.skip = Some(reason.to_string());
        self
    }

    /// Start the body against `ctx`
    pub fn run(&self, ctx: TestContext) -> BoxFuture<'static, E2eResult<()>> {
        (self.body)(ctx)
    }

    /// Title as matched by `--grep`: suite, title and tags
    #[must_use]
    pub fn full_title(&self) -> String {
        let mut title = format!("{} {}", self.suite, self.title);
        for tag in &self.tags {
            title.push_str(" @");
            title.push_str(tag);
        }
        title
    }
}

/// Which scenarios a run selects
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Substrings of the id; any match selects
    pub filters: Vec<String>,
    pub grep: Option<Regex>,
    /// Required tags; any match selects
    pub tags: Vec<String>,
    /// Projects to run; empty means all
    pub projects: Vec<String>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn grep(mut self, pattern: &str) -> E2eResult<Self> {
        let re = Regex::new(pattern).map_err(|e| E2eError::config(format!("invalid --grep: {e}")))?;
        self.grep = Some(re);
        Ok(self)
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into().trim_start_matches('@').to_string());
        self
    }

    #[must_use]
    pub fn project(mut self, name: impl Into<String>) -> Self {
        self.projects.push(name.into());
        self
    }

    #[must_use]
    pub fn matches(&self, scenario: &Scenario) -> bool {
        let by_filter = self.filters.is_empty()
            || self.filters.iter().any(|f| scenario.id.contains(f.as_str()));
        let by_grep = self
            .grep
            .as_ref()
            .is_none_or(|re| re.is_match(&scenario.full_title()));
        let by_tag =
            self.tags.is_empty() || self.tags.iter().any(|t| scenario.tags.contains(t));
        by_filter && by_grep && by_tag
    }

    /// Whether the selection narrows scenarios at all
    #[must_use]
    pub fn is_narrowing(&self) -> bool {
        !self.filters.is_empty() || self.grep.is_some() || !self.tags.is_empty()
    }
}

/// Scenarios in declaration order
#[derive(Debug, Clone, Default)]
pub struct Registry {
    scenarios: Vec<Scenario>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scenario; a duplicate id is a configuration error
    pub fn add(&mut self, scenario: Scenario) -> E2eResult<()> {
        if self.get(&scenario.id).is_some() {
            return Err(E2eError::config(format!(
                "duplicate scenario id {}",
                scenario.id
            )));
        }
        self.scenarios.push(scenario);
        Ok(())
    }

    pub fn extend(&mut self, scenarios: impl IntoIterator<Item = Scenario>) -> E2eResult<()> {
        for scenario in scenarios {
            self.add(scenario)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Suite names in first-declaration order
    #[must_use]
    pub fn suites(&self) -> Vec<&str> {
        let mut suites: Vec<&str> = Vec::new();
        for s in &self.scenarios {
            if !suites.contains(&s.suite.as_str()) {
                suites.push(&s.suite);
            }
        }
        suites
    }

    /// Ids of focused scenarios
    #[must_use]
    pub fn focused(&self) -> Vec<String> {
        self.scenarios
            .iter()
            .filter(|s| s.only)
            .map(|s| s.id.clone())
            .collect()
    }
}
