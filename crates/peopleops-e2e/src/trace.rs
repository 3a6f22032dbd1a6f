//! Action traces.
//!
//! [`TracingDriver`] wraps a page driver and records every call with its
//! target, start offset, duration and outcome. The runner writes the
//! resulting [`ActionTrace`] next to failure screenshots.

use crate::driver::{ElementHandle, PageDriver, SelectBy};
use crate::locator::Locator;
use crate::result::E2eResult;
use crate::session::StorageState;
use crate::wait::LoadState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Longest script excerpt kept in a trace entry
const SCRIPT_EXCERPT: usize = 80;

/// One driver call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracedAction {
    /// Driver method, e.g. `click`
    pub name: String,
    /// Locator display string, URL or script excerpt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Offset from trace start
    pub start_ms: u64,
    pub duration_ms: u64,
    /// Error text when the call failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TracedAction {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMetadata {
    pub trace_id: String,
    pub test_id: String,
    /// Zero-based retry index
    pub attempt: u32,
    pub started_at: DateTime<Utc>,
}

impl TraceMetadata {
    #[must_use]
    pub fn new(test_id: impl Into<String>, attempt: u32) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
            test_id: test_id.into(),
            attempt,
            started_at: Utc::now(),
        }
    }
}

/// Serialized trace of one attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTrace {
    pub metadata: TraceMetadata,
    pub actions: Vec<TracedAction>,
}

impl ActionTrace {
    /// Write as pretty JSON, creating parent directories
    pub fn save_json(&self, path: &Path) -> E2eResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> E2eResult<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Calls that failed, in order
    #[must_use]
    pub fn errors(&self) -> Vec<&TracedAction> {
        self.actions.iter().filter(|a| a.is_error()).collect()
    }

    #[must_use]
    pub fn actions_named(&self, name: &str) -> Vec<&TracedAction> {
        self.actions.iter().filter(|a| a.name == name).collect()
    }
}

/// Page driver decorator that records each call
#[derive(Debug)]
pub struct TracingDriver {
    inner: Arc<dyn PageDriver>,
    metadata: TraceMetadata,
    started: Instant,
    actions: Mutex<Vec<TracedAction>>,
}

impl TracingDriver {
    #[must_use]
    pub fn new(inner: Arc<dyn PageDriver>, test_id: &str, attempt: u32) -> Self {
        Self {
            inner,
            metadata: TraceMetadata::new(test_id, attempt),
            started: Instant::now(),
            actions: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything recorded so far
    #[must_use]
    pub fn trace(&self) -> ActionTrace {
        ActionTrace {
            metadata: self.metadata.clone(),
            actions: self
                .actions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    async fn record<T, F>(&self, name: &str, target: Option<String>, call: F) -> E2eResult<T>
    where
        F: Future<Output = E2eResult<T>> + Send,
    {
        let start = self.started.elapsed();
        let at = Instant::now();
        let outcome = call.await;
        let action = TracedAction {
            name: name.to_string(),
            target,
            start_ms: millis(start),
            duration_ms: millis(at.elapsed()),
            error: outcome.as_ref().err().map(ToString::to_string),
        };
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action);
        outcome
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn excerpt(script: &str) -> String {
    let flat: String = script.split_whitespace().collect::<Vec<_>>().join(" ");
    flat.chars().take(SCRIPT_EXCERPT).collect()
}

#[async_trait]
impl PageDriver for TracingDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.record("goto", Some(url.to_string()), self.inner.goto(url))
            .await
    }

    async fn reload(&self) -> E2eResult<()> {
        self.record("reload", None, self.inner.reload()).await
    }

    async fn go_back(&self) -> E2eResult<()> {
        self.record("go_back", None, self.inner.go_back()).await
    }

    async fn current_url(&self) -> E2eResult<String> {
        self.inner.current_url().await
    }

    async fn title(&self) -> E2eResult<String> {
        self.inner.title().await
    }

    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> E2eResult<()> {
        self.record(
            "wait_for_load_state",
            Some(state.to_string()),
            self.inner.wait_for_load_state(state, timeout),
        )
        .await
    }

    // Polled by auto-wait loops; recording every poll would drown the trace.
    async fn query(&self, locator: &Locator) -> E2eResult<Vec<ElementHandle>> {
        self.inner.query(locator).await
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        self.record("click", Some(locator.to_string()), self.inner.click(locator))
            .await
    }

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.record(
            "fill",
            Some(locator.to_string()),
            self.inner.fill(locator, value),
        )
        .await
    }

    async fn select_option(&self, locator: &Locator, by: &SelectBy) -> E2eResult<()> {
        self.record(
            "select_option",
            Some(format!("{locator} {by}")),
            self.inner.select_option(locator, by),
        )
        .await
    }

    async fn set_checked(&self, locator: &Locator, checked: bool) -> E2eResult<()> {
        let name = if checked { "check" } else { "uncheck" };
        self.record(
            name,
            Some(locator.to_string()),
            self.inner.set_checked(locator, checked),
        )
        .await
    }

    async fn press(&self, locator: &Locator, key: &str) -> E2eResult<()> {
        self.record(
            "press",
            Some(format!("{locator} {key}")),
            self.inner.press(locator, key),
        )
        .await
    }

    async fn evaluate(&self, script: &str) -> E2eResult<serde_json::Value> {
        self.record("evaluate", Some(excerpt(script)), self.inner.evaluate(script))
            .await
    }

    async fn add_init_script(&self, script: &str) -> E2eResult<()> {
        self.record(
            "add_init_script",
            Some(excerpt(script)),
            self.inner.add_init_script(script),
        )
        .await
    }

    async fn screenshot(&self, full_page: bool) -> E2eResult<Vec<u8>> {
        self.record("screenshot", None, self.inner.screenshot(full_page))
            .await
    }

    async fn storage_state(&self) -> E2eResult<StorageState> {
        self.record("storage_state", None, self.inner.storage_state())
            .await
    }

    async fn apply_storage_state(&self, state: &StorageState) -> E2eResult<()> {
        self.record(
            "apply_storage_state",
            None,
            self.inner.apply_storage_state(state),
        )
        .await
    }

    async fn close(&self) -> E2eResult<()> {
        self.record("close", None, self.inner.close()).await
    }
}
