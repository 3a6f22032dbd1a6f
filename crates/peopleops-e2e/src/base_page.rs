//! Shared page primitives.
//!
//! Every page object holds a [`BasePage`]. Actions auto-wait and are strict:
//! the target must resolve to exactly one visible, enabled element before
//! the driver is asked to act. Reads never fail on absence; they return
//! `false` or an empty string and warn when the target is ambiguous.

use crate::driver::{ElementHandle, PageDriver, SelectBy};
use crate::locator::{Locator, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use crate::result::{E2eError, E2eResult};
use crate::script;
use crate::wait::{poll_until, ElementState, LoadState, UrlPattern, WaitOptions, DEFAULT_WAIT_TIMEOUT_MS};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default directory for `take_screenshot`
pub const DEFAULT_SCREENSHOT_DIR: &str = "screenshots";

/// Driver handle plus the timeouts and base URL a page operates with
#[derive(Debug, Clone)]
pub struct BasePage {
    driver: Arc<dyn PageDriver>,
    base_url: String,
    action_timeout_ms: u64,
    navigation_timeout_ms: u64,
    screenshot_dir: PathBuf,
}

impl BasePage {
    /// Create a page bound to `base_url`
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, base_url: impl Into<String>) -> Self {
        Self {
            driver,
            base_url: base_url.into(),
            action_timeout_ms: DEFAULT_TIMEOUT_MS,
            navigation_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
        }
    }

    /// Set the action (auto-wait) timeout
    #[must_use]
    pub const fn with_action_timeout(mut self, timeout_ms: u64) -> Self {
        self.action_timeout_ms = timeout_ms;
        self
    }

    /// Set the navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout_ms: u64) -> Self {
        self.navigation_timeout_ms = timeout_ms;
        self
    }

    /// Set where screenshots are written
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Same driver and timeouts, different application
    #[must_use]
    pub fn rebased(&self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..self.clone()
        }
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    /// Base URL relative paths resolve against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Action timeout in milliseconds
    #[must_use]
    pub const fn action_timeout_ms(&self) -> u64 {
        self.action_timeout_ms
    }

    fn action_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.action_timeout_ms)
            .with_poll_interval(DEFAULT_POLL_INTERVAL_MS)
    }

    /// Resolve `path` against the base URL; absolute URLs pass through
    #[must_use]
    pub fn resolve_url(&self, path: &str) -> String {
        if path.contains("://") || path.starts_with("about:") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.is_empty() {
            return base.to_string();
        }
        format!("{base}/{}", path.trim_start_matches('/'))
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Go to `path` and wait for the page to settle
    pub async fn navigate(&self, path: &str) -> E2eResult<()> {
        let url = self.resolve_url(path);
        debug!(%url, "navigate");
        self.driver.goto(&url).await?;
        self.wait_for_page_load().await
    }

    /// Wait for DOM content, then network idle
    pub async fn wait_for_page_load(&self) -> E2eResult<()> {
        let timeout = Duration::from_millis(self.navigation_timeout_ms);
        self.driver
            .wait_for_load_state(LoadState::DomContentLoaded, timeout)
            .await?;
        self.driver
            .wait_for_load_state(LoadState::NetworkIdle, timeout)
            .await
    }

    /// Reload and wait for the page to settle
    pub async fn reload(&self) -> E2eResult<()> {
        self.driver.reload().await?;
        self.wait_for_page_load().await
    }

    /// Navigate back in history
    pub async fn go_back(&self) -> E2eResult<()> {
        self.driver.go_back().await?;
        self.wait_for_page_load().await
    }

    /// Document title
    pub async fn page_title(&self) -> E2eResult<String> {
        self.driver.title().await
    }

    /// Current page URL
    pub async fn current_url(&self) -> E2eResult<String> {
        self.driver.current_url().await
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Wait until `locator` resolves to exactly one actionable element
    async fn actionable(&self, locator: &Locator) -> E2eResult<()> {
        let what = format!("{locator} to be actionable");
        poll_until(&what, &self.action_options(), || async {
            let elements = self.driver.query(locator).await?;
            match elements.as_slice() {
                [only] if only.is_actionable() => Ok(Some(())),
                [] | [_] => Ok(None),
                many => Err(E2eError::StrictModeViolation {
                    selector: locator.to_string(),
                    count: many.len(),
                }),
            }
        })
        .await
    }

    /// Fill an input, replacing its value
    pub async fn fill_input(&self, target: impl Into<Locator>, value: &str) -> E2eResult<()> {
        let locator = target.into();
        self.actionable(&locator).await?;
        debug!(locator = %locator, "fill");
        self.driver.fill(&locator, value).await
    }

    /// Click an element
    pub async fn click_element(&self, target: impl Into<Locator>) -> E2eResult<()> {
        let locator = target.into();
        self.actionable(&locator).await?;
        debug!(locator = %locator, "click");
        self.driver.click(&locator).await
    }

    /// Select a `<select>` option by value
    pub async fn select_dropdown(&self, target: impl Into<Locator>, value: &str) -> E2eResult<()> {
        let locator = target.into();
        self.actionable(&locator).await?;
        debug!(locator = %locator, value, "select");
        self.driver
            .select_option(&locator, &SelectBy::Value(value.to_string()))
            .await
    }

    /// Select a `<select>` option by visible label
    pub async fn select_dropdown_by_label(
        &self,
        target: impl Into<Locator>,
        label: &str,
    ) -> E2eResult<()> {
        let locator = target.into();
        self.actionable(&locator).await?;
        debug!(locator = %locator, label, "select by label");
        self.driver
            .select_option(&locator, &SelectBy::Label(label.to_string()))
            .await
    }

    /// Clear an input, then fill it
    pub async fn clear_and_fill(&self, target: impl Into<Locator>, value: &str) -> E2eResult<()> {
        let locator = target.into();
        self.actionable(&locator).await?;
        self.driver.fill(&locator, "").await?;
        self.driver.fill(&locator, value).await
    }

    /// Ensure a checkbox is checked
    pub async fn check(&self, target: impl Into<Locator>) -> E2eResult<()> {
        self.set_checked(target, true).await
    }

    /// Ensure a checkbox is unchecked
    pub async fn uncheck(&self, target: impl Into<Locator>) -> E2eResult<()> {
        self.set_checked(target, false).await
    }

    async fn set_checked(&self, target: impl Into<Locator>, checked: bool) -> E2eResult<()> {
        let locator = target.into();
        self.actionable(&locator).await?;
        self.driver.set_checked(&locator, checked).await
    }

    /// Press a key while `target` is focused
    pub async fn press(&self, target: impl Into<Locator>, key: &str) -> E2eResult<()> {
        let locator = target.into();
        self.actionable(&locator).await?;
        self.driver.press(&locator, key).await
    }

    /// Make `confirm()` dialogs return `accept` on the current document
    pub async fn auto_dialogs(&self, accept: bool) -> E2eResult<()> {
        self.driver.evaluate(&script::auto_dialog_expr(accept)).await?;
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    async fn first_match(&self, locator: &Locator) -> E2eResult<Option<ElementHandle>> {
        let mut elements = self.driver.query(locator).await?;
        if elements.len() > 1 {
            warn!(locator = %locator, count = elements.len(), "query matched several elements, using the first");
        }
        Ok((!elements.is_empty()).then(|| elements.swap_remove(0)))
    }

    /// Whether the target is visible right now
    pub async fn is_element_visible(&self, target: impl Into<Locator>) -> E2eResult<bool> {
        let locator = target.into();
        Ok(self.first_match(&locator).await?.is_some_and(|e| e.visible))
    }

    /// Whether the target becomes visible within `timeout`
    pub async fn is_visible_within(&self, target: impl Into<Locator>, timeout: Duration) -> E2eResult<bool> {
        let locator = target.into();
        let options = WaitOptions::new()
            .with_timeout(timeout.as_millis() as u64)
            .with_poll_interval(DEFAULT_POLL_INTERVAL_MS);
        match self.wait_on(&locator, ElementState::Visible, &options).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_timeout() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether the target is enabled right now
    pub async fn is_element_enabled(&self, target: impl Into<Locator>) -> E2eResult<bool> {
        let locator = target.into();
        Ok(self.first_match(&locator).await?.is_some_and(|e| e.enabled))
    }

    /// Whether the target is checked right now
    pub async fn is_checked(&self, target: impl Into<Locator>) -> E2eResult<bool> {
        let locator = target.into();
        Ok(self
            .first_match(&locator)
            .await?
            .and_then(|e| e.checked)
            .unwrap_or(false))
    }

    /// Text of the target, empty when absent
    pub async fn get_element_text(&self, target: impl Into<Locator>) -> E2eResult<String> {
        let locator = target.into();
        Ok(self
            .first_match(&locator)
            .await?
            .map(|e| e.text_content)
            .unwrap_or_default())
    }

    /// Text of every match, in document order
    pub async fn all_text_contents(&self, target: impl Into<Locator>) -> E2eResult<Vec<String>> {
        let locator = target.into();
        Ok(self
            .driver
            .query(&locator)
            .await?
            .into_iter()
            .map(|e| e.text_content)
            .collect())
    }

    /// Number of matches
    pub async fn count(&self, target: impl Into<Locator>) -> E2eResult<usize> {
        let locator = target.into();
        Ok(self.driver.query(&locator).await?.len())
    }

    /// Current value of an input, empty when absent
    pub async fn input_value(&self, target: impl Into<Locator>) -> E2eResult<String> {
        let locator = target.into();
        Ok(self
            .first_match(&locator)
            .await?
            .and_then(|e| e.value)
            .unwrap_or_default())
    }

    /// Attribute of the target
    pub async fn get_attribute(
        &self,
        target: impl Into<Locator>,
        name: &str,
    ) -> E2eResult<Option<String>> {
        let locator = target.into();
        Ok(self
            .first_match(&locator)
            .await?
            .and_then(|mut e| e.attributes.remove(name)))
    }

    /// Evaluate a script in the page
    pub async fn evaluate(&self, js: &str) -> E2eResult<serde_json::Value> {
        self.driver.evaluate(js).await
    }

    // =========================================================================
    // WAITS
    // =========================================================================

    async fn wait_on(&self, locator: &Locator, state: ElementState, options: &WaitOptions) -> E2eResult<()> {
        let what = format!("{locator} to be {state}");
        poll_until(&what, options, || async {
            let elements = self.driver.query(locator).await?;
            Ok(state.is_satisfied(&elements).then_some(()))
        })
        .await
    }

    /// Wait until the target reaches `state`
    pub async fn wait_for_element(
        &self,
        target: impl Into<Locator>,
        state: ElementState,
        timeout: Duration,
    ) -> E2eResult<()> {
        let locator = target.into();
        let options = WaitOptions::new()
            .with_timeout(timeout.as_millis() as u64)
            .with_poll_interval(DEFAULT_POLL_INTERVAL_MS);
        self.wait_on(&locator, state, &options).await
    }

    /// Wait until the target is visible, within the action timeout
    pub async fn wait_visible(&self, target: impl Into<Locator>) -> E2eResult<()> {
        let locator = target.into();
        self.wait_on(&locator, ElementState::Visible, &self.action_options())
            .await
    }

    /// Wait until the current URL matches `pattern`
    pub async fn wait_for_url_pattern(&self, pattern: impl Into<UrlPattern>, timeout: Duration) -> E2eResult<()> {
        let pattern = pattern.into();
        let options = WaitOptions::new()
            .with_timeout(timeout.as_millis() as u64)
            .with_poll_interval(DEFAULT_POLL_INTERVAL_MS);
        poll_until(&pattern.to_string(), &options, || async {
            let url = self.driver.current_url().await?;
            Ok(pattern.matches(&url).then_some(()))
        })
        .await
    }

    /// Sleep for a fixed time
    pub async fn wait_for_timeout(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    // =========================================================================
    // ARTIFACTS
    // =========================================================================

    /// Write a full-page screenshot to `<screenshot_dir>/<name>.png`
    pub async fn take_screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        let png = self.driver.screenshot(true).await?;
        tokio::fs::create_dir_all(&self.screenshot_dir).await?;
        let path = self.screenshot_dir.join(format!("{name}.png"));
        tokio::fs::write(&path, png).await?;
        debug!(path = %path.display(), "screenshot written");
        Ok(path)
    }
}
