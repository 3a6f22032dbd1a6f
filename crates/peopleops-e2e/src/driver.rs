//! Page driver abstraction.
//!
//! Page objects never talk to a browser directly. They hold an
//! `Arc<dyn PageDriver>` and every primitive they need (navigation, element
//! queries, input) goes through this trait. Two implementations exist:
//!
//! - the CDP driver in [`crate::browser`] (feature `browser`);
//! - [`MockDriver`], an in-memory page keyed by locator display strings,
//!   used by unit tests of page objects and the runner.
//!
//! Driver actions operate on the first element a locator resolves to.
//! Strictness and auto-waiting live one level up, in
//! [`crate::base_page::BasePage`].

use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use crate::session::StorageState;
use crate::wait::LoadState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Snapshot of one resolved element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Lowercase tag name
    pub tag_name: String,
    /// Whitespace-normalized text content
    #[serde(default)]
    pub text_content: String,
    /// Rendered with a non-empty box and not hidden by style
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
    /// Form control value
    #[serde(default)]
    pub value: Option<String>,
    /// Checkbox or radio state
    #[serde(default)]
    pub checked: Option<bool>,
    /// Element attributes
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ElementHandle {
    /// Create a visible, enabled element
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            text_content: String::new(),
            visible: true,
            enabled: true,
            value: None,
            checked: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = text.into();
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Mark as hidden
    #[must_use]
    pub const fn hidden(self) -> Self {
        self.with_visible(false)
    }

    /// Mark as disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set the control value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the checked state
    #[must_use]
    pub const fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Visible and enabled
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        self.visible && self.enabled
    }
}

/// How `select_option` picks an `<option>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectBy {
    /// Option `value` attribute
    Value(String),
    /// Option visible label
    Label(String),
}

impl std::fmt::Display for SelectBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Label(l) => write!(f, "label:{l}"),
        }
    }
}

/// Browser viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Window viewport
    pub viewport: Viewport,
    /// Executable path override
    pub executable_path: Option<String>,
    /// Chrome sandbox (disable inside containers)
    pub sandbox: bool,
    /// Timeout for a single CDP request
    pub request_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            executable_path: None,
            sandbox: true,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    /// Set executable path
    #[must_use]
    pub fn executable(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Disable the sandbox
    #[must_use]
    pub const fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// One browser page (tab) under automation
#[async_trait]
pub trait PageDriver: Send + Sync + std::fmt::Debug {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Reload the current page
    async fn reload(&self) -> E2eResult<()>;

    /// Go back in history
    async fn go_back(&self) -> E2eResult<()>;

    /// Current URL
    async fn current_url(&self) -> E2eResult<String>;

    /// Document title
    async fn title(&self) -> E2eResult<String>;

    /// Wait until the page reaches a load state
    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> E2eResult<()>;

    /// Resolve a locator to all matching elements, in document order
    async fn query(&self, locator: &Locator) -> E2eResult<Vec<ElementHandle>>;

    /// Click the first match
    async fn click(&self, locator: &Locator) -> E2eResult<()>;

    /// Replace the value of the first match
    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()>;

    /// Select an option of the first `<select>` match
    async fn select_option(&self, locator: &Locator, by: &SelectBy) -> E2eResult<()>;

    /// Set the checked state of the first match
    async fn set_checked(&self, locator: &Locator, checked: bool) -> E2eResult<()>;

    /// Focus the first match and press a key (e.g. "Enter")
    async fn press(&self, locator: &Locator, key: &str) -> E2eResult<()>;

    /// Evaluate a script expression and return its JSON value
    async fn evaluate(&self, script: &str) -> E2eResult<serde_json::Value>;

    /// Run `script` in every document this page loads from now on, and in
    /// the current one
    async fn add_init_script(&self, script: &str) -> E2eResult<()>;

    /// PNG screenshot of the viewport or the full page
    async fn screenshot(&self, full_page: bool) -> E2eResult<Vec<u8>>;

    /// Capture cookies and storage of the page's origin
    async fn storage_state(&self) -> E2eResult<StorageState>;

    /// Install cookies and storage from a snapshot
    async fn apply_storage_state(&self, state: &StorageState) -> E2eResult<()>;

    /// Close the page
    async fn close(&self) -> E2eResult<()>;
}

/// Options for a freshly created page
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Session snapshot to install before the test starts
    pub storage_state: Option<StorageState>,
    /// Viewport
    pub viewport: Viewport,
    /// Origins whose web storage is wiped before the page is handed out
    pub origins: Vec<String>,
}

/// Creates isolated pages for runner workers
#[async_trait]
pub trait DriverFactory: Send + Sync + std::fmt::Debug {
    /// New page for `worker`, with fresh cookies and storage
    async fn new_page(&self, worker: usize, options: &PageOptions) -> E2eResult<Arc<dyn PageDriver>>;

    /// Release every browser
    async fn shutdown(&self) -> E2eResult<()>;
}

// =============================================================================
// MOCK DRIVER
// =============================================================================

/// Side effect triggered by clicking a mock element
#[derive(Debug, Clone)]
pub enum MockReaction {
    /// Replace the elements under a key
    SetElements(String, Vec<ElementHandle>),
    /// Remove every element under a key
    RemoveElements(String),
    /// Change the current URL
    Navigate(String),
}

impl MockReaction {
    /// Elements appear under `key`
    pub fn show(key: impl Into<Locator>, elements: Vec<ElementHandle>) -> Self {
        Self::SetElements(key.into().to_string(), elements)
    }

    /// Elements under `key` disappear
    pub fn hide(key: impl Into<Locator>) -> Self {
        Self::RemoveElements(key.into().to_string())
    }

    /// The page navigates to `url`
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::Navigate(url.into())
    }
}

#[derive(Debug, Default)]
struct MockState {
    url: String,
    title: String,
    elements: HashMap<String, Vec<ElementHandle>>,
    reactions: HashMap<String, Vec<MockReaction>>,
    eval_results: Vec<(String, serde_json::Value)>,
    storage: StorageState,
    screenshot: Vec<u8>,
    back_stack: Vec<String>,
    load_failure: Option<String>,
    history: Vec<String>,
}

/// In-memory page for unit tests.
///
/// Elements are registered under the display string of the locator that
/// should find them; a locator nobody registered resolves to nothing.
/// Actions mutate the registered elements (fill sets `value`, check sets
/// `checked`) and are recorded in a call history.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in an `Arc` usable as a page driver
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the current URL without recording a navigation
    pub fn set_url(&self, url: impl Into<String>) {
        self.state().url = url.into();
    }

    /// Set the document title
    pub fn set_title(&self, title: impl Into<String>) {
        self.state().title = title.into();
    }

    /// Register the elements a locator resolves to
    pub fn set_elements(&self, key: impl Into<Locator>, elements: Vec<ElementHandle>) {
        self.state()
            .elements
            .insert(key.into().to_string(), elements);
    }

    /// Register a single element for a locator
    pub fn set_element(&self, key: impl Into<Locator>, element: ElementHandle) {
        self.set_elements(key, vec![element]);
    }

    /// Remove the elements of a locator
    pub fn remove_elements(&self, key: impl Into<Locator>) {
        self.state().elements.remove(&key.into().to_string());
    }

    /// Run `reaction` whenever the locator is clicked
    pub fn on_click(&self, key: impl Into<Locator>, reaction: MockReaction) {
        self.state()
            .reactions
            .entry(key.into().to_string())
            .or_default()
            .push(reaction);
    }

    /// Return `value` from `evaluate` for scripts containing `fragment`
    pub fn set_eval_result(&self, fragment: impl Into<String>, value: serde_json::Value) {
        self.state().eval_results.push((fragment.into(), value));
    }

    /// Storage the page reports from `storage_state`
    pub fn set_storage_state(&self, storage: StorageState) {
        self.state().storage = storage;
    }

    /// Bytes returned by `screenshot`
    pub fn set_screenshot(&self, png: Vec<u8>) {
        self.state().screenshot = png;
    }

    /// Make load-state waits fail with a navigation error
    pub fn fail_loads(&self, message: impl Into<String>) {
        self.state().load_failure = Some(message.into());
    }

    /// Current value of the first element under a locator
    #[must_use]
    pub fn value_of(&self, key: impl Into<Locator>) -> Option<String> {
        self.state()
            .elements
            .get(&key.into().to_string())
            .and_then(|els| els.first())
            .and_then(|el| el.value.clone())
    }

    /// Storage most recently applied or reported
    #[must_use]
    pub fn storage(&self) -> StorageState {
        self.state().storage.clone()
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Check if a call starting with `prefix` was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state().history.iter().any(|c| c.starts_with(prefix))
    }

    /// Recorded calls starting with `prefix`
    #[must_use]
    pub fn calls(&self, prefix: &str) -> Vec<String> {
        self.state()
            .history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn record(&self, call: String) {
        self.state().history.push(call);
    }

    fn with_first<R>(
        &self,
        locator: &Locator,
        f: impl FnOnce(&mut ElementHandle) -> R,
    ) -> E2eResult<R> {
        let key = locator.to_string();
        let mut state = self.state();
        state
            .elements
            .get_mut(&key)
            .and_then(|els| els.first_mut())
            .map(f)
            .ok_or(E2eError::ElementNotFound { selector: key })
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.record(format!("goto:{url}"));
        let mut state = self.state();
        let previous = std::mem::replace(&mut state.url, url.to_string());
        state.back_stack.push(previous);
        Ok(())
    }

    async fn reload(&self) -> E2eResult<()> {
        self.record("reload".to_string());
        Ok(())
    }

    async fn go_back(&self) -> E2eResult<()> {
        self.record("go_back".to_string());
        let mut state = self.state();
        if let Some(previous) = state.back_stack.pop() {
            state.url = previous;
        }
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.state().url.clone())
    }

    async fn title(&self) -> E2eResult<String> {
        Ok(self.state().title.clone())
    }

    async fn wait_for_load_state(&self, state: LoadState, _timeout: Duration) -> E2eResult<()> {
        self.record(format!("wait:{state}"));
        let guard = self.state();
        match &guard.load_failure {
            Some(message) => Err(E2eError::NavigationError {
                url: guard.url.clone(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn query(&self, locator: &Locator) -> E2eResult<Vec<ElementHandle>> {
        Ok(self
            .state()
            .elements
            .get(&locator.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        let key = locator.to_string();
        self.with_first(locator, |_| ())?;
        self.record(format!("click:{key}"));
        let mut state = self.state();
        let reactions = state.reactions.get(&key).cloned().unwrap_or_default();
        for reaction in reactions {
            match reaction {
                MockReaction::SetElements(target, elements) => {
                    state.elements.insert(target, elements);
                }
                MockReaction::RemoveElements(target) => {
                    state.elements.remove(&target);
                }
                MockReaction::Navigate(url) => {
                    let previous = std::mem::replace(&mut state.url, url);
                    state.back_stack.push(previous);
                }
            }
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.with_first(locator, |el| el.value = Some(value.to_string()))?;
        self.record(format!("fill:{locator}={value}"));
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, by: &SelectBy) -> E2eResult<()> {
        let chosen = match by {
            SelectBy::Value(v) | SelectBy::Label(v) => v.clone(),
        };
        self.with_first(locator, |el| el.value = Some(chosen))?;
        self.record(format!("select:{locator}={by}"));
        Ok(())
    }

    async fn set_checked(&self, locator: &Locator, checked: bool) -> E2eResult<()> {
        self.with_first(locator, |el| el.checked = Some(checked))?;
        self.record(format!("check:{locator}={checked}"));
        Ok(())
    }

    async fn press(&self, locator: &Locator, key: &str) -> E2eResult<()> {
        self.with_first(locator, |_| ())?;
        self.record(format!("press:{locator}={key}"));
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> E2eResult<serde_json::Value> {
        let head: String = script.chars().take(60).collect();
        self.record(format!("evaluate:{head}"));
        Ok(self
            .state()
            .eval_results
            .iter()
            .find(|(fragment, _)| script.contains(fragment.as_str()))
            .map(|(_, value)| value.clone())
            .unwrap_or(serde_json::Value::Null))
    }

    async fn add_init_script(&self, script: &str) -> E2eResult<()> {
        let head: String = script.chars().take(60).collect();
        self.record(format!("init_script:{head}"));
        Ok(())
    }

    async fn screenshot(&self, full_page: bool) -> E2eResult<Vec<u8>> {
        self.record(format!("screenshot:full_page={full_page}"));
        Ok(self.state().screenshot.clone())
    }

    async fn storage_state(&self) -> E2eResult<StorageState> {
        self.record("storage_state".to_string());
        Ok(self.state().storage.clone())
    }

    async fn apply_storage_state(&self, storage: &StorageState) -> E2eResult<()> {
        self.record(format!("apply_storage_state:{}", storage.cookies.len()));
        self.state().storage = storage.clone();
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        self.record("close".to_string());
        Ok(())
    }
}

/// Factory handing out mock pages, for runner tests
pub struct MockDriverFactory {
    build: Box<dyn Fn(usize) -> MockDriver + Send + Sync>,
    pages: Mutex<Vec<Arc<MockDriver>>>,
}

impl std::fmt::Debug for MockDriverFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDriverFactory")
            .field("pages", &self.pages_created())
            .finish_non_exhaustive()
    }
}

impl Default for MockDriverFactory {
    fn default() -> Self {
        Self::new(|_| MockDriver::new())
    }
}

impl MockDriverFactory {
    /// Build each page with `build(worker)`
    pub fn new(build: impl Fn(usize) -> MockDriver + Send + Sync + 'static) -> Self {
        Self {
            build: Box::new(build),
            pages: Mutex::new(Vec::new()),
        }
    }

    /// Number of pages created so far
    #[must_use]
    pub fn pages_created(&self) -> usize {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Pages created so far, oldest first
    #[must_use]
    pub fn pages(&self) -> Vec<Arc<MockDriver>> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DriverFactory for MockDriverFactory {
    async fn new_page(&self, worker: usize, options: &PageOptions) -> E2eResult<Arc<dyn PageDriver>> {
        let page = Arc::new((self.build)(worker));
        if let Some(storage) = &options.storage_state {
            page.apply_storage_state(storage).await?;
        }
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&page));
        Ok(page)
    }

    async fn shutdown(&self) -> E2eResult<()> {
        Ok(())
    }
}
