//! Wait mechanisms.
//!
//! Every page-object action and explicit wait suspends on one of the helpers
//! here. Waiting is polling: a check runs, and if it is not yet satisfied the
//! task sleeps for the poll interval until the deadline passes.

use crate::driver::ElementHandle;
use crate::result::{E2eError, E2eResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for navigation and explicit waits (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// Wait for the `load` event to fire
    #[default]
    Load,
    /// Wait for `DOMContentLoaded` event
    DomContentLoaded,
    /// Wait for network to be idle (no requests for 500ms)
    NetworkIdle,
}

impl LoadState {
    /// Get the JavaScript event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

// =============================================================================
// ELEMENT STATE
// =============================================================================

/// Element states accepted by `wait_for_element`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementState {
    /// At least one match exists in the DOM
    Attached,
    /// No match exists
    Detached,
    /// A match is visible
    #[default]
    Visible,
    /// No match is visible (absent counts as hidden)
    Hidden,
}

impl ElementState {
    /// Whether the resolved elements satisfy this state
    #[must_use]
    pub fn is_satisfied(&self, elements: &[ElementHandle]) -> bool {
        match self {
            Self::Attached => !elements.is_empty(),
            Self::Detached => elements.is_empty(),
            Self::Visible => elements.iter().any(|e| e.visible),
            Self::Hidden => elements.iter().all(|e| !e.visible),
        }
    }
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// URL PATTERNS
// =============================================================================

/// URL matcher for `wait_for_url_pattern`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Glob pattern (e.g., "**/dashboard")
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Glob(pattern) => Self::glob_matches(pattern, url),
            Self::Any => true,
        }
    }

    /// `*` matches any run of characters, slashes included
    fn glob_matches(pattern: &str, url: &str) -> bool {
        let parts: Vec<&str> = pattern.split('*').collect();
        let mut pos = 0;
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                continue;
            }
            let found = if i == parts.len() - 1 && !pattern.ends_with('*') {
                // The last literal must sit at the very end of the URL.
                url[pos..].rfind(part).filter(|f| pos + f + part.len() == url.len())
            } else {
                url[pos..].find(part)
            };
            match found {
                Some(f) if i == 0 && f != 0 => return false,
                Some(f) => pos += f + part.len(),
                None => return false,
            }
        }
        pattern.ends_with('*') || pos == url.len()
    }
}

impl From<&str> for UrlPattern {
    /// Strings containing `*` are globs, everything else is a substring.
    fn from(pattern: &str) -> Self {
        if pattern.contains('*') {
            Self::Glob(pattern.to_string())
        } else {
            Self::Contains(pattern.to_string())
        }
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(p) => write!(f, "url == {p}"),
            Self::Prefix(p) => write!(f, "url starting with {p}"),
            Self::Contains(p) => write!(f, "url containing {p}"),
            Self::Regex(p) => write!(f, "url matching /{p}/"),
            Self::Glob(p) => write!(f, "url matching {p}"),
            Self::Any => write!(f, "any url"),
        }
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `check` until it yields `Some`, or fail with `Timeout`.
///
/// Errors returned by the check abort the wait immediately.
pub async fn poll_until<T, F, Fut>(what: &str, options: &WaitOptions, mut check: F) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<Option<T>>>,
{
    let deadline = Instant::now() + options.timeout();
    loop {
        if let Some(value) = check().await? {
            return Ok(value);
        }
        if Instant::now() >= deadline {
            debug!(what, timeout_ms = options.timeout_ms, "wait timed out");
            return Err(E2eError::Timeout {
                what: what.to_string(),
                ms: options.timeout_ms,
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Retry an async operation with exponential backoff.
///
/// Runs `op` up to `max_retries + 1` times, doubling the delay after each
/// failure. The last error is returned when every attempt fails.
pub async fn retry_with_backoff<T, F, Fut>(
    what: &str,
    max_retries: u32,
    initial_delay: Duration,
    mut op: F,
) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    let mut delay = initial_delay;
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_retries => {
                warn!(what, attempt, error = %err, "retrying after failure");
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    mod load_state_tests {
        use super::*;

        #[test]
        fn test_load_state_event_names() {
            assert_eq!(LoadState::Load.event_name(), "load");
            assert_eq!(LoadState::DomContentLoaded.event_name(), "DOMContentLoaded");
            assert_eq!(LoadState::NetworkIdle.to_string(), "networkidle");
        }
    }

    mod element_state_tests {
        use super::*;

        fn el(visible: bool) -> ElementHandle {
            ElementHandle::new("div").with_visible(visible)
        }

        #[test]
        fn test_attached_and_detached() {
            assert!(ElementState::Attached.is_satisfied(&[el(false)]));
            assert!(!ElementState::Attached.is_satisfied(&[]));
            assert!(ElementState::Detached.is_satisfied(&[]));
        }

        #[test]
        fn test_visible_and_hidden() {
            assert!(ElementState::Visible.is_satisfied(&[el(false), el(true)]));
            assert!(!ElementState::Visible.is_satisfied(&[]));
            assert!(ElementState::Hidden.is_satisfied(&[]));
            assert!(ElementState::Hidden.is_satisfied(&[el(false)]));
            assert!(!ElementState::Hidden.is_satisfied(&[el(true)]));
        }
    }

    mod url_pattern_tests {
        use super::*;

        #[test]
        fn test_glob_double_star() {
            let p = UrlPattern::Glob("**/dashboard".into());
            assert!(p.matches("http://localhost:3000/dashboard"));
            assert!(!p.matches("http://localhost:3000/dashboard/settings"));
            assert!(!p.matches("http://localhost:3000/login"));
        }

        #[test]
        fn test_glob_repeated_suffix() {
            let p = UrlPattern::Glob("*/a".into());
            assert!(p.matches("x/a/b/a"));
        }

        #[test]
        fn test_glob_anchored_start() {
            let p = UrlPattern::Glob("http://localhost*".into());
            assert!(p.matches("http://localhost:3000/employees"));
            assert!(!p.matches("https://localhost:3000"));
        }

        #[test]
        fn test_from_str() {
            assert_eq!(UrlPattern::from("/dashboard"), UrlPattern::Contains("/dashboard".into()));
            assert!(matches!(UrlPattern::from("**/login"), UrlPattern::Glob(_)));
        }

        #[test]
        fn test_regex_and_any() {
            assert!(UrlPattern::Regex(r"/employees/EMP\d+/skills$".into())
                .matches("http://h/employees/EMP123456/skills"));
            assert!(!UrlPattern::Regex("(".into()).matches("("));
            assert!(UrlPattern::Any.matches(""));
        }
    }

    mod polling_tests {
        use super::*;

        #[tokio::test]
        async fn test_poll_until_resolves() {
            let calls = Arc::new(AtomicU32::new(0));
            let counter = Arc::clone(&calls);
            let opts = WaitOptions::new().with_timeout(1000).with_poll_interval(1);
            let value = poll_until("third call", &opts, || {
                let counter = Arc::clone(&counter);
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok((n >= 3).then_some(n))
                }
            })
            .await
            .unwrap();
            assert_eq!(value, 3);
        }

        #[tokio::test]
        async fn test_poll_until_times_out() {
            let opts = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            let err = poll_until::<(), _, _>("never", &opts, || async { Ok(None) })
                .await
                .unwrap_err();
            assert!(matches!(err, E2eError::Timeout { ms: 20, .. }));
        }

        #[tokio::test]
        async fn test_poll_until_propagates_check_error() {
            let opts = WaitOptions::new().with_timeout(1000);
            let err = poll_until::<(), _, _>("broken", &opts, || async {
                Err(E2eError::page("detached"))
            })
            .await
            .unwrap_err();
            assert!(matches!(err, E2eError::PageError { .. }));
        }

        #[tokio::test]
        async fn test_retry_with_backoff_eventually_succeeds() {
            let calls = Arc::new(AtomicU32::new(0));
            let counter = Arc::clone(&calls);
            let result = retry_with_backoff("flaky", 3, Duration::from_millis(1), || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(E2eError::page("not yet"))
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await
            .unwrap();
            assert_eq!(result, "ok");
            assert_eq!(calls.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn test_retry_with_backoff_gives_up() {
            let calls = Arc::new(AtomicU32::new(0));
            let counter = Arc::clone(&calls);
            let result: E2eResult<()> =
                retry_with_backoff("always", 2, Duration::from_millis(1), || {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err(E2eError::page("down"))
                    }
                })
                .await;
            assert!(result.is_err());
            assert_eq!(calls.load(Ordering::SeqCst), 3);
        }
    }
}
