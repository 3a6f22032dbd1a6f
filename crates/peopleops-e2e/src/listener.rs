//! Client-side error capture.
//!
//! [`ErrorListener::attach`] installs a hook in every document the page
//! loads. The hook records uncaught errors, unhandled promise rejections,
//! `console.error` calls and failed `fetch` responses into a page global,
//! which [`ErrorListener::errors`] reads back.

use crate::driver::PageDriver;
use crate::result::{E2eError, E2eResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Page global holding recorded errors
pub const ERRORS_GLOBAL: &str = "__peopleopsErrors";

/// Hook installed before any application script runs
pub const ERROR_HOOK: &str = r#"(() => {
  if (window.__peopleopsErrors) return true;
  const errors = (window.__peopleopsErrors = []);
  const push = (kind, detail) => errors.push(kind + ": " + String(detail));
  window.addEventListener("error", (e) => push("uncaught", e.message || e.error));
  window.addEventListener("unhandledrejection", (e) => push("unhandled rejection", e.reason && e.reason.message ? e.reason.message : e.reason));
  const consoleError = console.error.bind(console);
  console.error = (...args) => { push("console.error", args.map(String).join(" ")); consoleError(...args); };
  if (window.fetch) {
    const fetch = window.fetch.bind(window);
    window.fetch = async (input, init) => {
      const url = typeof input === "string" ? input : input && input.url;
      try {
        const res = await fetch(input, init);
        if (res.status >= 400) push("fetch " + res.status, url);
        return res;
      } catch (err) {
        push("fetch failed", url + " " + (err && err.message ? err.message : err));
        throw err;
      }
    };
  }
  return true;
})()"#;

const READ_ERRORS: &str = "(window.__peopleopsErrors || []).slice()";

const CLEAR_ERRORS: &str = "(window.__peopleopsErrors || []).splice(0).length";

/// Records application errors raised while a test drives the page
#[derive(Debug, Clone)]
pub struct ErrorListener {
    driver: Arc<dyn PageDriver>,
}

impl ErrorListener {
    /// Install the hook on `driver`
    pub async fn attach(driver: Arc<dyn PageDriver>) -> E2eResult<Self> {
        driver.add_init_script(ERROR_HOOK).await?;
        debug!("error listener attached");
        Ok(Self { driver })
    }

    /// Errors recorded in the current document
    pub async fn errors(&self) -> E2eResult<Vec<String>> {
        let value = self.driver.evaluate(READ_ERRORS).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|e| E2eError::ScriptError {
            message: format!("unreadable error log: {e}"),
        })
    }

    /// Drop what has been recorded so far
    pub async fn clear(&self) -> E2eResult<()> {
        self.driver.evaluate(CLEAR_ERRORS).await?;
        Ok(())
    }

    /// Fail with `PageErrors` if anything was recorded
    pub async fn assert_clean(&self) -> E2eResult<()> {
        let errors = self.errors().await?;
        if errors.is_empty() {
            return Ok(());
        }
        warn!(count = errors.len(), "page reported errors");
        Err(E2eError::PageErrors { errors })
    }
}
