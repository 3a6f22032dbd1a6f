//! Page Object Model support.
//!
//! A page object owns a [`BasePage`] and a struct of named locators, and
//! exposes the actions and reads a scenario needs. Implement [`PageObject`]
//! to make it openable by path.
//!
//! ```ignore
//! pub struct LoginPage {
//!     base: BasePage,
//!     pub locators: LoginLocators,
//! }
//!
//! #[async_trait]
//! impl PageObject for LoginPage {
//!     fn path(&self) -> &str {
//!         "/login"
//!     }
//!
//!     fn base(&self) -> &BasePage {
//!         &self.base
//!     }
//! }
//! ```

use crate::base_page::BasePage;
use crate::locator::{Locator, TextMatch};
use crate::result::E2eResult;
use async_trait::async_trait;
use tracing::{debug, warn};

/// A page or view of the application under test
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Path relative to the page's base URL
    fn path(&self) -> &str;

    /// Shared primitives
    fn base(&self) -> &BasePage;

    /// Name for logs
    fn page_name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Navigate to [`path`](Self::path) and wait for the page to settle
    async fn open(&self) -> E2eResult<()> {
        debug!(page = self.page_name(), path = self.path(), "open");
        self.base().navigate(self.path()).await
    }

    /// Whether the browser is currently on this page
    async fn is_current(&self) -> E2eResult<bool> {
        let url = self.base().current_url().await?;
        Ok(url.contains(self.path().trim_end_matches('/')))
    }
}

/// Table row whose cell text equals `text` exactly
#[must_use]
pub fn row_by_cell(rows: &Locator, cell: &Locator, text: &str) -> Locator {
    rows.clone()
        .filter_has(cell.clone().has_text(TextMatch::exact(text)))
}

/// Table row whose text contains `text`.
///
/// Substring lookups are ambiguous for names that prefix one another; use
/// [`row_by_cell`] to act on a specific row.
pub async fn row_containing(base: &BasePage, rows: &Locator, text: &str) -> E2eResult<Locator> {
    let candidate = rows.clone().has_text(text);
    let count = base.count(&candidate).await?;
    if count > 1 {
        warn!(locator = %candidate, count, "row lookup is ambiguous");
    }
    Ok(candidate.first())
}
