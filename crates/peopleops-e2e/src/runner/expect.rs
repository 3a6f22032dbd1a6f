//! Assertions for scenario bodies.
//!
//! Each helper returns `AssertionFailed` with expected and actual values so
//! the report says what went wrong. The page-level helpers retry until the
//! page's action timeout, like the reads they wrap.

use crate::base_page::BasePage;
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use crate::wait::{poll_until, WaitOptions, DEFAULT_POLL_INTERVAL_MS};
use std::fmt::Debug;
use std::time::Duration;

/// `actual` contains `expected`
pub fn expect_contains(what: &str, actual: &str, expected: &str) -> E2eResult<()> {
    if actual.contains(expected) {
        return Ok(());
    }
    Err(E2eError::assertion(format!(
        "expected {what} to contain {expected:?}\n  actual: {actual:?}"
    )))
}

pub fn expect_eq<T: PartialEq + Debug>(what: &str, actual: T, expected: T) -> E2eResult<()> {
    if actual == expected {
        return Ok(());
    }
    Err(E2eError::assertion(format!(
        "expected {what} to equal {expected:?}\n  actual: {actual:?}"
    )))
}

pub fn expect_true(what: &str, condition: bool) -> E2eResult<()> {
    if condition {
        return Ok(());
    }
    Err(E2eError::assertion(format!("expected {what}")))
}

fn options(base: &BasePage) -> WaitOptions {
    WaitOptions::new()
        .with_timeout(base.action_timeout_ms())
        .with_poll_interval(DEFAULT_POLL_INTERVAL_MS)
}

/// `target` becomes visible within the action timeout
pub async fn expect_visible(base: &BasePage, target: impl Into<Locator>) -> E2eResult<()> {
    let locator = target.into();
    let timeout = Duration::from_millis(base.action_timeout_ms());
    if base.is_visible_within(&locator, timeout).await? {
        return Ok(());
    }
    Err(E2eError::assertion(format!(
        "expected {locator} to be visible within {}ms",
        timeout.as_millis()
    )))
}

/// The current URL contains `fragment` within the action timeout
pub async fn expect_url_contains(base: &BasePage, fragment: &str) -> E2eResult<()> {
    let timeout = Duration::from_millis(base.action_timeout_ms());
    match base.wait_for_url_pattern(fragment, timeout).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_timeout() => {
            let actual = base.current_url().await?;
            Err(E2eError::assertion(format!(
                "expected url to contain {fragment:?}\n  actual: {actual:?}"
            )))
        }
        Err(err) => Err(err),
    }
}

/// `target` resolves to exactly `expected` elements within the action timeout
pub async fn expect_count(base: &BasePage, target: impl Into<Locator>, expected: usize) -> E2eResult<()> {
    let locator = target.into();
    let outcome = poll_until(&format!("count of {locator}"), &options(base), || async {
        let count = base.count(&locator).await?;
        Ok((count == expected).then_some(()))
    })
    .await;
    match outcome {
        Err(err) if err.is_timeout() => {
            let actual = base.count(&locator).await?;
            Err(E2eError::assertion(format!(
                "expected {locator} to match {expected} element(s)\n  actual: {actual}"
            )))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ElementHandle, MockDriver};
    use crate::pages::testing::{base, PEOPLEOPS};

    mod value_tests {
        use super::*;

        #[test]
        fn test_expect_contains() {
            expect_contains("toast", "Designation created successfully", "successfully").unwrap();
            let err = expect_contains("toast", "", "successfully").unwrap_err();
            let message = err.to_string();
            assert!(message.contains("\"successfully\""));
            assert!(message.contains("actual: \"\""));
        }

        #[test]
        fn test_expect_eq_and_true() {
            expect_eq("rows", 2, 2).unwrap();
            assert!(expect_eq("rows", 1, 2).unwrap_err().to_string().contains("actual: 1"));
            expect_true("form to be open", true).unwrap();
            assert!(matches!(
                expect_true("form to be open", false).unwrap_err(),
                E2eError::AssertionFailed { .. }
            ));
        }
    }

    mod page_tests {
        use super::*;

        #[tokio::test]
        async fn test_expect_visible() {
            let mock = MockDriver::new().shared();
            let page = base(&mock, PEOPLEOPS);
            let heading = Locator::css("h1");
            assert!(expect_visible(&page, &heading).await.is_err());
            mock.set_element(&heading, ElementHandle::new("h1"));
            expect_visible(&page, &heading).await.unwrap();
        }

        #[tokio::test]
        async fn test_expect_url_contains() {
            let mock = MockDriver::new().shared();
            let page = base(&mock, PEOPLEOPS);
            mock.set_url("http://localhost:3000/dashboard");
            expect_url_contains(&page, "dashboard").await.unwrap();
            let err = expect_url_contains(&page, "login").await.unwrap_err();
            assert!(err.to_string().contains("/dashboard"));
        }

        #[tokio::test]
        async fn test_expect_count() {
            let mock = MockDriver::new().shared();
            let page = base(&mock, PEOPLEOPS);
            let rows = Locator::css("tbody tr");
            mock.set_elements(&rows, vec![ElementHandle::new("tr"), ElementHandle::new("tr")]);
            expect_count(&page, &rows, 2).await.unwrap();
            let err = expect_count(&page, &rows, 3).await.unwrap_err();
            assert!(err.to_string().contains("actual: 2"));
        }
    }
}
