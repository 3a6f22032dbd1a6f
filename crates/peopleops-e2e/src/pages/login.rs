//! Login page, for both applications.
//!
//! The two login forms differ only in markup, so one page object serves
//! both through [`LoginLocators::peopleops`] and [`LoginLocators::orange_hrm`].

use crate::base_page::BasePage;
use crate::locator::{Locator, TextMatch};
use crate::page_object::PageObject;
use crate::result::E2eResult;
use std::time::Duration;
use tracing::info;

/// How long each error candidate is given to appear
pub const ERROR_WAIT_TIMEOUT_MS: u64 = 1000;

/// Login form elements
#[derive(Debug, Clone)]
pub struct LoginLocators {
    /// Username or email input
    pub username_input: Locator,
    /// Password input
    pub password_input: Locator,
    /// Submit button
    pub sign_in_button: Locator,
    /// Form-level error banner
    pub error_message: Locator,
    /// Per-field validation messages
    pub field_errors: Locator,
    /// "Remember me" checkbox
    pub remember_me: Locator,
    /// Show/hide password control
    pub password_toggle: Locator,
    /// Places a failed login may be reported, checked in order
    pub error_candidates: Vec<Locator>,
}

impl LoginLocators {
    /// PeopleOps platform login form
    #[must_use]
    pub fn peopleops() -> Self {
        let error_message = Locator::css(
            r#".error, .error-message, [class*="error"], [role="alert"], .text-red-500, .text-danger"#,
        );
        Self {
            username_input: Locator::css("input#email"),
            password_input: Locator::css("input#password"),
            sign_in_button: Locator::css(r#"button[type="submit"]"#),
            field_errors: Locator::css(r#"[class*="field-error"], .invalid-feedback"#),
            remember_me: Locator::css(r#"input[type="checkbox"]"#),
            password_toggle: Locator::css(
                r#"button[aria-label*="password"], [class*="password-toggle"], [class*="show-password"]"#,
            ),
            error_candidates: vec![
                error_message.clone(),
                Locator::text(TextMatch::pattern("login failed")),
                Locator::text(TextMatch::pattern("invalid credentials")),
                Locator::text(TextMatch::pattern("error")),
                Locator::text(TextMatch::pattern("invalid")),
            ],
            error_message,
        }
    }

    /// OrangeHRM login form
    #[must_use]
    pub fn orange_hrm() -> Self {
        let error_message = Locator::css(".oxd-alert-content-text");
        Self {
            username_input: Locator::placeholder(TextMatch::exact("Username")),
            password_input: Locator::placeholder(TextMatch::exact("Password")),
            sign_in_button: Locator::css("button[type='submit']"),
            field_errors: Locator::css(".oxd-input-field-error-message"),
            remember_me: Locator::css("input[type='checkbox']"),
            password_toggle: Locator::css(".oxd-password-toggle"),
            error_candidates: vec![
                error_message.clone(),
                Locator::text(TextMatch::pattern("invalid credentials")),
            ],
            error_message,
        }
    }
}

/// Login page
#[derive(Debug, Clone)]
pub struct LoginPage {
    base: BasePage,
    path: &'static str,
    error_wait: Duration,
    /// Element locators
    pub locators: LoginLocators,
}

impl LoginPage {
    /// PeopleOps login at `/login`
    #[must_use]
    pub fn peopleops(base: BasePage) -> Self {
        Self {
            base,
            path: "/login",
            error_wait: Duration::from_millis(ERROR_WAIT_TIMEOUT_MS),
            locators: LoginLocators::peopleops(),
        }
    }

    /// OrangeHRM login at `/auth/login`
    #[must_use]
    pub fn orange_hrm(base: BasePage) -> Self {
        Self {
            base,
            path: "/auth/login",
            error_wait: Duration::from_millis(ERROR_WAIT_TIMEOUT_MS),
            locators: LoginLocators::orange_hrm(),
        }
    }

    /// Override how long each error candidate is awaited
    #[must_use]
    pub const fn with_error_wait(mut self, timeout: Duration) -> Self {
        self.error_wait = timeout;
        self
    }

    /// Open the login form
    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await
    }

    /// Type the username
    pub async fn enter_username(&self, username: &str) -> E2eResult<()> {
        self.base.fill_input(&self.locators.username_input, username).await
    }

    /// Type the password
    pub async fn enter_password(&self, password: &str) -> E2eResult<()> {
        self.base.fill_input(&self.locators.password_input, password).await
    }

    /// Submit the form
    pub async fn click_sign_in(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.sign_in_button).await
    }

    /// Fill both credentials and submit
    pub async fn login(&self, username: &str, password: &str) -> E2eResult<()> {
        info!(username, "login");
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.click_sign_in().await
    }

    /// Text of the error banner, empty when there is none
    pub async fn error_message(&self) -> E2eResult<String> {
        self.base.get_element_text(&self.locators.error_message).await
    }

    /// Whether any known error indicator becomes visible
    pub async fn is_error_visible(&self) -> E2eResult<bool> {
        for candidate in &self.locators.error_candidates {
            if self.base.is_visible_within(candidate, self.error_wait).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Field validation messages, in form order
    pub async fn field_errors(&self) -> E2eResult<Vec<String>> {
        self.base.all_text_contents(&self.locators.field_errors).await
    }

    /// Tick "remember me"
    pub async fn check_remember_me(&self) -> E2eResult<()> {
        self.base.check(&self.locators.remember_me).await
    }

    /// Whether "remember me" is ticked
    pub async fn is_remember_me_checked(&self) -> E2eResult<bool> {
        self.base.is_checked(&self.locators.remember_me).await
    }

    /// `type` attribute of the password input (`password` or `text`)
    pub async fn password_input_type(&self) -> E2eResult<Option<String>> {
        self.base
            .get_attribute(&self.locators.password_input, "type")
            .await
    }

    /// Show or hide the password
    pub async fn toggle_password_visibility(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.password_toggle).await
    }
}

impl PageObject for LoginPage {
    fn path(&self) -> &str {
        self.path
    }

    fn base(&self) -> &BasePage {
        &self.base
    }
}
