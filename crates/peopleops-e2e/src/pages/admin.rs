//! OrangeHRM system user administration.

use super::{autocomplete, button, choose_option, toast_text};
use crate::base_page::BasePage;
use crate::data::UserFormData;
use crate::locator::{Locator, TextMatch};
use crate::page_object::{row_by_cell, PageObject};
use crate::result::E2eResult;
use std::time::Duration;
use tracing::info;

/// How long a toast is awaited
pub const TOAST_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct AdminLocators {
    pub heading: Locator,
    pub add_button: Locator,
    pub search_button: Locator,
    pub reset_button: Locator,
    pub save_button: Locator,
    pub cancel_button: Locator,
    pub confirm_delete_button: Locator,
    /// Role and status `oxd-select` dropdowns, in that order
    pub dropdowns: Locator,
    pub employee_input: Locator,
    /// Unstyled text inputs; the username is the second one
    pub text_inputs: Locator,
    pub password_inputs: Locator,
    pub search_input: Locator,
    pub table_rows: Locator,
    pub table_cell: Locator,
    pub delete_icon: Locator,
    pub edit_icon: Locator,
    pub toast: Locator,
    pub field_errors: Locator,
    /// Options of the open dropdown
    pub options: Locator,
    pub no_records: Locator,
}

impl Default for AdminLocators {
    fn default() -> Self {
        Self {
            heading: Locator::role_named("heading", TextMatch::exact("Admin")),
            add_button: button("Add"),
            search_button: button("Search"),
            reset_button: button("Reset"),
            save_button: button("Save"),
            cancel_button: button("Cancel"),
            confirm_delete_button: button("Yes, Delete"),
            dropdowns: Locator::css(".oxd-select-text"),
            employee_input: Locator::css(".oxd-autocomplete-text-input > input"),
            text_inputs: Locator::css(r#"input[autocomplete="off"]"#),
            password_inputs: Locator::css(r#"input[type="password"]"#),
            search_input: Locator::placeholder(TextMatch::exact("Type for hints...")),
            table_rows: Locator::css(".oxd-table-body").locator(Locator::css(".oxd-table-row")),
            table_cell: Locator::css(".oxd-table-cell"),
            delete_icon: Locator::css(".oxd-icon.bi-trash"),
            edit_icon: Locator::css(".oxd-table-cell-actions button"),
            toast: Locator::css(".oxd-toast-content"),
            field_errors: Locator::css(".oxd-form-field-error"),
            options: Locator::role("option"),
            no_records: Locator::text("No Records Found"),
        }
    }
}

impl AdminLocators {
    #[must_use]
    pub fn role_dropdown(&self) -> Locator {
        self.dropdowns.clone().nth(0)
    }

    #[must_use]
    pub fn status_dropdown(&self) -> Locator {
        self.dropdowns.clone().nth(1)
    }

    #[must_use]
    pub fn username_input(&self) -> Locator {
        self.text_inputs.clone().nth(1)
    }

    #[must_use]
    pub fn password_input(&self) -> Locator {
        self.password_inputs.clone().nth(0)
    }

    #[must_use]
    pub fn confirm_password_input(&self) -> Locator {
        self.password_inputs.clone().nth(1)
    }

    /// Row whose username cell is exactly `username`
    #[must_use]
    pub fn user_row(&self, username: &str) -> Locator {
        row_by_cell(&self.table_rows, &self.table_cell, username)
    }
}

/// System users at `/admin/viewSystemUsers`
#[derive(Debug, Clone)]
pub struct AdminPage {
    base: BasePage,
    toast_timeout: Duration,
    pub locators: AdminLocators,
}

impl AdminPage {
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            toast_timeout: Duration::from_millis(TOAST_TIMEOUT_MS),
            locators: AdminLocators::default(),
        }
    }

    #[must_use]
    pub const fn with_toast_timeout(mut self, timeout: Duration) -> Self {
        self.toast_timeout = timeout;
        self
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await
    }

    pub async fn is_heading_visible(&self) -> E2eResult<bool> {
        self.base
            .is_visible_within(&self.locators.heading, Duration::from_millis(self.base.action_timeout_ms()))
            .await
    }

    /// Open the add form, fill every field and save.
    ///
    /// The confirmation password defaults to the password.
    pub async fn add_user(&self, user: &UserFormData) -> E2eResult<()> {
        info!(username = %user.username, role = %user.role, "add system user");
        let l = &self.locators;
        self.base.click_element(&l.add_button).await?;
        choose_option(&self.base, &l.role_dropdown(), &user.role).await?;
        autocomplete(&self.base, &l.employee_input, &user.employee_name).await?;
        choose_option(&self.base, &l.status_dropdown(), &user.status).await?;
        self.base.fill_input(l.username_input(), &user.username).await?;
        self.base.fill_input(l.password_input(), &user.password).await?;
        let confirm = user.confirm_password.as_deref().unwrap_or(&user.password);
        self.base.fill_input(l.confirm_password_input(), confirm).await?;
        self.base.click_element(&l.save_button).await
    }

    pub async fn search_user_by_username(&self, username: &str) -> E2eResult<()> {
        let l = &self.locators;
        self.base.fill_input(&l.search_input, username).await?;
        self.base.click_element(&l.search_button).await
    }

    pub async fn search_user_by_role(&self, role: &str) -> E2eResult<()> {
        choose_option(&self.base, &self.locators.role_dropdown(), role).await?;
        self.base.click_element(&self.locators.search_button).await
    }

    pub async fn search_user_by_status(&self, status: &str) -> E2eResult<()> {
        choose_option(&self.base, &self.locators.status_dropdown(), status).await?;
        self.base.click_element(&self.locators.search_button).await
    }

    pub async fn reset_search(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.reset_button).await
    }

    /// Trash the row for `username` and accept the confirmation
    pub async fn delete_user(&self, username: &str) -> E2eResult<()> {
        info!(username, "delete system user");
        let l = &self.locators;
        let trash = l.user_row(username).locator(l.delete_icon.clone());
        self.base.click_element(trash).await?;
        self.base.click_element(&l.confirm_delete_button).await
    }

    /// Open the edit form for `username`
    pub async fn edit_user(&self, username: &str) -> E2eResult<()> {
        let l = &self.locators;
        let edit = l.user_row(username).locator(l.edit_icon.clone().last());
        self.base.click_element(edit).await
    }

    /// Edit `username`, switch its status and save
    pub async fn change_user_status(&self, username: &str, status: &str) -> E2eResult<()> {
        info!(username, status, "change user status");
        self.edit_user(username).await?;
        choose_option(&self.base, &self.locators.status_dropdown(), status).await?;
        self.base.click_element(&self.locators.save_button).await
    }

    /// Open `dropdown` and list its options
    pub async fn dropdown_options(&self, dropdown: &Locator) -> E2eResult<Vec<String>> {
        self.base.click_element(dropdown).await?;
        self.base.all_text_contents(&self.locators.options).await
    }

    pub async fn is_no_records_displayed(&self) -> E2eResult<bool> {
        self.base.is_element_visible(&self.locators.no_records).await
    }

    pub async fn is_user_listed(&self, username: &str) -> E2eResult<bool> {
        self.base
            .is_element_visible(self.locators.user_row(username))
            .await
    }

    pub async fn row_count(&self) -> E2eResult<usize> {
        self.base.count(&self.locators.table_rows).await
    }

    pub async fn field_errors(&self) -> E2eResult<Vec<String>> {
        self.base.all_text_contents(&self.locators.field_errors).await
    }

    pub async fn toast_message(&self) -> E2eResult<String> {
        toast_text(&self.base, &self.locators.toast, self.toast_timeout).await
    }
}

impl PageObject for AdminPage {
    fn path(&self) -> &str {
        "/admin/viewSystemUsers"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }
}
