//! PeopleOps employee management.

use super::{button, toast_text};
use crate::base_page::BasePage;
use crate::data::constants::employee_status;
use crate::data::EmployeeData;
use crate::locator::Locator;
use crate::page_object::{row_by_cell, PageObject};
use crate::result::E2eResult;
use std::time::Duration;
use tracing::info;

/// How long a delete confirmation modal is given to appear
const CONFIRM_WAIT_MS: u64 = 1000;

/// Input matched by `name` or `id`
fn field(name: &str) -> Locator {
    Locator::css(format!(r#"input[name="{name}"], input[id="{name}"]"#))
}

/// Employee form, table and message elements
#[derive(Debug, Clone)]
pub struct EmployeeLocators {
    pub employee_code_input: Locator,
    pub first_name_input: Locator,
    pub last_name_input: Locator,
    pub email_input: Locator,
    pub hire_date_input: Locator,
    pub exit_date_input: Locator,
    pub status_dropdown: Locator,
    pub internal_designation_input: Locator,
    pub billing_designation_input: Locator,
    pub save_button: Locator,
    pub cancel_button: Locator,
    pub add_employee_button: Locator,
    pub export_button: Locator,
    /// Confirmation button of the delete modal
    pub confirm_button: Locator,
    pub success_message: Locator,
    pub error_message: Locator,
    pub validation_error: Locator,
    pub warning_message: Locator,
    pub search_input: Locator,
    /// Body rows of the employee table
    pub table_rows: Locator,
    /// Cells of a table row
    pub table_cell: Locator,
}

impl Default for EmployeeLocators {
    fn default() -> Self {
        Self {
            employee_code_input: field("employeeCode"),
            first_name_input: field("firstName"),
            last_name_input: field("lastName"),
            email_input: field("email"),
            hire_date_input: field("hireDate"),
            exit_date_input: field("exitDate"),
            status_dropdown: Locator::css(r#"select[name="status"], select[id="status"]"#),
            internal_designation_input: field("internalDesignation"),
            billing_designation_input: field("billingDesignation"),
            save_button: button("Save").or(Locator::css(r#"button[type="submit"]"#)),
            cancel_button: button("Cancel"),
            add_employee_button: button("Add Employee").or(button("Create Employee")),
            export_button: button("Export"),
            confirm_button: button("Confirm").or(button("Yes")),
            success_message: Locator::css(".success, .alert-success")
                .or(Locator::css(r#"[role="alert"]"#).has_text("success")),
            error_message: Locator::css(".error, .alert-error, .alert-danger")
                .or(Locator::css(r#"[role="alert"]"#).has_text("error")),
            validation_error: Locator::css(".validation-error, .field-error, .invalid-feedback"),
            warning_message: Locator::css(".warning, .alert-warning"),
            search_input: Locator::css(r#"input[placeholder*="Search"], input[type="search"]"#),
            table_rows: Locator::css("table tbody tr, .employee-list .employee-row"),
            table_cell: Locator::css("td"),
        }
    }
}

impl EmployeeLocators {
    /// Row whose code cell equals `code`
    #[must_use]
    pub fn row(&self, code: &str) -> Locator {
        row_by_cell(&self.table_rows, &self.table_cell, code)
    }

    /// Edit control in the row of `code`
    #[must_use]
    pub fn edit_button(&self, code: &str) -> Locator {
        self.row(code)
            .locator(button("Edit").or(Locator::css(r#"[aria-label="Edit"]"#)))
    }

    /// Delete control in the row of `code`
    #[must_use]
    pub fn delete_button(&self, code: &str) -> Locator {
        self.row(code)
            .locator(button("Delete").or(Locator::css(r#"[aria-label="Delete"]"#)))
    }

    /// Validation messages next to `input`
    #[must_use]
    pub fn field_validation(&self, input: &Locator) -> Locator {
        input.clone().first().parent().locator(self.validation_error.clone())
    }
}

/// Employee list and form at `/employees`
#[derive(Debug, Clone)]
pub struct EmployeePage {
    base: BasePage,
    /// Element locators
    pub locators: EmployeeLocators,
}

impl EmployeePage {
    /// Create the page object
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            locators: EmployeeLocators::default(),
        }
    }

    /// Open the employee list
    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await
    }

    fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.base.action_timeout_ms())
    }

    pub async fn click_add_employee(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.add_employee_button).await
    }

    pub async fn click_save(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.save_button).await
    }

    pub async fn click_cancel(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.cancel_button).await
    }

    pub async fn fill_employee_code(&self, code: &str) -> E2eResult<()> {
        self.base.fill_input(&self.locators.employee_code_input, code).await
    }

    pub async fn fill_exit_date(&self, date: &str) -> E2eResult<()> {
        self.base.fill_input(&self.locators.exit_date_input, date).await
    }

    pub async fn select_status(&self, status: &str) -> E2eResult<()> {
        self.base.select_dropdown(&self.locators.status_dropdown, status).await
    }

    async fn fill_mandatory(&self, employee: &EmployeeData) -> E2eResult<()> {
        let l = &self.locators;
        self.base.fill_input(&l.employee_code_input, &employee.code).await?;
        self.base.fill_input(&l.first_name_input, &employee.first_name).await?;
        self.base.fill_input(&l.last_name_input, &employee.last_name).await?;
        self.base.fill_input(&l.email_input, &employee.email).await?;
        self.base.fill_input(&l.hire_date_input, &employee.hire_date).await
    }

    /// Fill every field present in `employee` without submitting
    pub async fn fill_employee_form(&self, employee: &EmployeeData) -> E2eResult<()> {
        self.fill_mandatory(employee).await?;
        let l = &self.locators;
        if let Some(exit) = &employee.exit_date {
            self.base.fill_input(&l.exit_date_input, exit).await?;
        }
        if let Some(status) = &employee.status {
            self.select_status(status).await?;
        }
        if let Some(internal) = &employee.internal_designation {
            self.base.fill_input(&l.internal_designation_input, internal).await?;
        }
        if let Some(billing) = &employee.billing_designation {
            self.base.fill_input(&l.billing_designation_input, billing).await?;
        }
        Ok(())
    }

    /// Fill code, names, email and hire date, then save
    pub async fn create_employee_with_mandatory_fields(&self, employee: &EmployeeData) -> E2eResult<()> {
        info!(code = %employee.code, "create employee");
        self.fill_mandatory(employee).await?;
        self.click_save().await
    }

    /// Fill every present field, then save
    pub async fn create_employee_with_all_fields(&self, employee: &EmployeeData) -> E2eResult<()> {
        info!(code = %employee.code, "create employee with all fields");
        self.fill_employee_form(employee).await?;
        self.click_save().await
    }

    /// Type into the table search box
    pub async fn search_employee(&self, term: &str) -> E2eResult<()> {
        self.base.fill_input(&self.locators.search_input, term).await
    }

    /// Text of every visible table row
    pub async fn search_results(&self) -> E2eResult<Vec<String>> {
        self.base.all_text_contents(self.locators.table_rows.clone().visible()).await
    }

    /// Open the edit form of `code`
    pub async fn click_edit_employee_by_code(&self, code: &str) -> E2eResult<()> {
        self.base.click_element(self.locators.edit_button(code)).await
    }

    /// Search, edit, change status and save
    pub async fn update_employee_status(&self, code: &str, status: &str) -> E2eResult<()> {
        info!(code, status, "update employee status");
        self.search_employee(code).await?;
        self.click_edit_employee_by_code(code).await?;
        self.select_status(status).await?;
        self.click_save().await
    }

    /// Delete `code`, accepting the browser dialog or confirmation modal
    pub async fn delete_employee(&self, code: &str) -> E2eResult<()> {
        info!(code, "delete employee");
        self.search_employee(code).await?;
        self.base.auto_dialogs(true).await?;
        self.base.click_element(self.locators.delete_button(code)).await?;
        if self
            .base
            .is_visible_within(&self.locators.confirm_button, Duration::from_millis(CONFIRM_WAIT_MS))
            .await?
        {
            self.base.click_element(&self.locators.confirm_button).await?;
        }
        Ok(())
    }

    /// Search, edit, set exit date and status `Exited`, save
    pub async fn mark_employee_as_exited(&self, code: &str, exit_date: &str) -> E2eResult<()> {
        self.search_employee(code).await?;
        self.click_edit_employee_by_code(code).await?;
        self.fill_exit_date(exit_date).await?;
        self.select_status(employee_status::EXITED).await?;
        self.click_save().await
    }

    /// Whether a row with code cell `code` is shown
    pub async fn is_employee_in_table(&self, code: &str) -> E2eResult<bool> {
        self.base.is_element_visible(self.locators.row(code)).await
    }

    pub async fn is_save_button_enabled(&self) -> E2eResult<bool> {
        self.base.is_element_enabled(&self.locators.save_button).await
    }

    pub async fn is_export_button_visible(&self) -> E2eResult<bool> {
        self.base.is_element_visible(&self.locators.export_button).await
    }

    /// Start an export of the employee list
    pub async fn export(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.export_button).await
    }

    /// Success banner text, waiting up to the action timeout
    pub async fn success_message(&self) -> E2eResult<String> {
        toast_text(&self.base, &self.locators.success_message, self.message_timeout()).await
    }

    /// Error banner text, waiting up to the action timeout
    pub async fn error_message(&self) -> E2eResult<String> {
        toast_text(&self.base, &self.locators.error_message, self.message_timeout()).await
    }

    pub async fn warning_message(&self) -> E2eResult<String> {
        toast_text(&self.base, &self.locators.warning_message, self.message_timeout()).await
    }

    pub async fn is_success_message_displayed(&self) -> E2eResult<bool> {
        self.base.is_element_visible(&self.locators.success_message).await
    }

    pub async fn is_error_message_displayed(&self) -> E2eResult<bool> {
        self.base.is_element_visible(&self.locators.error_message).await
    }

    pub async fn is_validation_error_displayed(&self) -> E2eResult<bool> {
        self.base.is_element_visible(&self.locators.validation_error).await
    }

    /// First validation message on the form
    pub async fn validation_error(&self) -> E2eResult<String> {
        self.base.get_element_text(&self.locators.validation_error).await
    }

    /// Every validation message on the form
    pub async fn all_validation_messages(&self) -> E2eResult<Vec<String>> {
        self.base.all_text_contents(&self.locators.validation_error).await
    }

    /// Validation message attached to the code input
    pub async fn employee_code_validation(&self) -> E2eResult<String> {
        let target = self.locators.field_validation(&self.locators.employee_code_input);
        self.base.get_element_text(target).await
    }

    /// Validation message attached to the email input
    pub async fn email_validation(&self) -> E2eResult<String> {
        let target = self.locators.field_validation(&self.locators.email_input);
        self.base.get_element_text(target).await
    }
}

impl PageObject for EmployeePage {
    fn path(&self) -> &str {
        "/employees"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }
}
