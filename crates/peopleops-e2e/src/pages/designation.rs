//! PeopleOps designation management.

use super::{button, toast_text};
use crate::base_page::BasePage;
use crate::data::DesignationData;
use crate::locator::{Locator, TextMatch};
use crate::page_object::{row_by_cell, PageObject};
use crate::result::E2eResult;
use std::time::Duration;
use tracing::info;

/// Settle time after a save, delete or assignment; searches and filters use half
pub const DEFAULT_SETTLE_MS: u64 = 1000;

/// Designation form and table elements
#[derive(Debug, Clone)]
pub struct DesignationLocators {
    pub add_button: Locator,
    pub title_input: Locator,
    pub department_dropdown: Locator,
    pub level_dropdown: Locator,
    pub save_button: Locator,
    pub cancel_button: Locator,
    pub search_input: Locator,
    pub search_button: Locator,
    pub export_button: Locator,
    pub filter_button: Locator,
    pub filter_department: Locator,
    pub apply_button: Locator,
    pub sort_button: Locator,
    pub sort_by_level_option: Locator,
    pub employee_id_input: Locator,
    pub confirm_button: Locator,
    pub table_rows: Locator,
    pub table_cell: Locator,
    pub success_message: Locator,
    pub error_message: Locator,
    pub validation_message: Locator,
}

impl Default for DesignationLocators {
    fn default() -> Self {
        Self {
            add_button: button("Add Designation"),
            title_input: Locator::css("#designationTitle"),
            department_dropdown: Locator::css("#department"),
            level_dropdown: Locator::css("#level"),
            save_button: button("Save"),
            cancel_button: button("Cancel"),
            search_input: Locator::css(r#"input[placeholder*="Search"]"#),
            search_button: button("Search"),
            export_button: button("Export"),
            filter_button: button("Filter"),
            filter_department: Locator::css("#filterDepartment"),
            apply_button: button("Apply"),
            sort_button: button("Sort"),
            sort_by_level_option: Locator::css("option").has_text("Level").first(),
            employee_id_input: Locator::css("#employeeId"),
            confirm_button: button("Confirm"),
            table_rows: Locator::css("table tbody tr"),
            table_cell: Locator::css("td"),
            success_message: Locator::css(".success-message, .alert-success"),
            error_message: Locator::css(".error-message, .alert-danger"),
            validation_message: Locator::css(".validation-message, .error"),
        }
    }
}

impl DesignationLocators {
    /// Row whose title cell equals `title`
    #[must_use]
    pub fn row(&self, title: &str) -> Locator {
        row_by_cell(&self.table_rows, &self.table_cell, title)
    }

    /// Button named `name` in the row of `title`
    #[must_use]
    pub fn row_button(&self, title: &str, name: &str) -> Locator {
        self.row(title)
            .locator(Locator::role_named("button", TextMatch::exact(name)))
    }
}

/// Designation list at `/designations`
#[derive(Debug, Clone)]
pub struct DesignationPage {
    base: BasePage,
    settle_ms: u64,
    /// Element locators
    pub locators: DesignationLocators,
}

impl DesignationPage {
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            settle_ms: DEFAULT_SETTLE_MS,
            locators: DesignationLocators::default(),
        }
    }

    /// Override the settle time after mutations
    #[must_use]
    pub const fn with_settle_ms(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await
    }

    pub async fn click_add_button(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.add_button).await
    }

    pub async fn click_save_button(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.save_button).await
    }

    pub async fn click_cancel_button(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.cancel_button).await
    }

    /// Fill the fields present in `data`
    pub async fn fill_designation_form(&self, data: &DesignationData) -> E2eResult<()> {
        let l = &self.locators;
        if let Some(title) = &data.title {
            self.base.fill_input(&l.title_input, title).await?;
        }
        if let Some(department) = &data.department {
            self.base.select_dropdown(&l.department_dropdown, department).await?;
        }
        if let Some(level) = &data.level {
            self.base.select_dropdown(&l.level_dropdown, level).await?;
        }
        Ok(())
    }

    /// Open the form, fill it, save and let the list refresh
    pub async fn add_designation(&self, data: &DesignationData) -> E2eResult<()> {
        info!(title = ?data.title, "add designation");
        self.click_add_button().await?;
        self.fill_designation_form(data).await?;
        self.click_save_button().await?;
        self.base.wait_for_timeout(self.settle_ms).await;
        Ok(())
    }

    /// Edit the row of `title` with the fields present in `updates`
    pub async fn update_designation(&self, title: &str, updates: &DesignationData) -> E2eResult<()> {
        info!(title, "update designation");
        self.search_designation(title).await?;
        self.base
            .click_element(self.locators.row_button(title, "Edit"))
            .await?;
        self.fill_designation_form(updates).await?;
        self.click_save_button().await?;
        self.base.wait_for_timeout(self.settle_ms).await;
        Ok(())
    }

    /// Delete the row of `title` and confirm
    pub async fn delete_designation(&self, title: &str) -> E2eResult<()> {
        info!(title, "delete designation");
        self.search_designation(title).await?;
        self.base.auto_dialogs(true).await?;
        self.base
            .click_element(self.locators.row_button(title, "Delete"))
            .await?;
        if self
            .base
            .is_visible_within(&self.locators.confirm_button, Duration::from_millis(self.settle_ms))
            .await?
        {
            self.base.click_element(&self.locators.confirm_button).await?;
        }
        self.base.wait_for_timeout(self.settle_ms).await;
        Ok(())
    }

    pub async fn search_designation(&self, title: &str) -> E2eResult<()> {
        self.base.fill_input(&self.locators.search_input, title).await?;
        self.base.click_element(&self.locators.search_button).await?;
        self.base.wait_for_timeout(self.settle_ms / 2).await;
        Ok(())
    }

    pub async fn filter_by_department(&self, department: &str) -> E2eResult<()> {
        let l = &self.locators;
        self.base.click_element(&l.filter_button).await?;
        self.base.select_dropdown(&l.filter_department, department).await?;
        self.base.click_element(&l.apply_button).await?;
        self.base.wait_for_timeout(self.settle_ms / 2).await;
        Ok(())
    }

    pub async fn sort_by_level(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.sort_button).await?;
        self.base
            .click_element(&self.locators.sort_by_level_option)
            .await?;
        self.base.wait_for_timeout(self.settle_ms / 2).await;
        Ok(())
    }

    /// Assign `title` to `employee_id`
    pub async fn assign_designation(&self, employee_id: &str, title: &str) -> E2eResult<()> {
        info!(employee_id, title, "assign designation");
        self.search_designation(title).await?;
        self.base
            .click_element(self.locators.row_button(title, "Assign"))
            .await?;
        self.base
            .fill_input(&self.locators.employee_id_input, employee_id)
            .await?;
        self.base.click_element(&self.locators.confirm_button).await?;
        self.base.wait_for_timeout(self.settle_ms).await;
        Ok(())
    }

    /// Text of every listed row
    pub async fn search_results(&self) -> E2eResult<Vec<String>> {
        self.base.all_text_contents(&self.locators.table_rows).await
    }

    pub async fn is_designation_in_table(&self, title: &str) -> E2eResult<bool> {
        self.base.is_element_visible(self.locators.row(title)).await
    }

    /// Rows whose title cell equals `title`
    pub async fn designation_count(&self, title: &str) -> E2eResult<usize> {
        self.base.count(self.locators.row(title)).await
    }

    pub async fn all_validation_messages(&self) -> E2eResult<Vec<String>> {
        self.base
            .all_text_contents(&self.locators.validation_message)
            .await
    }

    pub async fn success_message(&self) -> E2eResult<String> {
        let timeout = Duration::from_millis(self.base.action_timeout_ms());
        toast_text(&self.base, &self.locators.success_message, timeout).await
    }

    pub async fn error_message(&self) -> E2eResult<String> {
        let timeout = Duration::from_millis(self.base.action_timeout_ms());
        toast_text(&self.base, &self.locators.error_message, timeout).await
    }

    pub async fn is_export_button_visible(&self) -> E2eResult<bool> {
        self.base.is_element_visible(&self.locators.export_button).await
    }

    pub async fn export(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.export_button).await
    }
}

impl PageObject for DesignationPage {
    fn path(&self) -> &str {
        "/designations"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ElementHandle, MockDriver, MockReaction};
    use crate::pages::testing::{base, PEOPLEOPS};
    use std::sync::Arc;

    fn designation_page(mock: &Arc<MockDriver>) -> DesignationPage {
        let page = DesignationPage::new(base(mock, PEOPLEOPS)).with_settle_ms(0);
        let l = &page.locators;
        mock.set_element(&l.title_input, ElementHandle::new("input"));
        mock.set_element(&l.search_input, ElementHandle::new("input"));
        mock.set_element(&l.department_dropdown, ElementHandle::new("select"));
        mock.set_element(&l.level_dropdown, ElementHandle::new("select"));
        for b in [&l.add_button, &l.save_button, &l.search_button] {
            mock.set_element(b, ElementHandle::new("button"));
        }
        page
    }

    mod form_tests {
        use super::*;

        #[tokio::test]
        async fn test_add_designation_reports_success() {
            let mock = MockDriver::new().shared();
            let page = designation_page(&mock);
            mock.on_click(
                &page.locators.save_button,
                MockReaction::show(
                    &page.locators.success_message,
                    vec![ElementHandle::new("div").with_text("Designation created successfully")],
                ),
            );
            let data = DesignationData {
                title: Some("Senior Developer".into()),
                department: Some("Engineering".into()),
                level: Some("Level 3".into()),
            };
            page.add_designation(&data).await.unwrap();
            assert_eq!(mock.value_of(&page.locators.level_dropdown).as_deref(), Some("Level 3"));
            assert!(page.success_message().await.unwrap().contains("successfully"));
        }

        #[tokio::test]
        async fn test_absent_fields_are_not_touched() {
            let mock = MockDriver::new().shared();
            let page = designation_page(&mock);
            let data = DesignationData {
                department: Some("Engineering".into()),
                ..DesignationData::default()
            };
            page.add_designation(&data).await.unwrap();
            assert!(mock.calls("fill:").is_empty());
            assert_eq!(mock.calls("select:").len(), 1);
        }

        #[tokio::test]
        async fn test_cancel_and_export() {
            let mock = MockDriver::new().shared();
            let page = designation_page(&mock);
            let l = &page.locators;
            assert!(!page.is_export_button_visible().await.unwrap());
            mock.set_element(&l.export_button, ElementHandle::new("button"));
            mock.set_element(&l.cancel_button, ElementHandle::new("button"));
            assert!(page.is_export_button_visible().await.unwrap());
            page.click_add_button().await.unwrap();
            page.click_cancel_button().await.unwrap();
            page.export().await.unwrap();
            assert_eq!(
                mock.calls("click:"),
                vec![
                    format!("click:{}", l.add_button),
                    format!("click:{}", l.cancel_button),
                    format!("click:{}", l.export_button),
                ]
            );
        }
    }

    mod table_tests {
        use super::*;

        #[tokio::test]
        async fn test_update_targets_exact_title_row() {
            let mock = MockDriver::new().shared();
            let page = designation_page(&mock);
            let edit = page.locators.row_button("Acme Corp", "Edit");
            mock.set_element(&edit, ElementHandle::new("button"));
            let updates = DesignationData {
                level: Some("Level 4".into()),
                ..DesignationData::default()
            };
            page.update_designation("Acme Corp", &updates).await.unwrap();
            assert!(mock.was_called(&format!("click:{edit}")));
            assert_ne!(edit, page.locators.row_button("Acme Corp 2", "Edit"));
        }

        #[tokio::test]
        async fn test_assign_fills_employee_and_confirms() {
            let mock = MockDriver::new().shared();
            let page = designation_page(&mock);
            mock.set_element(page.locators.row_button("Architect", "Assign"), ElementHandle::new("button"));
            mock.set_element(&page.locators.employee_id_input, ElementHandle::new("input"));
            mock.set_element(&page.locators.confirm_button, ElementHandle::new("button"));
            page.assign_designation("EMP001", "Architect").await.unwrap();
            assert_eq!(mock.value_of(&page.locators.employee_id_input).as_deref(), Some("EMP001"));
            assert!(mock.was_called(&format!("click:{}", page.locators.confirm_button)));
        }

        #[tokio::test]
        async fn test_filter_and_sort() {
            let mock = MockDriver::new().shared();
            let page = designation_page(&mock);
            let l = &page.locators;
            for b in [&l.filter_button, &l.apply_button, &l.sort_button, &l.sort_by_level_option] {
                mock.set_element(b, ElementHandle::new("button"));
            }
            mock.set_element(&l.filter_department, ElementHandle::new("select"));
            page.filter_by_department("Engineering").await.unwrap();
            page.sort_by_level().await.unwrap();
            assert_eq!(mock.value_of(&l.filter_department).as_deref(), Some("Engineering"));
            assert_eq!(mock.calls("click:").len(), 4);
        }

        #[tokio::test]
        async fn test_delete_confirms_when_modal_shows() {
            let mock = MockDriver::new().shared();
            let page = designation_page(&mock);
            let l = &page.locators;
            let delete = l.row_button("Architect", "Delete");
            mock.set_element(&delete, ElementHandle::new("button"));
            page.delete_designation("Architect").await.unwrap();
            assert!(!mock.was_called(&format!("click:{}", l.confirm_button)));

            mock.on_click(
                &delete,
                MockReaction::show(&l.confirm_button, vec![ElementHandle::new("button")]),
            );
            page.delete_designation("Architect").await.unwrap();
            assert_eq!(
                mock.calls("click:").last().cloned(),
                Some(format!("click:{}", l.confirm_button))
            );
            assert!(mock.was_called("evaluate:"));
        }

        #[tokio::test]
        async fn test_duplicate_count_and_validation() {
            let mock = MockDriver::new().shared();
            let page = designation_page(&mock);
            mock.set_element(page.locators.row("QA Lead"), ElementHandle::new("tr"));
            mock.set_elements(
                &page.locators.validation_message,
                vec![ElementHandle::new("span").with_text("Designation is required")],
            );
            assert_eq!(page.designation_count("QA Lead").await.unwrap(), 1);
            assert_eq!(
                page.all_validation_messages().await.unwrap(),
                vec!["Designation is required"]
            );
        }
    }
}
