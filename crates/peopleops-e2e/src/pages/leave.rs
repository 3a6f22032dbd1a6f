//! OrangeHRM leave module.

use super::{button, choose_option, toast_text};
use crate::base_page::BasePage;
use crate::data::LeaveRequest;
use crate::locator::{Locator, TextMatch};
use crate::page_object::PageObject;
use crate::result::E2eResult;
use std::time::Duration;
use tracing::info;

/// How long a toast is awaited
pub const TOAST_TIMEOUT_MS: u64 = 5000;

/// Status filter label for a short status name
#[must_use]
pub fn status_label(status: &str) -> &str {
    match status {
        "Pending" => "Pending Approval",
        other => other,
    }
}

/// Apply-form fields that can carry `aria-required`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveField {
    LeaveType,
    FromDate,
    ToDate,
    Comment,
}

/// Leave tabs, apply form, list and filters
#[derive(Debug, Clone)]
pub struct LeaveLocators {
    pub apply_tab: Locator,
    pub my_leave_tab: Locator,
    pub leave_list_tab: Locator,
    pub entitlements_tab: Locator,
    /// Every `oxd-select` dropdown, in page order
    pub dropdowns: Locator,
    pub options: Locator,
    pub date_inputs: Locator,
    pub comment_box: Locator,
    pub apply_button: Locator,
    pub cancel_button: Locator,
    pub toast: Locator,
    pub toast_error: Locator,
    pub field_errors: Locator,
    pub leave_table: Locator,
    pub table_rows: Locator,
    pub table_cell: Locator,
    pub search_button: Locator,
    pub reset_button: Locator,
}

impl Default for LeaveLocators {
    fn default() -> Self {
        Self {
            apply_tab: Locator::css(r##"a[href="#/leave/applyLeave"]"##),
            my_leave_tab: Locator::css(r##"a[href="#/leave/myLeaveList"]"##),
            leave_list_tab: Locator::css(r##"a[href="#/leave/leaveRequestList"]"##),
            entitlements_tab: Locator::css(r##"a[href="#/leave/viewLeaveEntitlements"]"##),
            dropdowns: Locator::css(".oxd-select-text-input"),
            options: Locator::role("option"),
            date_inputs: Locator::placeholder(TextMatch::exact("yyyy-mm-dd")),
            comment_box: Locator::css("textarea.oxd-textarea"),
            apply_button: Locator::css(r#"button[type="submit"]"#),
            cancel_button: button("Cancel"),
            toast: Locator::css(".oxd-toast-content"),
            toast_error: Locator::css(".oxd-text--toast-message"),
            field_errors: Locator::css(".oxd-form-field-error"),
            leave_table: Locator::css(".oxd-table"),
            table_rows: Locator::css(".oxd-table-body").locator(Locator::css(".oxd-table-row")),
            table_cell: Locator::css(".oxd-table-cell"),
            search_button: button("Search"),
            reset_button: button("Reset"),
        }
    }
}

impl LeaveLocators {
    /// Leave type dropdown on the apply form and the list filter
    #[must_use]
    pub fn leave_type_dropdown(&self) -> Locator {
        self.dropdowns.clone().first()
    }

    /// Status filter on the leave list
    #[must_use]
    pub fn status_filter(&self) -> Locator {
        self.dropdowns.clone().nth(1)
    }

    #[must_use]
    pub fn from_date(&self) -> Locator {
        self.date_inputs.clone().nth(0)
    }

    #[must_use]
    pub fn to_date(&self) -> Locator {
        self.date_inputs.clone().nth(1)
    }

    /// Button named `name` inside list row `row`
    #[must_use]
    pub fn row_button(&self, row: usize, name: &str) -> Locator {
        self.table_rows.clone().nth(row).locator(button(name))
    }

    #[must_use]
    pub fn field(&self, field: LeaveField) -> Locator {
        match field {
            LeaveField::LeaveType => self.leave_type_dropdown(),
            LeaveField::FromDate => self.from_date(),
            LeaveField::ToDate => self.to_date(),
            LeaveField::Comment => self.comment_box.clone(),
        }
    }
}

/// Leave list at `/leave/viewLeaveList`
#[derive(Debug, Clone)]
pub struct LeavePage {
    base: BasePage,
    toast_timeout: Duration,
    /// Element locators
    pub locators: LeaveLocators,
}

impl LeavePage {
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            toast_timeout: Duration::from_millis(TOAST_TIMEOUT_MS),
            locators: LeaveLocators::default(),
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

    pub async fn open_apply_tab(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.apply_tab).await
    }

    pub async fn open_my_leave_tab(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.my_leave_tab).await
    }

    pub async fn open_leave_list_tab(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.leave_list_tab).await
    }

    pub async fn open_entitlements_tab(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.entitlements_tab).await
    }

    pub async fn select_leave_type(&self, leave_type: &str) -> E2eResult<()> {
        choose_option(&self.base, &self.locators.leave_type_dropdown(), leave_type).await
    }

    /// Fill the apply form and submit; the comment is skipped when absent
    pub async fn apply_leave(&self, request: &LeaveRequest) -> E2eResult<()> {
        info!(leave_type = %request.leave_type, from = %request.from_date, to = %request.to_date, "apply leave");
        let l = &self.locators;
        self.select_leave_type(&request.leave_type).await?;
        self.base.fill_input(l.from_date(), &request.from_date).await?;
        self.base.fill_input(l.to_date(), &request.to_date).await?;
        if let Some(comment) = &request.comment {
            self.base.fill_input(&l.comment_box, comment).await?;
        }
        self.base.click_element(&l.apply_button).await
    }

    pub async fn approve_leave(&self, row: usize) -> E2eResult<()> {
        info!(row, "approve leave");
        self.base
            .click_element(self.locators.row_button(row, "Approve"))
            .await
    }

    pub async fn reject_leave(&self, row: usize) -> E2eResult<()> {
        info!(row, "reject leave");
        self.base
            .click_element(self.locators.row_button(row, "Reject"))
            .await
    }

    /// Filter the list by status and search; `Pending` maps to "Pending Approval"
    pub async fn filter_by_status(&self, status: &str) -> E2eResult<()> {
        choose_option(&self.base, &self.locators.status_filter(), status_label(status)).await?;
        self.base.click_element(&self.locators.search_button).await
    }

    /// Narrow the list to `from..=to` and search
    pub async fn filter_by_date_range(&self, from: &str, to: &str) -> E2eResult<()> {
        self.base.clear_and_fill(self.locators.from_date(), from).await?;
        self.base.clear_and_fill(self.locators.to_date(), to).await?;
        self.base.click_element(&self.locators.search_button).await
    }

    /// Abandon the apply form
    pub async fn cancel_application(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.cancel_button).await
    }

    pub async fn reset_filters(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.reset_button).await
    }

    /// Text of the first entitlement row mentioning `leave_type`
    pub async fn leave_balance(&self, leave_type: &str) -> E2eResult<Option<String>> {
        let rows = self.base.all_text_contents(&self.locators.table_rows).await?;
        Ok(rows.into_iter().find(|row| row.contains(leave_type)))
    }

    /// Status cell (last column) of `row`
    pub async fn leave_status(&self, row: usize) -> E2eResult<String> {
        let cell = self
            .locators
            .table_rows
            .clone()
            .nth(row)
            .locator(self.locators.table_cell.clone().last());
        self.base.get_element_text(cell).await
    }

    /// Toast text, empty when none appears
    pub async fn toast_message(&self) -> E2eResult<String> {
        toast_text(&self.base, &self.locators.toast, self.toast_timeout).await
    }

    pub async fn field_errors(&self) -> E2eResult<Vec<String>> {
        self.base.all_text_contents(&self.locators.field_errors).await
    }

    pub async fn row_count(&self) -> E2eResult<usize> {
        self.base.count(&self.locators.table_rows).await
    }

    pub async fn is_apply_form_displayed(&self) -> E2eResult<bool> {
        self.base
            .is_element_visible(self.locators.leave_type_dropdown())
            .await
    }

    pub async fn is_leave_table_displayed(&self) -> E2eResult<bool> {
        self.base.is_element_visible(&self.locators.leave_table).await
    }

    /// Whether `field` carries `aria-required="true"`
    pub async fn is_field_required(&self, field: LeaveField) -> E2eResult<bool> {
        Ok(self
            .base
            .get_attribute(self.locators.field(field), "aria-required")
            .await?
            .is_some_and(|v| v == "true"))
    }

    /// Open the leave type dropdown and list its options
    pub async fn dropdown_options(&self) -> E2eResult<Vec<String>> {
        self.base
            .click_element(self.locators.leave_type_dropdown())
            .await?;
        self.base.all_text_contents(&self.locators.options).await
    }

    pub async fn from_date_value(&self) -> E2eResult<String> {
        self.base.input_value(self.locators.from_date()).await
    }

    pub async fn to_date_value(&self) -> E2eResult<String> {
        self.base.input_value(self.locators.to_date()).await
    }
}

impl PageObject for LeavePage {
    fn path(&self) -> &str {
        "/leave/viewLeaveList"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ElementHandle, MockDriver, MockReaction};
    use crate::pages::testing::{base, HRM};
    use std::sync::Arc;

    fn leave_page(mock: &Arc<MockDriver>) -> LeavePage {
        let page = LeavePage::new(base(mock, HRM)).with_toast_timeout(Duration::from_millis(50));
        let l = &page.locators;
        mock.set_element(l.leave_type_dropdown(), ElementHandle::new("div"));
        mock.set_element(l.from_date(), ElementHandle::new("input"));
        mock.set_element(l.to_date(), ElementHandle::new("input"));
        mock.set_element(&l.comment_box, ElementHandle::new("textarea"));
        mock.set_element(&l.apply_button, ElementHandle::new("button"));
        mock.set_element(
            Locator::role_named("option", TextMatch::exact("CAN - Personal")),
            ElementHandle::new("div"),
        );
        page
    }

    fn request(comment: Option<&str>) -> LeaveRequest {
        LeaveRequest {
            leave_type: "CAN - Personal".into(),
            from_date: "2025-12-25".into(),
            to_date: "2025-12-20".into(),
            comment: comment.map(String::from),
        }
    }

    mod apply_tests {
        use super::*;

        #[tokio::test]
        async fn test_apply_without_comment() {
            let mock = MockDriver::new().shared();
            let page = leave_page(&mock);
            page.apply_leave(&request(None)).await.unwrap();
            assert_eq!(mock.calls("fill:").len(), 2);
            assert_eq!(page.from_date_value().await.unwrap(), "2025-12-25");
            assert_eq!(page.to_date_value().await.unwrap(), "2025-12-20");
            assert_eq!(mock.value_of(&page.locators.comment_box), None);
        }

        #[tokio::test]
        async fn test_reversed_range_shows_error_toast() {
            let mock = MockDriver::new().shared();
            let page = leave_page(&mock);
            mock.on_click(
                &page.locators.apply_button,
                MockReaction::show(
                    &page.locators.toast,
                    vec![ElementHandle::new("div").with_text("To date should be after from date")],
                ),
            );
            page.apply_leave(&request(Some("Holiday"))).await.unwrap();
            assert!(!page.toast_message().await.unwrap().is_empty());
            assert_eq!(page.row_count().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_required_fields() {
            let mock = MockDriver::new().shared();
            let page = leave_page(&mock);
            mock.set_element(
                page.locators.from_date(),
                ElementHandle::new("input").with_attribute("aria-required", "true"),
            );
            assert!(page.is_field_required(LeaveField::FromDate).await.unwrap());
            assert!(!page.is_field_required(LeaveField::Comment).await.unwrap());
        }

        #[tokio::test]
        async fn test_dropdown_options() {
            let mock = MockDriver::new().shared();
            let page = leave_page(&mock);
            mock.set_elements(
                &page.locators.options,
                vec![
                    ElementHandle::new("div").with_text("CAN - Personal"),
                    ElementHandle::new("div").with_text("CAN - Vacation"),
                ],
            );
            assert_eq!(page.dropdown_options().await.unwrap().len(), 2);
        }
    }

    mod tab_tests {
        use super::*;

        #[tokio::test]
        async fn test_tabs_follow_their_links() {
            let mock = MockDriver::new().shared();
            let page = leave_page(&mock);
            let l = &page.locators;
            for (tab, path) in [
                (&l.my_leave_tab, "myLeaveList"),
                (&l.leave_list_tab, "leaveRequestList"),
                (&l.entitlements_tab, "viewLeaveEntitlements"),
            ] {
                mock.set_element(tab, ElementHandle::new("a"));
                mock.on_click(tab, MockReaction::navigate(format!("{HRM}/leave/{path}")));
            }
            page.open_my_leave_tab().await.unwrap();
            assert!(page.base().current_url().await.unwrap().ends_with("myLeaveList"));
            page.open_leave_list_tab().await.unwrap();
            assert!(page.base().current_url().await.unwrap().ends_with("leaveRequestList"));
            page.open_entitlements_tab().await.unwrap();
            assert!(page.base().current_url().await.unwrap().ends_with("viewLeaveEntitlements"));
        }

        #[tokio::test]
        async fn test_cancel_application() {
            let mock = MockDriver::new().shared();
            let page = leave_page(&mock);
            assert!(page.cancel_application().await.unwrap_err().is_timeout());
            mock.set_element(&page.locators.cancel_button, ElementHandle::new("button"));
            page.cancel_application().await.unwrap();
        }

        #[test]
        fn test_field_locators() {
            let l = LeaveLocators::default();
            assert_eq!(l.field(LeaveField::FromDate), l.from_date());
            assert_eq!(l.field(LeaveField::ToDate), l.to_date());
            assert_eq!(l.field(LeaveField::LeaveType), l.leave_type_dropdown());
            assert_ne!(l.from_date(), l.to_date());
        }
    }

    mod list_tests {
        use super::*;

        #[test]
        fn test_status_label() {
            assert_eq!(status_label("Pending"), "Pending Approval");
            assert_eq!(status_label("Rejected"), "Rejected");
        }

        #[tokio::test]
        async fn test_filter_pending_picks_pending_approval() {
            let mock = MockDriver::new().shared();
            let page = leave_page(&mock);
            mock.set_element(page.locators.status_filter(), ElementHandle::new("div"));
            mock.set_element(
                Locator::role_named("option", TextMatch::exact("Pending Approval")),
                ElementHandle::new("div"),
            );
            mock.set_element(&page.locators.search_button, ElementHandle::new("button"));
            page.filter_by_status("Pending").await.unwrap();
            assert!(mock.was_called(r#"click:role=option[name="Pending Approval"s]"#));
        }

        #[tokio::test]
        async fn test_approve_and_reject_target_row() {
            let mock = MockDriver::new().shared();
            let page = leave_page(&mock);
            mock.set_element(page.locators.row_button(0, "Approve"), ElementHandle::new("button"));
            mock.set_element(page.locators.row_button(1, "Reject"), ElementHandle::new("button"));
            page.approve_leave(0).await.unwrap();
            page.reject_leave(1).await.unwrap();
            assert!(page.reject_leave(0).await.unwrap_err().is_timeout());
        }

        #[tokio::test]
        async fn test_date_range_filter_searches() {
            let mock = MockDriver::new().shared();
            let page = leave_page(&mock);
            mock.set_element(&page.locators.search_button, ElementHandle::new("button"));
            page.filter_by_date_range("2025-12-01", "2025-12-31").await.unwrap();
            assert_eq!(page.from_date_value().await.unwrap(), "2025-12-01");
            assert_eq!(page.to_date_value().await.unwrap(), "2025-12-31");
            let history = mock.history();
            assert!(history.last().unwrap().starts_with("click:"));
        }

        #[tokio::test]
        async fn test_leave_status_reads_last_cell() {
            let mock = MockDriver::new().shared();
            let page = leave_page(&mock);
            let l = &page.locators;
            let status_cell = l.table_rows.clone().nth(0).locator(l.table_cell.clone().last());
            mock.set_element(status_cell, ElementHandle::new("div").with_text("Pending Approval (1.00)"));
            assert!(page.leave_status(0).await.unwrap().contains("Pending"));
            assert_eq!(page.leave_status(3).await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_leave_table_visibility() {
            let mock = MockDriver::new().shared();
            let page = leave_page(&mock);
            assert!(!page.is_leave_table_displayed().await.unwrap());
            mock.set_element(&page.locators.leave_table, ElementHandle::new("div"));
            assert!(page.is_leave_table_displayed().await.unwrap());
        }

        #[tokio::test]
        async fn test_leave_balance_row() {
            let mock = MockDriver::new().shared();
            let page = leave_page(&mock);
            mock.set_elements(
                &page.locators.table_rows,
                vec![
                    ElementHandle::new("div").with_text("CAN - Personal 5.00 1.00"),
                    ElementHandle::new("div").with_text("CAN - Vacation 10.00 0.00"),
                ],
            );
            assert_eq!(
                page.leave_balance("CAN - Vacation").await.unwrap().as_deref(),
                Some("CAN - Vacation 10.00 0.00")
            );
            assert_eq!(page.leave_balance("Maternity").await.unwrap(), None);
        }
    }
}
