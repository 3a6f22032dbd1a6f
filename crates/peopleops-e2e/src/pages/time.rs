//! OrangeHRM time module: timesheets, attendance punches, projects and activities.

use super::{autocomplete, button, choose_option, toast_text};
use crate::base_page::BasePage;
use crate::data::TimesheetEntry;
use crate::locator::{Locator, TextMatch};
use crate::page_object::PageObject;
use crate::result::E2eResult;
use std::time::Duration;
use tracing::{debug, info};

/// How long a toast is awaited
pub const TOAST_TIMEOUT_MS: u64 = 5000;

/// Pause after a range search before reading validation output
pub const RANGE_SETTLE_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct TimeLocators {
    pub timesheets_tab: Locator,
    pub attendance_tab: Locator,
    pub projects_tab: Locator,
    pub activities_tab: Locator,
    pub employee_input: Locator,
    /// Every `oxd-select` dropdown, in page order
    pub dropdowns: Locator,
    /// Daily hour cells on the timesheet grid, Monday first
    pub hours_inputs: Locator,
    pub add_button: Locator,
    pub save_button: Locator,
    pub search_button: Locator,
    pub reset_button: Locator,
    pub submit_button: Locator,
    pub punch_in_button: Locator,
    pub punch_out_button: Locator,
    pub project_name_input: Locator,
    pub activity_input: Locator,
    pub date_inputs: Locator,
    pub status_badge: Locator,
    pub table: Locator,
    pub table_rows: Locator,
    pub toast: Locator,
    pub field_errors: Locator,
}

impl Default for TimeLocators {
    fn default() -> Self {
        Self {
            timesheets_tab: Locator::css(r##"a[href="#/time/viewEmployeeTimesheet"]"##),
            attendance_tab: Locator::css(r##"a[href="#/attendance/punchIn"]"##),
            projects_tab: Locator::css(r##"a[href="#/time/viewProjects"]"##),
            activities_tab: Locator::css(r##"a[href="#/time/viewActivities"]"##),
            employee_input: Locator::placeholder(TextMatch::exact("Type for hints...")),
            dropdowns: Locator::css(".oxd-select-text-input"),
            hours_inputs: Locator::placeholder(TextMatch::exact("0.00")),
            add_button: button("Add"),
            save_button: Locator::css(r#"button[type="submit"]"#),
            search_button: button("Search"),
            reset_button: button("Reset"),
            submit_button: button("Submit"),
            punch_in_button: button("Check In"),
            punch_out_button: button("Check Out"),
            project_name_input: Locator::placeholder(TextMatch::exact("Project Name")),
            activity_input: Locator::css(r#"input[placeholder*="Activity"]"#),
            date_inputs: Locator::placeholder(TextMatch::exact("yyyy-mm-dd")),
            status_badge: Locator::css(".oxd-status-badge"),
            table: Locator::css(".oxd-table"),
            table_rows: Locator::css(".oxd-table-body").locator(Locator::css(".oxd-table-row")),
            toast: Locator::css(".oxd-toast-content"),
            field_errors: Locator::css(".oxd-form-field-error"),
        }
    }
}

impl TimeLocators {
    /// Project picker on the timesheet form
    #[must_use]
    pub fn project_dropdown(&self) -> Locator {
        self.dropdowns.clone().first()
    }

    /// Status filter on the timesheet list
    #[must_use]
    pub fn status_filter(&self) -> Locator {
        self.dropdowns.clone().first()
    }

    /// Hours cell for `day` (0 = first column)
    #[must_use]
    pub fn hours_for_day(&self, day: usize) -> Locator {
        self.hours_inputs.clone().nth(day)
    }

    #[must_use]
    pub fn from_date(&self) -> Locator {
        self.date_inputs.clone().nth(0)
    }

    #[must_use]
    pub fn to_date(&self) -> Locator {
        self.date_inputs.clone().nth(1)
    }
}

/// Employee timesheets at `/time/viewEmployeeTimesheet`
#[derive(Debug, Clone)]
pub struct TimePage {
    base: BasePage,
    toast_timeout: Duration,
    settle_ms: u64,
    pub locators: TimeLocators,
}

impl TimePage {
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            toast_timeout: Duration::from_millis(TOAST_TIMEOUT_MS),
            settle_ms: RANGE_SETTLE_MS,
            locators: TimeLocators::default(),
        }
    }

    #[must_use]
    pub const fn with_toast_timeout(mut self, timeout: Duration) -> Self {
        self.toast_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_settle_ms(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await
    }

    pub async fn open_timesheets_tab(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.timesheets_tab).await
    }

    pub async fn open_attendance_tab(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.attendance_tab).await
    }

    pub async fn open_projects_tab(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.projects_tab).await
    }

    pub async fn open_activities_tab(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.activities_tab).await
    }

    /// Add a timesheet for an employee and project, filling hours per day index
    pub async fn create_timesheet(&self, entry: &TimesheetEntry) -> E2eResult<()> {
        info!(employee = %entry.employee_name, project = %entry.project, days = entry.hours.len(), "create timesheet");
        let l = &self.locators;
        self.base.click_element(&l.add_button).await?;
        autocomplete(&self.base, &l.employee_input, &entry.employee_name).await?;
        choose_option(&self.base, &l.project_dropdown(), &entry.project).await?;
        for (day, hours) in &entry.hours {
            self.base.fill_input(l.hours_for_day(*day), hours).await?;
        }
        self.base.click_element(&l.save_button).await
    }

    /// Fill the date range, optionally pick a status, then search
    pub async fn search_and_filter(&self, from: &str, to: &str, status: Option<&str>) -> E2eResult<()> {
        let l = &self.locators;
        self.base.fill_input(l.from_date(), from).await?;
        self.base.fill_input(l.to_date(), to).await?;
        if let Some(status) = status {
            choose_option(&self.base, &l.status_filter(), status).await?;
        }
        self.base.click_element(&l.search_button).await
    }

    pub async fn reset_filters(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.reset_button).await
    }

    pub async fn submit_timesheet(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.submit_button).await
    }

    /// Rows whose text mentions `status`
    pub async fn timesheet_status_count(&self, status: &str) -> E2eResult<usize> {
        let rows = self.base.all_text_contents(&self.locators.table_rows).await?;
        Ok(rows.iter().filter(|row| row.contains(status)).count())
    }

    /// Search with a date range and report whether the page rejected it
    /// with a field error or a toast
    pub async fn verify_time_range_validation(&self, from: &str, to: &str) -> E2eResult<bool> {
        let l = &self.locators;
        self.base.fill_input(l.from_date(), from).await?;
        self.base.fill_input(l.to_date(), to).await?;
        self.base.click_element(&l.search_button).await?;
        self.base.wait_for_timeout(self.settle_ms).await;
        let errors = self.base.count(&l.field_errors).await?;
        let toast = self.base.is_element_visible(&l.toast).await?;
        debug!(errors, toast, "time range validation");
        Ok(errors > 0 || toast)
    }

    pub async fn punch_in(&self) -> E2eResult<()> {
        info!("punch in");
        self.base.click_element(&self.locators.punch_in_button).await
    }

    pub async fn punch_out(&self) -> E2eResult<()> {
        info!("punch out");
        self.base.click_element(&self.locators.punch_out_button).await
    }

    pub async fn add_project(&self, name: &str) -> E2eResult<()> {
        let l = &self.locators;
        self.base.click_element(&l.add_button).await?;
        self.base.fill_input(&l.project_name_input, name).await?;
        self.base.click_element(&l.save_button).await
    }

    pub async fn add_activity(&self, name: &str) -> E2eResult<()> {
        let l = &self.locators;
        self.base.click_element(&l.add_button).await?;
        self.base.fill_input(&l.activity_input, name).await?;
        self.base.click_element(&l.save_button).await
    }

    pub async fn toast_message(&self) -> E2eResult<String> {
        toast_text(&self.base, &self.locators.toast, self.toast_timeout).await
    }

    pub async fn field_errors(&self) -> E2eResult<Vec<String>> {
        self.base.all_text_contents(&self.locators.field_errors).await
    }

    pub async fn row_count(&self) -> E2eResult<usize> {
        self.base.count(&self.locators.table_rows).await
    }

    /// Status line of the open timesheet, e.g. `Status: Submitted`
    pub async fn timesheet_status(&self) -> E2eResult<String> {
        self.base.get_element_text(&self.locators.status_badge).await
    }

    pub async fn is_table_displayed(&self) -> E2eResult<bool> {
        self.base.is_element_visible(&self.locators.table).await
    }
}

impl PageObject for TimePage {
    fn path(&self) -> &str {
        "/time/viewEmployeeTimesheet"
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
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn time_page(mock: &Arc<MockDriver>) -> TimePage {
        let page = TimePage::new(base(mock, HRM))
            .with_toast_timeout(Duration::from_millis(50))
            .with_settle_ms(0);
        let l = &page.locators;
        mock.set_element(l.from_date(), ElementHandle::new("input"));
        mock.set_element(l.to_date(), ElementHandle::new("input"));
        mock.set_element(&l.search_button, ElementHandle::new("button"));
        mock.set_element(&l.add_button, ElementHandle::new("button"));
        mock.set_element(&l.save_button, ElementHandle::new("button"));
        page
    }

    mod timesheet_tests {
        use super::*;

        #[tokio::test]
        async fn test_create_timesheet_fills_each_day() {
            let mock = MockDriver::new().shared();
            let page = time_page(&mock);
            let l = &page.locators;
            mock.set_element(&l.employee_input, ElementHandle::new("input"));
            mock.set_element(
                Locator::css(".oxd-autocomplete-option").has_text("Odis Adalwin").first(),
                ElementHandle::new("div"),
            );
            mock.set_element(l.project_dropdown(), ElementHandle::new("div"));
            mock.set_element(
                Locator::role_named("option", TextMatch::exact("ACME Ltd - ACME Ltd")),
                ElementHandle::new("div"),
            );
            mock.set_element(l.hours_for_day(0), ElementHandle::new("input"));
            mock.set_element(l.hours_for_day(2), ElementHandle::new("input"));

            let entry = TimesheetEntry {
                employee_name: "Odis Adalwin".into(),
                project: "ACME Ltd - ACME Ltd".into(),
                hours: BTreeMap::from([(0, "8.00".to_string()), (2, "4.50".to_string())]),
            };
            page.create_timesheet(&entry).await.unwrap();
            assert_eq!(mock.value_of(l.hours_for_day(0)).as_deref(), Some("8.00"));
            assert_eq!(mock.value_of(l.hours_for_day(2)).as_deref(), Some("4.50"));
            assert_eq!(mock.history().last().map(String::as_str), Some(r#"click:button[type="submit"]"#));
        }

        #[tokio::test]
        async fn test_status_count() {
            let mock = MockDriver::new().shared();
            let page = time_page(&mock);
            mock.set_elements(
                &page.locators.table_rows,
                vec![
                    ElementHandle::new("div").with_text("Odis Adalwin 2025-01-06 Submitted"),
                    ElementHandle::new("div").with_text("Paul Collings 2025-01-06 Approved"),
                    ElementHandle::new("div").with_text("Linda Anderson 2025-01-13 Submitted"),
                ],
            );
            assert_eq!(page.timesheet_status_count("Submitted").await.unwrap(), 2);
            assert_eq!(page.timesheet_status_count("Rejected").await.unwrap(), 0);
            assert_eq!(page.row_count().await.unwrap(), 3);
        }
    }

    mod tab_tests {
        use super::*;

        #[tokio::test]
        async fn test_tabs_follow_their_links() {
            let mock = MockDriver::new().shared();
            let page = time_page(&mock);
            let l = &page.locators;
            for (tab, path) in [
                (&l.timesheets_tab, "time/viewEmployeeTimesheet"),
                (&l.attendance_tab, "attendance/punchIn"),
                (&l.projects_tab, "time/viewProjects"),
                (&l.activities_tab, "time/viewActivities"),
            ] {
                mock.set_element(tab, ElementHandle::new("a"));
                mock.on_click(tab, MockReaction::navigate(format!("{HRM}/{path}")));
            }
            page.open_projects_tab().await.unwrap();
            assert!(page.base().current_url().await.unwrap().ends_with("viewProjects"));
            page.open_activities_tab().await.unwrap();
            assert!(page.base().current_url().await.unwrap().ends_with("viewActivities"));
            page.open_timesheets_tab().await.unwrap();
            assert!(page.base().current_url().await.unwrap().ends_with("viewEmployeeTimesheet"));
        }

        #[tokio::test]
        async fn test_table_and_status() {
            let mock = MockDriver::new().shared();
            let page = time_page(&mock);
            assert!(!page.is_table_displayed().await.unwrap());
            assert_eq!(page.timesheet_status().await.unwrap(), "");
            mock.set_element(&page.locators.table, ElementHandle::new("div"));
            mock.set_element(
                &page.locators.status_badge,
                ElementHandle::new("p").with_text("Status: Submitted"),
            );
            assert!(page.is_table_displayed().await.unwrap());
            assert_eq!(page.timesheet_status().await.unwrap(), "Status: Submitted");
        }

        #[tokio::test]
        async fn test_submit_timesheet() {
            let mock = MockDriver::new().shared();
            let page = time_page(&mock);
            assert!(page.submit_timesheet().await.unwrap_err().is_timeout());
            mock.set_element(&page.locators.submit_button, ElementHandle::new("button"));
            page.submit_timesheet().await.unwrap();
            assert!(mock.was_called(&format!("click:{}", page.locators.submit_button)));
        }
    }

    mod validation_tests {
        use super::*;

        #[tokio::test]
        async fn test_reversed_range_is_rejected() {
            let mock = MockDriver::new().shared();
            let page = time_page(&mock);
            mock.on_click(
                &page.locators.search_button,
                MockReaction::show(
                    &page.locators.field_errors,
                    vec![ElementHandle::new("span").with_text("To date should be after from date")],
                ),
            );
            assert!(page
                .verify_time_range_validation("2025-12-31", "2025-01-01")
                .await
                .unwrap());
            assert_eq!(page.field_errors().await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_valid_range_is_accepted() {
            let mock = MockDriver::new().shared();
            let page = time_page(&mock);
            assert!(!page
                .verify_time_range_validation("2025-01-01", "2025-01-31")
                .await
                .unwrap());
            assert_eq!(page.toast_message().await.unwrap(), "");
        }
    }

    mod punch_tests {
        use super::*;

        #[tokio::test]
        async fn test_punch_in_then_out() {
            let mock = MockDriver::new().shared();
            let page = time_page(&mock);
            mock.set_element(&page.locators.punch_in_button, ElementHandle::new("button"));
            mock.on_click(
                &page.locators.punch_in_button,
                MockReaction::show(&page.locators.punch_out_button, vec![ElementHandle::new("button")]),
            );
            assert!(page.punch_out().await.unwrap_err().is_timeout());
            page.punch_in().await.unwrap();
            page.punch_out().await.unwrap();
            assert_eq!(mock.calls("click:").len(), 2);
        }

        #[tokio::test]
        async fn test_add_project() {
            let mock = MockDriver::new().shared();
            let page = time_page(&mock);
            mock.set_element(&page.locators.project_name_input, ElementHandle::new("input"));
            page.add_project("Apollo").await.unwrap();
            assert_eq!(mock.value_of(&page.locators.project_name_input).as_deref(), Some("Apollo"));
        }

        #[tokio::test]
        async fn test_add_activity() {
            let mock = MockDriver::new().shared();
            let page = time_page(&mock);
            mock.set_element(&page.locators.activity_input, ElementHandle::new("input"));
            page.add_activity("Code Review").await.unwrap();
            assert_eq!(mock.value_of(&page.locators.activity_input).as_deref(), Some("Code Review"));
            assert_eq!(mock.history().last().map(String::as_str), Some(r#"click:button[type="submit"]"#));
        }
    }
}
