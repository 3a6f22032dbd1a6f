//! Recruitment: OrangeHRM jobs, candidates and vacancies, plus the PeopleOps
//! requisition view.

use super::{autocomplete, button, choose_option, toast_text};
use crate::base_page::BasePage;
use crate::data::{CandidateData, CandidateFilter, JobData, VacancyData};
use crate::locator::{Locator, TextMatch};
use crate::page_object::{row_by_cell, PageObject};
use crate::result::E2eResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// How long a toast is awaited
pub const TOAST_TIMEOUT_MS: u64 = 5000;

/// OrangeHRM recruitment elements
#[derive(Debug, Clone)]
pub struct RecruitmentLocators {
    pub jobs_tab: Locator,
    pub candidates_tab: Locator,
    pub vacancies_tab: Locator,
    pub add_button: Locator,
    pub save_button: Locator,
    pub cancel_button: Locator,
    pub job_title_input: Locator,
    pub job_description_input: Locator,
    pub job_specification_input: Locator,
    pub first_name_input: Locator,
    pub middle_name_input: Locator,
    pub last_name_input: Locator,
    pub email_input: Locator,
    pub phone_input: Locator,
    pub vacancy_name_input: Locator,
    pub positions_input: Locator,
    pub hiring_manager_input: Locator,
    /// Every `oxd-select` dropdown, in page order
    pub dropdowns: Locator,
    pub search_button: Locator,
    pub reset_button: Locator,
    pub data_table: Locator,
    pub table_rows: Locator,
    pub table_cell: Locator,
    pub delete_button: Locator,
    pub delete_confirm_button: Locator,
    pub toast: Locator,
    pub toast_error: Locator,
    pub field_errors: Locator,
    pub no_data: Locator,
    pub page_title: Locator,
}

impl Default for RecruitmentLocators {
    fn default() -> Self {
        Self {
            jobs_tab: Locator::css(r##"a[href="#/recruitment/jobs"]"##),
            candidates_tab: Locator::css(r##"a[href="#/recruitment/candidates"]"##),
            vacancies_tab: Locator::css(r##"a[href="#/recruitment/vacancies"]"##),
            add_button: button("Add"),
            save_button: Locator::css(r#"button[type="submit"]"#),
            cancel_button: button("Cancel"),
            job_title_input: Locator::css(r#"input[name="jobTitle"]"#),
            job_description_input: Locator::css(r#"textarea[placeholder*="Description"]"#),
            job_specification_input: Locator::css(r#"textarea[placeholder*="Specification"]"#),
            first_name_input: Locator::placeholder(TextMatch::exact("First Name")),
            middle_name_input: Locator::placeholder(TextMatch::exact("Middle Name")),
            last_name_input: Locator::placeholder(TextMatch::exact("Last Name")),
            email_input: Locator::css(r#"input[type="email"]"#),
            phone_input: Locator::css(r#"input[type="text"][placeholder*="Phone"]"#),
            vacancy_name_input: Locator::placeholder(TextMatch::exact("Vacancy Name")),
            positions_input: Locator::css(r#"input[type="number"]"#),
            hiring_manager_input: Locator::placeholder(TextMatch::exact("Type for hints...")),
            dropdowns: Locator::css(".oxd-select-text-input"),
            search_button: button("Search"),
            reset_button: button("Reset"),
            data_table: Locator::css(".oxd-table"),
            table_rows: Locator::css(".oxd-table-body").locator(Locator::css(".oxd-table-row")),
            table_cell: Locator::css(".oxd-table-cell"),
            delete_button: Locator::css(r#"button[class*="delete"]"#),
            delete_confirm_button: button("Yes, Delete"),
            toast: Locator::css(".oxd-toast-content"),
            toast_error: Locator::css(".oxd-text--toast-message"),
            field_errors: Locator::css(".oxd-form-field-error"),
            no_data: Locator::css(".oxd-empty-state"),
            page_title: Locator::css("h2"),
        }
    }
}

impl RecruitmentLocators {
    /// Dropdown at zero-based `index`
    #[must_use]
    pub fn dropdown(&self, index: usize) -> Locator {
        self.dropdowns.clone().nth(index)
    }

    /// Filter dropdown driven by `filter`
    #[must_use]
    pub fn filter_dropdown(&self, filter: &CandidateFilter) -> Locator {
        match filter {
            CandidateFilter::JobTitle(_) => self.dropdown(0),
            CandidateFilter::Status(_) => self.dropdown(1),
            CandidateFilter::Source(_) => self.dropdown(2),
        }
    }

    /// Cell `col` of row `row`, both zero-based
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Locator {
        self.table_rows
            .clone()
            .nth(row)
            .locator(self.table_cell.clone().nth(col))
    }
}

/// OrangeHRM recruitment module at `/recruitment/viewCandidates`
#[derive(Debug, Clone)]
pub struct RecruitmentPage {
    base: BasePage,
    toast_timeout: Duration,
    /// Element locators
    pub locators: RecruitmentLocators,
}

impl RecruitmentPage {
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            toast_timeout: Duration::from_millis(TOAST_TIMEOUT_MS),
            locators: RecruitmentLocators::default(),
        }
    }

    /// Override how long toasts are awaited
    #[must_use]
    pub const fn with_toast_timeout(mut self, timeout: Duration) -> Self {
        self.toast_timeout = timeout;
        self
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await
    }

    pub async fn open_jobs_tab(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.jobs_tab).await
    }

    pub async fn open_candidates_tab(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.candidates_tab).await
    }

    pub async fn open_vacancies_tab(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.vacancies_tab).await
    }

    pub async fn click_add(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.add_button).await
    }

    pub async fn click_save(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.save_button).await
    }

    /// Add a job title
    pub async fn create_job(&self, job: &JobData) -> E2eResult<()> {
        info!(title = %job.title, "create job");
        let l = &self.locators;
        self.click_add().await?;
        self.base.fill_input(&l.job_title_input, &job.title).await?;
        if let Some(description) = &job.description {
            self.base.fill_input(&l.job_description_input, description).await?;
        }
        if let Some(specification) = &job.specification {
            self.base
                .fill_input(&l.job_specification_input, specification)
                .await?;
        }
        self.click_save().await
    }

    /// Add a candidate, optionally applying to a vacancy
    pub async fn create_candidate(&self, candidate: &CandidateData) -> E2eResult<()> {
        info!(first = %candidate.first_name, last = %candidate.last_name, "create candidate");
        let l = &self.locators;
        self.click_add().await?;
        self.base.fill_input(&l.first_name_input, &candidate.first_name).await?;
        if let Some(middle) = &candidate.middle_name {
            self.base.fill_input(&l.middle_name_input, middle).await?;
        }
        self.base.fill_input(&l.last_name_input, &candidate.last_name).await?;
        self.base.fill_input(&l.email_input, &candidate.email).await?;
        if let Some(phone) = &candidate.phone {
            self.base.fill_input(&l.phone_input, phone).await?;
        }
        if let Some(vacancy) = &candidate.vacancy {
            choose_option(&self.base, &l.dropdown(0), vacancy).await?;
        }
        self.click_save().await
    }

    /// Add a vacancy for an existing job title
    pub async fn create_vacancy(&self, vacancy: &VacancyData) -> E2eResult<()> {
        info!(name = %vacancy.name, "create vacancy");
        let l = &self.locators;
        self.click_add().await?;
        self.base.fill_input(&l.vacancy_name_input, &vacancy.name).await?;
        choose_option(&self.base, &l.dropdown(0), &vacancy.job_title).await?;
        if let Some(manager) = &vacancy.hiring_manager {
            autocomplete(&self.base, &l.hiring_manager_input, manager).await?;
        }
        if let Some(positions) = vacancy.positions {
            self.base
                .fill_input(&l.positions_input, &positions.to_string())
                .await?;
        }
        self.click_save().await
    }

    /// Apply one candidate filter and search
    pub async fn search_and_filter(&self, filter: &CandidateFilter) -> E2eResult<()> {
        let value = match filter {
            CandidateFilter::JobTitle(v) | CandidateFilter::Status(v) | CandidateFilter::Source(v) => v,
        };
        info!(?filter, "filter candidates");
        choose_option(&self.base, &self.locators.filter_dropdown(filter), value).await?;
        self.base.click_element(&self.locators.search_button).await
    }

    pub async fn reset_filters(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.reset_button).await
    }

    /// Delete the record in `row` and confirm
    pub async fn delete_row(&self, row: usize) -> E2eResult<()> {
        let l = &self.locators;
        let delete = l.table_rows.clone().nth(row).locator(l.delete_button.clone());
        self.base.click_element(delete).await?;
        self.base.click_element(&l.delete_confirm_button).await
    }

    pub async fn table_row_count(&self) -> E2eResult<usize> {
        self.base.count(&self.locators.table_rows).await
    }

    /// Text of cell `col` in row `row`, empty when absent
    pub async fn table_cell_text(&self, row: usize, col: usize) -> E2eResult<String> {
        self.base.get_element_text(self.locators.cell(row, col)).await
    }

    /// Index of the first row whose cell `col` reads `text`
    pub async fn row_index_of(&self, col: usize, text: &str) -> E2eResult<Option<usize>> {
        for row in 0..self.table_row_count().await? {
            if self.table_cell_text(row, col).await?.trim() == text {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    /// First cell of the first row, `None` on an empty table
    pub async fn first_row_data(&self) -> E2eResult<Option<String>> {
        if self.table_row_count().await? == 0 {
            return Ok(None);
        }
        self.table_cell_text(0, 0).await.map(Some)
    }

    pub async fn is_table_displayed(&self) -> E2eResult<bool> {
        self.base.is_element_visible(&self.locators.data_table).await
    }

    pub async fn is_no_data_displayed(&self) -> E2eResult<bool> {
        self.base.is_element_visible(&self.locators.no_data).await
    }

    pub async fn has_field_errors(&self) -> E2eResult<bool> {
        Ok(self.base.count(&self.locators.field_errors).await? > 0)
    }

    pub async fn field_errors(&self) -> E2eResult<Vec<String>> {
        self.base.all_text_contents(&self.locators.field_errors).await
    }

    /// Toast text, empty when none appears
    pub async fn toast_message(&self) -> E2eResult<String> {
        toast_text(&self.base, &self.locators.toast, self.toast_timeout).await
    }

    /// Whether `field` carries `aria-required="true"`
    pub async fn is_field_required(&self, field: &Locator) -> E2eResult<bool> {
        Ok(self
            .base
            .get_attribute(field, "aria-required")
            .await?
            .is_some_and(|v| v == "true"))
    }

    pub async fn page_heading(&self) -> E2eResult<String> {
        self.base.get_element_text(&self.locators.page_title).await
    }
}

impl PageObject for RecruitmentPage {
    fn path(&self) -> &str {
        "/recruitment/viewCandidates"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }
}

// =============================================================================
// PEOPLEOPS REQUISITIONS
// =============================================================================

/// Position and status of one requisition row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequisitionDetails {
    pub position: String,
    /// Trimmed status cell
    pub status: String,
}

/// Requisition table at PeopleOps `/recruitment`
#[derive(Debug, Clone)]
pub struct RequisitionPage {
    base: BasePage,
    /// Table rows
    pub rows: Locator,
    /// Row cells
    pub cell: Locator,
    /// Confirmation shown after activation
    pub engagement_active: Locator,
}

impl RequisitionPage {
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            rows: Locator::role("row"),
            cell: Locator::role("cell"),
            engagement_active: Locator::text("Engagement Active"),
        }
    }

    /// Row with a cell equal to `position`
    #[must_use]
    pub fn row(&self, position: &str) -> Locator {
        row_by_cell(&self.rows, &self.cell, position)
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await?;
        self.base
            .wait_for_url_pattern("recruitment", Duration::from_millis(self.base.action_timeout_ms()))
            .await
    }

    /// Activate the engagement of `position` and wait for the confirmation
    pub async fn activate_engagement(&self, position: &str) -> E2eResult<()> {
        info!(position, "activate engagement");
        self.base
            .click_element(self.row(position).locator(button("Activate Engagement")))
            .await?;
        self.base.wait_visible(&self.engagement_active).await
    }

    pub async fn requisition_details(&self, position: &str) -> E2eResult<RequisitionDetails> {
        let status = self
            .base
            .get_element_text(self.row(position).locator(Locator::test_id("requisition-status")))
            .await?;
        Ok(RequisitionDetails {
            position: position.to_string(),
            status: status.trim().to_string(),
        })
    }
}

impl PageObject for RequisitionPage {
    fn path(&self) -> &str {
        "/recruitment"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ElementHandle, MockDriver, MockReaction};
    use crate::pages::testing::{base, HRM, PEOPLEOPS};
    use std::sync::Arc;

    fn recruitment(mock: &Arc<MockDriver>) -> RecruitmentPage {
        let page = RecruitmentPage::new(base(mock, HRM)).with_toast_timeout(Duration::from_millis(50));
        let l = &page.locators;
        for input in [
            &l.job_title_input,
            &l.job_description_input,
            &l.first_name_input,
            &l.last_name_input,
            &l.email_input,
            &l.vacancy_name_input,
            &l.positions_input,
        ] {
            mock.set_element(input, ElementHandle::new("input"));
        }
        for b in [&l.add_button, &l.save_button, &l.search_button] {
            mock.set_element(b, ElementHandle::new("button"));
        }
        page
    }

    fn option(mock: &MockDriver, text: &str) {
        mock.set_element(
            Locator::role_named("option", TextMatch::exact(text)),
            ElementHandle::new("div").with_text(text),
        );
    }

    mod form_tests {
        use super::*;

        #[tokio::test]
        async fn test_create_job_skips_missing_specification() {
            let mock = MockDriver::new().shared();
            let page = recruitment(&mock);
            let job = JobData {
                title: "QA Engineer 1718".into(),
                description: Some("Tests things".into()),
                specification: None,
            };
            page.create_job(&job).await.unwrap();
            assert_eq!(mock.calls("fill:").len(), 2);
            assert_eq!(mock.calls("click:").len(), 2);
        }

        #[tokio::test]
        async fn test_create_candidate_with_vacancy() {
            let mock = MockDriver::new().shared();
            let page = recruitment(&mock);
            mock.set_element(page.locators.dropdown(0), ElementHandle::new("div"));
            option(&mock, "Senior QA Lead");
            let candidate = CandidateData {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@testcompany.com".into(),
                vacancy: Some("Senior QA Lead".into()),
                ..CandidateData::default()
            };
            page.create_candidate(&candidate).await.unwrap();
            assert_eq!(mock.value_of(&page.locators.email_input).as_deref(), Some("ada@testcompany.com"));
            assert!(mock.was_called(r#"click:role=option[name="Senior QA Lead"s]"#));
        }

        #[tokio::test]
        async fn test_missing_fields_show_errors() {
            let mock = MockDriver::new().shared();
            let page = recruitment(&mock);
            mock.on_click(
                &page.locators.save_button,
                MockReaction::show(
                    &page.locators.field_errors,
                    vec![ElementHandle::new("span").with_text("Required")],
                ),
            );
            assert!(!page.has_field_errors().await.unwrap());
            page.click_save().await.unwrap();
            assert!(page.has_field_errors().await.unwrap());
            assert_eq!(page.toast_message().await.unwrap(), "");
        }
    }

    mod table_tests {
        use super::*;

        #[tokio::test]
        async fn test_filter_by_status_uses_second_dropdown() {
            let mock = MockDriver::new().shared();
            let page = recruitment(&mock);
            let filter = CandidateFilter::Status("Shortlisted".into());
            mock.set_element(page.locators.filter_dropdown(&filter), ElementHandle::new("div"));
            option(&mock, "Shortlisted");
            page.search_and_filter(&filter).await.unwrap();
            assert_eq!(
                mock.calls("click:")[0],
                format!("click:{}", page.locators.dropdown(1))
            );
            assert!(mock.calls("click:").last().unwrap().contains("Search"));
        }

        #[tokio::test]
        async fn test_first_row_data() {
            let mock = MockDriver::new().shared();
            let page = recruitment(&mock);
            assert_eq!(page.first_row_data().await.unwrap(), None);
            mock.set_elements(&page.locators.table_rows, vec![ElementHandle::new("div")]);
            mock.set_element(page.locators.cell(0, 0), ElementHandle::new("div").with_text("Vacancy A"));
            assert_eq!(page.first_row_data().await.unwrap().as_deref(), Some("Vacancy A"));
        }

        #[tokio::test]
        async fn test_field_required_reads_aria() {
            let mock = MockDriver::new().shared();
            let page = recruitment(&mock);
            mock.set_element(
                &page.locators.first_name_input,
                ElementHandle::new("input").with_attribute("aria-required", "true"),
            );
            assert!(page.is_field_required(&page.locators.first_name_input).await.unwrap());
            assert!(!page.is_field_required(&page.locators.phone_input).await.unwrap());
        }

        #[tokio::test]
        async fn test_row_index_of_matches_trimmed_cell() {
            let mock = MockDriver::new().shared();
            let page = recruitment(&mock);
            let l = &page.locators;
            mock.set_elements(&l.table_rows, vec![ElementHandle::new("div"); 3]);
            mock.set_element(l.cell(0, 1), ElementHandle::new("div").with_text("Accountant"));
            mock.set_element(l.cell(2, 1), ElementHandle::new("div").with_text(" QA Engineer 42 "));
            assert_eq!(page.row_index_of(1, "QA Engineer 42").await.unwrap(), Some(2));
            assert_eq!(page.row_index_of(1, "Payroll").await.unwrap(), None);
            assert_eq!(page.table_cell_text(1, 1).await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_delete_row_confirms() {
            let mock = MockDriver::new().shared();
            let page = recruitment(&mock);
            let l = &page.locators;
            let delete = l.table_rows.clone().nth(1).locator(l.delete_button.clone());
            mock.set_element(&delete, ElementHandle::new("button"));
            assert!(page.delete_row(1).await.unwrap_err().is_timeout());
            mock.set_element(&l.delete_confirm_button, ElementHandle::new("button"));
            page.delete_row(1).await.unwrap();
            assert_eq!(
                mock.calls("click:").last().cloned(),
                Some(format!("click:{}", l.delete_confirm_button))
            );
        }
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_tabs_follow_their_links() {
            let mock = MockDriver::new().shared();
            let page = recruitment(&mock);
            let l = &page.locators;
            for (tab, path) in [
                (&l.jobs_tab, "jobs"),
                (&l.candidates_tab, "viewCandidates"),
                (&l.vacancies_tab, "viewJobVacancy"),
            ] {
                mock.set_element(tab, ElementHandle::new("a"));
                mock.on_click(tab, MockReaction::navigate(format!("{HRM}/recruitment/{path}")));
            }
            page.open_jobs_tab().await.unwrap();
            assert!(page.base().current_url().await.unwrap().ends_with("jobs"));
            page.open_vacancies_tab().await.unwrap();
            assert!(page.base().current_url().await.unwrap().ends_with("viewJobVacancy"));
            page.open_candidates_tab().await.unwrap();
            assert!(page.base().current_url().await.unwrap().ends_with("viewCandidates"));
        }

        #[tokio::test]
        async fn test_page_heading() {
            let mock = MockDriver::new().shared();
            let page = recruitment(&mock);
            assert_eq!(page.page_heading().await.unwrap(), "");
            mock.set_element(&page.locators.page_title, ElementHandle::new("h2").with_text("Candidates"));
            assert_eq!(page.page_heading().await.unwrap(), "Candidates");
        }

        #[tokio::test]
        async fn test_create_vacancy_with_manager_and_positions() {
            let mock = MockDriver::new().shared();
            let page = recruitment(&mock);
            let l = &page.locators;
            mock.set_element(l.dropdown(0), ElementHandle::new("div"));
            option(&mock, "QA Engineer");
            mock.set_element(&l.hiring_manager_input, ElementHandle::new("input"));
            mock.set_element(
                Locator::css(".oxd-autocomplete-option").has_text("Odis Adalwin").first(),
                ElementHandle::new("div"),
            );
            let vacancy = VacancyData {
                name: "QA Vacancy".into(),
                job_title: "QA Engineer".into(),
                positions: Some(2),
                hiring_manager: Some("Odis Adalwin".into()),
            };
            page.create_vacancy(&vacancy).await.unwrap();
            assert_eq!(mock.value_of(&l.vacancy_name_input).as_deref(), Some("QA Vacancy"));
            assert_eq!(mock.value_of(&l.positions_input).as_deref(), Some("2"));
            assert_eq!(mock.value_of(&l.hiring_manager_input).as_deref(), Some("Odis Adalwin"));
        }
    }

    mod requisition_tests {
        use super::*;

        #[tokio::test]
        async fn test_activate_engagement_waits_for_confirmation() {
            let mock = MockDriver::new().shared();
            let page = RequisitionPage::new(base(&mock, PEOPLEOPS));
            let activate = page.row("Rust Developer").locator(button("Activate Engagement"));
            mock.set_element(&activate, ElementHandle::new("button"));
            mock.on_click(
                &activate,
                MockReaction::show(&page.engagement_active, vec![ElementHandle::new("span")]),
            );
            page.activate_engagement("Rust Developer").await.unwrap();
        }

        #[tokio::test]
        async fn test_activate_without_confirmation_times_out() {
            let mock = MockDriver::new().shared();
            let page = RequisitionPage::new(base(&mock, PEOPLEOPS));
            let activate = page.row("Rust Developer").locator(button("Activate Engagement"));
            mock.set_element(&activate, ElementHandle::new("button"));
            assert!(page.activate_engagement("Rust Developer").await.unwrap_err().is_timeout());
        }

        #[tokio::test]
        async fn test_requisition_status_trimmed() {
            let mock = MockDriver::new().shared();
            let page = RequisitionPage::new(base(&mock, PEOPLEOPS));
            mock.set_element(
                page.row("Rust Developer").locator(Locator::test_id("requisition-status")),
                ElementHandle::new("td").with_text("  Open \n"),
            );
            let details = page.requisition_details("Rust Developer").await.unwrap();
            assert_eq!(
                details,
                RequisitionDetails {
                    position: "Rust Developer".into(),
                    status: "Open".into()
                }
            );
        }
    }
}
