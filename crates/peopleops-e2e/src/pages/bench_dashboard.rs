//! Bench view: employees under full utilization, with search and filters.

use super::parse_number;
use crate::base_page::BasePage;
use crate::locator::{Locator, TextMatch};
use crate::page_object::{row_by_cell, PageObject};
use crate::result::E2eResult;
use crate::wait::ElementState;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound on waiting for the loading indicator to clear
pub const LOADING_TIMEOUT_MS: u64 = 10_000;

/// One row of the bench table, trimmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchEmployee {
    pub name: String,
    pub utilization: String,
    pub skills: String,
    pub available_from: String,
    pub status: String,
}

impl BenchEmployee {
    /// Utilization as a number, when it parses
    #[must_use]
    pub fn utilization_pct(&self) -> Option<f64> {
        parse_number(&self.utilization)
    }
}

#[derive(Debug, Clone)]
pub struct BenchDashboardLocators {
    pub rows: Locator,
    pub name_column: Locator,
    pub utilization_column: Locator,
    pub skills_column: Locator,
    pub available_from_column: Locator,
    pub status_column: Locator,
    pub search_input: Locator,
    pub filter_button: Locator,
    pub min_utilization: Locator,
    pub max_utilization: Locator,
    pub skill_filter: Locator,
    pub apply_button: Locator,
    pub refresh_button: Locator,
    pub empty_state: Locator,
    pub loading: Locator,
}

/// Column cell: test id first, positional cell as fallback
fn column(test_id: &str, position: usize) -> Locator {
    Locator::test_id(test_id).or(Locator::css(format!("td:nth-child({position})")))
}

fn named_button(pattern: &str) -> Locator {
    Locator::role_named("button", TextMatch::pattern(pattern))
}

impl Default for BenchDashboardLocators {
    fn default() -> Self {
        Self {
            rows: Locator::css("table tbody tr"),
            name_column: column("employee-name", 1),
            utilization_column: column("utilization", 2),
            skills_column: column("skills", 3),
            available_from_column: column("available-from", 4),
            status_column: column("status", 5),
            search_input: Locator::placeholder(TextMatch::pattern("search")),
            filter_button: named_button("filter"),
            min_utilization: Locator::test_id("min-utilization"),
            max_utilization: Locator::test_id("max-utilization"),
            skill_filter: Locator::test_id("skill-filter"),
            apply_button: named_button("apply"),
            refresh_button: named_button("refresh"),
            empty_state: Locator::css(r#"[data-testid="empty-state"], .empty-message"#),
            loading: Locator::css(r#"[data-testid="loading"], .spinner, .loading"#),
        }
    }
}

impl BenchDashboardLocators {
    /// Row whose name cell is exactly `name`
    #[must_use]
    pub fn row(&self, name: &str) -> Locator {
        row_by_cell(&self.rows, &self.name_column, name)
    }

    #[must_use]
    pub fn cell(row: &Locator, column: &Locator) -> Locator {
        row.clone().locator(column.clone().first())
    }
}

/// Bench table at `/bench-dashboard`
#[derive(Debug, Clone)]
pub struct BenchDashboardPage {
    base: BasePage,
    loading_timeout: Duration,
    pub locators: BenchDashboardLocators,
}

impl BenchDashboardPage {
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            loading_timeout: Duration::from_millis(LOADING_TIMEOUT_MS),
            locators: BenchDashboardLocators::default(),
        }
    }

    #[must_use]
    pub const fn with_loading_timeout(mut self, timeout: Duration) -> Self {
        self.loading_timeout = timeout;
        self
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await?;
        self.wait_for_loading().await
    }

    /// Wait for network idle, then for the loading indicator to clear
    pub async fn wait_for_loading(&self) -> E2eResult<()> {
        self.base.wait_for_page_load().await?;
        if self.base.is_element_visible(&self.locators.loading).await? {
            debug!("waiting for loading indicator");
            self.base
                .wait_for_element(&self.locators.loading, ElementState::Hidden, self.loading_timeout)
                .await?;
        }
        Ok(())
    }

    async fn cell_text(&self, row: &Locator, column: &Locator) -> E2eResult<String> {
        let text = self
            .base
            .get_element_text(BenchDashboardLocators::cell(row, column))
            .await?;
        Ok(text.trim().to_string())
    }

    async fn read_row(&self, row: &Locator) -> E2eResult<BenchEmployee> {
        let l = &self.locators;
        Ok(BenchEmployee {
            name: self.cell_text(row, &l.name_column).await?,
            utilization: self.cell_text(row, &l.utilization_column).await?,
            skills: self.cell_text(row, &l.skills_column).await?,
            available_from: self.cell_text(row, &l.available_from_column).await?,
            status: self.cell_text(row, &l.status_column).await?,
        })
    }

    pub async fn all_bench_employees(&self) -> E2eResult<Vec<BenchEmployee>> {
        let count = self.base.count(&self.locators.rows).await?;
        let mut employees = Vec::with_capacity(count);
        for i in 0..count {
            let row = self.locators.rows.clone().nth(i);
            employees.push(self.read_row(&row).await?);
        }
        Ok(employees)
    }

    pub async fn bench_employee_count(&self) -> E2eResult<usize> {
        self.base.count(&self.locators.rows).await
    }

    pub async fn search_employee(&self, name: &str) -> E2eResult<()> {
        info!(name, "search bench");
        self.base.fill_input(&self.locators.search_input, name).await?;
        self.base.press(&self.locators.search_input, "Enter").await?;
        self.wait_for_loading().await
    }

    pub async fn is_employee_displayed(&self, name: &str) -> E2eResult<bool> {
        self.base.is_element_visible(self.locators.row(name)).await
    }

    /// Utilization of `name`; `None` when the row is missing or unreadable
    pub async fn employee_utilization(&self, name: &str) -> E2eResult<Option<f64>> {
        let text = self
            .cell_text(&self.locators.row(name), &self.locators.utilization_column)
            .await?;
        Ok(parse_number(&text))
    }

    /// Skills of `name`, split on commas with blanks dropped
    pub async fn employee_skills(&self, name: &str) -> E2eResult<Vec<String>> {
        let text = self
            .cell_text(&self.locators.row(name), &self.locators.skills_column)
            .await?;
        Ok(split_skills(&text))
    }

    pub async fn employee_status(&self, name: &str) -> E2eResult<String> {
        self.cell_text(&self.locators.row(name), &self.locators.status_column)
            .await
    }

    pub async fn filter_by_utilization(&self, min: u32, max: u32) -> E2eResult<()> {
        info!(min, max, "filter bench by utilization");
        let l = &self.locators;
        self.base.click_element(&l.filter_button).await?;
        self.base.fill_input(&l.min_utilization, &min.to_string()).await?;
        self.base.fill_input(&l.max_utilization, &max.to_string()).await?;
        self.base.click_element(&l.apply_button).await?;
        self.wait_for_loading().await
    }

    /// Add each skill as a filter chip, then apply
    pub async fn filter_by_skills(&self, skills: &[&str]) -> E2eResult<()> {
        let l = &self.locators;
        self.base.click_element(&l.filter_button).await?;
        for skill in skills {
            self.base.fill_input(&l.skill_filter, skill).await?;
            self.base.press(&l.skill_filter, "Enter").await?;
        }
        self.base.click_element(&l.apply_button).await?;
        self.wait_for_loading().await
    }

    pub async fn employees_with_zero_utilization(&self) -> E2eResult<Vec<String>> {
        Ok(self
            .all_bench_employees()
            .await?
            .into_iter()
            .filter(|e| e.utilization_pct() == Some(0.0))
            .map(|e| e.name)
            .collect())
    }

    /// Employees whose available-from date is after `today`
    pub async fn employees_with_future_availability(&self, today: NaiveDate) -> E2eResult<Vec<BenchEmployee>> {
        Ok(self
            .all_bench_employees()
            .await?
            .into_iter()
            .filter(|e| {
                NaiveDate::parse_from_str(&e.available_from, "%Y-%m-%d").is_ok_and(|date| date > today)
            })
            .collect())
    }

    pub async fn is_empty_state_visible(&self) -> E2eResult<bool> {
        self.base.is_element_visible(&self.locators.empty_state).await
    }

    pub async fn empty_state_message(&self) -> E2eResult<String> {
        self.base.get_element_text(&self.locators.empty_state).await
    }

    pub async fn refresh(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.refresh_button).await?;
        self.wait_for_loading().await
    }
}

fn split_skills(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl PageObject for BenchDashboardPage {
    fn path(&self) -> &str {
        "/bench-dashboard"
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

    fn dashboard(mock: &Arc<MockDriver>) -> BenchDashboardPage {
        BenchDashboardPage::new(base(mock, PEOPLEOPS)).with_loading_timeout(Duration::from_millis(120))
    }

    fn seed_table(mock: &Arc<MockDriver>, page: &BenchDashboardPage, rows: &[[&str; 5]]) {
        let l = &page.locators;
        mock.set_elements(&l.rows, rows.iter().map(|_| ElementHandle::new("tr")).collect());
        let columns = [
            &l.name_column,
            &l.utilization_column,
            &l.skills_column,
            &l.available_from_column,
            &l.status_column,
        ];
        for (i, values) in rows.iter().enumerate() {
            let row = l.rows.clone().nth(i);
            for (column, value) in columns.iter().zip(values) {
                mock.set_element(
                    BenchDashboardLocators::cell(&row, column),
                    ElementHandle::new("td").with_text(format!(" {value} ")),
                );
            }
        }
    }

    mod table_tests {
        use super::*;

        #[tokio::test]
        async fn test_rows_are_trimmed() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            seed_table(
                &mock,
                &page,
                &[
                    ["Alice Johnson", "0%", "Java, Spring Boot", "2025-01-15", "Active"],
                    ["Bob Smith", "50%", "Python", "2025-02-01", "Active"],
                ],
            );
            let employees = page.all_bench_employees().await.unwrap();
            assert_eq!(employees.len(), 2);
            assert_eq!(employees[0].name, "Alice Johnson");
            assert_eq!(employees[0].skills, "Java, Spring Boot");
            assert_eq!(employees[1].utilization_pct(), Some(50.0));
        }

        #[tokio::test]
        async fn test_zero_and_future_availability() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            seed_table(
                &mock,
                &page,
                &[
                    ["Alice Johnson", "0%", "Java", "2025-01-15", "Active"],
                    ["Bob Smith", "50%", "Python", "2025-03-01", "Active"],
                    ["Eve Black", "0 %", "Go", "", "Active"],
                ],
            );
            assert_eq!(
                page.employees_with_zero_utilization().await.unwrap(),
                vec!["Alice Johnson", "Eve Black"]
            );
            let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
            let future = page.employees_with_future_availability(today).await.unwrap();
            assert_eq!(future.len(), 1);
            assert_eq!(future[0].name, "Bob Smith");
        }

        #[tokio::test]
        async fn test_per_employee_reads() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            let l = &page.locators;
            let row = l.row("Alice Johnson");
            mock.set_element(
                BenchDashboardLocators::cell(&row, &l.utilization_column),
                ElementHandle::new("td").with_text("12.5%"),
            );
            mock.set_element(
                BenchDashboardLocators::cell(&row, &l.skills_column),
                ElementHandle::new("td").with_text("Java, , React ,"),
            );
            assert_eq!(page.employee_utilization("Alice Johnson").await.unwrap(), Some(12.5));
            assert_eq!(page.employee_skills("Alice Johnson").await.unwrap(), vec!["Java", "React"]);
            assert_eq!(page.employee_utilization("Nobody").await.unwrap(), None);
        }
    }

    mod state_tests {
        use super::*;

        #[tokio::test]
        async fn test_employee_status_is_trimmed() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            let l = &page.locators;
            mock.set_element(
                BenchDashboardLocators::cell(&l.row("Bob Smith"), &l.status_column),
                ElementHandle::new("td").with_text(" Active "),
            );
            assert_eq!(page.employee_status("Bob Smith").await.unwrap(), "Active");
            assert_eq!(page.employee_status("Nobody").await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_empty_state_message() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            assert!(!page.is_empty_state_visible().await.unwrap());
            mock.set_element(
                &page.locators.empty_state,
                ElementHandle::new("div").with_text("No employees on bench"),
            );
            assert!(page.is_empty_state_visible().await.unwrap());
            assert_eq!(page.empty_state_message().await.unwrap(), "No employees on bench");
        }
    }

    mod filter_tests {
        use super::*;

        #[tokio::test]
        async fn test_filter_by_utilization() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            let l = &page.locators;
            for key in [&l.filter_button, &l.min_utilization, &l.max_utilization, &l.apply_button] {
                mock.set_element(key, ElementHandle::new("input"));
            }
            page.filter_by_utilization(0, 50).await.unwrap();
            assert_eq!(mock.value_of(&l.min_utilization).as_deref(), Some("0"));
            assert_eq!(mock.value_of(&l.max_utilization).as_deref(), Some("50"));
            assert!(mock.was_called("wait:networkidle"));
        }

        #[tokio::test]
        async fn test_filter_by_skills_adds_each() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            let l = &page.locators;
            for key in [&l.filter_button, &l.skill_filter, &l.apply_button] {
                mock.set_element(key, ElementHandle::new("input"));
            }
            page.filter_by_skills(&["Java", "Python"]).await.unwrap();
            assert_eq!(mock.calls("press:").len(), 2);
        }

        #[tokio::test]
        async fn test_refresh_waits_for_spinner() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            let l = &page.locators;
            mock.set_element(&l.refresh_button, ElementHandle::new("button"));
            mock.set_element(&l.loading, ElementHandle::new("div"));
            assert!(page.refresh().await.unwrap_err().is_timeout());

            mock.on_click(&l.refresh_button, MockReaction::hide(&l.loading));
            page.refresh().await.unwrap();
        }

        #[test]
        fn test_split_skills() {
            assert_eq!(split_skills(" Java ,Go,,"), vec!["Java", "Go"]);
            assert!(split_skills("").is_empty());
        }
    }
}
