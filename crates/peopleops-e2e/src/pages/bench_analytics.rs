//! Bench analytics dashboard: utilization, bench list and skill gaps.

use super::parse_number;
use crate::base_page::BasePage;
use crate::locator::{Locator, TextMatch};
use crate::page_object::PageObject;
use crate::result::E2eResult;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BenchAnalyticsLocators {
    pub utilization_rows: Locator,
    /// Utilization figure inside a row
    pub utilization: Locator,
    pub employee_skills: Locator,
    pub bench_list: Locator,
    pub available_from: Locator,
    pub employee_status: Locator,
    pub utilization_chart: Locator,
    pub average_utilization: Locator,
    pub bench_count: Locator,
    pub engagement_end_dates: Locator,
    pub skill_gap_report: Locator,
    pub empty_state: Locator,
}

impl Default for BenchAnalyticsLocators {
    fn default() -> Self {
        Self {
            utilization_rows: Locator::test_id("utilization-row"),
            utilization: Locator::test_id("utilization"),
            employee_skills: Locator::test_id("employee-skill"),
            bench_list: Locator::test_id("bench-list"),
            available_from: Locator::test_id("available-from"),
            employee_status: Locator::test_id("employee-status"),
            utilization_chart: Locator::test_id("utilization-chart"),
            average_utilization: Locator::test_id("average-utilization"),
            bench_count: Locator::test_id("bench-count"),
            engagement_end_dates: Locator::test_id("engagement-end-date"),
            skill_gap_report: Locator::test_id("skill-gap-report"),
            empty_state: Locator::test_id("empty-state"),
        }
    }
}

impl BenchAnalyticsLocators {
    /// Utilization row that names `employee` exactly
    #[must_use]
    pub fn row(&self, employee: &str) -> Locator {
        self.utilization_rows
            .clone()
            .filter_has(Locator::text(TextMatch::exact(employee)))
    }

    #[must_use]
    pub fn bench_entry(&self, employee: &str) -> Locator {
        self.bench_list
            .clone()
            .locator(Locator::text(TextMatch::exact(employee)))
    }
}

/// Analytics view at `/bench-analytics`
#[derive(Debug, Clone)]
pub struct BenchAnalyticsDashboardPage {
    base: BasePage,
    pub locators: BenchAnalyticsLocators,
}

impl BenchAnalyticsDashboardPage {
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            locators: BenchAnalyticsLocators::default(),
        }
    }

    fn expect_timeout(&self) -> Duration {
        Duration::from_millis(self.base.action_timeout_ms())
    }

    /// Open the dashboard and confirm the URL
    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await?;
        self.base
            .wait_for_url_pattern("bench-analytics", self.expect_timeout())
            .await
    }

    /// Texts of rows whose utilization figure is below `percent`;
    /// rows without a readable figure are skipped
    pub async fn employees_with_utilization_below(&self, percent: f64) -> E2eResult<Vec<String>> {
        let l = &self.locators;
        let count = self.base.count(&l.utilization_rows).await?;
        let mut below = Vec::new();
        for i in 0..count {
            let row = l.utilization_rows.clone().nth(i);
            let figure = self
                .base
                .get_element_text(row.clone().locator(l.utilization.clone()))
                .await?;
            if parse_number(&figure).is_some_and(|value| value < percent) {
                below.push(self.base.get_element_text(row).await?);
            }
        }
        Ok(below)
    }

    pub async fn employee_skills(&self) -> E2eResult<Vec<String>> {
        self.base.all_text_contents(&self.locators.employee_skills).await
    }

    pub async fn is_employee_in_bench_list(&self, employee: &str) -> E2eResult<bool> {
        Ok(self.base.count(self.locators.bench_entry(employee)).await? > 0)
    }

    pub async fn available_from_date(&self, employee: &str) -> E2eResult<Option<String>> {
        let cell = self
            .locators
            .row(employee)
            .locator(self.locators.available_from.clone());
        if self.base.count(&cell).await? == 0 {
            return Ok(None);
        }
        Ok(Some(self.base.get_element_text(cell).await?))
    }

    /// Whether the status cell in the employee's row reads "inactive"
    pub async fn is_employee_inactive(&self, employee: &str) -> E2eResult<bool> {
        let cell = self
            .locators
            .row(employee)
            .locator(self.locators.employee_status.clone());
        let status = self.base.get_element_text(cell).await?;
        Ok(status.trim().eq_ignore_ascii_case("inactive"))
    }

    pub async fn is_utilization_chart_visible(&self) -> E2eResult<bool> {
        self.base
            .is_visible_within(&self.locators.utilization_chart, self.expect_timeout())
            .await
    }

    pub async fn average_utilization(&self) -> E2eResult<String> {
        self.base
            .get_element_text(&self.locators.average_utilization)
            .await
    }

    pub async fn bench_count(&self) -> E2eResult<String> {
        self.base.get_element_text(&self.locators.bench_count).await
    }

    pub async fn upcoming_engagement_end_dates(&self) -> E2eResult<Vec<String>> {
        self.base
            .all_text_contents(&self.locators.engagement_end_dates)
            .await
    }

    pub async fn is_skill_gap_report_visible(&self) -> E2eResult<bool> {
        self.base
            .is_visible_within(&self.locators.skill_gap_report, self.expect_timeout())
            .await
    }

    pub async fn is_empty_state_visible(&self) -> E2eResult<bool> {
        self.base
            .is_visible_within(&self.locators.empty_state, self.expect_timeout())
            .await
    }
}

impl PageObject for BenchAnalyticsDashboardPage {
    fn path(&self) -> &str {
        "/bench-analytics"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }
}
