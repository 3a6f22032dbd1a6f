//! Per-attempt state handed to a scenario body.

use crate::base_page::BasePage;
use crate::config::RunnerConfig;
use crate::data::{ReferenceData, TestDataGenerator};
use crate::driver::PageDriver;
use crate::pages::{
    AdminPage, BenchAnalyticsDashboardPage, BenchDashboardPage, DashboardPage, DesignationPage,
    EmployeePage, LeavePage, LoginPage, PortfolioCompanyPage, RecruitmentPage, RequisitionPage,
    SkillsPage, TimePage,
};
use crate::session::SessionStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Driver, configuration and reference data for one test attempt
#[derive(Debug, Clone)]
pub struct TestContext {
    driver: Arc<dyn PageDriver>,
    config: Arc<RunnerConfig>,
    reference: Arc<ReferenceData>,
    test_id: String,
    project: String,
    worker: usize,
    retry: u32,
}

impl TestContext {
    #[must_use]
    pub fn new(
        driver: Arc<dyn PageDriver>,
        config: Arc<RunnerConfig>,
        reference: Arc<ReferenceData>,
        test_id: impl Into<String>,
    ) -> Self {
        Self {
            driver,
            config,
            reference,
            test_id: test_id.into(),
            project: String::new(),
            worker: 0,
            retry: 0,
        }
    }

    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    #[must_use]
    pub const fn with_worker(mut self, worker: usize, retry: u32) -> Self {
        self.worker = worker;
        self.retry = retry;
        self
    }

    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub const fn worker(&self) -> usize {
        self.worker
    }

    /// Zero on the first attempt
    pub const fn retry(&self) -> u32 {
        self.retry
    }

    /// Where this attempt writes screenshots and traces
    #[must_use]
    pub fn artifact_dir(&self) -> PathBuf {
        super::executor::artifact_dir(&self.config.output_dir, &self.test_id, self.retry)
    }

    /// Fresh generator; scenarios seed their own fixtures
    #[must_use]
    pub fn generator(&self) -> TestDataGenerator {
        TestDataGenerator::new()
    }

    /// Session snapshot written by the setup project
    #[must_use]
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(&self.config.storage_state)
    }

    /// Base page bound to the PeopleOps platform
    #[must_use]
    pub fn base(&self) -> BasePage {
        BasePage::new(Arc::clone(&self.driver), &self.config.base_url)
            .with_action_timeout(self.config.expect_timeout_ms)
            .with_navigation_timeout(self.config.navigation_timeout_ms)
            .with_screenshot_dir(self.artifact_dir())
    }

    /// Base page bound to the OrangeHRM instance
    #[must_use]
    pub fn hrm_base(&self) -> BasePage {
        self.base().rebased(&self.config.hrm_base_url)
    }

    pub fn login_page(&self) -> LoginPage {
        LoginPage::peopleops(self.base())
    }

    pub fn hrm_login_page(&self) -> LoginPage {
        LoginPage::orange_hrm(self.hrm_base())
    }

    pub fn dashboard_page(&self) -> DashboardPage {
        DashboardPage::new(self.base())
    }

    pub fn employee_page(&self) -> EmployeePage {
        EmployeePage::new(self.base())
    }

    pub fn skills_page(&self, employee_code: &str) -> SkillsPage {
        SkillsPage::new(self.base(), employee_code)
    }

    pub fn designation_page(&self) -> DesignationPage {
        DesignationPage::new(self.base())
    }

    pub fn portfolio_company_page(&self) -> PortfolioCompanyPage {
        PortfolioCompanyPage::new(self.base())
    }

    pub fn requisition_page(&self) -> RequisitionPage {
        RequisitionPage::new(self.base())
    }

    pub fn bench_dashboard_page(&self) -> BenchDashboardPage {
        BenchDashboardPage::new(self.base())
    }

    pub fn bench_analytics_page(&self) -> BenchAnalyticsDashboardPage {
        BenchAnalyticsDashboardPage::new(self.base())
    }

    fn toast_timeout(&self) -> Duration {
        Duration::from_millis(self.config.expect_timeout_ms)
    }

    pub fn admin_page(&self) -> AdminPage {
        AdminPage::new(self.hrm_base()).with_toast_timeout(self.toast_timeout())
    }

    pub fn leave_page(&self) -> LeavePage {
        LeavePage::new(self.hrm_base()).with_toast_timeout(self.toast_timeout())
    }

    pub fn recruitment_page(&self) -> RecruitmentPage {
        RecruitmentPage::new(self.hrm_base()).with_toast_timeout(self.toast_timeout())
    }

    pub fn time_page(&self) -> TimePage {
        TimePage::new(self.hrm_base()).with_toast_timeout(self.toast_timeout())
    }
}
