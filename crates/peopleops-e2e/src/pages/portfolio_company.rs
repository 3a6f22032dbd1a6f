//! Portfolio companies and their projects, engagements and positions.
//!
//! The page is a tree: a portfolio company holds projects, a project holds
//! engagements, an engagement holds positions. Each operation selects its
//! parent by exact name, then opens the child form.

use crate::base_page::BasePage;
use crate::data::{EngagementData, PortfolioCompanyData, PositionData, ProjectData};
use crate::locator::{Locator, TextMatch};
use crate::page_object::PageObject;
use crate::result::E2eResult;
use std::time::Duration;
use tracing::info;

fn named_button(pattern: &str) -> Locator {
    Locator::role_named("button", TextMatch::pattern(pattern))
}

/// Form inputs keyed by `data-testid`
#[derive(Debug, Clone)]
pub struct PortfolioCompanyLocators {
    pub portco_name: Locator,
    pub portco_code: Locator,
    pub portco_start_date: Locator,
    pub portco_end_date: Locator,
    pub project_name: Locator,
    pub project_code: Locator,
    pub project_start_date: Locator,
    pub project_end_date: Locator,
    pub engagement_name: Locator,
    pub engagement_code: Locator,
    pub engagement_start_date: Locator,
    pub engagement_end_date: Locator,
    pub engagement_budget: Locator,
    pub position_name: Locator,
    pub position_proficiency: Locator,
    pub position_resource_count: Locator,
    pub error_message: Locator,
    pub save_button: Locator,
    pub inactivate_button: Locator,
    pub add_project_button: Locator,
    pub close_project_button: Locator,
    pub add_engagement_button: Locator,
    pub add_position_button: Locator,
}

impl Default for PortfolioCompanyLocators {
    fn default() -> Self {
        Self {
            portco_name: Locator::test_id("portco-name"),
            portco_code: Locator::test_id("portco-code"),
            portco_start_date: Locator::test_id("portco-start-date"),
            portco_end_date: Locator::test_id("portco-end-date"),
            project_name: Locator::test_id("project-name"),
            project_code: Locator::test_id("project-code"),
            project_start_date: Locator::test_id("project-start-date"),
            project_end_date: Locator::test_id("project-end-date"),
            engagement_name: Locator::test_id("engagement-name"),
            engagement_code: Locator::test_id("engagement-code"),
            engagement_start_date: Locator::test_id("engagement-start-date"),
            engagement_end_date: Locator::test_id("engagement-end-date"),
            engagement_budget: Locator::test_id("engagement-budget"),
            position_name: Locator::test_id("position-name"),
            position_proficiency: Locator::test_id("position-proficiency"),
            position_resource_count: Locator::test_id("position-resource-count"),
            error_message: Locator::test_id("error-message"),
            save_button: named_button("save"),
            inactivate_button: named_button("inactivate|inactive"),
            add_project_button: named_button("add project"),
            close_project_button: named_button("close project"),
            add_engagement_button: named_button("add engagement"),
            add_position_button: named_button("add position"),
        }
    }
}

impl PortfolioCompanyLocators {
    /// Tree item whose text is exactly `name`
    #[must_use]
    pub fn item(name: &str) -> Locator {
        Locator::text(TextMatch::exact(name))
    }
}

/// Portfolio company tree at `/portfolio-company`
#[derive(Debug, Clone)]
pub struct PortfolioCompanyPage {
    base: BasePage,
    /// Element locators
    pub locators: PortfolioCompanyLocators,
}

impl PortfolioCompanyPage {
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            locators: PortfolioCompanyLocators::default(),
        }
    }

    /// Open the page and confirm the URL
    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await?;
        self.base
            .wait_for_url_pattern("portfolio-company", self.action_timeout())
            .await
    }

    fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.base.action_timeout_ms())
    }

    async fn fill_some(&self, target: &Locator, value: Option<&str>) -> E2eResult<()> {
        match value {
            Some(v) => self.base.fill_input(target, v).await,
            None => Ok(()),
        }
    }

    async fn select_item(&self, name: &str) -> E2eResult<()> {
        self.base
            .click_element(PortfolioCompanyLocators::item(name))
            .await
    }

    async fn save(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.save_button).await
    }

    /// Fill the company form with the fields present and save
    pub async fn create_portfolio_company(&self, data: &PortfolioCompanyData) -> E2eResult<()> {
        info!(name = ?data.name, code = ?data.code, "create portfolio company");
        let l = &self.locators;
        self.fill_some(&l.portco_name, data.name.as_deref()).await?;
        self.fill_some(&l.portco_code, data.code.as_deref()).await?;
        self.fill_some(&l.portco_start_date, data.start_date.as_deref()).await?;
        self.fill_some(&l.portco_end_date, data.end_date.as_deref()).await?;
        self.save().await
    }

    /// Select `name` and change code and dates; the name itself is not edited
    pub async fn edit_portfolio_company(&self, name: &str, updates: &PortfolioCompanyData) -> E2eResult<()> {
        let l = &self.locators;
        self.select_item(name).await?;
        self.fill_some(&l.portco_code, updates.code.as_deref()).await?;
        self.fill_some(&l.portco_start_date, updates.start_date.as_deref()).await?;
        self.fill_some(&l.portco_end_date, updates.end_date.as_deref()).await?;
        self.save().await
    }

    pub async fn inactivate_portfolio_company(&self, name: &str) -> E2eResult<()> {
        info!(name, "inactivate portfolio company");
        self.select_item(name).await?;
        self.base.click_element(&self.locators.inactivate_button).await
    }

    /// Add `project` under `portco`
    pub async fn add_project(&self, portco: &str, project: &ProjectData) -> E2eResult<()> {
        info!(portco, project = %project.name, "add project");
        let l = &self.locators;
        self.select_item(portco).await?;
        self.base.click_element(&l.add_project_button).await?;
        self.base.fill_input(&l.project_name, &project.name).await?;
        self.fill_some(&l.project_code, project.code.as_deref()).await?;
        self.fill_some(&l.project_start_date, project.start_date.as_deref()).await?;
        self.fill_some(&l.project_end_date, project.end_date.as_deref()).await?;
        self.save().await
    }

    pub async fn close_project(&self, name: &str) -> E2eResult<()> {
        self.select_item(name).await?;
        self.base.click_element(&self.locators.close_project_button).await
    }

    /// Add `engagement` under `project`
    pub async fn add_engagement(&self, project: &str, engagement: &EngagementData) -> E2eResult<()> {
        info!(project, engagement = %engagement.name, "add engagement");
        let l = &self.locators;
        self.select_item(project).await?;
        self.base.click_element(&l.add_engagement_button).await?;
        self.base.fill_input(&l.engagement_name, &engagement.name).await?;
        self.fill_some(&l.engagement_code, engagement.code.as_deref()).await?;
        self.fill_some(&l.engagement_start_date, engagement.start_date.as_deref()).await?;
        self.fill_some(&l.engagement_end_date, engagement.end_date.as_deref()).await?;
        self.fill_some(&l.engagement_budget, engagement.budget.as_deref()).await?;
        self.save().await
    }

    /// Define `position` on `engagement`
    pub async fn add_position(&self, engagement: &str, position: &PositionData) -> E2eResult<()> {
        let l = &self.locators;
        self.select_item(engagement).await?;
        self.base.click_element(&l.add_position_button).await?;
        self.base.fill_input(&l.position_name, &position.name).await?;
        self.fill_some(&l.position_proficiency, position.proficiency.as_deref()).await?;
        self.fill_some(&l.position_resource_count, position.resource_count.as_deref())
            .await?;
        self.save().await
    }

    /// Error banner text, waiting up to the action timeout
    pub async fn error_message(&self) -> E2eResult<String> {
        super::toast_text(&self.base, &self.locators.error_message, self.action_timeout()).await
    }

    /// Whether an item named exactly `name` is shown
    pub async fn is_listed(&self, name: &str) -> E2eResult<bool> {
        self.base
            .is_element_visible(PortfolioCompanyLocators::item(name))
            .await
    }

    /// Items named exactly `name`
    pub async fn listed_count(&self, name: &str) -> E2eResult<usize> {
        self.base.count(PortfolioCompanyLocators::item(name)).await
    }
}

impl PageObject for PortfolioCompanyPage {
    fn path(&self) -> &str {
        "/portfolio-company"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }
}
