//! Page objects for the PeopleOps platform and the OrangeHRM instance.
//!
//! Each page holds a [`BasePage`](crate::base_page::BasePage) plus a public
//! struct of named locators built once in `new`. Actions take plain fixture
//! structs and skip `None` fields; reads never mutate page state.

pub mod admin;
pub mod bench_analytics;
pub mod bench_dashboard;
pub mod dashboard;
pub mod designation;
pub mod employee;
pub mod leave;
pub mod login;
pub mod portfolio_company;
pub mod recruitment;
pub mod skills;
pub mod time;

pub use admin::{AdminLocators, AdminPage};
pub use bench_analytics::{BenchAnalyticsDashboardPage, BenchAnalyticsLocators};
pub use bench_dashboard::{BenchDashboardLocators, BenchDashboardPage, BenchEmployee};
pub use dashboard::{DashboardLocators, DashboardPage, DashboardStatistics};
pub use designation::{DesignationLocators, DesignationPage};
pub use employee::{EmployeeLocators, EmployeePage};
pub use leave::{LeaveField, LeaveLocators, LeavePage};
pub use login::{LoginLocators, LoginPage};
pub use portfolio_company::{PortfolioCompanyLocators, PortfolioCompanyPage};
pub use recruitment::{
    RecruitmentLocators, RecruitmentPage, RequisitionDetails, RequisitionPage,
};
pub use skills::{SkillsLocators, SkillsPage};
pub use time::{TimeLocators, TimePage};

use crate::base_page::BasePage;
use crate::locator::{Locator, TextMatch};
use crate::result::E2eResult;
use std::time::Duration;

/// First capture group of `pattern` in `text`
pub(crate) fn capture(pattern: &str, text: &str) -> Option<String> {
    regex::Regex::new(pattern)
        .ok()?
        .captures(text)?
        .get(1)
        .map(|m| m.as_str().to_string())
}

/// Leading number in `text` (`"45%"` → 45.0, `"1,234"` → 1234.0)
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    capture(r"(-?[0-9][0-9,]*(?:\.[0-9]+)?)", text)?
        .replace(',', "")
        .parse()
        .ok()
}

/// Button located by its accessible name
pub(crate) fn button(name: &str) -> Locator {
    Locator::role_named("button", TextMatch::exact(name))
}

/// Open an OrangeHRM `oxd-select` dropdown and pick an option
pub(crate) async fn choose_option(base: &BasePage, dropdown: &Locator, option: &str) -> E2eResult<()> {
    base.click_element(dropdown).await?;
    base.click_element(Locator::role_named("option", TextMatch::exact(option)))
        .await
}

/// Fill an OrangeHRM autocomplete and accept the first suggestion
pub(crate) async fn autocomplete(base: &BasePage, input: &Locator, text: &str) -> E2eResult<()> {
    base.fill_input(input, text).await?;
    let suggestion = Locator::css(".oxd-autocomplete-option").has_text(text).first();
    base.click_element(suggestion).await
}

/// Text of a toast if one appears within `timeout`
pub(crate) async fn toast_text(base: &BasePage, toast: &Locator, timeout: Duration) -> E2eResult<String> {
    if base.is_visible_within(toast, timeout).await? {
        base.get_element_text(toast).await
    } else {
        Ok(String::new())
    }
}
