//! The registered end-to-end scenarios.
//!
//! One module per area; each returns its scenarios in declaration order.
//! Bodies seed their own fixtures through the generator and never depend
//! on records created by a sibling scenario.

mod admin;
mod auth;
mod bench;
mod dashboard;
mod designation;
mod employee;
mod leave;
mod portfolio;
mod recruitment;
mod skills;
mod time;

use crate::base_page::BasePage;
use crate::locator::{Locator, TextMatch};
use crate::result::E2eResult;
use crate::runner::{expect_url_contains, Registry, TestContext};

/// Suite of the session setup scenario
pub const SETUP_SUITE: &str = "auth.setup";

/// Every scenario, grouped by suite
pub fn registry() -> E2eResult<Registry> {
    let mut registry = Registry::new();
    registry.extend(auth::scenarios())?;
    registry.extend(dashboard::scenarios())?;
    registry.extend(admin::scenarios())?;
    registry.extend(employee::scenarios())?;
    registry.extend(skills::scenarios())?;
    registry.extend(designation::scenarios())?;
    registry.extend(leave::scenarios())?;
    registry.extend(recruitment::scenarios())?;
    registry.extend(time::scenarios())?;
    registry.extend(portfolio::scenarios())?;
    registry.extend(bench::analytics_scenarios())?;
    registry.extend(bench::dashboard_scenarios())?;
    Ok(registry)
}

/// Sign in to PeopleOps as the resource manager and land on the dashboard
pub(crate) async fn sign_in(ctx: &TestContext) -> E2eResult<()> {
    let user = &ctx.reference().users.resource_manager;
    let login = ctx.login_page();
    login.navigate().await?;
    login.login(&user.username, &user.password).await?;
    expect_url_contains(&ctx.base(), "dashboard").await
}

/// OrangeHRM page heading
pub(crate) fn hrm_heading(name: &str) -> Locator {
    Locator::role_named("heading", TextMatch::exact(name))
}

/// Click a top-level OrangeHRM menu link
pub(crate) async fn open_menu(base: &BasePage, name: &str) -> E2eResult<()> {
    base.click_element(Locator::role_named("link", TextMatch::exact(name)))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;

    mod registry_tests {
        use super::*;

        #[test]
        fn test_registry_builds() {
            let registry = registry().unwrap();
            assert!(registry.len() > 40);
            assert!(registry.focused().is_empty());
        }

        #[test]
        fn test_every_area_has_a_suite() {
            let registry = registry().unwrap();
            let suites = registry.suites();
            for suite in [
                SETUP_SUITE,
                "login",
                "session",
                "dashboard",
                "admin",
                "employee",
                "skills",
                "designation",
                "leave",
                "recruitment",
                "time",
                "portfolio-company",
                "bench-analytics",
                "bench-dashboard",
            ] {
                assert!(suites.contains(&suite), "missing suite {suite}");
            }
        }

        #[test]
        fn test_default_projects_split_setup() {
            let registry = registry().unwrap();
            let config = RunnerConfig::default();
            let setup = config.project("setup").unwrap();
            let chromium = config.project("chromium").unwrap();
            let logged_out = config.project("logged-out").unwrap();
            let in_setup: Vec<_> = registry
                .scenarios()
                .iter()
                .filter(|s| setup.matches(&s.suite))
                .collect();
            assert_eq!(in_setup.len(), 1);
            assert_eq!(in_setup[0].suite, SETUP_SUITE);
            assert!(registry
                .scenarios()
                .iter()
                .filter(|s| s.suite != SETUP_SUITE)
                .all(|s| chromium.matches(&s.suite) != logged_out.matches(&s.suite)));
        }

        #[test]
        fn test_login_form_is_planned_without_session() {
            let registry = registry().unwrap();
            let config = RunnerConfig::default();
            for scenario in registry.scenarios() {
                let owner = config
                    .projects
                    .iter()
                    .find(|p| p.matches(&scenario.suite))
                    .unwrap();
                if scenario.suite == crate::config::LOGIN_SUITE {
                    assert!(!owner.use_storage_state, "{} sees a session", scenario.id);
                }
            }
            let reuse = registry
                .scenarios()
                .iter()
                .find(|s| s.title.starts_with("stored session"))
                .unwrap();
            assert!(config.project("chromium").unwrap().matches(&reuse.suite));
        }

        #[test]
        fn test_smoke_tag_selects_a_subset() {
            let registry = registry().unwrap();
            let smoke = registry
                .scenarios()
                .iter()
                .filter(|s| s.tags.iter().any(|t| t == "smoke"))
                .count();
            assert!(smoke > 0);
            assert!(smoke < registry.len());
        }
    }
}
