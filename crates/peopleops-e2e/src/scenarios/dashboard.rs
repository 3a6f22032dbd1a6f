//! PeopleOps dashboard: layout, header controls and navigation.

use super::sign_in;
use crate::result::E2eResult;
use crate::runner::{expect_true, expect_url_contains, Scenario, TestContext};
use tracing::debug;

const SUITE: &str = "dashboard";

/// Expandable sidebar groups
const MENUS: [&str; 8] = [
    "Identity & Access",
    "Master Data",
    "Recruitment",
    "Staffing",
    "Billing",
    "Delivery",
    "Documents",
    "Reporting",
];

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUITE, "dashboard loads after login", loads_after_login).tag("smoke"),
        Scenario::new(SUITE, "every service card is shown", service_cards),
        Scenario::new(SUITE, "every sidebar section is shown", sidebar_sections),
        Scenario::new(SUITE, "statistics cards show values", statistics),
        Scenario::new(SUITE, "sidebar links leave and return to the dashboard", menu_navigation),
        Scenario::new(SUITE, "identity and access menu expands", expand_menu),
        Scenario::new(SUITE, "every menu expands without hiding the sidebar", all_menus_expanded),
        Scenario::new(SUITE, "access button opens its service", access_service),
        Scenario::new(SUITE, "search finds a service and clears", search_with_results),
        Scenario::new(SUITE, "search with no matches shows no results", search_without_results),
        Scenario::new(SUITE, "search with special characters keeps the page", search_special_characters),
        Scenario::new(SUITE, "very long search keeps the page", search_long_input),
        Scenario::new(SUITE, "dark mode toggles", dark_mode),
        Scenario::new(SUITE, "notification bell opens", notifications),
        Scenario::new(SUITE, "issue notification opens when present", issues),
        Scenario::new(SUITE, "refresh keeps the dashboard", refresh),
        Scenario::new(SUITE, "logout returns to the login form", logout),
        Scenario::new(SUITE, "back after logout stays on login", back_after_logout),
        Scenario::new(SUITE, "direct access without login redirects", direct_access),
    ]
}

async fn loads_after_login(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    expect_true("the dashboard heading", dashboard.is_page_loaded().await?)?;
    expect_true("the sidebar", dashboard.is_sidebar_visible().await?)
}

async fn service_cards(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    dashboard.navigate().await?;
    let missing: Vec<_> = dashboard
        .service_cards()
        .await?
        .into_iter()
        .filter_map(|(name, visible)| (!visible).then_some(name))
        .collect();
    expect_true(&format!("all service cards, missing {missing:?}"), missing.is_empty())
}

async fn sidebar_sections(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    dashboard.navigate().await?;
    let missing: Vec<_> = dashboard
        .sidebar_sections()
        .await?
        .into_iter()
        .filter_map(|(name, visible)| (!visible).then_some(name))
        .collect();
    expect_true(&format!("all sidebar sections, missing {missing:?}"), missing.is_empty())
}

async fn statistics(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    dashboard.navigate().await?;
    let stats = dashboard.statistics().await?;
    expect_true("a total users figure", stats.total_users.is_some())?;
    expect_true("an active services figure", stats.active_services.is_some())?;
    expect_true("an active jobs figure", stats.active_jobs.is_some())?;
    expect_true("a monthly revenue figure", stats.monthly_revenue.is_some())
}

async fn menu_navigation(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    let base = ctx.base();
    dashboard.navigate().await?;
    dashboard.navigate_to_menu("Analytics").await?;
    base.wait_for_page_load().await?;
    let url = base.current_url().await?;
    expect_true(&format!("to leave the dashboard, still at {url:?}"), !url.contains("/dashboard"))?;
    dashboard.navigate_to_menu("Dashboard").await?;
    expect_url_contains(&base, "/dashboard").await
}

async fn expand_menu(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    dashboard.navigate().await?;
    dashboard.navigate_to_menu(MENUS[0]).await?;
    expect_true(
        &format!("menu {:?} expanded", MENUS[0]),
        dashboard.is_menu_expanded(MENUS[0]).await?,
    )
}

/// Groups that refuse to expand are skipped
async fn all_menus_expanded(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    dashboard.navigate().await?;
    for menu in MENUS {
        if let Err(err) = dashboard.navigate_to_menu(menu).await {
            debug!(menu, %err, "menu not expandable");
        }
    }
    expect_true("the sidebar", dashboard.is_sidebar_visible().await?)
}

async fn access_service(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    let base = ctx.base();
    dashboard.navigate().await?;
    dashboard.access_service("Identity Management").await?;
    base.wait_for_page_load().await?;
    let url = base.current_url().await?;
    expect_true(&format!("to leave the dashboard, still at {url:?}"), !url.contains("/dashboard"))
}

async fn search_with_results(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    dashboard.navigate().await?;
    dashboard.search_for("Identity").await?;
    ctx.base().wait_for_page_load().await?;
    let results = dashboard.search_results_count().await?;
    expect_true(&format!("search results for \"Identity\", got {results}"), results > 0)?;
    dashboard.clear_search().await?;
    let left = ctx.base().input_value(&dashboard.locators.search_bar).await?;
    expect_true(&format!("an empty search bar, got {left:?}"), left.is_empty())
}

async fn search_without_results(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    dashboard.navigate().await?;
    dashboard.search_for("zzqx-no-such-entry").await?;
    expect_true("no search results", !dashboard.has_search_results().await?)
}

/// Search `text` and expect the dashboard to survive it
async fn search_keeps_page(ctx: &TestContext, text: &str) -> E2eResult<()> {
    sign_in(ctx).await?;
    let dashboard = ctx.dashboard_page();
    dashboard.navigate().await?;
    dashboard.search_for(text).await?;
    ctx.base().wait_for_page_load().await?;
    expect_true("the dashboard heading", dashboard.is_page_loaded().await?)
}

async fn search_special_characters(ctx: TestContext) -> E2eResult<()> {
    search_keeps_page(&ctx, r"!@#$%^&*(){}[]<>?/\|").await
}

async fn search_long_input(ctx: TestContext) -> E2eResult<()> {
    search_keeps_page(&ctx, &"a".repeat(1000)).await
}

async fn dark_mode(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    dashboard.navigate().await?;
    let before = dashboard.is_dark_mode().await?;
    dashboard.toggle_dark_mode().await?;
    let after = dashboard.is_dark_mode().await?;
    expect_true("the theme to flip", before != after)
}

async fn notifications(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    dashboard.navigate().await?;
    let unread = dashboard.notification_count().await?;
    debug!(unread, "notifications");
    dashboard.open_notifications().await?;
    expect_true("the dashboard heading", dashboard.is_page_loaded().await?)
}

async fn issues(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let dashboard = ctx.dashboard_page();
    dashboard.navigate().await?;
    if !ctx.base().is_element_visible(&dashboard.locators.issue_notification).await? {
        return Ok(());
    }
    let count = dashboard.issue_count().await?;
    expect_true(&format!("a positive issue count, got {count}"), count > 0)?;
    dashboard.open_issues().await
}

async fn refresh(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let base = ctx.base();
    base.reload().await?;
    expect_url_contains(&base, "dashboard").await?;
    expect_true("the dashboard heading", ctx.dashboard_page().is_page_loaded().await?)
}

async fn logout(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    ctx.dashboard_page().logout().await?;
    expect_url_contains(&ctx.base(), "login").await
}

async fn back_after_logout(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let base = ctx.base();
    ctx.dashboard_page().logout().await?;
    expect_url_contains(&base, "login").await?;
    base.go_back().await?;
    base.wait_for_page_load().await?;
    expect_url_contains(&base, "login").await
}

async fn direct_access(ctx: TestContext) -> E2eResult<()> {
    let base = ctx.base();
    base.navigate("/dashboard").await?;
    expect_url_contains(&base, "login").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::driver::{ElementHandle, MockDriver, MockReaction};
    use crate::locator::Locator;
    use crate::pages::{DashboardLocators, LoginLocators};
    use std::sync::Arc;

    fn signed_in_mock() -> Arc<MockDriver> {
        let mock = MockDriver::new().shared();
        let login = LoginLocators::peopleops();
        mock.set_element(&login.username_input, ElementHandle::new("input"));
        mock.set_element(&login.password_input, ElementHandle::new("input"));
        mock.set_element(&login.sign_in_button, ElementHandle::new("button"));
        mock.on_click(
            &login.sign_in_button,
            MockReaction::navigate("http://people.test/dashboard"),
        );
        mock.set_element(DashboardLocators::default().page_title, ElementHandle::new("h1"));
        mock
    }

    fn context(mock: &Arc<MockDriver>) -> TestContext {
        let config = RunnerConfig {
            base_url: "http://people.test".into(),
            expect_timeout_ms: 150,
            navigation_timeout_ms: 150,
            ..RunnerConfig::default()
        };
        TestContext::new(mock.clone(), Arc::new(config), Arc::default(), "dashboard::dark-mode-toggles")
    }

    mod dashboard_tests {
        use super::*;

        #[tokio::test]
        async fn test_dark_mode_flips_html_class() {
            let mock = signed_in_mock();
            let l = DashboardLocators::default();
            let html = Locator::css("html");
            mock.set_element(&html, ElementHandle::new("html").with_attribute("class", "light"));
            mock.set_element(&l.dark_mode_toggle, ElementHandle::new("button"));
            mock.on_click(
                &l.dark_mode_toggle,
                MockReaction::show(&html, vec![ElementHandle::new("html").with_attribute("class", "dark")]),
            );
            dark_mode(context(&mock)).await.unwrap();
            assert!(mock.was_called("fill:input#email=admin"));
        }

        #[tokio::test]
        async fn test_dark_mode_fails_when_theme_is_stuck() {
            let mock = signed_in_mock();
            let l = DashboardLocators::default();
            mock.set_element(Locator::css("html"), ElementHandle::new("html"));
            mock.set_element(&l.dark_mode_toggle, ElementHandle::new("button"));
            let err = dark_mode(context(&mock)).await.unwrap_err();
            assert!(err.to_string().contains("theme to flip"));
        }

        #[tokio::test]
        async fn test_menu_navigation_round_trip() {
            let mock = signed_in_mock();
            let l = DashboardLocators::default();
            for (menu, url) in [
                ("Analytics", "http://people.test/analytics"),
                ("Dashboard", "http://people.test/dashboard"),
            ] {
                mock.set_element(l.menu_item(menu), ElementHandle::new("a"));
                mock.on_click(l.menu_item(menu), MockReaction::navigate(url));
            }
            menu_navigation(context(&mock)).await.unwrap();
        }

        #[tokio::test]
        async fn test_menu_navigation_fails_when_link_is_inert() {
            let mock = signed_in_mock();
            let l = DashboardLocators::default();
            mock.set_element(l.menu_item("Analytics"), ElementHandle::new("a"));
            let err = menu_navigation(context(&mock)).await.unwrap_err();
            assert!(err.to_string().contains("to leave the dashboard"));
        }

        #[tokio::test]
        async fn test_search_with_results_clears_bar() {
            let mock = signed_in_mock();
            let l = DashboardLocators::default();
            mock.set_element(&l.search_bar, ElementHandle::new("input"));
            mock.set_elements(&l.search_results, vec![ElementHandle::new("li"); 2]);
            search_with_results(context(&mock)).await.unwrap();
            assert!(mock.was_called(&format!("press:{}=Enter", l.search_bar)));
            assert_eq!(mock.calls("fill:").last(), Some(&format!("fill:{}=", l.search_bar)));
        }

        #[tokio::test]
        async fn test_issues_skipped_without_notification() {
            let mock = signed_in_mock();
            let l = DashboardLocators::default();
            issues(context(&mock)).await.unwrap();
            assert!(!mock.was_called(&format!("click:{}", l.issue_notification)));
        }

        #[tokio::test]
        async fn test_issues_opened_when_present() {
            let mock = signed_in_mock();
            let l = DashboardLocators::default();
            mock.set_element(&l.issue_notification, ElementHandle::new("span").with_text("2 Issues"));
            issues(context(&mock)).await.unwrap();
            assert!(mock.was_called(&format!("click:{}", l.issue_notification)));
        }
    }

    mod logout_tests {
        use super::*;

        #[tokio::test]
        async fn test_back_after_logout_flags_cached_dashboard() {
            let mock = signed_in_mock();
            let l = DashboardLocators::default();
            mock.set_element(&l.user_profile, ElementHandle::new("div").with_text("AU"));
            mock.set_element(&l.logout_item, ElementHandle::new("button"));
            mock.on_click(&l.logout_item, MockReaction::navigate("http://people.test/login"));
            let err = back_after_logout(context(&mock)).await.unwrap_err();
            assert!(mock.was_called("go_back"));
            assert!(err.to_string().contains("login"));
        }
    }
}
