//! PeopleOps platform dashboard.

use super::{capture, parse_number};
use crate::base_page::BasePage;
use crate::locator::{Locator, TextMatch};
use crate::page_object::PageObject;
use crate::result::E2eResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Service cards shown on the dashboard, in display order
pub const SERVICES: [&str; 9] = [
    "Identity Management",
    "Master Data",
    "Recruitment",
    "Staffing",
    "Billing",
    "Delivery",
    "Documents",
    "Notifications",
    "Reporting",
];

/// Sidebar section headings, in display order
pub const SIDEBAR_SECTIONS: [&str; 6] = [
    "OVERVIEW",
    "CORE SERVICES",
    "HR OPERATIONS",
    "BUSINESS SERVICES",
    "COMMUNICATION & REPORTING",
    "SYSTEM",
];

/// Headline numbers from the statistics cards, as displayed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStatistics {
    /// "Total Users" value, digits and separators
    pub total_users: Option<String>,
    /// "Active Services" value
    pub active_services: Option<String>,
    /// "Active Jobs" value
    pub active_jobs: Option<String>,
    /// "Monthly Revenue" value without the currency sign
    pub monthly_revenue: Option<String>,
}

/// Dashboard elements
#[derive(Debug, Clone)]
pub struct DashboardLocators {
    /// "PeopleOps Platform" heading
    pub page_title: Locator,
    /// Subtitle under the heading
    pub page_subtitle: Locator,
    /// Global search input
    pub search_bar: Locator,
    /// Theme switch
    pub dark_mode_toggle: Locator,
    /// Notification bell
    pub notification_bell: Locator,
    /// Unread count inside the bell
    pub notification_badge: Locator,
    /// Profile avatar ("AU")
    pub user_profile: Locator,
    /// Logout entry of the profile menu
    pub logout_item: Locator,
    /// Navigation sidebar
    pub sidebar: Locator,
    /// "N Issue(s)" notification
    pub issue_notification: Locator,
    /// Search result entries
    pub search_results: Locator,
    /// Empty search result message
    pub no_results: Locator,
}

impl Default for DashboardLocators {
    fn default() -> Self {
        let notification_bell = Locator::css(r#"button[aria-label*="notification"]"#).first();
        Self {
            page_title: Locator::text("PeopleOps Platform"),
            page_subtitle: Locator::text("Enterprise HR and Operations Management System"),
            search_bar: Locator::css(r#"input[placeholder*="Search"]"#),
            dark_mode_toggle: Locator::css(r#"button[aria-label*="theme"], button[aria-label*="dark"]"#).first(),
            notification_badge: notification_bell.clone().locator(r#"[class*="badge"]"#),
            notification_bell,
            user_profile: Locator::text(TextMatch::exact("AU")).last(),
            logout_item: Locator::text("Logout"),
            sidebar: Locator::css(r#"nav, [role="navigation"], aside"#).first(),
            issue_notification: Locator::text(TextMatch::Pattern {
                source: r"\d+ Issue".into(),
                case_insensitive: false,
            }),
            search_results: Locator::css(r#"[class*="search-result"]"#),
            no_results: Locator::text(TextMatch::pattern("No results|No matches")),
        }
    }
}

impl DashboardLocators {
    /// Statistics card labelled `label`
    #[must_use]
    pub fn statistic_card(label: &str) -> Locator {
        Locator::text(label).first().parent()
    }

    /// "Access {service}" button of a service card
    #[must_use]
    pub fn access_button(service: &str) -> Locator {
        Locator::css("button").has_text(format!("Access {service}"))
    }

    /// Service card title
    #[must_use]
    pub fn service_card(service: &str) -> Locator {
        Locator::text(service).first()
    }

    /// Sidebar entry named `name`
    #[must_use]
    pub fn menu_item(&self, name: &str) -> Locator {
        self.sidebar.clone().locator(Locator::text(name)).first()
    }
}

/// Dashboard at `/dashboard`
#[derive(Debug, Clone)]
pub struct DashboardPage {
    base: BasePage,
    /// Element locators
    pub locators: DashboardLocators,
}

impl DashboardPage {
    /// Create the page object
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            locators: DashboardLocators::default(),
        }
    }

    /// Open the dashboard and wait for its heading
    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await?;
        self.base
            .wait_for_element(
                &self.locators.page_title,
                crate::wait::ElementState::Visible,
                Duration::from_secs(10),
            )
            .await
    }

    /// Whether the heading shows up within five seconds
    pub async fn is_page_loaded(&self) -> E2eResult<bool> {
        self.base
            .is_visible_within(&self.locators.page_title, Duration::from_secs(5))
            .await
    }

    // =========================================================================
    // HEADER
    // =========================================================================

    /// Type a query into the global search and submit it
    pub async fn search_for(&self, text: &str) -> E2eResult<()> {
        self.base.fill_input(&self.locators.search_bar, text).await?;
        self.base.press(&self.locators.search_bar, "Enter").await
    }

    /// Empty the search input
    pub async fn clear_search(&self) -> E2eResult<()> {
        self.base.fill_input(&self.locators.search_bar, "").await
    }

    /// Whether the search produced anything
    pub async fn has_search_results(&self) -> E2eResult<bool> {
        Ok(!self.base.is_element_visible(&self.locators.no_results).await?)
    }

    /// Number of search result entries
    pub async fn search_results_count(&self) -> E2eResult<usize> {
        self.base.count(&self.locators.search_results).await
    }

    /// Flip the color theme
    pub async fn toggle_dark_mode(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.dark_mode_toggle).await
    }

    /// Whether `<html>` carries the `dark` class
    pub async fn is_dark_mode(&self) -> E2eResult<bool> {
        let classes = self
            .base
            .get_attribute(Locator::css("html"), "class")
            .await?
            .unwrap_or_default();
        Ok(classes.split_whitespace().any(|c| c == "dark"))
    }

    /// Open the notification panel
    pub async fn open_notifications(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.notification_bell).await
    }

    /// Unread notifications; zero without a badge
    pub async fn notification_count(&self) -> E2eResult<u32> {
        let badge = self.base.get_element_text(&self.locators.notification_badge).await?;
        Ok(badge.trim().parse().unwrap_or(0))
    }

    /// Sign out through the profile menu
    pub async fn logout(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.user_profile).await?;
        self.base.wait_for_timeout(500).await;
        self.base.click_element(&self.locators.logout_item).await
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Click a sidebar entry
    pub async fn navigate_to_menu(&self, name: &str) -> E2eResult<()> {
        self.base.click_element(self.locators.menu_item(name)).await
    }

    /// Whether the sidebar group `name` is expanded
    pub async fn is_menu_expanded(&self, name: &str) -> E2eResult<bool> {
        let group = Locator::text(name).first().parent();
        Ok(self
            .base
            .get_attribute(group, "aria-expanded")
            .await?
            .is_some_and(|v| v == "true"))
    }

    /// Whether the sidebar's Dashboard entry is showing
    pub async fn is_sidebar_visible(&self) -> E2eResult<bool> {
        self.base.is_element_visible(self.locators.menu_item("Dashboard")).await
    }

    /// Visibility of each sidebar section heading
    pub async fn sidebar_sections(&self) -> E2eResult<Vec<(&'static str, bool)>> {
        let mut sections = Vec::with_capacity(SIDEBAR_SECTIONS.len());
        for heading in SIDEBAR_SECTIONS {
            let visible = self
                .base
                .is_element_visible(Locator::text(TextMatch::exact(heading)))
                .await?;
            sections.push((heading, visible));
        }
        Ok(sections)
    }

    // =========================================================================
    // SERVICES
    // =========================================================================

    /// Press "Access {service}"
    pub async fn access_service(&self, service: &str) -> E2eResult<()> {
        self.base
            .click_element(DashboardLocators::access_button(service))
            .await
    }

    /// Whether the card for `service` is visible
    pub async fn is_service_card_visible(&self, service: &str) -> E2eResult<bool> {
        self.base
            .is_element_visible(DashboardLocators::service_card(service))
            .await
    }

    /// Visibility of every service card
    pub async fn service_cards(&self) -> E2eResult<Vec<(&'static str, bool)>> {
        let mut cards = Vec::with_capacity(SERVICES.len());
        for service in SERVICES {
            cards.push((service, self.is_service_card_visible(service).await?));
        }
        Ok(cards)
    }

    // =========================================================================
    // STATISTICS
    // =========================================================================

    async fn statistic(&self, label: &str, pattern: &str) -> E2eResult<Option<String>> {
        let text = self
            .base
            .get_element_text(DashboardLocators::statistic_card(label))
            .await?;
        Ok(capture(pattern, &text))
    }

    /// All four headline numbers
    pub async fn statistics(&self) -> E2eResult<DashboardStatistics> {
        Ok(DashboardStatistics {
            total_users: self.statistic("Total Users", r"([0-9][0-9,]*)").await?,
            active_services: self.statistic("Active Services", r"(\d+)").await?,
            active_jobs: self.statistic("Active Jobs", r"(\d+)").await?,
            monthly_revenue: self.statistic("Monthly Revenue", r"\$([0-9,]+)").await?,
        })
    }

    /// Number in the "N Issue" notification; zero when absent
    pub async fn issue_count(&self) -> E2eResult<u32> {
        let text = self
            .base
            .get_element_text(&self.locators.issue_notification)
            .await?;
        Ok(parse_number(&text).map_or(0, |n| n as u32))
    }

    /// Open the issue notification
    pub async fn open_issues(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.issue_notification).await
    }
}

impl PageObject for DashboardPage {
    fn path(&self) -> &str {
        "/dashboard"
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

    fn dashboard(mock: &Arc<MockDriver>) -> DashboardPage {
        DashboardPage::new(base(mock, PEOPLEOPS))
    }

    mod statistics_tests {
        use super::*;

        #[tokio::test]
        async fn test_statistics_parsed_from_cards() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            for (label, text) in [
                ("Total Users", "Total Users 1,234 +12%"),
                ("Active Services", "Active Services 9"),
                ("Active Jobs", "Active Jobs 42 this month"),
                ("Monthly Revenue", "Monthly Revenue $125,000"),
            ] {
                mock.set_element(
                    DashboardLocators::statistic_card(label),
                    ElementHandle::new("div").with_text(text),
                );
            }
            let stats = page.statistics().await.unwrap();
            assert_eq!(stats.total_users.as_deref(), Some("1,234"));
            assert_eq!(stats.active_services.as_deref(), Some("9"));
            assert_eq!(stats.active_jobs.as_deref(), Some("42"));
            assert_eq!(stats.monthly_revenue.as_deref(), Some("125,000"));
        }

        #[tokio::test]
        async fn test_missing_statistics_are_none() {
            let mock = MockDriver::new().shared();
            let stats = dashboard(&mock).statistics().await.unwrap();
            assert_eq!(stats, DashboardStatistics::default());
        }

        #[tokio::test]
        async fn test_issue_count() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            assert_eq!(page.issue_count().await.unwrap(), 0);
            mock.set_element(
                &page.locators.issue_notification,
                ElementHandle::new("span").with_text("3 Issues"),
            );
            assert_eq!(page.issue_count().await.unwrap(), 3);
        }
    }

    mod header_tests {
        use super::*;
        use crate::driver::PageDriver;

        #[tokio::test]
        async fn test_search_presses_enter() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            mock.set_element(&page.locators.search_bar, ElementHandle::new("input"));
            page.search_for("John").await.unwrap();
            assert_eq!(
                mock.history(),
                vec![
                    r#"fill:input[placeholder*="Search"]=John"#,
                    r#"press:input[placeholder*="Search"]=Enter"#,
                ]
            );
        }

        #[tokio::test]
        async fn test_dark_mode_reads_html_class() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            mock.set_element("html", ElementHandle::new("html").with_attribute("class", "light"));
            mock.set_element(&page.locators.dark_mode_toggle, ElementHandle::new("button"));
            mock.on_click(
                &page.locators.dark_mode_toggle,
                MockReaction::show(
                    "html",
                    vec![ElementHandle::new("html").with_attribute("class", "antialiased dark")],
                ),
            );
            assert!(!page.is_dark_mode().await.unwrap());
            page.toggle_dark_mode().await.unwrap();
            assert!(page.is_dark_mode().await.unwrap());
        }

        #[tokio::test]
        async fn test_notification_count() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            assert_eq!(page.notification_count().await.unwrap(), 0);
            mock.set_element(
                &page.locators.notification_badge,
                ElementHandle::new("span").with_text("5"),
            );
            assert_eq!(page.notification_count().await.unwrap(), 5);
        }

        #[tokio::test]
        async fn test_search_results_and_clear() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            mock.set_element(&page.locators.search_bar, ElementHandle::new("input"));
            mock.set_elements(&page.locators.search_results, vec![ElementHandle::new("li"); 3]);
            page.search_for("Staffing").await.unwrap();
            assert_eq!(page.search_results_count().await.unwrap(), 3);
            assert!(page.has_search_results().await.unwrap());
            page.clear_search().await.unwrap();
            assert_eq!(mock.value_of(&page.locators.search_bar).as_deref(), Some(""));
            mock.set_element(&page.locators.no_results, ElementHandle::new("p").with_text("No results"));
            assert!(!page.has_search_results().await.unwrap());
        }

        #[tokio::test]
        async fn test_open_notifications_clicks_bell() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            mock.set_element(&page.locators.notification_bell, ElementHandle::new("button"));
            page.open_notifications().await.unwrap();
            assert!(mock.was_called(&format!("click:{}", page.locators.notification_bell)));
        }

        #[tokio::test]
        async fn test_logout_through_profile_menu() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            mock.set_element(&page.locators.user_profile, ElementHandle::new("div").with_text("AU"));
            mock.on_click(
                &page.locators.user_profile,
                MockReaction::show(
                    &page.locators.logout_item,
                    vec![ElementHandle::new("button").with_text("Logout")],
                ),
            );
            mock.on_click(&page.locators.logout_item, MockReaction::navigate("http://localhost:3000/login"));
            page.logout().await.unwrap();
            assert_eq!(mock.current_url().await.unwrap(), "http://localhost:3000/login");
        }
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_access_service_button() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            mock.set_element(
                DashboardLocators::access_button("Recruitment"),
                ElementHandle::new("button").with_text("Access Recruitment"),
            );
            page.access_service("Recruitment").await.unwrap();
            assert!(mock.was_called(r#"click:button >> has-text="Access Recruitment"i"#));
        }

        #[tokio::test]
        async fn test_navigate_to_menu_stays_in_sidebar() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            let item = page.locators.menu_item("Analytics");
            mock.set_element(&item, ElementHandle::new("a"));
            page.navigate_to_menu("Analytics").await.unwrap();
            assert_eq!(mock.calls("click:"), vec![format!("click:{item}")]);
            let err = page.navigate_to_menu("Billing").await.unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_open_issues_and_service_cards() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            mock.set_element(&page.locators.issue_notification, ElementHandle::new("span").with_text("1 Issue"));
            page.open_issues().await.unwrap();
            assert!(mock.was_called(&format!("click:{}", page.locators.issue_notification)));
            mock.set_element(DashboardLocators::service_card("Billing"), ElementHandle::new("h3"));
            let cards = page.service_cards().await.unwrap();
            assert_eq!(cards.len(), SERVICES.len());
            assert!(cards.contains(&("Billing", true)));
            assert!(cards.contains(&("Reporting", false)));
        }

        #[tokio::test]
        async fn test_menu_expanded_and_sections() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            mock.set_element(
                Locator::text("HR Operations").first().parent(),
                ElementHandle::new("div").with_attribute("aria-expanded", "true"),
            );
            mock.set_element(Locator::text(TextMatch::exact("OVERVIEW")), ElementHandle::new("h3"));
            assert!(page.is_menu_expanded("HR Operations").await.unwrap());
            assert!(!page.is_menu_expanded("System").await.unwrap());
            let sections = page.sidebar_sections().await.unwrap();
            assert_eq!(sections[0], ("OVERVIEW", true));
            assert_eq!(sections[5], ("SYSTEM", false));
        }

        #[tokio::test]
        async fn test_navigate_waits_for_heading() {
            let mock = MockDriver::new().shared();
            let page = dashboard(&mock);
            mock.set_element(&page.locators.page_title, ElementHandle::new("h1"));
            page.navigate().await.unwrap();
            assert!(mock.was_called("goto:http://localhost:3000/dashboard"));
            assert!(page.is_page_loaded().await.unwrap());
        }
    }
}
