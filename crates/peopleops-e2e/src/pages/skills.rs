//! Skills of one employee, with freshness evaluation.

use super::{button, toast_text};
use crate::base_page::BasePage;
use crate::data::{SkillData, SkillUpdate};
use crate::locator::Locator;
use crate::page_object::{row_by_cell, PageObject};
use crate::result::E2eResult;
use std::time::Duration;
use tracing::{debug, info};

/// Pause between consecutive skill submissions
pub const SKILL_SUBMIT_INTERVAL_MS: u64 = 500;

/// Skill form, table and freshness elements
#[derive(Debug, Clone)]
pub struct SkillsLocators {
    pub skill_name_input: Locator,
    pub proficiency_input: Locator,
    pub experience_input: Locator,
    pub last_used_date_input: Locator,
    pub add_skill_button: Locator,
    pub save_button: Locator,
    pub cancel_button: Locator,
    pub search_input: Locator,
    pub table_rows: Locator,
    pub table_cell: Locator,
    pub success_message: Locator,
    pub error_message: Locator,
    pub validation_error: Locator,
    pub warning_message: Locator,
    /// "Evaluate" / "Freshness Check"
    pub evaluate_freshness_button: Locator,
    /// Rusty marker anywhere in the table
    pub rusty_indicator: Locator,
    /// Months before a skill counts as stale
    pub freshness_override_input: Locator,
}

impl Default for SkillsLocators {
    fn default() -> Self {
        Self {
            skill_name_input: Locator::css(
                r#"input[name="skillName"], input[id="skillName"], select[name="skill"]"#,
            ),
            proficiency_input: Locator::css(
                r#"input[name="proficiency"], input[id="proficiency"], select[name="proficiency"]"#,
            ),
            experience_input: Locator::css(
                r#"input[name="experience"], input[id="experience"], input[name="yearsOfExperience"]"#,
            ),
            last_used_date_input: Locator::css(r#"input[name="lastUsedDate"], input[id="lastUsedDate"]"#),
            add_skill_button: button("Add Skill").or(button("+ Skill")),
            save_button: button("Save").or(Locator::css(r#"button[type="submit"]"#)),
            cancel_button: button("Cancel"),
            search_input: Locator::css(r#"input[placeholder*="Search skill"]"#),
            table_rows: Locator::css(
                r#"table.skills-table tbody tr, [data-testid="skills-table"] tbody tr, .skills-list tr"#,
            ),
            table_cell: Locator::css("td"),
            success_message: Locator::css(".success, .alert-success")
                .or(Locator::css(r#"[role="alert"]"#).has_text("success")),
            error_message: Locator::css(".error, .alert-error, .alert-danger")
                .or(Locator::css(r#"[role="alert"]"#).has_text("error")),
            validation_error: Locator::css(".validation-error, .field-error, .invalid-feedback"),
            warning_message: Locator::css(".warning, .alert-warning"),
            evaluate_freshness_button: button("Evaluate").or(button("Freshness Check")),
            rusty_indicator: Locator::css(r#".rusty-skill, [data-status="rusty"], .skill-warning"#),
            freshness_override_input: Locator::css(
                r#"input[name="freshnessOverride"], input[id="freshnessOverride"]"#,
            ),
        }
    }
}

impl SkillsLocators {
    /// Row whose name cell equals `skill`
    #[must_use]
    pub fn row(&self, skill: &str) -> Locator {
        row_by_cell(&self.table_rows, &self.table_cell, skill)
    }

    #[must_use]
    pub fn edit_button(&self, skill: &str) -> Locator {
        self.row(skill)
            .locator(button("Edit").or(Locator::css(r#"[aria-label="Edit"]"#)))
    }

    #[must_use]
    pub fn delete_button(&self, skill: &str) -> Locator {
        self.row(skill)
            .locator(button("Delete").or(Locator::css(r#"[aria-label="Delete"]"#)))
    }

    /// Rusty marker inside the row of `skill`
    #[must_use]
    pub fn rusty_marker(&self, skill: &str) -> Locator {
        self.row(skill)
            .locator(Locator::css(r#".rusty-skill, [data-status="rusty"]"#))
    }
}

/// Skills tab at `/employees/{code}/skills`
#[derive(Debug, Clone)]
pub struct SkillsPage {
    base: BasePage,
    path: String,
    /// Element locators
    pub locators: SkillsLocators,
}

impl SkillsPage {
    /// Skills page of `employee_code`
    #[must_use]
    pub fn new(base: BasePage, employee_code: &str) -> Self {
        Self {
            base,
            path: format!("/employees/{employee_code}/skills"),
            locators: SkillsLocators::default(),
        }
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await
    }

    pub async fn click_add_skill(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.add_skill_button).await
    }

    pub async fn click_save(&self) -> E2eResult<()> {
        self.base.click_element(&self.locators.save_button).await
    }

    /// Open the form, fill it and save
    pub async fn add_skill(&self, skill: &SkillData) -> E2eResult<()> {
        info!(skill = %skill.name, "add skill");
        let l = &self.locators;
        self.click_add_skill().await?;
        self.base.fill_input(&l.skill_name_input, &skill.name).await?;
        self.base.fill_input(&l.proficiency_input, &skill.proficiency).await?;
        self.base.fill_input(&l.experience_input, &skill.experience).await?;
        if let Some(date) = &skill.last_used_date {
            self.base.fill_input(&l.last_used_date_input, date).await?;
        }
        self.click_save().await
    }

    /// Add each skill in turn, pausing between submissions
    pub async fn add_multiple_skills(&self, skills: &[SkillData]) -> E2eResult<()> {
        for skill in skills {
            self.add_skill(skill).await?;
            self.base.wait_for_timeout(SKILL_SUBMIT_INTERVAL_MS).await;
        }
        Ok(())
    }

    /// Edit the row of `skill`, changing only the fields present in `update`
    pub async fn update_skill(&self, skill: &str, update: &SkillUpdate) -> E2eResult<()> {
        info!(skill, "update skill");
        let l = &self.locators;
        self.base.click_element(l.edit_button(skill)).await?;
        if let Some(proficiency) = &update.proficiency {
            self.base.fill_input(&l.proficiency_input, proficiency).await?;
        }
        if let Some(experience) = &update.experience {
            self.base.fill_input(&l.experience_input, experience).await?;
        }
        if let Some(date) = &update.last_used_date {
            self.base.fill_input(&l.last_used_date_input, date).await?;
        }
        self.click_save().await
    }

    /// Delete the row of `skill`, accepting the confirmation dialog
    pub async fn delete_skill(&self, skill: &str) -> E2eResult<()> {
        info!(skill, "delete skill");
        self.base.auto_dialogs(true).await?;
        self.base.click_element(self.locators.delete_button(skill)).await
    }

    pub async fn search_skill(&self, term: &str) -> E2eResult<()> {
        self.base.fill_input(&self.locators.search_input, term).await
    }

    pub async fn is_skill_in_table(&self, skill: &str) -> E2eResult<bool> {
        self.base.is_element_visible(self.locators.row(skill)).await
    }

    /// Rows currently listed
    pub async fn skill_count(&self) -> E2eResult<usize> {
        self.base.count(self.locators.table_rows.clone().visible()).await
    }

    /// Run the freshness evaluation and wait for the network to settle
    pub async fn evaluate_skill_freshness(&self) -> E2eResult<()> {
        self.base
            .click_element(&self.locators.evaluate_freshness_button)
            .await?;
        self.base.wait_for_page_load().await
    }

    pub async fn is_skill_flagged_as_rusty(&self, skill: &str) -> E2eResult<bool> {
        self.base.is_element_visible(self.locators.rusty_marker(skill)).await
    }

    /// Override the staleness threshold
    pub async fn set_freshness_override(&self, months: u32) -> E2eResult<()> {
        debug!(months, "freshness override");
        self.base
            .fill_input(&self.locators.freshness_override_input, &months.to_string())
            .await
    }

    pub async fn rusty_skills_count(&self) -> E2eResult<usize> {
        self.base.count(&self.locators.rusty_indicator).await
    }

    fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.base.action_timeout_ms())
    }

    pub async fn success_message(&self) -> E2eResult<String> {
        toast_text(&self.base, &self.locators.success_message, self.message_timeout()).await
    }

    pub async fn error_message(&self) -> E2eResult<String> {
        toast_text(&self.base, &self.locators.error_message, self.message_timeout()).await
    }

    pub async fn warning_message(&self) -> E2eResult<String> {
        toast_text(&self.base, &self.locators.warning_message, self.message_timeout()).await
    }

    pub async fn is_validation_error_displayed(&self) -> E2eResult<bool> {
        self.base.is_element_visible(&self.locators.validation_error).await
    }

    pub async fn all_validation_messages(&self) -> E2eResult<Vec<String>> {
        self.base.all_text_contents(&self.locators.validation_error).await
    }
}

impl PageObject for SkillsPage {
    fn path(&self) -> &str {
        &self.path
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

    fn skills_page(mock: &Arc<MockDriver>) -> SkillsPage {
        let page = SkillsPage::new(base(mock, PEOPLEOPS), "EMP001");
        let l = &page.locators;
        for input in [
            &l.skill_name_input,
            &l.proficiency_input,
            &l.experience_input,
            &l.last_used_date_input,
            &l.freshness_override_input,
        ] {
            mock.set_element(input, ElementHandle::new("input"));
        }
        mock.set_element(&l.add_skill_button, ElementHandle::new("button"));
        mock.set_element(&l.save_button, ElementHandle::new("button"));
        page
    }

    fn javascript() -> SkillData {
        SkillData {
            name: "JavaScript".into(),
            proficiency: "3".into(),
            experience: "5".into(),
            last_used_date: None,
        }
    }

    mod form_tests {
        use super::*;

        #[tokio::test]
        async fn test_path_includes_employee_code() {
            let mock = MockDriver::new().shared();
            skills_page(&mock).navigate().await.unwrap();
            assert!(mock.was_called("goto:http://localhost:3000/employees/EMP001/skills"));
        }

        #[tokio::test]
        async fn test_add_skill_skips_missing_date() {
            let mock = MockDriver::new().shared();
            let page = skills_page(&mock);
            page.add_skill(&javascript()).await.unwrap();
            assert_eq!(mock.calls("fill:").len(), 3);
            assert_eq!(mock.value_of(&page.locators.proficiency_input).as_deref(), Some("3"));
            assert_eq!(mock.value_of(&page.locators.last_used_date_input), None);
            assert_eq!(mock.calls("click:").len(), 2);
        }

        #[tokio::test]
        async fn test_add_multiple_skills_submits_each() {
            let mock = MockDriver::new().shared();
            let page = skills_page(&mock);
            let python = SkillData {
                name: "Python".into(),
                ..javascript()
            };
            page.add_multiple_skills(&[javascript(), python]).await.unwrap();
            assert_eq!(mock.value_of(&page.locators.skill_name_input).as_deref(), Some("Python"));
            assert_eq!(mock.calls("click:").len(), 4);
        }

        #[tokio::test]
        async fn test_update_only_given_fields() {
            let mock = MockDriver::new().shared();
            let page = skills_page(&mock);
            mock.set_element(page.locators.edit_button("JavaScript"), ElementHandle::new("button"));
            let update = SkillUpdate {
                proficiency: Some("4".into()),
                ..SkillUpdate::default()
            };
            page.update_skill("JavaScript", &update).await.unwrap();
            assert_eq!(mock.calls("fill:").len(), 1);
            assert_eq!(mock.value_of(&page.locators.proficiency_input).as_deref(), Some("4"));
        }
    }

    mod table_tests {
        use super::*;

        #[tokio::test]
        async fn test_delete_skill_accepts_dialog() {
            let mock = MockDriver::new().shared();
            let page = skills_page(&mock);
            mock.set_element(page.locators.delete_button("JavaScript"), ElementHandle::new("button"));
            page.delete_skill("JavaScript").await.unwrap();
            assert!(mock.was_called("evaluate:"));
            assert!(mock.was_called(&format!("click:{}", page.locators.delete_button("JavaScript"))));
        }

        #[tokio::test]
        async fn test_search_and_count() {
            let mock = MockDriver::new().shared();
            let page = skills_page(&mock);
            mock.set_element(&page.locators.search_input, ElementHandle::new("input"));
            mock.set_elements(
                page.locators.table_rows.clone().visible(),
                vec![ElementHandle::new("tr").with_text("Go 3 5"); 2],
            );
            page.search_skill("Go").await.unwrap();
            assert_eq!(mock.value_of(&page.locators.search_input).as_deref(), Some("Go"));
            assert_eq!(page.skill_count().await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_delete_missing_skill_times_out() {
            let mock = MockDriver::new().shared();
            let err = skills_page(&mock).delete_skill("Cobol").await.unwrap_err();
            assert!(err.is_timeout());
        }
    }

    mod message_tests {
        use super::*;

        #[tokio::test]
        async fn test_messages_read_visible_toasts() {
            let mock = MockDriver::new().shared();
            let page = skills_page(&mock);
            mock.set_element(
                &page.locators.warning_message,
                ElementHandle::new("div").with_text("Skill not used recently"),
            );
            mock.set_element(
                &page.locators.error_message,
                ElementHandle::new("div").with_text("Skill already exists"),
            );
            assert_eq!(page.warning_message().await.unwrap(), "Skill not used recently");
            assert_eq!(page.error_message().await.unwrap(), "Skill already exists");
            assert_eq!(page.success_message().await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_validation_error_flag() {
            let mock = MockDriver::new().shared();
            let page = skills_page(&mock);
            assert!(!page.is_validation_error_displayed().await.unwrap());
            mock.set_element(
                &page.locators.validation_error,
                ElementHandle::new("p").with_text("Experience cannot be negative"),
            );
            assert!(page.is_validation_error_displayed().await.unwrap());
            assert_eq!(
                page.all_validation_messages().await.unwrap(),
                vec!["Experience cannot be negative".to_string()]
            );
        }
    }

    mod freshness_tests {
        use super::*;

        #[tokio::test]
        async fn test_evaluate_waits_for_network_idle() {
            let mock = MockDriver::new().shared();
            let page = skills_page(&mock);
            mock.set_element(&page.locators.evaluate_freshness_button, ElementHandle::new("button"));
            mock.on_click(
                &page.locators.evaluate_freshness_button,
                MockReaction::show(
                    &page.locators.rusty_indicator,
                    vec![ElementHandle::new("span"), ElementHandle::new("span")],
                ),
            );
            mock.set_element(page.locators.rusty_marker("Python"), ElementHandle::new("span"));
            page.set_freshness_override(9).await.unwrap();
            page.evaluate_skill_freshness().await.unwrap();
            assert!(mock.was_called("wait:networkidle"));
            assert_eq!(page.rusty_skills_count().await.unwrap(), 2);
            assert!(page.is_skill_flagged_as_rusty("Python").await.unwrap());
            assert!(!page.is_skill_flagged_as_rusty("JavaScript").await.unwrap());
            assert_eq!(mock.value_of(&page.locators.freshness_override_input).as_deref(), Some("9"));
        }
    }
}
