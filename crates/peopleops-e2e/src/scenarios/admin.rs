//! OrangeHRM system user administration.

use super::{hrm_heading, open_menu};
use crate::data::UserFormData;
use crate::locator::Locator;
use crate::pages::{AdminLocators, AdminPage};
use crate::result::E2eResult;
use crate::runner::{
    expect_contains, expect_count, expect_eq, expect_true, expect_url_contains, expect_visible,
    Scenario, TestContext,
};

const SUITE: &str = "admin";

/// One-letter hint; the first employee suggestion is picked
const EMPLOYEE_HINT: &str = "a";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUITE, "admin page opens from the main menu", opens_from_menu).tag("smoke"),
        Scenario::new(SUITE, "add user button is shown", add_button_shown),
        Scenario::new(SUITE, "add user with valid data", add_user),
        Scenario::new(SUITE, "add user without mandatory fields", add_user_without_fields),
        Scenario::new(SUITE, "search user by username", search_by_username),
        Scenario::new(SUITE, "search user by role", search_by_role),
        Scenario::new(SUITE, "reset clears the search filters", reset_search),
        Scenario::new(SUITE, "search user by status", search_by_status),
        Scenario::new(SUITE, "unknown username finds no records", no_records),
        Scenario::new(SUITE, "role dropdown offers admin and ess", role_options),
        Scenario::new(SUITE, "status dropdown offers enabled and disabled", status_options),
        Scenario::new(SUITE, "change user status", change_status),
        Scenario::new(SUITE, "delete a user", delete_user),
    ]
}

/// Add a fresh ESS user and return it
async fn create_user(ctx: &TestContext, admin: &AdminPage) -> E2eResult<UserFormData> {
    let user = ctx.generator().user_form_data(EMPLOYEE_HINT);
    admin.navigate().await?;
    admin.add_user(&user).await?;
    expect_contains("toast", &admin.toast_message().await?, "Success")?;
    Ok(user)
}

async fn opens_from_menu(ctx: TestContext) -> E2eResult<()> {
    let base = ctx.hrm_base();
    base.navigate("/dashboard/index").await?;
    expect_visible(&base, hrm_heading("Dashboard")).await?;
    open_menu(&base, "Admin").await?;
    expect_url_contains(&base, "admin").await?;
    expect_true("the Admin heading", ctx.admin_page().is_heading_visible().await?)
}

async fn add_button_shown(ctx: TestContext) -> E2eResult<()> {
    let admin = ctx.admin_page();
    admin.navigate().await?;
    expect_visible(&ctx.hrm_base(), &admin.locators.add_button).await
}

async fn add_user(ctx: TestContext) -> E2eResult<()> {
    let admin = ctx.admin_page();
    let user = create_user(&ctx, &admin).await?;

    admin.navigate().await?;
    admin.search_user_by_username(&user.username).await?;
    expect_true(
        &format!("user {} to be listed", user.username),
        admin.is_user_listed(&user.username).await?,
    )
}

async fn add_user_without_fields(ctx: TestContext) -> E2eResult<()> {
    let admin = ctx.admin_page();
    let base = ctx.hrm_base();
    admin.navigate().await?;
    base.click_element(&admin.locators.add_button).await?;
    base.click_element(&admin.locators.save_button).await?;
    let errors = admin.field_errors().await?;
    expect_true("at least one field error", !errors.is_empty())?;
    expect_contains("field errors", &errors.join(" | "), "Required")?;
    expect_url_contains(&base, "saveSystemUser").await
}

async fn search_by_username(ctx: TestContext) -> E2eResult<()> {
    let username = ctx.reference().users.hrm_admin.username.clone();
    let admin = ctx.admin_page();
    admin.navigate().await?;
    admin.search_user_by_username(&username).await?;
    expect_count(&ctx.hrm_base(), &admin.locators.table_rows, 1).await?;
    expect_true("the admin user to be listed", admin.is_user_listed(&username).await?)
}

async fn search_by_role(ctx: TestContext) -> E2eResult<()> {
    let admin = ctx.admin_page();
    admin.navigate().await?;
    admin.search_user_by_role("Admin").await?;
    let rows = ctx.hrm_base().all_text_contents(&admin.locators.table_rows).await?;
    expect_true("at least one result", !rows.is_empty())?;
    expect_true(
        "every row to carry the Admin role",
        rows.iter().all(|row| row.contains("Admin")),
    )
}

async fn reset_search(ctx: TestContext) -> E2eResult<()> {
    let admin = ctx.admin_page();
    let base = ctx.hrm_base();
    admin.navigate().await?;
    base.fill_input(&admin.locators.search_input, "Test").await?;
    admin.reset_search().await?;
    let value = base.input_value(&admin.locators.search_input).await?;
    expect_eq("username filter", value.as_str(), "")
}

async fn search_by_status(ctx: TestContext) -> E2eResult<()> {
    let admin = ctx.admin_page();
    admin.navigate().await?;
    admin.search_user_by_status("Enabled").await?;
    let rows = ctx.hrm_base().all_text_contents(&admin.locators.table_rows).await?;
    expect_true("at least one result", !rows.is_empty())?;
    expect_true(
        "every row to be Enabled",
        rows.iter().all(|row| row.contains("Enabled")),
    )
}

async fn no_records(ctx: TestContext) -> E2eResult<()> {
    let admin = ctx.admin_page();
    admin.navigate().await?;
    admin.search_user_by_username("asdasd123123").await?;
    expect_true("No Records Found", admin.is_no_records_displayed().await?)?;
    expect_eq("rows", admin.row_count().await?, 0)
}

/// Open the add form and check `dropdown` lists every `expected` option
async fn dropdown_lists(
    ctx: TestContext,
    dropdown: fn(&AdminLocators) -> Locator,
    expected: &[&str],
) -> E2eResult<()> {
    let admin = ctx.admin_page();
    admin.navigate().await?;
    ctx.hrm_base().click_element(&admin.locators.add_button).await?;
    let options = admin.dropdown_options(&dropdown(&admin.locators)).await?;
    for option in expected {
        expect_true(
            &format!("option {option:?} in {options:?}"),
            options.iter().any(|o| o == option),
        )?;
    }
    Ok(())
}

async fn role_options(ctx: TestContext) -> E2eResult<()> {
    dropdown_lists(ctx, AdminLocators::role_dropdown, &["Admin", "ESS"]).await
}

async fn status_options(ctx: TestContext) -> E2eResult<()> {
    dropdown_lists(ctx, AdminLocators::status_dropdown, &["Enabled", "Disabled"]).await
}

async fn change_status(ctx: TestContext) -> E2eResult<()> {
    let admin = ctx.admin_page();
    let user = create_user(&ctx, &admin).await?;
    admin.navigate().await?;
    admin.search_user_by_username(&user.username).await?;
    admin.change_user_status(&user.username, "Disabled").await?;
    expect_contains("toast", &admin.toast_message().await?, "Success")
}

async fn delete_user(ctx: TestContext) -> E2eResult<()> {
    let admin = ctx.admin_page();
    let user = create_user(&ctx, &admin).await?;
    admin.navigate().await?;
    admin.search_user_by_username(&user.username).await?;
    admin.delete_user(&user.username).await?;
    expect_contains("toast", &admin.toast_message().await?, "Success")?;
    expect_true(
        &format!("user {} to be gone", user.username),
        !admin.is_user_listed(&user.username).await?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::driver::{ElementHandle, MockDriver, MockReaction};
    use crate::locator::TextMatch;
    use std::sync::Arc;

    fn context(mock: &Arc<MockDriver>) -> TestContext {
        let config = RunnerConfig {
            hrm_base_url: "https://hrm.test/web/index.php".into(),
            expect_timeout_ms: 150,
            ..RunnerConfig::default()
        };
        TestContext::new(mock.clone(), Arc::new(config), Arc::default(), "admin::test")
    }

    mod admin_tests {
        use super::*;

        #[tokio::test]
        async fn test_missing_fields_stay_on_form() {
            let mock = MockDriver::new().shared();
            let l = AdminLocators::default();
            mock.set_element(&l.add_button, ElementHandle::new("button"));
            mock.set_element(&l.save_button, ElementHandle::new("button"));
            mock.on_click(
                &l.add_button,
                MockReaction::navigate("https://hrm.test/web/index.php/admin/saveSystemUser"),
            );
            mock.on_click(
                &l.save_button,
                MockReaction::show(
                    &l.field_errors,
                    vec![
                        ElementHandle::new("span").with_text("Required"),
                        ElementHandle::new("span").with_text("Passwords do not match"),
                    ],
                ),
            );
            add_user_without_fields(context(&mock)).await.unwrap();
        }

        #[tokio::test]
        async fn test_search_by_username_expects_one_row() {
            let mock = MockDriver::new().shared();
            let l = AdminLocators::default();
            mock.set_element(&l.search_input, ElementHandle::new("input"));
            mock.set_element(&l.search_button, ElementHandle::new("button"));
            mock.set_elements(
                &l.table_rows,
                vec![
                    ElementHandle::new("div").with_text("Admin"),
                    ElementHandle::new("div").with_text("Admin2"),
                ],
            );
            let err = search_by_username(context(&mock)).await.unwrap_err();
            assert!(err.to_string().contains("actual: 2"));
        }

        #[tokio::test]
        async fn test_reset_clears_filter() {
            let mock = MockDriver::new().shared();
            let l = AdminLocators::default();
            mock.set_element(&l.search_input, ElementHandle::new("input"));
            mock.set_element(&l.reset_button, ElementHandle::new("button"));
            mock.on_click(&l.reset_button, MockReaction::show(&l.search_input, vec![ElementHandle::new("input")]));
            reset_search(context(&mock)).await.unwrap();
            assert!(mock.was_called(&format!("fill:{}=Test", l.search_input)));
        }

        #[tokio::test]
        async fn test_no_records_needs_message() {
            let mock = MockDriver::new().shared();
            let l = AdminLocators::default();
            mock.set_element(&l.search_input, ElementHandle::new("input"));
            mock.set_element(&l.search_button, ElementHandle::new("button"));
            let err = no_records(context(&mock)).await.unwrap_err();
            assert!(err.to_string().contains("No Records Found"));

            mock.set_element(&l.no_records, ElementHandle::new("span"));
            no_records(context(&mock)).await.unwrap();
        }

        #[tokio::test]
        async fn test_status_options_require_both() {
            let mock = MockDriver::new().shared();
            let l = AdminLocators::default();
            mock.set_element(&l.add_button, ElementHandle::new("button"));
            mock.set_element(l.status_dropdown(), ElementHandle::new("div"));
            mock.set_elements(
                &l.options,
                vec![
                    ElementHandle::new("div").with_text("-- Select --"),
                    ElementHandle::new("div").with_text("Enabled"),
                ],
            );
            let err = status_options(context(&mock)).await.unwrap_err();
            assert!(err.to_string().contains("Disabled"));
            assert!(mock.was_called(&format!("click:{}", l.status_dropdown())));
        }

        #[tokio::test]
        async fn test_search_by_status_rejects_disabled_rows() {
            let mock = MockDriver::new().shared();
            let l = AdminLocators::default();
            mock.set_element(l.status_dropdown(), ElementHandle::new("div"));
            mock.set_element(
                Locator::role_named("option", TextMatch::exact("Enabled")),
                ElementHandle::new("div"),
            );
            mock.set_element(&l.search_button, ElementHandle::new("button"));
            mock.set_elements(
                &l.table_rows,
                vec![
                    ElementHandle::new("div").with_text("Admin Admin Odis Enabled"),
                    ElementHandle::new("div").with_text("jdoe ESS John Disabled"),
                ],
            );
            let err = search_by_status(context(&mock)).await.unwrap_err();
            assert!(err.to_string().contains("Enabled"));
        }
    }
}
