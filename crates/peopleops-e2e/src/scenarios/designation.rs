//! PeopleOps designations.

use super::sign_in;
use crate::data::DesignationData;
use crate::result::E2eResult;
use crate::runner::{expect_contains, expect_count, expect_eq, expect_true, Scenario, TestContext};

const SUITE: &str = "designation";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUITE, "create designation with all fields", create).tag("smoke"),
        Scenario::new(SUITE, "mandatory fields are validated", mandatory_fields),
        Scenario::new(SUITE, "duplicate designation is prevented", duplicate),
        Scenario::new(SUITE, "row lookup matches the exact title", exact_row_lookup),
        Scenario::new(SUITE, "search designation by title", search_by_title),
        Scenario::new(SUITE, "update designation level", update_level),
        Scenario::new(SUITE, "delete designation", delete),
        Scenario::new(SUITE, "filter designations by department", filter_by_department),
        Scenario::new(SUITE, "sort designations by level", sort_by_level),
        Scenario::new(SUITE, "assign designation to an employee", assign),
        Scenario::new(SUITE, "cancel discards the add form", cancel_add),
        Scenario::new(SUITE, "export designations list", export_list),
    ]
}

fn title_of(data: &DesignationData) -> String {
    data.title.clone().unwrap_or_default()
}

async fn create(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let data = ctx.generator().designation_data();
    let title = title_of(&data);
    let page = ctx.designation_page();
    page.navigate().await?;
    page.add_designation(&data).await?;
    expect_contains("success message", &page.success_message().await?, "successfully")?;
    expect_true(
        &format!("designation {title:?} in the table"),
        page.is_designation_in_table(&title).await?,
    )
}

async fn mandatory_fields(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.designation_page();
    page.navigate().await?;
    page.click_add_button().await?;
    page.click_save_button().await?;
    let messages = page.all_validation_messages().await?;
    expect_true(
        &format!("at least one validation message, got {messages:?}"),
        !messages.is_empty(),
    )?;
    expect_true(
        "the form to stay open",
        ctx.base().is_element_visible(&page.locators.save_button).await?,
    )
}

async fn duplicate(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let data = ctx.generator().designation_data();
    let title = title_of(&data);
    let page = ctx.designation_page();
    page.navigate().await?;
    page.add_designation(&data).await?;
    expect_contains("success message", &page.success_message().await?, "successfully")?;

    page.add_designation(&data).await?;
    expect_contains("error message", &page.error_message().await?, "already exists")?;
    page.navigate().await?;
    page.search_designation(&title).await?;
    expect_count(&ctx.base(), page.locators.row(&title), 1).await
}

/// "X" and "X 2" both exist; a lookup of "X" resolves to one row
async fn exact_row_lookup(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let base_data = ctx.generator().designation_data();
    let title = title_of(&base_data);
    let longer = DesignationData {
        title: Some(format!("{title} 2")),
        ..base_data.clone()
    };
    let page = ctx.designation_page();
    page.navigate().await?;
    page.add_designation(&base_data).await?;
    page.add_designation(&longer).await?;
    page.navigate().await?;
    page.search_designation(&title).await?;
    expect_count(&ctx.base(), page.locators.row(&title), 1).await
}

async fn search_by_title(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let data = ctx.generator().designation_data();
    let title = title_of(&data);
    let page = ctx.designation_page();
    page.navigate().await?;
    page.add_designation(&data).await?;
    page.search_designation(&title).await?;
    let rows = page.search_results().await?;
    expect_true("at least one result", !rows.is_empty())?;
    expect_true(
        &format!("every row to mention {title:?}"),
        rows.iter().all(|row| row.contains(&title)),
    )
}

/// Sign in and add a fresh designation through the form
async fn seed_designation(ctx: &TestContext) -> E2eResult<DesignationData> {
    sign_in(ctx).await?;
    let data = ctx.generator().designation_data();
    let page = ctx.designation_page();
    page.navigate().await?;
    page.add_designation(&data).await?;
    expect_contains("success message", &page.success_message().await?, "successfully")?;
    Ok(data)
}

async fn update_level(ctx: TestContext) -> E2eResult<()> {
    let data = seed_designation(&ctx).await?;
    let updates = DesignationData {
        level: Some("Level 5".into()),
        ..DesignationData::default()
    };
    let page = ctx.designation_page();
    page.update_designation(&title_of(&data), &updates).await?;
    expect_contains("success message", &page.success_message().await?, "updated")
}

async fn delete(ctx: TestContext) -> E2eResult<()> {
    let data = seed_designation(&ctx).await?;
    let title = title_of(&data);
    let page = ctx.designation_page();
    page.delete_designation(&title).await?;
    expect_contains("success message", &page.success_message().await?, "deleted")?;
    expect_true(
        &format!("designation {title:?} to be gone"),
        !page.is_designation_in_table(&title).await?,
    )
}

async fn filter_by_department(ctx: TestContext) -> E2eResult<()> {
    let data = seed_designation(&ctx).await?;
    let department = data.department.unwrap_or_else(|| "Engineering".into());
    let page = ctx.designation_page();
    page.navigate().await?;
    page.filter_by_department(&department).await?;
    let rows = page.search_results().await?;
    expect_true(
        &format!("rows for department {department:?}"),
        !rows.is_empty(),
    )
}

async fn sort_by_level(ctx: TestContext) -> E2eResult<()> {
    seed_designation(&ctx).await?;
    let page = ctx.designation_page();
    page.navigate().await?;
    page.sort_by_level().await?;
    expect_true("sorted rows", !page.search_results().await?.is_empty())
}

async fn assign(ctx: TestContext) -> E2eResult<()> {
    let data = seed_designation(&ctx).await?;
    let employee_id = ctx
        .reference()
        .employee_1()
        .map_or_else(|| "EMP001".to_string(), |e| e.code.clone());
    let page = ctx.designation_page();
    page.assign_designation(&employee_id, &title_of(&data)).await?;
    expect_contains("success message", &page.success_message().await?, "assigned")
}

async fn cancel_add(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let data = ctx.generator().designation_data();
    let title = title_of(&data);
    let page = ctx.designation_page();
    page.navigate().await?;
    page.click_add_button().await?;
    page.fill_designation_form(&data).await?;
    page.click_cancel_button().await?;
    page.search_designation(&title).await?;
    expect_true(
        &format!("designation {title:?} not saved"),
        !page.is_designation_in_table(&title).await?,
    )
}

async fn export_list(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.designation_page();
    page.navigate().await?;
    expect_true("the export button", page.is_export_button_visible().await?)?;
    page.export().await?;
    expect_eq("error message", page.error_message().await?.as_str(), "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::driver::{ElementHandle, MockDriver, MockReaction};
    use crate::pages::{DesignationLocators, LoginLocators};
    use std::sync::Arc;

    fn signed_in_mock() -> Arc<MockDriver> {
        let mock = MockDriver::new().shared();
        let login = LoginLocators::peopleops();
        for input in [&login.username_input, &login.password_input, &login.sign_in_button] {
            mock.set_element(input, ElementHandle::new("input"));
        }
        mock.on_click(&login.sign_in_button, MockReaction::navigate("http://people.test/dashboard"));
        mock
    }

    fn context(mock: &Arc<MockDriver>) -> TestContext {
        let config = RunnerConfig {
            base_url: "http://people.test".into(),
            expect_timeout_ms: 150,
            navigation_timeout_ms: 150,
            ..RunnerConfig::default()
        };
        TestContext::new(mock.clone(), Arc::new(config), Arc::default(), "designation::test")
    }

    mod designation_tests {
        use super::*;

        #[tokio::test]
        async fn test_mandatory_fields_keep_form_open() {
            let mock = signed_in_mock();
            let l = DesignationLocators::default();
            mock.set_element(&l.add_button, ElementHandle::new("button"));
            mock.set_element(&l.save_button, ElementHandle::new("button"));
            mock.on_click(
                &l.save_button,
                MockReaction::show(
                    &l.validation_message,
                    vec![ElementHandle::new("span").with_text("Designation is required")],
                ),
            );
            mandatory_fields(context(&mock)).await.unwrap();
        }

        #[tokio::test]
        async fn test_cancel_add_does_not_save() {
            let mock = signed_in_mock();
            let l = DesignationLocators::default();
            for b in [&l.add_button, &l.cancel_button, &l.search_button] {
                mock.set_element(b, ElementHandle::new("button"));
            }
            for input in [&l.title_input, &l.search_input] {
                mock.set_element(input, ElementHandle::new("input"));
            }
            for select in [&l.department_dropdown, &l.level_dropdown] {
                mock.set_element(select, ElementHandle::new("select"));
            }
            cancel_add(context(&mock)).await.unwrap();
            assert!(mock.was_called(&format!("click:{}", l.cancel_button)));
            assert!(!mock.was_called(&format!("click:{}", l.save_button)));
        }

        #[tokio::test]
        async fn test_filter_needs_rows() {
            let mock = signed_in_mock();
            let l = DesignationLocators::default();
            for b in [&l.add_button, &l.save_button, &l.filter_button, &l.apply_button] {
                mock.set_element(b, ElementHandle::new("button"));
            }
            mock.set_element(&l.title_input, ElementHandle::new("input"));
            for select in [&l.department_dropdown, &l.level_dropdown, &l.filter_department] {
                mock.set_element(select, ElementHandle::new("select"));
            }
            mock.set_element(
                &l.success_message,
                ElementHandle::new("div").with_text("Designation created successfully"),
            );
            let err = filter_by_department(context(&mock)).await.unwrap_err();
            assert!(err.to_string().contains("rows for department"));

            mock.set_element(&l.table_rows, ElementHandle::new("tr").with_text("Architect Engineering"));
            filter_by_department(context(&mock)).await.unwrap();
            assert!(mock.was_called(&format!("select:{}", l.filter_department)));
        }

        #[tokio::test]
        async fn test_title_of_missing_title_is_empty() {
            assert_eq!(title_of(&DesignationData::default()), "");
            let data = DesignationData {
                title: Some("Architect".into()),
                ..DesignationData::default()
            };
            assert_eq!(title_of(&data), "Architect");
        }
    }
}
