//! PeopleOps employee master data.

use super::sign_in;
use crate::data::{email, unique_suffix, EmployeeData};
use crate::result::E2eResult;
use crate::runner::{
    expect_contains, expect_count, expect_true, expect_url_contains, Scenario, TestContext,
};

const SUITE: &str = "employee";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUITE, "create employee with mandatory fields", create_mandatory).tag("smoke"),
        Scenario::new(SUITE, "create employee with all fields", create_all_fields),
        Scenario::new(SUITE, "created employee is found by first name", search_by_name),
        Scenario::new(SUITE, "duplicate employee code is rejected", duplicate_code),
        Scenario::new(SUITE, "missing mandatory fields are validated", missing_fields),
        Scenario::new(SUITE, "exit date before hire date is rejected", exit_before_hire),
        Scenario::new(SUITE, "invalid email format is rejected", invalid_email),
        Scenario::new(SUITE, "invalid employee code format is rejected", invalid_code),
        Scenario::new(SUITE, "update employee status", update_status),
        Scenario::new(SUITE, "mark employee as exited", mark_exited),
        Scenario::new(SUITE, "delete employee", delete_employee),
        Scenario::new(SUITE, "cancel discards the add form", cancel_add),
        Scenario::new(SUITE, "export employee list", export_list),
    ]
}

/// Create a fresh employee through the form and confirm it was saved
pub(super) async fn seed_employee(ctx: &TestContext) -> E2eResult<EmployeeData> {
    let employee = ctx.generator().employee_data();
    let page = ctx.employee_page();
    page.navigate().await?;
    page.click_add_employee().await?;
    page.create_employee_with_mandatory_fields(&employee).await?;
    expect_contains("success message", &page.success_message().await?, "successfully")?;
    Ok(employee)
}

async fn create_mandatory(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let employee = seed_employee(&ctx).await?;
    let page = ctx.employee_page();
    page.navigate().await?;
    page.search_employee(&employee.code).await?;
    expect_true(
        &format!("employee {} in the table", employee.code),
        page.is_employee_in_table(&employee.code).await?,
    )
}

async fn create_all_fields(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let mut generator = ctx.generator();
    let employee = EmployeeData {
        internal_designation: Some(generator.designation()),
        billing_designation: Some(generator.designation()),
        ..generator.employee_data()
    };
    let page = ctx.employee_page();
    page.navigate().await?;
    page.click_add_employee().await?;
    page.create_employee_with_all_fields(&employee).await?;
    expect_contains("success message", &page.success_message().await?, "successfully")
}

/// John Doe from the reference data under a fresh code
async fn search_by_name(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let mut generator = ctx.generator();
    let template = ctx
        .reference()
        .employee_1()
        .cloned()
        .unwrap_or_else(|| generator.employee_data());
    let employee = EmployeeData {
        code: generator.employee_code(),
        email: format!("{}.{}", unique_suffix(), template.email),
        ..template
    };
    let page = ctx.employee_page();
    page.navigate().await?;
    page.click_add_employee().await?;
    page.create_employee_with_mandatory_fields(&employee).await?;
    expect_contains("success message", &page.success_message().await?, "successfully")?;

    page.navigate().await?;
    page.search_employee(&employee.first_name).await?;
    let rows = page.search_results().await?;
    expect_true(
        &format!("a row containing {:?}, got {rows:?}", employee.first_name),
        rows.iter().any(|row| row.contains(&employee.first_name)),
    )
}

async fn duplicate_code(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let first = seed_employee(&ctx).await?;
    let mut generator = ctx.generator();
    let (first_name, last_name) = (generator.first_name(), generator.last_name());
    let second = EmployeeData {
        email: format!("{}.{}", unique_suffix(), email(&first_name, &last_name)),
        first_name,
        last_name,
        ..first.clone()
    };

    let page = ctx.employee_page();
    page.navigate().await?;
    page.click_add_employee().await?;
    page.create_employee_with_mandatory_fields(&second).await?;
    expect_contains("error message", &page.error_message().await?, "already exists")?;

    page.navigate().await?;
    page.search_employee(&first.code).await?;
    expect_count(&ctx.base(), page.locators.row(&first.code), 1).await
}

async fn missing_fields(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.employee_page();
    page.navigate().await?;
    page.click_add_employee().await?;
    page.click_save().await?;
    let messages = page.all_validation_messages().await?;
    expect_true(
        &format!("at least one validation message, got {messages:?}"),
        !messages.is_empty(),
    )?;
    expect_url_contains(&ctx.base(), "employees").await
}

async fn exit_before_hire(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let mut generator = ctx.generator();
    let employee = EmployeeData {
        exit_date: Some(generator.date(-400)),
        ..generator.employee_data()
    };
    let page = ctx.employee_page();
    page.navigate().await?;
    page.click_add_employee().await?;
    page.create_employee_with_all_fields(&employee).await?;

    let expected = &ctx.reference().messages.employee.invalid_date_range;
    let mut shown = page.all_validation_messages().await?;
    shown.push(page.error_message().await?);
    expect_contains("date range error", &shown.join(" | "), expected)
}

async fn invalid_email(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let employee = EmployeeData {
        email: "invalid-email".into(),
        ..ctx.generator().employee_data()
    };
    let page = ctx.employee_page();
    page.navigate().await?;
    page.click_add_employee().await?;
    page.create_employee_with_mandatory_fields(&employee).await?;
    let message = page.email_validation().await?;
    expect_true("an email validation message", !message.trim().is_empty())
}

async fn invalid_code(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.employee_page();
    page.navigate().await?;
    page.click_add_employee().await?;
    page.fill_employee_code("INVALID").await?;
    page.click_save().await?;
    let message = page.employee_code_validation().await?;
    expect_true("an employee code validation message", !message.trim().is_empty())
}

async fn update_status(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let employee = seed_employee(&ctx).await?;
    let page = ctx.employee_page();
    page.navigate().await?;
    page.update_employee_status(&employee.code, "Inactive").await?;
    expect_contains("success message", &page.success_message().await?, "updated")
}

async fn mark_exited(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let employee = seed_employee(&ctx).await?;
    let exit_date = ctx.generator().exit_date();
    let page = ctx.employee_page();
    page.navigate().await?;
    page.mark_employee_as_exited(&employee.code, &exit_date).await?;
    expect_contains("success message", &page.success_message().await?, "updated")
}

async fn delete_employee(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let employee = seed_employee(&ctx).await?;
    let page = ctx.employee_page();
    page.navigate().await?;
    page.delete_employee(&employee.code).await?;
    expect_contains("success message", &page.success_message().await?, "deleted")?;
    expect_true(
        &format!("employee {} to be gone", employee.code),
        !page.is_employee_in_table(&employee.code).await?,
    )
}

/// Cancel closes the form without saving
async fn cancel_add(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let code = ctx.generator().employee_code();
    let page = ctx.employee_page();
    page.navigate().await?;
    page.click_add_employee().await?;
    expect_true("save enabled on the add form", page.is_save_button_enabled().await?)?;
    page.fill_employee_code(&code).await?;
    page.click_cancel().await?;
    expect_true("no success message", !page.is_success_message_displayed().await?)?;
    page.search_employee(&code).await?;
    expect_true(
        &format!("employee {code} not saved"),
        !page.is_employee_in_table(&code).await?,
    )
}

async fn export_list(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.employee_page();
    page.navigate().await?;
    expect_true("the export button", page.is_export_button_visible().await?)?;
    page.export().await?;
    expect_true("no error message", !page.is_error_message_displayed().await?)
}
