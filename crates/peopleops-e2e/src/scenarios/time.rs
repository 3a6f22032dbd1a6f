//! OrangeHRM time: timesheets, attendance and filters.

use super::{hrm_heading, open_menu};
use crate::data::unique_suffix;
use crate::result::E2eResult;
use crate::runner::{
    expect_contains, expect_eq, expect_true, expect_url_contains, expect_visible, Scenario,
    TestContext,
};

const SUITE: &str = "time";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUITE, "time module opens from the main menu", opens_from_menu).tag("smoke"),
        Scenario::new(SUITE, "attendance tab is reachable", attendance_tab),
        Scenario::new(SUITE, "attendance offers a punch button", punch_button),
        Scenario::new(SUITE, "from date after to date is rejected", reversed_range),
        Scenario::new(SUITE, "reset filters keeps the timesheet list", reset_filters),
        Scenario::new(SUITE, "add timesheet without required fields fails", timesheet_without_fields),
        Scenario::new(SUITE, "timesheets tab is reachable", timesheets_tab),
        Scenario::new(SUITE, "projects tab lists projects", projects_listed),
        Scenario::new(SUITE, "activities tab lists activities", activities_listed),
        Scenario::new(SUITE, "tabs switch between time views", tabs_switch_views),
        Scenario::new(SUITE, "timesheet list survives a reload", survives_reload),
        Scenario::new(SUITE, "status filter keeps matching timesheets", filter_by_status),
        Scenario::new(SUITE, "punching toggles attendance", punch_toggles),
        Scenario::new(SUITE, "my timesheet can be submitted", submit_my_timesheet),
        Scenario::new(SUITE, "add a project", add_project),
        Scenario::new(SUITE, "add an activity", add_activity),
    ]
}

async fn opens_from_menu(ctx: TestContext) -> E2eResult<()> {
    let base = ctx.hrm_base();
    base.navigate("/dashboard/index").await?;
    expect_visible(&base, hrm_heading("Dashboard")).await?;
    open_menu(&base, "Time").await?;
    expect_url_contains(&base, "time").await
}

async fn attendance_tab(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    time.navigate().await?;
    time.open_attendance_tab().await?;
    expect_url_contains(&ctx.hrm_base(), "attendance").await
}

/// Check In or Check Out, depending on the current punch state
async fn punch_button(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    let base = ctx.hrm_base();
    base.navigate("/attendance/punchIn").await?;
    let l = &time.locators;
    let either = l.punch_in_button.clone().or(l.punch_out_button.clone());
    expect_visible(&base, either).await
}

async fn reversed_range(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    time.navigate().await?;
    let rejected = time
        .verify_time_range_validation("2025-12-31", "2025-01-01")
        .await?;
    expect_true("the reversed date range to be rejected", rejected)
}

async fn reset_filters(ctx: TestContext) -> E2eResult<()> {
    let generator = ctx.generator();
    let time = ctx.time_page();
    time.navigate().await?;
    time.search_and_filter(&generator.date(-7), &generator.date(0), None)
        .await?;
    time.reset_filters().await?;
    expect_url_contains(&ctx.hrm_base(), "viewEmployeeTimesheet").await
}

async fn timesheet_without_fields(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    let base = ctx.hrm_base();
    time.navigate().await?;
    base.click_element(&time.locators.add_button).await?;
    base.click_element(&time.locators.save_button).await?;
    let errors = time.field_errors().await?;
    expect_true(
        &format!("at least one field error, got {errors:?}"),
        !errors.is_empty(),
    )
}

async fn timesheets_tab(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    time.navigate().await?;
    time.open_timesheets_tab().await?;
    expect_url_contains(&ctx.hrm_base(), "viewEmployeeTimesheet").await
}

async fn projects_listed(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    time.navigate().await?;
    time.open_projects_tab().await?;
    expect_url_contains(&ctx.hrm_base(), "viewProjects").await?;
    expect_true("the project table", time.is_table_displayed().await?)
}

async fn activities_listed(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    time.navigate().await?;
    time.open_activities_tab().await?;
    expect_url_contains(&ctx.hrm_base(), "viewActivities").await?;
    expect_true("the activity table", time.is_table_displayed().await?)
}

async fn tabs_switch_views(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    let base = ctx.hrm_base();
    time.navigate().await?;
    time.open_timesheets_tab().await?;
    expect_url_contains(&base, "viewEmployeeTimesheet").await?;
    time.open_attendance_tab().await?;
    expect_url_contains(&base, "attendance").await?;
    time.open_projects_tab().await?;
    expect_url_contains(&base, "viewProjects").await?;
    time.open_activities_tab().await?;
    expect_url_contains(&base, "viewActivities").await
}

async fn survives_reload(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    let base = ctx.hrm_base();
    time.navigate().await?;
    base.reload().await?;
    expect_url_contains(&base, "viewEmployeeTimesheet").await?;
    expect_true("the timesheet table", time.is_table_displayed().await?)
}

/// Every row left after a status filter carries that status
async fn filter_by_status(ctx: TestContext) -> E2eResult<()> {
    let generator = ctx.generator();
    let time = ctx.time_page();
    time.navigate().await?;
    time.search_and_filter(&generator.date(-30), &generator.date(0), Some("Submitted"))
        .await?;
    expect_true("the timesheet table", time.is_table_displayed().await?)?;
    expect_eq(
        "rows matching Submitted",
        time.timesheet_status_count("Submitted").await?,
        time.row_count().await?,
    )
}

/// Check In when punched out, Check Out otherwise
async fn punch_toggles(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    let base = ctx.hrm_base();
    base.navigate("/attendance/punchIn").await?;
    if base.is_element_visible(&time.locators.punch_in_button).await? {
        time.punch_in().await?;
    } else {
        time.punch_out().await?;
    }
    expect_contains("toast", &time.toast_message().await?, "Success")
}

/// Submit when the timesheet is still open, then expect a status line
async fn submit_my_timesheet(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    let base = ctx.hrm_base();
    base.navigate("/time/viewMyTimesheet").await?;
    if base.is_element_visible(&time.locators.submit_button).await? {
        time.submit_timesheet().await?;
        expect_contains("toast", &time.toast_message().await?, "Success")?;
    }
    expect_contains("timesheet status", &time.timesheet_status().await?, "Status")
}

async fn add_project(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    time.navigate().await?;
    time.open_projects_tab().await?;
    time.add_project(&format!("Project {}", unique_suffix())).await?;
    expect_contains("toast", &time.toast_message().await?, "Success")
}

async fn add_activity(ctx: TestContext) -> E2eResult<()> {
    let time = ctx.time_page();
    time.navigate().await?;
    time.open_activities_tab().await?;
    time.add_activity(&format!("Review {}", unique_suffix())).await?;
    expect_contains("toast", &time.toast_message().await?, "Success")
}
