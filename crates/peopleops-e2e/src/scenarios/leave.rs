//! OrangeHRM leave: navigation, the apply form and its validation.

use super::{hrm_heading, open_menu};
use crate::data::LeaveRequest;
use crate::pages::LeaveField;
use crate::result::E2eResult;
use crate::runner::{
    expect_contains, expect_eq, expect_true, expect_url_contains, expect_visible, Scenario,
    TestContext,
};

const SUITE: &str = "leave";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUITE, "leave module opens from the main menu", opens_from_menu).tag("smoke"),
        Scenario::new(SUITE, "apply tab shows the form", apply_form_shown),
        Scenario::new(SUITE, "leave type dropdown lists options", leave_types_listed),
        Scenario::new(SUITE, "required fields are marked", required_fields),
        Scenario::new(SUITE, "apply leave with valid data", apply_valid),
        Scenario::new(SUITE, "apply leave without a comment", apply_without_comment),
        Scenario::new(SUITE, "apply leave without a leave type fails", apply_without_type),
        Scenario::new(SUITE, "apply leave without a from date fails", apply_without_from),
        Scenario::new(SUITE, "apply leave without a to date fails", apply_without_to),
        Scenario::new(SUITE, "end date before start date is rejected", end_before_start),
        Scenario::new(SUITE, "applied leave is listed as pending", applied_is_pending),
        Scenario::new(SUITE, "cancel stays in the leave module", cancel_apply),
        Scenario::new(SUITE, "my leave tab lists requests", my_leave_listed),
        Scenario::new(SUITE, "leave list filters by status", leave_list_by_status),
        Scenario::new(SUITE, "applied leave can be approved", approve_applied),
        Scenario::new(SUITE, "applied leave can be rejected", reject_applied),
        Scenario::new(SUITE, "date filter keeps the typed range", date_filter_kept),
        Scenario::new(SUITE, "entitlements are listed", entitlements_listed),
        Scenario::new(SUITE, "entitlements show a leave type balance", entitlement_balance),
        Scenario::new(SUITE, "tabs switch between leave views", tabs_switch_views),
        Scenario::new(SUITE, "apply form survives a reload", apply_survives_reload),
    ]
}

async fn opens_from_menu(ctx: TestContext) -> E2eResult<()> {
    let base = ctx.hrm_base();
    base.navigate("/dashboard/index").await?;
    expect_visible(&base, hrm_heading("Dashboard")).await?;
    open_menu(&base, "Leave").await?;
    expect_url_contains(&base, "leave").await
}

async fn apply_form_shown(ctx: TestContext) -> E2eResult<()> {
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_apply_tab().await?;
    expect_url_contains(&ctx.hrm_base(), "applyLeave").await?;
    expect_true("the apply form", leave.is_apply_form_displayed().await?)
}

async fn leave_types_listed(ctx: TestContext) -> E2eResult<()> {
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_apply_tab().await?;
    let options = leave.dropdown_options().await?;
    expect_true(
        &format!("leave types besides the placeholder, got {options:?}"),
        options.iter().any(|o| !o.contains("Select")),
    )
}

async fn required_fields(ctx: TestContext) -> E2eResult<()> {
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_apply_tab().await?;
    for field in [LeaveField::LeaveType, LeaveField::FromDate, LeaveField::ToDate] {
        expect_true(
            &format!("{field:?} to be required"),
            leave.is_field_required(field).await?,
        )?;
    }
    expect_true(
        "the comment to be optional",
        !leave.is_field_required(LeaveField::Comment).await?,
    )
}

async fn apply_valid(ctx: TestContext) -> E2eResult<()> {
    let request = ctx.generator().leave_request();
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_apply_tab().await?;
    leave.apply_leave(&request).await?;
    expect_contains("toast", &leave.toast_message().await?, "Success")
}

async fn apply_without_comment(ctx: TestContext) -> E2eResult<()> {
    let request = LeaveRequest {
        comment: None,
        ..ctx.generator().leave_request()
    };
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_apply_tab().await?;
    leave.apply_leave(&request).await?;
    expect_contains("toast", &leave.toast_message().await?, "Success")
}

/// Submit the apply form with `missing` left empty and expect a required error
async fn submit_without(ctx: TestContext, missing: LeaveField) -> E2eResult<()> {
    let request = ctx.generator().leave_request();
    let leave = ctx.leave_page();
    let base = ctx.hrm_base();
    let l = &leave.locators;
    leave.navigate().await?;
    leave.open_apply_tab().await?;
    if missing != LeaveField::LeaveType {
        leave.select_leave_type(&request.leave_type).await?;
    }
    if missing != LeaveField::FromDate {
        base.fill_input(l.from_date(), &request.from_date).await?;
    }
    if missing != LeaveField::ToDate {
        base.fill_input(l.to_date(), &request.to_date).await?;
    }
    base.click_element(&l.apply_button).await?;
    let errors = leave.field_errors().await?;
    expect_contains("field errors", &errors.join(" | "), "Required")
}

async fn apply_without_type(ctx: TestContext) -> E2eResult<()> {
    submit_without(ctx, LeaveField::LeaveType).await
}

async fn apply_without_from(ctx: TestContext) -> E2eResult<()> {
    submit_without(ctx, LeaveField::FromDate).await
}

async fn apply_without_to(ctx: TestContext) -> E2eResult<()> {
    submit_without(ctx, LeaveField::ToDate).await
}

/// A range ending before it starts is refused and nothing is recorded
async fn end_before_start(ctx: TestContext) -> E2eResult<()> {
    let request = LeaveRequest {
        from_date: "2025-12-25".into(),
        to_date: "2025-12-20".into(),
        comment: None,
        ..ctx.generator().leave_request()
    };
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_apply_tab().await?;
    leave.apply_leave(&request).await?;

    let errors = leave.field_errors().await?;
    let toast = leave.toast_message().await?;
    expect_true(
        &format!("a date range error, field errors {errors:?} toast {toast:?}"),
        !errors.is_empty() || !toast.is_empty(),
    )?;
    expect_true("no success toast", !toast.contains("Success"))?;
    expect_url_contains(&ctx.hrm_base(), "applyLeave").await
}

/// A fresh application shows up in My Leave awaiting approval
async fn applied_is_pending(ctx: TestContext) -> E2eResult<()> {
    let request = ctx.generator().leave_request();
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_apply_tab().await?;
    leave.apply_leave(&request).await?;
    expect_contains("toast", &leave.toast_message().await?, "Success")?;

    leave.open_my_leave_tab().await?;
    leave.filter_by_date_range(&request.from_date, &request.to_date).await?;
    expect_true("a listed request", leave.row_count().await? > 0)?;
    expect_contains("status", &leave.leave_status(0).await?, "Pending")
}

async fn cancel_apply(ctx: TestContext) -> E2eResult<()> {
    let request = ctx.generator().leave_request();
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_apply_tab().await?;
    leave.select_leave_type(&request.leave_type).await?;
    leave.cancel_application().await?;
    expect_url_contains(&ctx.hrm_base(), "leave").await
}

async fn my_leave_listed(ctx: TestContext) -> E2eResult<()> {
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_my_leave_tab().await?;
    expect_url_contains(&ctx.hrm_base(), "myLeaveList").await?;
    expect_true("the leave table", leave.is_leave_table_displayed().await?)
}

async fn leave_list_by_status(ctx: TestContext) -> E2eResult<()> {
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_leave_list_tab().await?;
    expect_url_contains(&ctx.hrm_base(), "leaveRequestList").await?;
    leave.filter_by_status("Pending").await?;
    expect_true("the leave table", leave.is_leave_table_displayed().await?)?;
    leave.reset_filters().await
}

/// Apply, then find the request in the leave list and decide it
async fn decide_applied(ctx: TestContext, approve: bool) -> E2eResult<()> {
    let request = ctx.generator().leave_request();
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_apply_tab().await?;
    leave.apply_leave(&request).await?;
    expect_contains("toast", &leave.toast_message().await?, "Success")?;

    leave.open_leave_list_tab().await?;
    leave.filter_by_date_range(&request.from_date, &request.to_date).await?;
    expect_true("a pending request", leave.row_count().await? > 0)?;
    if approve {
        leave.approve_leave(0).await?;
    } else {
        leave.reject_leave(0).await?;
    }
    expect_contains("decision toast", &leave.toast_message().await?, "Success")
}

async fn approve_applied(ctx: TestContext) -> E2eResult<()> {
    decide_applied(ctx, true).await
}

async fn reject_applied(ctx: TestContext) -> E2eResult<()> {
    decide_applied(ctx, false).await
}

async fn date_filter_kept(ctx: TestContext) -> E2eResult<()> {
    let request = ctx.generator().leave_request();
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_my_leave_tab().await?;
    leave.filter_by_date_range(&request.from_date, &request.to_date).await?;
    expect_eq("from date", leave.from_date_value().await?, request.from_date)?;
    expect_eq("to date", leave.to_date_value().await?, request.to_date)
}

async fn entitlement_balance(ctx: TestContext) -> E2eResult<()> {
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_entitlements_tab().await?;
    let balance = leave.leave_balance("CAN").await?;
    expect_true(&format!("a CAN entitlement row, got {balance:?}"), balance.is_some())
}

async fn entitlements_listed(ctx: TestContext) -> E2eResult<()> {
    let leave = ctx.leave_page();
    leave.navigate().await?;
    leave.open_entitlements_tab().await?;
    expect_url_contains(&ctx.hrm_base(), "viewLeaveEntitlements").await?;
    expect_true("the entitlements table", leave.is_leave_table_displayed().await?)?;
    expect_true("at least one entitlement", leave.row_count().await? > 0)
}

async fn tabs_switch_views(ctx: TestContext) -> E2eResult<()> {
    let leave = ctx.leave_page();
    let base = ctx.hrm_base();
    leave.navigate().await?;
    leave.open_apply_tab().await?;
    expect_url_contains(&base, "applyLeave").await?;
    leave.open_my_leave_tab().await?;
    expect_url_contains(&base, "myLeaveList").await?;
    leave.open_leave_list_tab().await?;
    expect_url_contains(&base, "leaveRequestList").await
}

async fn apply_survives_reload(ctx: TestContext) -> E2eResult<()> {
    let leave = ctx.leave_page();
    let base = ctx.hrm_base();
    leave.navigate().await?;
    leave.open_apply_tab().await?;
    base.reload().await?;
    expect_url_contains(&base, "applyLeave").await?;
    expect_true("the apply form", leave.is_apply_form_displayed().await?)
}
