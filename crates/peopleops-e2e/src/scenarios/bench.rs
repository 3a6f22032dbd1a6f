//! Bench views: the analytics dashboard and the bench table.
//!
//! Both compare against the bench fixtures in the reference data, which
//! the application is expected to be seeded with.

use super::sign_in;
use crate::pages::parse_number;
use crate::result::E2eResult;
use crate::runner::{expect_eq, expect_true, Scenario, TestContext};
use chrono::{Local, NaiveDate};
use std::time::{Duration, Instant};

const ANALYTICS_SUITE: &str = "bench-analytics";
const DASHBOARD_SUITE: &str = "bench-dashboard";

/// Bench employees with availability after this date have a future allocation
const ALLOCATION_CUTOFF: &str = "2026-02-01";

/// Longest acceptable analytics dashboard load
const LOAD_BUDGET: Duration = Duration::from_secs(3);

pub(super) fn analytics_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(ANALYTICS_SUITE, "utilization chart is shown", chart_visible).tag("smoke"),
        Scenario::new(ANALYTICS_SUITE, "bench list names every benched employee", bench_list_complete),
        Scenario::new(ANALYTICS_SUITE, "fully utilized and inactive employees are off the bench", off_bench_excluded),
        Scenario::new(ANALYTICS_SUITE, "inactive employee is marked inactive", inactive_marked),
        Scenario::new(ANALYTICS_SUITE, "under-utilized employees are reported", under_utilized_reported),
        Scenario::new(ANALYTICS_SUITE, "skill gap report is shown", skill_gap_report),
        Scenario::new(ANALYTICS_SUITE, "bench count is a number", bench_count_numeric),
        Scenario::new(ANALYTICS_SUITE, "bench count matches the bench list", bench_count_matches),
        Scenario::new(ANALYTICS_SUITE, "bench employees' skills are listed", bench_skills_listed),
        Scenario::new(ANALYTICS_SUITE, "future allocation shows its available from date", available_from_shown),
        Scenario::new(ANALYTICS_SUITE, "average utilization is positive", average_utilization),
        Scenario::new(ANALYTICS_SUITE, "engagement end dates are dates", engagement_end_dates),
        Scenario::new(ANALYTICS_SUITE, "bench list or empty state is shown", analytics_or_empty_state),
        Scenario::new(ANALYTICS_SUITE, "dashboard loads within three seconds", loads_quickly),
    ]
}

pub(super) fn dashboard_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(DASHBOARD_SUITE, "bench table or empty state is shown", table_or_empty_state)
            .tag("smoke"),
        Scenario::new(DASHBOARD_SUITE, "search finds a benched employee", search_bench_employee),
        Scenario::new(DASHBOARD_SUITE, "utilization filter keeps rows in range", utilization_filter),
        Scenario::new(DASHBOARD_SUITE, "idle employees show zero utilization", zero_utilization),
        Scenario::new(DASHBOARD_SUITE, "skill filter keeps matching rows", skill_filter),
        Scenario::new(DASHBOARD_SUITE, "benched employees show their skills", table_skills),
        Scenario::new(DASHBOARD_SUITE, "benched employees are active", table_status),
        Scenario::new(DASHBOARD_SUITE, "future availability is listed", future_availability),
        Scenario::new(DASHBOARD_SUITE, "search without matches shows the empty state", search_without_matches),
        Scenario::new(DASHBOARD_SUITE, "refresh keeps the bench table", refresh_keeps_table),
    ]
}

async fn chart_visible(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    expect_true("the utilization chart", page.is_utilization_chart_visible().await?)
}

async fn bench_list_complete(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    for employee in ctx.reference().bench_list() {
        expect_true(
            &format!("{} in the bench list", employee.name),
            page.is_employee_in_bench_list(&employee.name).await?,
        )?;
    }
    Ok(())
}

async fn off_bench_excluded(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    for employee in ctx.reference().bench_employees.iter().filter(|e| !e.is_on_bench()) {
        expect_true(
            &format!("{} absent from the bench list", employee.name),
            !page.is_employee_in_bench_list(&employee.name).await?,
        )?;
    }
    Ok(())
}

async fn inactive_marked(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    for employee in ctx.reference().bench_employees.iter().filter(|e| e.status == "inactive") {
        expect_true(
            &format!("{} marked inactive", employee.name),
            page.is_employee_inactive(&employee.name).await?,
        )?;
    }
    Ok(())
}

async fn under_utilized_reported(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    let below = page.employees_with_utilization_below(100.0).await?;
    for employee in ctx.reference().bench_list() {
        expect_true(
            &format!("{} under full utilization, got {below:?}", employee.name),
            below.iter().any(|row| row.contains(&employee.name)),
        )?;
    }
    Ok(())
}

async fn skill_gap_report(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    expect_true("the skill gap report", page.is_skill_gap_report_visible().await?)
}

async fn bench_count_numeric(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    let count = page.bench_count().await?;
    expect_true(
        &format!("a numeric bench count, got {count:?}"),
        parse_number(&count).is_some(),
    )
}

async fn bench_count_matches(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    let count = page.bench_count().await?;
    let expected = ctx.reference().bench_list().count();
    expect_eq("bench count", parse_number(&count), Some(expected as f64))
}

async fn bench_skills_listed(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    let listed: Vec<String> = page
        .employee_skills()
        .await?
        .into_iter()
        .map(|s| s.trim().to_string())
        .collect();
    for employee in ctx.reference().bench_list() {
        for skill in &employee.skills {
            expect_true(
                &format!("{skill} of {} listed, got {listed:?}", employee.name),
                listed.contains(skill),
            )?;
        }
    }
    Ok(())
}

async fn available_from_shown(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    let allocated = ctx
        .reference()
        .bench_list()
        .filter(|e| e.available_from.as_str() > ALLOCATION_CUTOFF);
    for employee in allocated {
        let date = page.available_from_date(&employee.name).await?;
        expect_eq(
            &format!("available from date of {}", employee.name),
            date.as_deref().map(str::trim),
            Some(employee.available_from.as_str()),
        )?;
    }
    Ok(())
}

async fn average_utilization(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    let average = page.average_utilization().await?;
    expect_true(
        &format!("a positive average utilization, got {average:?}"),
        parse_number(&average).is_some_and(|value| value > 0.0),
    )
}

async fn engagement_end_dates(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    for date in page.upcoming_engagement_end_dates().await? {
        expect_true(
            &format!("a YYYY-MM-DD end date, got {date:?}"),
            NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").is_ok(),
        )?;
    }
    Ok(())
}

async fn analytics_or_empty_state(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    page.navigate().await?;
    let rows = ctx.base().count(&page.locators.utilization_rows).await?;
    if rows > 0 {
        return Ok(());
    }
    expect_true("an empty state without rows", page.is_empty_state_visible().await?)
}

async fn loads_quickly(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_analytics_page();
    let start = Instant::now();
    page.navigate().await?;
    let elapsed = start.elapsed();
    expect_true(
        &format!("a load under {LOAD_BUDGET:?}, took {elapsed:?}"),
        elapsed < LOAD_BUDGET,
    )
}

async fn table_or_empty_state(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_dashboard_page();
    page.navigate().await?;
    let rows = page.bench_employee_count().await?;
    let empty = page.is_empty_state_visible().await?;
    expect_true(
        &format!("rows or an empty state, got {rows} rows"),
        rows > 0 || empty,
    )
}

async fn search_bench_employee(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let reference = ctx.reference();
    let Some(employee) = reference.bench_list().next() else {
        return Ok(());
    };
    let page = ctx.bench_dashboard_page();
    page.navigate().await?;
    page.search_employee(&employee.name).await?;
    expect_true(
        &format!("{} displayed", employee.name),
        page.is_employee_displayed(&employee.name).await?,
    )
}

async fn utilization_filter(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_dashboard_page();
    page.navigate().await?;
    page.filter_by_utilization(0, 50).await?;
    for employee in page.all_bench_employees().await? {
        let pct = employee.utilization_pct();
        expect_true(
            &format!("{} within 0-50%, got {:?}", employee.name, employee.utilization),
            pct.is_some_and(|value| (0.0..=50.0).contains(&value)),
        )?;
    }
    Ok(())
}

async fn zero_utilization(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_dashboard_page();
    page.navigate().await?;
    let idle = page.employees_with_zero_utilization().await?;
    let expected = ctx
        .reference()
        .bench_list()
        .filter(|e| e.utilization == 0)
        .map(|e| e.name.clone());
    for name in expected {
        expect_true(
            &format!("{name} at zero utilization, got {idle:?}"),
            idle.contains(&name),
        )?;
    }
    Ok(())
}

async fn skill_filter(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_dashboard_page();
    page.navigate().await?;
    page.filter_by_skills(&["Java"]).await?;
    for employee in page.all_bench_employees().await? {
        expect_true(
            &format!("{} to know Java, got {:?}", employee.name, employee.skills),
            employee.skills.contains("Java"),
        )?;
    }
    Ok(())
}

async fn table_skills(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_dashboard_page();
    page.navigate().await?;
    for employee in ctx.reference().bench_list() {
        let shown = page.employee_skills(&employee.name).await?;
        expect_eq(&format!("skills of {}", employee.name), &shown, &employee.skills)?;
    }
    Ok(())
}

async fn table_status(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_dashboard_page();
    page.navigate().await?;
    for employee in ctx.reference().bench_list() {
        let status = page.employee_status(&employee.name).await?;
        expect_true(
            &format!("{} active, got {status:?}", employee.name),
            status.eq_ignore_ascii_case("active"),
        )?;
    }
    Ok(())
}

async fn future_availability(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_dashboard_page();
    page.navigate().await?;
    let today = Local::now().date_naive();
    let listed: Vec<String> = page
        .employees_with_future_availability(today)
        .await?
        .into_iter()
        .map(|e| e.name)
        .collect();
    let upcoming = ctx.reference().bench_list().filter(|e| {
        NaiveDate::parse_from_str(&e.available_from, "%Y-%m-%d").is_ok_and(|date| date > today)
    });
    for employee in upcoming {
        expect_true(
            &format!("{} available later, got {listed:?}", employee.name),
            listed.contains(&employee.name),
        )?;
    }
    Ok(())
}

async fn search_without_matches(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_dashboard_page();
    page.navigate().await?;
    page.search_employee("zzqx-nobody").await?;
    expect_eq("bench rows", page.bench_employee_count().await?, 0)?;
    let message = page.empty_state_message().await?;
    expect_true(
        &format!("an empty state message, got {message:?}"),
        !message.trim().is_empty(),
    )
}

async fn refresh_keeps_table(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let page = ctx.bench_dashboard_page();
    page.navigate().await?;
    let before = page.bench_employee_count().await?;
    page.refresh().await?;
    let after = page.bench_employee_count().await?;
    expect_true(
        &format!("the same rows after refresh, {before} then {after}"),
        before == after,
    )
}
