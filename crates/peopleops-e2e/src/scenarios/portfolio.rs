//! PeopleOps portfolio companies and the project tree beneath them.

use super::sign_in;
use crate::data::{unique_suffix, PortfolioCompanyData, ProjectData};
use crate::pages::PortfolioCompanyPage;
use crate::result::E2eResult;
use crate::runner::{expect_contains, expect_eq, expect_true, Scenario, TestContext};

const SUITE: &str = "portfolio-company";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUITE, "create portfolio company with mandatory fields", create_mandatory)
            .tag("smoke"),
        Scenario::new(SUITE, "create portfolio company with contract dates", create_with_dates),
        Scenario::new(SUITE, "duplicate company code is rejected", duplicate_code),
        Scenario::new(SUITE, "company without a name is rejected", missing_name),
        Scenario::new(SUITE, "end date before start date is rejected", end_before_start),
        Scenario::new(SUITE, "similar company names resolve exactly", similar_names),
        Scenario::new(SUITE, "edit company code and dates", edit_company),
        Scenario::new(SUITE, "inactivate a portfolio company", inactivate),
        Scenario::new(SUITE, "project under an inactive company is restricted", project_under_inactive),
        Scenario::new(SUITE, "duplicate project code within a company is rejected", duplicate_project_code),
        Scenario::new(SUITE, "same project code across companies is allowed", project_code_across_companies),
        Scenario::new(SUITE, "project without a start date is rejected", project_without_start),
        Scenario::new(SUITE, "close a project", close_project),
        Scenario::new(SUITE, "project engagement and position under a company", project_tree),
    ]
}

fn mandatory_only(data: PortfolioCompanyData) -> PortfolioCompanyData {
    PortfolioCompanyData {
        start_date: None,
        end_date: None,
        ..data
    }
}

fn name_of(data: &PortfolioCompanyData) -> &str {
    data.name.as_deref().unwrap_or_default()
}

async fn create_mandatory(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let data = mandatory_only(ctx.generator().portfolio_company_data());
    let page = ctx.portfolio_company_page();
    page.navigate().await?;
    page.create_portfolio_company(&data).await?;
    expect_true(
        &format!("{:?} listed", name_of(&data)),
        page.is_listed(name_of(&data)).await?,
    )
}

async fn create_with_dates(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let data = ctx.generator().portfolio_company_data();
    let page = ctx.portfolio_company_page();
    page.navigate().await?;
    page.create_portfolio_company(&data).await?;
    expect_true(
        &format!("{:?} listed", name_of(&data)),
        page.is_listed(name_of(&data)).await?,
    )
}

async fn duplicate_code(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let first = mandatory_only(ctx.generator().portfolio_company_data());
    let second = PortfolioCompanyData {
        name: Some(format!("PortCo {}", unique_suffix())),
        ..first.clone()
    };
    let page = ctx.portfolio_company_page();
    page.navigate().await?;
    page.create_portfolio_company(&first).await?;
    page.create_portfolio_company(&second).await?;
    expect_contains("error message", &page.error_message().await?, "already exists")?;
    expect_true(
        &format!("{:?} not listed", name_of(&second)),
        !page.is_listed(name_of(&second)).await?,
    )
}

async fn missing_name(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let data = PortfolioCompanyData {
        name: None,
        ..mandatory_only(ctx.generator().portfolio_company_data())
    };
    let page = ctx.portfolio_company_page();
    page.navigate().await?;
    page.create_portfolio_company(&data).await?;
    let message = page.error_message().await?;
    expect_true("an error message", !message.trim().is_empty())
}

async fn end_before_start(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let mut generator = ctx.generator();
    let data = PortfolioCompanyData {
        start_date: Some(generator.date(30)),
        end_date: Some(generator.date(0)),
        ..generator.portfolio_company_data()
    };
    let page = ctx.portfolio_company_page();
    page.navigate().await?;
    page.create_portfolio_company(&data).await?;
    let message = page.error_message().await?;
    expect_true("an error message", !message.trim().is_empty())?;
    expect_true(
        &format!("{:?} not listed", name_of(&data)),
        !page.is_listed(name_of(&data)).await?,
    )
}

/// Signed in, on the page, with a fresh company created
async fn with_company(ctx: &TestContext) -> E2eResult<(PortfolioCompanyPage, PortfolioCompanyData)> {
    sign_in(ctx).await?;
    let company = ctx.generator().portfolio_company_data();
    let page = ctx.portfolio_company_page();
    page.navigate().await?;
    page.create_portfolio_company(&company).await?;
    Ok((page, company))
}

async fn edit_company(ctx: TestContext) -> E2eResult<()> {
    let (page, company) = with_company(&ctx).await?;
    let mut generator = ctx.generator();
    let updates = PortfolioCompanyData {
        name: None,
        code: Some(format!("ED{}", unique_suffix())),
        start_date: Some(generator.date(7)),
        end_date: Some(generator.date(730)),
    };
    page.edit_portfolio_company(name_of(&company), &updates).await?;
    expect_eq("error message", page.error_message().await?.trim(), "")?;
    expect_true(
        &format!("{:?} listed", name_of(&company)),
        page.is_listed(name_of(&company)).await?,
    )
}

/// The page confirms inactivation through its message banner
async fn inactivate(ctx: TestContext) -> E2eResult<()> {
    let (page, company) = with_company(&ctx).await?;
    page.inactivate_portfolio_company(name_of(&company)).await?;
    let message = page.error_message().await?;
    expect_true("an inactivation message", !message.trim().is_empty())
}

async fn project_under_inactive(ctx: TestContext) -> E2eResult<()> {
    let (page, company) = with_company(&ctx).await?;
    page.inactivate_portfolio_company(name_of(&company)).await?;
    let project = ctx.generator().project_data();
    page.add_project(name_of(&company), &project).await?;
    expect_contains("error message", &page.error_message().await?, "restricted")
}

async fn duplicate_project_code(ctx: TestContext) -> E2eResult<()> {
    let (page, company) = with_company(&ctx).await?;
    let first = ctx.generator().project_data();
    let second = ProjectData {
        name: format!("{} 2", first.name),
        ..first.clone()
    };
    page.add_project(name_of(&company), &first).await?;
    page.add_project(name_of(&company), &second).await?;
    expect_contains("error message", &page.error_message().await?, "Error")
}

async fn project_code_across_companies(ctx: TestContext) -> E2eResult<()> {
    let (page, first_company) = with_company(&ctx).await?;
    let mut generator = ctx.generator();
    let second_company = generator.portfolio_company_data();
    page.create_portfolio_company(&second_company).await?;
    let project = generator.project_data();
    let sibling = ProjectData {
        name: format!("{} 2", project.name),
        ..project.clone()
    };
    page.add_project(name_of(&first_company), &project).await?;
    page.add_project(name_of(&second_company), &sibling).await?;
    expect_true(
        &format!("project {:?} listed", sibling.name),
        page.is_listed(&sibling.name).await?,
    )
}

async fn project_without_start(ctx: TestContext) -> E2eResult<()> {
    let (page, company) = with_company(&ctx).await?;
    let project = ProjectData {
        start_date: None,
        ..ctx.generator().project_data()
    };
    page.add_project(name_of(&company), &project).await?;
    expect_contains("error message", &page.error_message().await?, "required")
}

async fn close_project(ctx: TestContext) -> E2eResult<()> {
    let (page, company) = with_company(&ctx).await?;
    let project = ctx.generator().project_data();
    page.add_project(name_of(&company), &project).await?;
    page.close_project(&project.name).await?;
    expect_eq("error message", page.error_message().await?.trim(), "")
}

/// "Acme Corp N" and "Acme Corp N 2" both exist; the shorter name matches once
async fn similar_names(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let name = format!("Acme Corp {}", unique_suffix());
    let mut generator = ctx.generator();
    let first = PortfolioCompanyData {
        name: Some(name.clone()),
        ..mandatory_only(generator.portfolio_company_data())
    };
    let second = PortfolioCompanyData {
        name: Some(format!("{name} 2")),
        ..mandatory_only(generator.portfolio_company_data())
    };
    let page = ctx.portfolio_company_page();
    page.navigate().await?;
    page.create_portfolio_company(&first).await?;
    page.create_portfolio_company(&second).await?;
    expect_eq("items named exactly", page.listed_count(&name).await?, 1)
}

async fn project_tree(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let mut generator = ctx.generator();
    let company = mandatory_only(generator.portfolio_company_data());
    let project = generator.project_data();
    let engagement = generator.engagement_data();
    let position = generator.position_data();

    let page = ctx.portfolio_company_page();
    page.navigate().await?;
    page.create_portfolio_company(&company).await?;
    page.add_project(name_of(&company), &project).await?;
    expect_true(
        &format!("project {:?} listed", project.name),
        page.is_listed(&project.name).await?,
    )?;
    page.add_engagement(&project.name, &engagement).await?;
    expect_true(
        &format!("engagement {:?} listed", engagement.name),
        page.is_listed(&engagement.name).await?,
    )?;
    page.add_position(&engagement.name, &position).await?;
    expect_true(
        &format!("position {:?} listed", position.name),
        page.is_listed(&position.name).await?,
    )
}
