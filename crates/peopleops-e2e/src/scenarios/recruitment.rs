//! OrangeHRM recruitment: candidates, vacancies and list filters.

use super::{hrm_heading, open_menu};
use crate::data::generator::EMAIL_DOMAIN;
use crate::data::{
    unique_suffix, CandidateData, CandidateFilter, JobData, TestDataGenerator, VacancyData,
};
use crate::result::E2eResult;
use crate::runner::{
    expect_contains, expect_true, expect_url_contains, expect_visible, Scenario, TestContext,
};

const SUITE: &str = "recruitment";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUITE, "recruitment opens from the main menu", opens_from_menu).tag("smoke"),
        Scenario::new(SUITE, "candidate list shows a table", candidate_table),
        Scenario::new(SUITE, "add candidate with valid data", add_candidate),
        Scenario::new(SUITE, "add candidate without first name fails", candidate_without_first_name),
        Scenario::new(SUITE, "add candidate with invalid email fails", candidate_with_invalid_email),
        Scenario::new(SUITE, "add vacancy without a name fails", vacancy_without_name),
        Scenario::new(SUITE, "reset filters returns to the default view", reset_filters),
        Scenario::new(SUITE, "add candidate without last name fails", candidate_without_last_name),
        Scenario::new(SUITE, "add candidate with special characters", candidate_with_special_characters),
        Scenario::new(SUITE, "candidates tab shows its heading", candidates_heading),
        Scenario::new(SUITE, "tabs switch between recruitment views", tabs_switch_views),
        Scenario::new(SUITE, "candidate list survives a reload", survives_reload),
        Scenario::new(SUITE, "add job with valid data", add_job),
        Scenario::new(SUITE, "add job without a title fails", job_without_title),
        Scenario::new(SUITE, "delete job with confirmation", delete_job),
        Scenario::new(SUITE, "job and vacancy workflow", job_and_vacancy),
    ]
}

/// Job title column in the jobs table
const JOB_TITLE_COLUMN: usize = 1;

fn new_job() -> JobData {
    JobData {
        title: format!("QA Engineer {}", unique_suffix()),
        description: Some("Owns end-to-end test suites".into()),
        specification: None,
    }
}

fn new_candidate(generator: &mut TestDataGenerator) -> CandidateData {
    let first_name = generator.first_name();
    let last_name = generator.last_name();
    let email = format!(
        "{}.{}@{}",
        unique_suffix(),
        first_name.to_lowercase(),
        EMAIL_DOMAIN
    );
    CandidateData {
        first_name,
        last_name,
        email,
        ..CandidateData::default()
    }
}

async fn opens_from_menu(ctx: TestContext) -> E2eResult<()> {
    let base = ctx.hrm_base();
    base.navigate("/dashboard/index").await?;
    expect_visible(&base, hrm_heading("Dashboard")).await?;
    open_menu(&base, "Recruitment").await?;
    expect_url_contains(&base, "recruitment").await
}

async fn candidate_table(ctx: TestContext) -> E2eResult<()> {
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    expect_true("the candidate table", recruitment.is_table_displayed().await?)
}

async fn add_candidate(ctx: TestContext) -> E2eResult<()> {
    let candidate = new_candidate(&mut ctx.generator());
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    recruitment.create_candidate(&candidate).await?;
    expect_contains("toast", &recruitment.toast_message().await?, "Success")
}

async fn candidate_without_first_name(ctx: TestContext) -> E2eResult<()> {
    let candidate = CandidateData {
        first_name: String::new(),
        ..new_candidate(&mut ctx.generator())
    };
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    recruitment.create_candidate(&candidate).await?;
    expect_true("field errors", recruitment.has_field_errors().await?)?;
    expect_contains("field errors", &recruitment.field_errors().await?.join(" | "), "Required")
}

async fn candidate_with_invalid_email(ctx: TestContext) -> E2eResult<()> {
    let candidate = CandidateData {
        email: "not-an-email".into(),
        ..new_candidate(&mut ctx.generator())
    };
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    recruitment.create_candidate(&candidate).await?;
    expect_contains(
        "field errors",
        &recruitment.field_errors().await?.join(" | "),
        "Expected format",
    )
}

async fn vacancy_without_name(ctx: TestContext) -> E2eResult<()> {
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    recruitment.open_vacancies_tab().await?;
    recruitment.click_add().await?;
    recruitment.click_save().await?;
    expect_true("field errors", recruitment.has_field_errors().await?)?;
    expect_url_contains(&ctx.hrm_base(), "addJobVacancy").await
}

async fn reset_filters(ctx: TestContext) -> E2eResult<()> {
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    recruitment
        .search_and_filter(&CandidateFilter::Status("Shortlisted".into()))
        .await?;
    recruitment.reset_filters().await?;
    let shown = recruitment.is_table_displayed().await? || recruitment.is_no_data_displayed().await?;
    expect_true("the default candidate view", shown)
}

async fn candidate_without_last_name(ctx: TestContext) -> E2eResult<()> {
    let candidate = CandidateData {
        last_name: String::new(),
        ..new_candidate(&mut ctx.generator())
    };
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    recruitment.create_candidate(&candidate).await?;
    expect_contains("field errors", &recruitment.field_errors().await?.join(" | "), "Required")
}

async fn candidate_with_special_characters(ctx: TestContext) -> E2eResult<()> {
    let candidate = CandidateData {
        first_name: "José-Marie".into(),
        last_name: "O'Brien".into(),
        ..new_candidate(&mut ctx.generator())
    };
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    recruitment.create_candidate(&candidate).await?;
    expect_contains("toast", &recruitment.toast_message().await?, "Success")
}

async fn candidates_heading(ctx: TestContext) -> E2eResult<()> {
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    recruitment.open_candidates_tab().await?;
    expect_contains("heading", &recruitment.page_heading().await?, "Candidates")
}

async fn tabs_switch_views(ctx: TestContext) -> E2eResult<()> {
    let recruitment = ctx.recruitment_page();
    let base = ctx.hrm_base();
    recruitment.navigate().await?;
    recruitment.open_vacancies_tab().await?;
    expect_url_contains(&base, "Vacanc").await?;
    recruitment.open_jobs_tab().await?;
    expect_url_contains(&base, "jobs").await?;
    recruitment.open_candidates_tab().await?;
    expect_url_contains(&base, "Candidates").await
}

async fn survives_reload(ctx: TestContext) -> E2eResult<()> {
    let recruitment = ctx.recruitment_page();
    let base = ctx.hrm_base();
    recruitment.navigate().await?;
    base.reload().await?;
    expect_url_contains(&base, "viewCandidates").await?;
    expect_true("the candidate table", recruitment.is_table_displayed().await?)
}

async fn add_job(ctx: TestContext) -> E2eResult<()> {
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    recruitment.open_jobs_tab().await?;
    recruitment.create_job(&new_job()).await?;
    expect_contains("toast", &recruitment.toast_message().await?, "Success")
}

async fn job_without_title(ctx: TestContext) -> E2eResult<()> {
    let job = JobData {
        title: String::new(),
        ..new_job()
    };
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    recruitment.open_jobs_tab().await?;
    recruitment.create_job(&job).await?;
    expect_contains("field errors", &recruitment.field_errors().await?.join(" | "), "Required")
}

/// Create a job, find it in the list and delete it
async fn delete_job(ctx: TestContext) -> E2eResult<()> {
    let job = new_job();
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    recruitment.open_jobs_tab().await?;
    recruitment.create_job(&job).await?;
    expect_contains("toast", &recruitment.toast_message().await?, "Success")?;

    recruitment.open_jobs_tab().await?;
    let Some(row) = recruitment.row_index_of(JOB_TITLE_COLUMN, &job.title).await? else {
        return expect_true(&format!("job {:?} in the list", job.title), false);
    };
    recruitment.delete_row(row).await?;
    expect_contains("toast", &recruitment.toast_message().await?, "Success")
}

/// New job title, then a vacancy for it
async fn job_and_vacancy(ctx: TestContext) -> E2eResult<()> {
    let job = new_job();
    let vacancy = VacancyData {
        name: format!("{} Vacancy", job.title),
        job_title: job.title.clone(),
        positions: Some(2),
        hiring_manager: None,
    };
    let recruitment = ctx.recruitment_page();
    recruitment.navigate().await?;
    recruitment.open_jobs_tab().await?;
    recruitment.create_job(&job).await?;
    expect_contains("job toast", &recruitment.toast_message().await?, "Success")?;

    recruitment.open_vacancies_tab().await?;
    recruitment.create_vacancy(&vacancy).await?;
    expect_contains("vacancy toast", &recruitment.toast_message().await?, "Success")
}
