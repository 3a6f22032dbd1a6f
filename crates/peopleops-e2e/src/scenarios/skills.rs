//! PeopleOps employee skills and their freshness.

use super::employee::seed_employee;
use super::sign_in;
use crate::data::{SkillData, SkillUpdate};
use crate::pages::SkillsPage;
use crate::result::E2eResult;
use crate::runner::{expect_contains, expect_eq, expect_true, Scenario, TestContext};

const SUITE: &str = "skills";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUITE, "add a skill to an employee", add_skill).tag("smoke"),
        Scenario::new(SUITE, "skill form validates mandatory fields", mandatory_fields),
        Scenario::new(SUITE, "add several skills in one session", multiple_skills),
        Scenario::new(SUITE, "duplicate skill is rejected", duplicate_skill),
        Scenario::new(SUITE, "update skill proficiency", update_proficiency),
        Scenario::new(SUITE, "delete a skill", delete_skill),
        Scenario::new(SUITE, "search skills by name", search_skill),
        Scenario::new(SUITE, "negative experience is rejected", negative_experience),
        Scenario::new(SUITE, "future last used date is rejected", future_last_used),
        Scenario::new(SUITE, "skill unused for two years is flagged rusty", stale_skill_flagged),
        Scenario::new(SUITE, "recently used skill is not flagged", fresh_skill_not_flagged),
        Scenario::new(SUITE, "freshness override flags a recent skill", freshness_override),
    ]
}

async fn add_skill(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let employee = seed_employee(&ctx).await?;
    let skill = ctx.generator().skill_data();
    let page = ctx.skills_page(&employee.code);
    page.navigate().await?;
    page.add_skill(&skill).await?;
    expect_contains("success message", &page.success_message().await?, "successfully")?;
    expect_true(
        &format!("skill {:?} in the table", skill.name),
        page.is_skill_in_table(&skill.name).await?,
    )
}

async fn mandatory_fields(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let employee = seed_employee(&ctx).await?;
    let page = ctx.skills_page(&employee.code);
    page.navigate().await?;
    page.click_add_skill().await?;
    page.click_save().await?;
    let messages = page.all_validation_messages().await?;
    expect_true(
        &format!("at least one validation message, got {messages:?}"),
        !messages.is_empty(),
    )
}

async fn multiple_skills(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let employee = seed_employee(&ctx).await?;
    let skills = ctx.generator().multiple_skills(3)?;
    let page = ctx.skills_page(&employee.code);
    page.navigate().await?;
    page.add_multiple_skills(&skills).await?;
    page.navigate().await?;
    expect_eq("skill rows", page.skill_count().await?, skills.len())?;
    for skill in &skills {
        expect_true(
            &format!("skill {:?} in the table", skill.name),
            page.is_skill_in_table(&skill.name).await?,
        )?;
    }
    Ok(())
}

async fn duplicate_skill(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let employee = seed_employee(&ctx).await?;
    let skill = ctx.generator().skill_data();
    let page = ctx.skills_page(&employee.code);
    page.navigate().await?;
    page.add_skill(&skill).await?;
    expect_contains("success message", &page.success_message().await?, "successfully")?;

    page.add_skill(&skill).await?;
    let expected = &ctx.reference().messages.skill.duplicate_skill;
    expect_contains("error message", &page.error_message().await?, expected)
}

/// Signed in, on the skills page of a fresh employee with `skill` saved
async fn with_saved_skill(ctx: &TestContext, skill: &SkillData) -> E2eResult<SkillsPage> {
    sign_in(ctx).await?;
    let employee = seed_employee(ctx).await?;
    let page = ctx.skills_page(&employee.code);
    page.navigate().await?;
    page.add_skill(skill).await?;
    expect_contains("success message", &page.success_message().await?, "successfully")?;
    Ok(page)
}

async fn update_proficiency(ctx: TestContext) -> E2eResult<()> {
    let skill = SkillData {
        proficiency: "1".into(),
        ..ctx.generator().skill_data()
    };
    let page = with_saved_skill(&ctx, &skill).await?;
    let update = SkillUpdate {
        proficiency: Some("3".into()),
        ..SkillUpdate::default()
    };
    page.update_skill(&skill.name, &update).await?;
    expect_contains("success message", &page.success_message().await?, "updated")
}

async fn delete_skill(ctx: TestContext) -> E2eResult<()> {
    let skill = ctx.generator().skill_data();
    let page = with_saved_skill(&ctx, &skill).await?;
    page.delete_skill(&skill.name).await?;
    expect_contains("success message", &page.success_message().await?, "deleted")?;
    expect_true(
        &format!("skill {:?} gone from the table", skill.name),
        !page.is_skill_in_table(&skill.name).await?,
    )
}

async fn search_skill(ctx: TestContext) -> E2eResult<()> {
    let skill = ctx.generator().skill_data();
    let page = with_saved_skill(&ctx, &skill).await?;
    page.search_skill(&skill.name).await?;
    let rows = page.skill_count().await?;
    expect_true(&format!("search rows for {:?}, got {rows}", skill.name), rows > 0)?;
    expect_true(
        &format!("skill {:?} in the results", skill.name),
        page.is_skill_in_table(&skill.name).await?,
    )
}

/// Fill the form with `skill`, save, and expect `message` among the field errors
async fn rejected(ctx: &TestContext, skill: &SkillData, message: &str) -> E2eResult<()> {
    sign_in(ctx).await?;
    let employee = seed_employee(ctx).await?;
    let page = ctx.skills_page(&employee.code);
    page.navigate().await?;
    page.add_skill(skill).await?;
    expect_true("validation error shown", page.is_validation_error_displayed().await?)?;
    let messages = page.all_validation_messages().await?;
    expect_true(
        &format!("validation message {message:?}, got {messages:?}"),
        messages.iter().any(|m| m.contains(message)),
    )
}

async fn negative_experience(ctx: TestContext) -> E2eResult<()> {
    let skill = SkillData {
        experience: "-1".into(),
        ..ctx.generator().skill_data()
    };
    rejected(&ctx, &skill, &ctx.reference().messages.skill.negative_experience).await
}

async fn future_last_used(ctx: TestContext) -> E2eResult<()> {
    let mut generator = ctx.generator();
    let skill = SkillData {
        last_used_date: Some(generator.date(30)),
        ..generator.skill_data()
    };
    rejected(&ctx, &skill, &ctx.reference().messages.skill.future_last_used).await
}

/// Last used well beyond every freshness threshold
async fn stale_skill_flagged(ctx: TestContext) -> E2eResult<()> {
    sign_in(&ctx).await?;
    let employee = seed_employee(&ctx).await?;
    let mut generator = ctx.generator();
    let skill = SkillData {
        last_used_date: Some(generator.date(-730)),
        ..generator.skill_data()
    };
    let page = ctx.skills_page(&employee.code);
    page.navigate().await?;
    page.add_skill(&skill).await?;
    page.evaluate_skill_freshness().await?;
    expect_true(
        &format!("skill {:?} flagged rusty", skill.name),
        page.is_skill_flagged_as_rusty(&skill.name).await?,
    )
}

async fn fresh_skill_not_flagged(ctx: TestContext) -> E2eResult<()> {
    let skill = SkillData {
        last_used_date: Some(ctx.generator().date(-7)),
        ..ctx.generator().skill_data()
    };
    let page = with_saved_skill(&ctx, &skill).await?;
    page.evaluate_skill_freshness().await?;
    expect_true(
        &format!("skill {:?} not flagged rusty", skill.name),
        !page.is_skill_flagged_as_rusty(&skill.name).await?,
    )?;
    expect_eq("rusty skills", page.rusty_skills_count().await?, 0)
}

/// One-month threshold against a skill last used three months ago
async fn freshness_override(ctx: TestContext) -> E2eResult<()> {
    let skill = SkillData {
        last_used_date: Some(ctx.generator().date(-90)),
        ..ctx.generator().skill_data()
    };
    let page = with_saved_skill(&ctx, &skill).await?;
    page.set_freshness_override(1).await?;
    page.evaluate_skill_freshness().await?;
    expect_true(
        &format!("skill {:?} flagged rusty", skill.name),
        page.is_skill_flagged_as_rusty(&skill.name).await?,
    )
}
