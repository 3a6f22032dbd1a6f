//! Session setup and the OrangeHRM login form.

use super::{hrm_heading, SETUP_SUITE};
use crate::config::LOGIN_SUITE;
use crate::pages::LoginPage;
use crate::result::E2eResult;
use crate::runner::{
    expect_contains, expect_eq, expect_true, expect_url_contains, expect_visible, Scenario,
    TestContext,
};
use std::time::Duration;
use tracing::info;

const REQUIRED: &str = "Required";

/// Longer than any account field accepts
const OVERLONG: usize = 257;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SETUP_SUITE, "authenticate and store the session", authenticate)
            .tag("setup"),
        Scenario::new(LOGIN_SUITE, "valid login reaches the dashboard", valid_login).tag("smoke"),
        Scenario::new(LOGIN_SUITE, "invalid password is rejected", invalid_password),
        Scenario::new(LOGIN_SUITE, "empty username is required", empty_username),
        Scenario::new(LOGIN_SUITE, "empty password is required", empty_password),
        Scenario::new(LOGIN_SUITE, "both fields empty are required", both_empty),
        Scenario::new(LOGIN_SUITE, "peopleops login step by step", peopleops_login).tag("smoke"),
        Scenario::new(LOGIN_SUITE, "peopleops unknown user stays on login", peopleops_unknown_user),
        Scenario::new(LOGIN_SUITE, "peopleops sql injection stays on login", peopleops_sql_injection),
        Scenario::new(LOGIN_SUITE, "peopleops special characters stay on login", peopleops_special_characters),
        Scenario::new(LOGIN_SUITE, "peopleops overlong username is rejected", peopleops_long_username),
        Scenario::new(LOGIN_SUITE, "peopleops overlong password is rejected", peopleops_long_password),
        Scenario::new(LOGIN_SUITE, "peopleops password visibility toggles", peopleops_password_toggle),
        Scenario::new(LOGIN_SUITE, "peopleops remember me then login", peopleops_remember_me),
        Scenario::new("session", "stored session skips the login form", session_reuse).tag("smoke"),
    ]
}

/// Log in once and persist cookies and storage for the dependent projects
async fn authenticate(ctx: TestContext) -> E2eResult<()> {
    let credentials = &ctx.config().credentials;
    let login = ctx.hrm_login_page();
    login.navigate().await?;
    login.login(&credentials.username, &credentials.password).await?;

    let base = ctx.hrm_base();
    let navigation = Duration::from_millis(ctx.config().navigation_timeout_ms);
    base.wait_for_url_pattern("dashboard", navigation).await?;
    base.wait_for_page_load().await?;
    expect_visible(&base, hrm_heading("Dashboard")).await?;

    let store = ctx.session_store();
    let state = store.capture(ctx.driver().as_ref()).await?;
    info!(path = %store.path().display(), cookies = state.cookies.len(), "session stored");
    Ok(())
}

async fn valid_login(ctx: TestContext) -> E2eResult<()> {
    let admin = &ctx.reference().users.hrm_admin;
    let login = ctx.hrm_login_page();
    login.navigate().await?;
    login.login(&admin.username, &admin.password).await?;
    let base = ctx.hrm_base();
    expect_url_contains(&base, "dashboard").await?;
    expect_visible(&base, hrm_heading("Dashboard")).await
}

async fn invalid_password(ctx: TestContext) -> E2eResult<()> {
    let admin = &ctx.reference().users.hrm_admin;
    let login = ctx.hrm_login_page();
    login.navigate().await?;
    login.login(&admin.username, "wrongpassword").await?;
    expect_true("a login error", login.is_error_visible().await?)?;
    expect_contains("login error", &login.error_message().await?, "Invalid credentials")
}

async fn empty_username(ctx: TestContext) -> E2eResult<()> {
    let admin = &ctx.reference().users.hrm_admin;
    let login = ctx.hrm_login_page();
    login.navigate().await?;
    login.login("", &admin.password).await?;
    let errors = login.field_errors().await?;
    expect_eq("field error count", errors.len(), 1)?;
    expect_contains("username error", &errors.join(" "), REQUIRED)
}

async fn empty_password(ctx: TestContext) -> E2eResult<()> {
    let admin = &ctx.reference().users.hrm_admin;
    let login = ctx.hrm_login_page();
    login.navigate().await?;
    login.login(&admin.username, "").await?;
    let errors = login.field_errors().await?;
    expect_eq("field error count", errors.len(), 1)?;
    expect_contains("password error", &errors.join(" "), REQUIRED)
}

async fn both_empty(ctx: TestContext) -> E2eResult<()> {
    let login = ctx.hrm_login_page();
    login.navigate().await?;
    login.login("", "").await?;
    let errors = login.field_errors().await?;
    expect_eq("field error count", errors.len(), 2)?;
    expect_true(
        "every field error to read Required",
        errors.iter().all(|e| e.contains(REQUIRED)),
    )
}

/// Fill the PeopleOps form field by field and submit
async fn attempt_peopleops_login(ctx: &TestContext, username: &str, password: &str) -> E2eResult<LoginPage> {
    let login = ctx.login_page();
    login.navigate().await?;
    login.enter_username(username).await?;
    login.enter_password(password).await?;
    login.click_sign_in().await?;
    Ok(login)
}

async fn peopleops_login(ctx: TestContext) -> E2eResult<()> {
    let user = &ctx.reference().users.resource_manager;
    attempt_peopleops_login(&ctx, &user.username, &user.password).await?;
    expect_url_contains(&ctx.base(), "/dashboard").await
}

/// Submit `username` and expect no way past the login form
async fn stays_on_login(ctx: &TestContext, username: &str) -> E2eResult<()> {
    let user = &ctx.reference().users.resource_manager;
    let login = attempt_peopleops_login(ctx, username, &user.password).await?;
    let base = ctx.base();
    base.wait_for_page_load().await?;
    let failed = login.is_error_visible().await?;
    info!(username, failed, "rejected login");
    let url = base.current_url().await?;
    expect_true(&format!("to stay on the login form, now at {url:?}"), url.contains("/login"))
}

async fn peopleops_unknown_user(ctx: TestContext) -> E2eResult<()> {
    stays_on_login(&ctx, "invaliduser@example.com").await
}

async fn peopleops_sql_injection(ctx: TestContext) -> E2eResult<()> {
    stays_on_login(&ctx, "admin' OR '1'='1").await
}

async fn peopleops_special_characters(ctx: TestContext) -> E2eResult<()> {
    stays_on_login(&ctx, "!@#$%^&*()").await
}

async fn peopleops_long_username(ctx: TestContext) -> E2eResult<()> {
    let password = ctx.reference().users.resource_manager.password.clone();
    let login = attempt_peopleops_login(&ctx, &"a".repeat(OVERLONG), &password).await?;
    expect_true("a login error", login.is_error_visible().await?)
}

async fn peopleops_long_password(ctx: TestContext) -> E2eResult<()> {
    let username = ctx.reference().users.resource_manager.username.clone();
    let login = attempt_peopleops_login(&ctx, &username, &"a".repeat(OVERLONG)).await?;
    expect_true("a login error", login.is_error_visible().await?)
}

async fn peopleops_password_toggle(ctx: TestContext) -> E2eResult<()> {
    let login = ctx.login_page();
    login.navigate().await?;
    login.enter_password("password123").await?;
    let masked = Some("password");
    expect_eq("password input type", login.password_input_type().await?.as_deref(), masked)?;
    login.toggle_password_visibility().await?;
    expect_eq("revealed input type", login.password_input_type().await?.as_deref(), Some("text"))?;
    login.toggle_password_visibility().await?;
    expect_eq("re-masked input type", login.password_input_type().await?.as_deref(), masked)
}

async fn peopleops_remember_me(ctx: TestContext) -> E2eResult<()> {
    let user = &ctx.reference().users.resource_manager;
    let login = ctx.login_page();
    login.navigate().await?;
    login.check_remember_me().await?;
    expect_true("remember me ticked", login.is_remember_me_checked().await?)?;
    login.login(&user.username, &user.password).await?;
    expect_url_contains(&ctx.base(), "/dashboard").await
}

/// A page opened with the stored snapshot lands on the dashboard directly
async fn session_reuse(ctx: TestContext) -> E2eResult<()> {
    let base = ctx.hrm_base();
    base.navigate("/dashboard/index").await?;
    expect_url_contains(&base, "dashboard").await?;
    expect_visible(&base, hrm_heading("Dashboard")).await?;
    let url = base.current_url().await?;
    expect_true("no redirect to the login form", !url.contains("auth/login"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::driver::{ElementHandle, MockDriver, MockReaction};
    use crate::locator::{Locator, TextMatch};
    use crate::pages::LoginLocators;
    use crate::session::{Cookie, SessionStore, StorageState};
    use std::sync::Arc;

    const HRM: &str = "https://hrm.test/web/index.php";

    fn context(mock: &Arc<MockDriver>, config: RunnerConfig) -> TestContext {
        let config = RunnerConfig {
            hrm_base_url: HRM.into(),
            expect_timeout_ms: 150,
            navigation_timeout_ms: 150,
            ..config
        };
        TestContext::new(mock.clone(), Arc::new(config), Arc::default(), "auth.setup::authenticate")
    }

    fn login_form(mock: &MockDriver) -> LoginLocators {
        let l = LoginLocators::orange_hrm();
        mock.set_element(&l.username_input, ElementHandle::new("input"));
        mock.set_element(&l.password_input, ElementHandle::new("input"));
        mock.set_element(&l.sign_in_button, ElementHandle::new("button"));
        l
    }

    mod setup_tests {
        use super::*;

        #[tokio::test]
        async fn test_authenticate_stores_session() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join(".auth/user.json");
            let mock = MockDriver::new().shared();
            let l = login_form(&mock);
            mock.on_click(
                &l.sign_in_button,
                MockReaction::navigate(format!("{HRM}/dashboard/index")),
            );
            mock.set_element(hrm_heading("Dashboard"), ElementHandle::new("h6").with_text("Dashboard"));
            mock.set_storage_state(StorageState::new().with_cookie(Cookie::new("orangehrm", "s1", "hrm.test")));

            let config = RunnerConfig {
                storage_state: path.clone(),
                ..RunnerConfig::default()
            };
            authenticate(context(&mock, config)).await.unwrap();

            assert!(mock.was_called(&format!("goto:{HRM}/auth/login")));
            assert_eq!(mock.value_of(&l.username_input).as_deref(), Some("Admin"));
            let stored = SessionStore::new(&path).load().unwrap();
            assert_eq!(stored.cookies[0].value, "s1");
        }

        #[tokio::test]
        async fn test_authenticate_without_redirect_fails() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("user.json");
            let mock = MockDriver::new().shared();
            login_form(&mock);
            let config = RunnerConfig {
                storage_state: path.clone(),
                ..RunnerConfig::default()
            };
            let err = authenticate(context(&mock, config)).await.unwrap_err();
            assert!(err.is_timeout());
            assert!(!path.exists());
        }
    }

    mod login_tests {
        use super::*;

        #[tokio::test]
        async fn test_both_empty_expects_two_messages() {
            let mock = MockDriver::new().shared();
            let l = login_form(&mock);
            mock.on_click(
                &l.sign_in_button,
                MockReaction::show(
                    &l.field_errors,
                    vec![
                        ElementHandle::new("span").with_text("Required"),
                        ElementHandle::new("span").with_text("Required"),
                    ],
                ),
            );
            both_empty(context(&mock, RunnerConfig::default())).await.unwrap();
        }

        #[tokio::test]
        async fn test_invalid_password_reads_the_alert() {
            let mock = MockDriver::new().shared();
            let l = login_form(&mock);
            mock.on_click(
                &l.sign_in_button,
                MockReaction::show(
                    &l.error_message,
                    vec![ElementHandle::new("p").with_text("Invalid credentials")],
                ),
            );
            invalid_password(context(&mock, RunnerConfig::default())).await.unwrap();
            assert!(mock.was_called(&format!("fill:{}=wrongpassword", l.password_input)));
        }

        #[tokio::test]
        async fn test_session_reuse_needs_the_dashboard_heading() {
            let mock = MockDriver::new().shared();
            let err = session_reuse(context(&mock, RunnerConfig::default())).await.unwrap_err();
            assert!(err.to_string().contains("to be visible"));

            let heading = Locator::role_named("heading", TextMatch::exact("Dashboard"));
            mock.set_element(&heading, ElementHandle::new("h6"));
            session_reuse(context(&mock, RunnerConfig::default())).await.unwrap();
            assert!(mock.was_called(&format!("goto:{HRM}/dashboard/index")));
        }
    }

    mod peopleops_login_tests {
        use super::*;

        fn peopleops_form(mock: &MockDriver) -> LoginLocators {
            let l = LoginLocators::peopleops();
            mock.set_element(&l.username_input, ElementHandle::new("input"));
            mock.set_element(
                &l.password_input,
                ElementHandle::new("input").with_attribute("type", "password"),
            );
            mock.set_element(&l.sign_in_button, ElementHandle::new("button"));
            l
        }

        fn people_config() -> RunnerConfig {
            RunnerConfig {
                base_url: "http://people.test".into(),
                ..RunnerConfig::default()
            }
        }

        #[tokio::test]
        async fn test_step_by_step_login_reaches_dashboard() {
            let mock = MockDriver::new().shared();
            let l = peopleops_form(&mock);
            mock.on_click(&l.sign_in_button, MockReaction::navigate("http://people.test/dashboard"));
            peopleops_login(context(&mock, people_config())).await.unwrap();
            assert_eq!(mock.calls("fill:").len(), 2);
        }

        #[tokio::test]
        async fn test_sql_injection_stays_on_login() {
            let mock = MockDriver::new().shared();
            let l = peopleops_form(&mock);
            mock.set_element(&l.error_message, ElementHandle::new("p").with_text("Login failed"));
            peopleops_sql_injection(context(&mock, people_config())).await.unwrap();
            assert!(mock.was_called(&format!("fill:{}=admin' OR '1'='1", l.username_input)));
        }

        #[tokio::test]
        async fn test_sql_injection_fails_when_let_in() {
            let mock = MockDriver::new().shared();
            let l = peopleops_form(&mock);
            mock.set_element(&l.error_message, ElementHandle::new("p"));
            mock.on_click(&l.sign_in_button, MockReaction::navigate("http://people.test/dashboard"));
            let err = peopleops_sql_injection(context(&mock, people_config())).await.unwrap_err();
            assert!(err.to_string().contains("to stay on the login form"));
        }

        #[tokio::test]
        async fn test_remember_me_ticked_before_login() {
            let mock = MockDriver::new().shared();
            let l = peopleops_form(&mock);
            mock.set_element(&l.remember_me, ElementHandle::new("input").with_checked(false));
            mock.on_click(&l.sign_in_button, MockReaction::navigate("http://people.test/dashboard"));
            peopleops_remember_me(context(&mock, people_config())).await.unwrap();
        }

        #[tokio::test]
        async fn test_password_toggle_must_mask_again() {
            let mock = MockDriver::new().shared();
            let l = peopleops_form(&mock);
            mock.set_element(&l.password_toggle, ElementHandle::new("button"));
            mock.on_click(
                &l.password_toggle,
                MockReaction::show(
                    &l.password_input,
                    vec![ElementHandle::new("input").with_attribute("type", "text")],
                ),
            );
            let err = peopleops_password_toggle(context(&mock, people_config())).await.unwrap_err();
            assert!(err.to_string().contains("re-masked input type"));
        }
    }
}
