use crate::assertion::Assertion;
use crate::config::UserRole;
use crate::fixture::TestScope;
use crate::harness::Scenario;
use crate::page_object::PageObject;
use crate::result::VitrineResult;
use crate::test_data::TestDataGenerator;

const LOCKED_OUT: &str = "Epic sadface: Sorry, this user has been locked out.";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "login: standard user reaches inventory",
            &["login", "smoke"],
            standard_user_reaches_inventory,
        ),
        Scenario::new(
            "login: locked user stays on login with error",
            &["login", "negative", "smoke"],
            locked_user_is_rejected,
        ),
        Scenario::new(
            "login: invalid credentials are rejected",
            &["login", "negative", "regression"],
            invalid_credentials_are_rejected,
        ),
        Scenario::new(
            "login: error banner can be dismissed",
            &["login", "regression"],
            error_banner_can_be_dismissed,
        ),
        Scenario::new(
            "login: enter key submits the form",
            &["login", "regression"],
            enter_key_submits,
        ),
        Scenario::new(
            "login: form lists accepted usernames",
            &["login", "regression"],
            form_lists_accepted_usernames,
        ),
        Scenario::new(
            "login: performance user eventually reaches inventory",
            &["login", "regression"],
            performance_user_reaches_inventory,
        ),
    ]
}

async fn standard_user_reaches_inventory(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    Assertion::is_true(inventory.is_loaded().await?, "inventory is displayed").check()?;
    Assertion::equals("Products", inventory.header().title().await?.as_str()).check()?;
    Assertion::is_true(inventory.header().is_logo_visible().await?, "app logo is visible").check()?;
    Assertion::is_none(&scope.login_page().error_message().await?).check()
}

async fn locked_user_is_rejected(scope: TestScope) -> VitrineResult<()> {
    let credential = scope.config().credentials.get(UserRole::Locked)?.clone();
    let login = scope.login_page();
    login.open().await?;
    login.login(&credential.username, &credential.password).await?;

    let error = login.error_message().await?;
    Assertion::equals(&Some(LOCKED_OUT.to_string()), &error).check()?;
    Assertion::is_true(login.is_loaded().await?, "login form is still displayed").check()?;
    Assertion::is_false(
        scope.inventory_page().is_loaded().await?,
        "locked user must not reach the inventory",
    )
    .check()
}

async fn invalid_credentials_are_rejected(scope: TestScope) -> VitrineResult<()> {
    let login = scope.login_page();
    for case in TestDataGenerator::invalid_credentials() {
        login.open().await?;
        login.login(case.username, case.password).await?;
        let error = login.error_message().await?;
        Assertion::equals(&Some(case.expected_error.to_string()), &error)
            .context(case.name)
            .check()?;
        Assertion::is_true(login.is_loaded().await?, "still on the login form")
            .context(case.name)
            .check()?;
    }
    Ok(())
}

async fn error_banner_can_be_dismissed(scope: TestScope) -> VitrineResult<()> {
    let login = scope.login_page();
    login.open().await?;
    login.submit().await?;
    Assertion::is_true(login.is_error_displayed().await?, "empty submit shows an error").check()?;
    login.dismiss_error().await?;
    Assertion::is_false(login.is_error_displayed().await?, "error banner is gone").check()
}

async fn enter_key_submits(scope: TestScope) -> VitrineResult<()> {
    let credential = scope.config().credentials.get(UserRole::Standard)?.clone();
    let login = scope.login_page();
    login.open().await?;
    login.enter_username(&credential.username).await?;
    login.enter_password(&credential.password).await?;
    login.submit_with_enter().await?;
    scope.inventory_page().wait_until_loaded().await
}

async fn form_lists_accepted_usernames(scope: TestScope) -> VitrineResult<()> {
    let login = scope.login_page();
    login.open().await?;
    let listed = login.accepted_usernames().await?;
    for role in UserRole::ALL {
        let username = role.default_username();
        Assertion::is_true(
            listed.iter().any(|name| name == username),
            &format!("{username} is listed"),
        )
        .check()?;
    }
    let standard = scope.config().credentials.get(UserRole::Standard)?;
    Assertion::equals(standard.password.as_str(), login.password_hint().await?.as_str()).check()?;
    Assertion::equals("Swag Labs", login.logo_text().await?.as_str()).check()?;
    Assertion::equals(&Some("Username".to_string()), &login.username_placeholder().await?).check()?;
    Assertion::equals(&Some("Password".to_string()), &login.password_placeholder().await?).check()
}

async fn performance_user_reaches_inventory(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Performance).await?;
    Assertion::equals(&6, &inventory.product_count().await?).check()
}
