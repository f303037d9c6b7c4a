use crate::assertion::Assertion;
use crate::config::UserRole;
use crate::fixture::TestScope;
use crate::harness::Scenario;
use crate::page_object::PageObject;
use crate::pages::LoginPage;
use crate::result::VitrineResult;
use crate::test_data::TestDataGenerator;

const NO_MATCH: &str = "Epic sadface: Username and password do not match any user in this service";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "security: hostile usernames are rejected",
            &["security", "login", "negative"],
            hostile_usernames_are_rejected,
        ),
        Scenario::new(
            "security: password field is masked",
            &["security", "login", "regression"],
            password_field_is_masked,
        ),
        Scenario::new(
            "security: hostile checkout input is kept as text",
            &["security", "checkout", "negative"],
            hostile_checkout_input_is_text,
        ),
        Scenario::new(
            "security: boundary strings survive the checkout form",
            &["security", "checkout", "regression"],
            boundary_strings_survive_form,
        ),
    ]
}

async fn hostile_usernames_are_rejected(scope: TestScope) -> VitrineResult<()> {
    let password = scope.config().credentials.get(UserRole::Standard)?.password.clone();
    let login = scope.login_page();
    for input in TestDataGenerator::malicious_inputs() {
        login.open().await?;
        login.login(&input.value, &password).await?;
        Assertion::equals(&Some(NO_MATCH.to_string()), &login.error_message().await?)
            .context(input.name)
            .check()?;
        Assertion::is_false(
            scope.inventory_page().is_loaded().await?,
            "hostile username must not log in",
        )
        .context(input.name)
        .check()?;
    }
    Ok(())
}

async fn password_field_is_masked(scope: TestScope) -> VitrineResult<()> {
    let login = scope.login_page();
    login.open().await?;
    let kind = scope.interactions().attribute(&LoginPage::PASSWORD, "type").await?;
    Assertion::equals(&Some("password".to_string()), &kind).check()
}

async fn hostile_checkout_input_is_text(scope: TestScope) -> VitrineResult<()> {
    let cart = scope.cart_with_items(1).await?;
    cart.checkout().await?;
    let information = scope.checkout_information_page();
    information.wait_until_loaded().await?;
    let record = scope.checkout_record()?;

    for input in TestDataGenerator::malicious_inputs()
        .into_iter()
        .filter(|input| !input.value.contains('\0'))
    {
        information
            .fill_form(&input.value, &record.last_name, &record.postal_code)
            .await?;
        let (first, _, _) = information.field_values().await?;
        Assertion::equals(&input.value, &first).context(input.name).check()?;
        Assertion::is_true(information.is_loaded().await?, "form still rendered")
            .context(input.name)
            .check()?;
    }
    Ok(())
}

async fn boundary_strings_survive_form(scope: TestScope) -> VitrineResult<()> {
    let cart = scope.cart_with_items(1).await?;
    cart.checkout().await?;
    let information = scope.checkout_information_page();
    information.wait_until_loaded().await?;

    // Single-line inputs drop line breaks, so those cases are skipped.
    for case in TestDataGenerator::boundary_strings()
        .into_iter()
        .filter(|case| !case.value.contains('\n'))
    {
        information.fill_postal_code(&case.value).await?;
        let (_, _, postal) = information.field_values().await?;
        Assertion::equals(&case.value, &postal).context(case.name).check()?;
    }
    Ok(())
}
