use crate::assertion::Assertion;
use crate::config::UserRole;
use crate::fixture::TestScope;
use crate::harness::Scenario;
use crate::page_object::PageObject;
use crate::pages::{CartPage, CheckoutInformationPage, CheckoutOverviewPage, InventoryPage};
use crate::result::VitrineResult;

const BACKPACK: &str = "Sauce Labs Backpack";
const COMPLETE_HEADER: &str = "Thank you for your order!";
const TAX_PERCENT: u32 = 8;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "checkout: purchase one product end to end",
            &["checkout", "e2e", "smoke"],
            purchase_end_to_end,
        ),
        Scenario::new(
            "checkout: every information field is required",
            &["checkout", "negative", "regression"],
            information_fields_are_required,
        ),
        Scenario::new(
            "checkout: overview totals add up",
            &["checkout", "regression"],
            overview_totals_add_up,
        ),
        Scenario::new(
            "checkout: cancel on information returns to cart",
            &["checkout", "navigation", "regression"],
            cancel_information_returns_to_cart,
        ),
        Scenario::new(
            "checkout: cancel on overview returns to inventory",
            &["checkout", "navigation", "regression"],
            cancel_overview_returns_to_inventory,
        ),
        Scenario::new(
            "checkout: back home after order shows empty cart",
            &["checkout", "e2e", "regression"],
            back_home_after_order,
        ),
        Scenario::new(
            "checkout: error user cannot finish the order",
            &["checkout", "negative"],
            error_user_cannot_finish,
        ),
    ]
}

async fn open_cart(scope: &TestScope, inventory: &InventoryPage) -> VitrineResult<CartPage> {
    inventory.header().open_cart().await?;
    let cart = scope.cart_page();
    cart.wait_until_loaded().await?;
    Ok(cart)
}

async fn start_checkout(scope: &TestScope, cart: &CartPage) -> VitrineResult<CheckoutInformationPage> {
    cart.checkout().await?;
    let information = scope.checkout_information_page();
    information.wait_until_loaded().await?;
    Ok(information)
}

/// Fill a generated record and continue to the overview
async fn reach_overview(
    scope: &TestScope,
    information: &CheckoutInformationPage,
) -> VitrineResult<CheckoutOverviewPage> {
    let record = scope.checkout_record()?;
    information.fill_record(&record).await?;
    information.continue_checkout().await?;
    let overview = scope.checkout_overview_page();
    overview.wait_until_loaded().await?;
    Ok(overview)
}

async fn purchase_end_to_end(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    Assertion::is_none(&scope.login_page().error_message().await?).check()?;

    inventory.add_to_cart(BACKPACK).await?;
    Assertion::equals(&1, &inventory.header().cart_badge_count().await?).check()?;

    let cart = open_cart(&scope, &inventory).await?;
    let names = cart.item_names().await?;
    Assertion::equals(&vec![BACKPACK.to_string()], &names).check()?;

    let information = start_checkout(&scope, &cart).await?;
    let overview = reach_overview(&scope, &information).await?;
    Assertion::is_true(overview.is_loaded().await?, "advanced to step two").check()?;

    overview.finish().await?;
    let complete = scope.checkout_complete_page();
    complete.wait_until_loaded().await?;
    Assertion::is_true(complete.is_order_complete().await?, "order complete").check()?;
    Assertion::equals(COMPLETE_HEADER, complete.header_text().await?.as_str()).check()
}

async fn information_fields_are_required(scope: TestScope) -> VitrineResult<()> {
    let cart = scope.cart_with_items(1).await?;
    let information = start_checkout(&scope, &cart).await?;
    let record = scope.checkout_record()?;
    let first = record.first_name.as_str();
    let last = record.last_name.as_str();
    let postal = record.postal_code.as_str();

    let cases = [
        (("", last, postal), "Error: First Name is required"),
        ((first, "", postal), "Error: Last Name is required"),
        ((first, last, ""), "Error: Postal Code is required"),
    ];
    for ((f, l, p), expected) in cases {
        information.fill_form(f, l, p).await?;
        information.continue_checkout().await?;
        Assertion::equals(&Some(expected.to_string()), &information.error_message().await?)
            .check()?;
        Assertion::is_true(information.is_loaded().await?, "still on step one")
            .context(expected)
            .check()?;
    }
    Ok(())
}

async fn overview_totals_add_up(scope: TestScope) -> VitrineResult<()> {
    let cart = scope.cart_with_items(3).await?;
    let cart_total = cart.item_total().await?;
    let information = start_checkout(&scope, &cart).await?;
    let overview = reach_overview(&scope, &information).await?;

    let items = overview.line_items().await?;
    let summary = overview.summary().await?;
    Assertion::has_length(&items, 3).check()?;
    Assertion::is_true(summary.matches_items(&items), "subtotal matches line items").check()?;
    Assertion::equals(&cart_total, &summary.subtotal).check()?;
    Assertion::equals(&summary.subtotal.percent(TAX_PERCENT), &summary.tax)
        .context("tax")
        .check()?;
    Assertion::is_true(summary.is_consistent(), "subtotal plus tax is the total").check()?;
    Assertion::contains(&overview.payment_info().await?, "SauceCard").check()?;
    Assertion::contains(&overview.shipping_info().await?, "Pony Express").check()
}

async fn cancel_information_returns_to_cart(scope: TestScope) -> VitrineResult<()> {
    let cart = scope.cart_with_items(2).await?;
    let information = start_checkout(&scope, &cart).await?;
    information.cancel().await?;
    cart.wait_until_loaded().await?;
    Assertion::equals(&2, &cart.item_count().await?).check()
}

async fn cancel_overview_returns_to_inventory(scope: TestScope) -> VitrineResult<()> {
    let cart = scope.cart_with_items(1).await?;
    let information = start_checkout(&scope, &cart).await?;
    let overview = reach_overview(&scope, &information).await?;
    overview.cancel().await?;
    let inventory = scope.inventory_page();
    inventory.wait_until_loaded().await?;
    Assertion::equals(&1, &inventory.header().cart_badge_count().await?)
        .context("cancel keeps the cart")
        .check()
}

async fn back_home_after_order(scope: TestScope) -> VitrineResult<()> {
    let cart = scope.cart_with_items(2).await?;
    let information = start_checkout(&scope, &cart).await?;
    let overview = reach_overview(&scope, &information).await?;
    overview.finish().await?;
    let complete = scope.checkout_complete_page();
    complete.wait_until_loaded().await?;
    Assertion::contains(&complete.body_text().await?, "dispatched").check()?;

    complete.back_to_products().await?;
    let inventory = scope.inventory_page();
    inventory.wait_until_loaded().await?;
    Assertion::equals(&0, &inventory.header().cart_badge_count().await?).check()
}

async fn error_user_cannot_finish(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Error).await?;
    inventory.add_to_cart(BACKPACK).await?;
    let cart = open_cart(&scope, &inventory).await?;
    let information = start_checkout(&scope, &cart).await?;
    let overview = reach_overview(&scope, &information).await?;
    overview.finish().await?;
    Assertion::is_true(overview.is_loaded().await?, "order stays on the overview").check()?;
    Assertion::is_false(
        scope.checkout_complete_page().is_loaded().await?,
        "no confirmation is shown",
    )
    .check()
}
