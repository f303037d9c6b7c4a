use crate::assertion::Assertion;
use crate::config::UserRole;
use crate::fixture::TestScope;
use crate::harness::Scenario;
use crate::price::Price;
use crate::result::VitrineResult;

const BACKPACK: &str = "Sauce Labs Backpack";
const BIKE_LIGHT: &str = "Sauce Labs Bike Light";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "inventory: lists six priced products",
            &["inventory", "smoke"],
            lists_six_priced_products,
        ),
        Scenario::new(
            "inventory: every product has a description",
            &["inventory", "regression"],
            every_product_has_description,
        ),
        Scenario::new(
            "inventory: add and remove toggles the row button",
            &["inventory", "cart", "regression"],
            add_and_remove_toggles_button,
        ),
        Scenario::new(
            "inventory: add all products to cart",
            &["inventory", "cart", "regression"],
            add_all_products,
        ),
        Scenario::new(
            "inventory: unknown product is reported",
            &["inventory", "negative"],
            unknown_product_is_reported,
        ),
        Scenario::new(
            "inventory: footer shows copyright",
            &["inventory", "regression"],
            footer_shows_copyright,
        ),
    ]
}

async fn lists_six_priced_products(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    let products = inventory.products().await?;
    Assertion::has_length(&products, 6).check()?;
    for product in &products {
        Assertion::is_true(product.price > Price::ZERO, &format!("{} has a price", product.name))
            .check()?;
    }
    let backpack = products.iter().find(|p| p.name == BACKPACK);
    Assertion::equals(&Some(Price::from_cents(2999)), &backpack.map(|p| p.price)).check()
}

async fn every_product_has_description(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    let descriptions = inventory.product_descriptions().await?;
    Assertion::has_length(&descriptions, inventory.product_count().await?).check()?;
    Assertion::is_false(
        descriptions.iter().any(|d| d.trim().is_empty()),
        "no description is blank",
    )
    .check()
}

async fn add_and_remove_toggles_button(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    inventory.add_to_cart(BIKE_LIGHT).await?;
    Assertion::is_true(inventory.is_in_cart(BIKE_LIGHT).await?, "row shows Remove").check()?;
    Assertion::equals(&1, &inventory.header().cart_badge_count().await?).check()?;

    inventory.remove_from_cart(BIKE_LIGHT).await?;
    Assertion::is_false(inventory.is_in_cart(BIKE_LIGHT).await?, "row shows Add to cart").check()?;
    Assertion::equals(&0, &inventory.header().cart_badge_count().await?).check()
}

async fn add_all_products(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    let added = inventory.add_all_to_cart().await?;
    Assertion::equals(&inventory.product_count().await?, &added).check()?;
    Assertion::equals(&added, &inventory.header().cart_badge_count().await?).check()?;
    Assertion::equals(&0, &inventory.add_all_to_cart().await?)
        .context("second pass adds nothing")
        .check()
}

async fn unknown_product_is_reported(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    let result = inventory.add_to_cart("Sauce Labs Hoverboard").await;
    Assertion::fails_with(&result, "ProductNotFound").check()?;
    Assertion::equals(&0, &inventory.header().cart_badge_count().await?).check()
}

async fn footer_shows_copyright(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    let footer = inventory.footer_text().await?;
    Assertion::contains(&footer, "Sauce Labs. All Rights Reserved").check()?;
    Assertion::contains(&footer, "Privacy Policy").check()
}
