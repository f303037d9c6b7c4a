use crate::assertion::Assertion;
use crate::config::UserRole;
use crate::fixture::TestScope;
use crate::harness::Scenario;
use crate::page_object::PageObject;
use crate::price::Price;
use crate::result::VitrineResult;

const BACKPACK: &str = "Sauce Labs Backpack";
const ONESIE: &str = "Sauce Labs Onesie";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "cart: badge counts added items",
            &["cart", "smoke"],
            badge_counts_added_items,
        ),
        Scenario::new(
            "cart: line items match added products",
            &["cart", "regression"],
            line_items_match_added_products,
        ),
        Scenario::new(
            "cart: remove item from the cart page",
            &["cart", "regression"],
            remove_item_from_cart_page,
        ),
        Scenario::new(
            "cart: continue shopping keeps the cart",
            &["cart", "navigation", "regression"],
            continue_shopping_keeps_cart,
        ),
        Scenario::new(
            "cart: new session starts empty",
            &["cart", "regression"],
            new_session_starts_empty,
        ),
        Scenario::new(
            "cart: reset app state empties the cart",
            &["cart", "regression"],
            reset_app_state_empties_cart,
        ),
        Scenario::new(
            "cart: page objects in one scope agree",
            &["cart", "regression"],
            page_objects_agree,
        ),
    ]
}

async fn badge_counts_added_items(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    Assertion::equals(&0, &inventory.header().cart_badge_count().await?).check()?;
    inventory.add_to_cart(BACKPACK).await?;
    Assertion::equals(&1, &inventory.header().cart_badge_count().await?).check()?;
    inventory.add_to_cart(ONESIE).await?;
    Assertion::equals(&2, &inventory.header().cart_badge_count().await?).check()
}

async fn line_items_match_added_products(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    let listed = inventory.products().await?;
    let picked: Vec<_> = listed.iter().take(3).collect();
    for product in &picked {
        inventory.add_to_cart(&product.name).await?;
    }
    inventory.header().open_cart().await?;
    let cart = scope.cart_page();
    cart.wait_until_loaded().await?;

    let items = cart.line_items().await?;
    Assertion::has_length(&items, picked.len()).check()?;
    for (item, product) in items.iter().zip(&picked) {
        Assertion::equals(&product.name, &item.name).check()?;
        Assertion::equals(&product.price, &item.price).context(&item.name).check()?;
        Assertion::equals(&1, &item.quantity).context(&item.name).check()?;
    }
    let expected: Price = picked.iter().map(|p| p.price).sum();
    Assertion::equals(&expected, &cart.item_total().await?).check()
}

async fn remove_item_from_cart_page(scope: TestScope) -> VitrineResult<()> {
    let cart = scope.cart_with_items(2).await?;
    let names = cart.item_names().await?;
    let Some(first) = names.first() else {
        return Assertion::is_true(false, "cart has items").check();
    };
    cart.remove(first).await?;
    Assertion::is_false(cart.contains(first).await?, "removed item is gone").check()?;
    Assertion::equals(&1, &cart.item_count().await?).check()?;
    Assertion::equals(&1, &cart.header().cart_badge_count().await?).check()?;
    Assertion::fails_with(&cart.remove(first).await, "ProductNotFound").check()
}

async fn continue_shopping_keeps_cart(scope: TestScope) -> VitrineResult<()> {
    let cart = scope.cart_with_items(1).await?;
    cart.continue_shopping().await?;
    let inventory = scope.inventory_page();
    inventory.wait_until_loaded().await?;
    Assertion::equals(&1, &inventory.header().cart_badge_count().await?).check()
}

async fn new_session_starts_empty(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    inventory.header().open_cart().await?;
    let cart = scope.cart_page();
    cart.wait_until_loaded().await?;
    Assertion::is_true(cart.is_empty().await?, "fresh context has an empty cart").check()?;
    Assertion::equals(&Price::ZERO, &cart.item_total().await?).check()
}

async fn reset_app_state_empties_cart(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    inventory.add_to_cart(BACKPACK).await?;
    inventory.add_to_cart(ONESIE).await?;
    inventory.header().reset_app_state().await?;
    Assertion::equals(&0, &inventory.header().cart_badge_count().await?).check()?;
    inventory.header().open_cart().await?;
    let cart = scope.cart_page();
    cart.wait_until_loaded().await?;
    Assertion::is_true(cart.is_empty().await?, "cart is empty after reset").check()
}

async fn page_objects_agree(scope: TestScope) -> VitrineResult<()> {
    let first = scope.logged_in(UserRole::Standard).await?;
    first.add_to_cart(BACKPACK).await?;
    let second = scope.inventory_page();
    Assertion::equals(
        &first.header().cart_badge_count().await?,
        &second.header().cart_badge_count().await?,
    )
    .check()?;
    Assertion::equals(&first.product_names().await?, &second.product_names().await?).check()
}
