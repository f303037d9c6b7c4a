//! Shopping cart.

use super::header::HeaderBar;
use super::inventory::{parse_prices, remove_button};
use crate::interaction::Interactions;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::price::Price;
use crate::result::{VitrineError, VitrineResult};
use serde::Serialize;

/// One cart row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// Product name
    pub name: String,
    /// Quantity column
    pub quantity: u32,
    /// Unit price
    pub price: Price,
}

pub(crate) const ITEM: Locator = Locator::css("cart item", ".cart_item");
pub(crate) const ITEM_NAME: Locator = Locator::css("cart item name", ".inventory_item_name");
pub(crate) const ITEM_QUANTITY: Locator = Locator::css("cart item quantity", ".cart_quantity");
pub(crate) const ITEM_PRICE: Locator = Locator::css("cart item price", ".inventory_item_price");

/// Rows of a cart-style listing (cart and checkout overview)
pub(crate) async fn read_line_items(ui: &Interactions) -> VitrineResult<Vec<LineItem>> {
    let names = ui.all_texts(&ITEM_NAME).await?;
    let quantities = ui
        .all_texts(&ITEM_QUANTITY)
        .await?
        .into_iter()
        .map(|q| {
            q.trim()
                .parse::<u32>()
                .map_err(|_| VitrineError::page(format!("unreadable quantity '{q}'")))
        })
        .collect::<VitrineResult<Vec<_>>>()?;
    let prices = parse_prices(ui.all_texts(&ITEM_PRICE).await?)?;
    if names.len() != quantities.len() || names.len() != prices.len() {
        return Err(VitrineError::page(format!(
            "cart rows are incomplete: {} names, {} quantities, {} prices",
            names.len(),
            quantities.len(),
            prices.len()
        )));
    }
    Ok(names
        .into_iter()
        .zip(quantities)
        .zip(prices)
        .map(|((name, quantity), price)| LineItem {
            name,
            quantity,
            price,
        })
        .collect())
}

/// The cart at `/cart.html`
#[derive(Debug, Clone)]
pub struct CartPage {
    ui: Interactions,
}

impl CartPage {
    pub const CART_LIST: Locator = Locator::css("cart list", ".cart_list");
    pub const ITEM: Locator = ITEM;
    pub const ITEM_NAME: Locator = ITEM_NAME;
    pub const ITEM_QUANTITY: Locator = ITEM_QUANTITY;
    pub const ITEM_PRICE: Locator = ITEM_PRICE;
    pub const CONTINUE_SHOPPING: Locator = Locator::test_id("continue shopping button", "continue-shopping");
    pub const CHECKOUT: Locator = Locator::test_id("checkout button", "checkout");

    /// Path of the cart
    pub const PATH: &'static str = "/cart.html";

    #[must_use]
    pub const fn new(ui: Interactions) -> Self {
        Self { ui }
    }

    /// Locators this page touches
    #[must_use]
    pub fn registry() -> Vec<Locator> {
        vec![
            Self::CART_LIST,
            Self::ITEM,
            Self::ITEM_NAME,
            Self::ITEM_QUANTITY,
            Self::ITEM_PRICE,
            Self::CONTINUE_SHOPPING,
            Self::CHECKOUT,
        ]
    }

    #[must_use]
    pub fn header(&self) -> HeaderBar {
        HeaderBar::new(self.ui.clone())
    }

    /// Navigate to the cart and wait for it
    pub async fn open(&self) -> VitrineResult<()> {
        self.ui.open(Self::PATH).await?;
        self.wait_until_loaded().await
    }

    pub async fn line_items(&self) -> VitrineResult<Vec<LineItem>> {
        read_line_items(&self.ui).await
    }

    pub async fn item_names(&self) -> VitrineResult<Vec<String>> {
        self.ui.all_texts(&Self::ITEM_NAME).await
    }

    pub async fn item_count(&self) -> VitrineResult<usize> {
        self.ui.count(&Self::ITEM).await
    }

    pub async fn is_empty(&self) -> VitrineResult<bool> {
        Ok(self.item_count().await? == 0)
    }

    pub async fn contains(&self, name: &str) -> VitrineResult<bool> {
        Ok(self.item_names().await?.iter().any(|n| n == name))
    }

    /// Remove the row named `name`
    pub async fn remove(&self, name: &str) -> VitrineResult<()> {
        if !self.contains(name).await? {
            return Err(VitrineError::ProductNotFound {
                name: name.to_string(),
            });
        }
        self.ui.click(&remove_button(name)).await
    }

    /// Sum of unit price times quantity
    pub async fn item_total(&self) -> VitrineResult<Price> {
        Ok(self
            .line_items()
            .await?
            .iter()
            .map(|item| Price::from_cents(item.price.cents() * item.quantity))
            .sum())
    }

    pub async fn continue_shopping(&self) -> VitrineResult<()> {
        self.ui.click(&Self::CONTINUE_SHOPPING).await
    }

    /// Proceed to checkout step one
    pub async fn checkout(&self) -> VitrineResult<()> {
        self.ui.click(&Self::CHECKOUT).await
    }
}

impl PageObject for CartPage {
    fn page_name(&self) -> &'static str {
        "cart"
    }

    fn url_pattern(&self) -> &'static str {
        Self::PATH
    }

    fn ready_locator(&self) -> Locator {
        Self::CHECKOUT
    }

    fn interactions(&self) -> &Interactions {
        &self.ui
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pages::{InventoryPage, LoginPage};
    use crate::simulation::test_context;

    async fn cart_with(products: &[&str]) -> (std::sync::Arc<dyn crate::driver::PageDriver>, CartPage) {
        let (page, ui) = test_context().await;
        let login = LoginPage::new(ui.clone());
        login.open().await.unwrap();
        login.login("standard_user", "secret_sauce").await.unwrap();
        let inventory = InventoryPage::new(ui.clone());
        inventory.wait_until_loaded().await.unwrap();
        for product in products {
            inventory.add_to_cart(product).await.unwrap();
        }
        inventory.header().open_cart().await.unwrap();
        let cart = CartPage::new(ui);
        cart.wait_until_loaded().await.unwrap();
        (page, cart)
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let (_page, cart) = cart_with(&[]).await;
        assert!(cart.is_empty().await.unwrap());
        assert_eq!(cart.item_total().await.unwrap(), Price::ZERO);
    }

    #[tokio::test]
    async fn test_line_items_in_insertion_order() {
        let (_page, cart) = cart_with(&["Sauce Labs Onesie", "Sauce Labs Backpack"]).await;
        let items = cart.line_items().await.unwrap();
        assert_eq!(
            items,
            vec![
                LineItem {
                    name: "Sauce Labs Onesie".to_string(),
                    quantity: 1,
                    price: Price::from_cents(799),
                },
                LineItem {
                    name: "Sauce Labs Backpack".to_string(),
                    quantity: 1,
                    price: Price::from_cents(2999),
                },
            ]
        );
        assert_eq!(cart.item_total().await.unwrap(), Price::from_cents(3798));
    }

    #[tokio::test]
    async fn test_remove() {
        let (_page, cart) = cart_with(&["Sauce Labs Bike Light"]).await;
        let err = cart.remove("Sauce Labs Onesie").await.unwrap_err();
        assert!(matches!(err, VitrineError::ProductNotFound { .. }));
        cart.remove("Sauce Labs Bike Light").await.unwrap();
        assert!(cart.is_empty().await.unwrap());
        assert_eq!(cart.header().cart_badge_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_continue_shopping() {
        let (_page, cart) = cart_with(&[]).await;
        cart.continue_shopping().await.unwrap();
        assert!(!cart.is_loaded().await.unwrap());
    }
}
