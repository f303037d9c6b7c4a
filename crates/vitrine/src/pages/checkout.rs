//! Checkout steps: information, overview and completion.

use super::cart::{read_line_items, LineItem, ITEM, ITEM_NAME, ITEM_PRICE, ITEM_QUANTITY};
use super::header::HeaderBar;
use crate::interaction::Interactions;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::price::Price;
use crate::result::{VitrineError, VitrineResult};
use crate::test_data::CheckoutRecord;
use serde::Serialize;

/// Step one: shipping information form
#[derive(Debug, Clone)]
pub struct CheckoutInformationPage {
    ui: Interactions,
}

impl CheckoutInformationPage {
    pub const FIRST_NAME: Locator = Locator::test_id("first name field", "firstName");
    pub const LAST_NAME: Locator = Locator::test_id("last name field", "lastName");
    pub const POSTAL_CODE: Locator = Locator::test_id("postal code field", "postalCode");
    pub const CONTINUE: Locator = Locator::test_id("continue button", "continue");
    pub const CANCEL: Locator = Locator::test_id("cancel button", "cancel");
    pub const ERROR: Locator = Locator::test_id("error banner", "error");

    pub const PATH: &'static str = "/checkout-step-one.html";

    #[must_use]
    pub const fn new(ui: Interactions) -> Self {
        Self { ui }
    }

    /// Locators this page touches
    #[must_use]
    pub fn registry() -> Vec<Locator> {
        vec![
            Self::FIRST_NAME,
            Self::LAST_NAME,
            Self::POSTAL_CODE,
            Self::CONTINUE,
            Self::CANCEL,
            Self::ERROR,
        ]
    }

    #[must_use]
    pub fn header(&self) -> HeaderBar {
        HeaderBar::new(self.ui.clone())
    }

    pub async fn fill_first_name(&self, value: &str) -> VitrineResult<()> {
        self.ui.fill(&Self::FIRST_NAME, value).await
    }

    pub async fn fill_last_name(&self, value: &str) -> VitrineResult<()> {
        self.ui.fill(&Self::LAST_NAME, value).await
    }

    pub async fn fill_postal_code(&self, value: &str) -> VitrineResult<()> {
        self.ui.fill(&Self::POSTAL_CODE, value).await
    }

    /// Fill all three fields
    pub async fn fill_form(&self, first_name: &str, last_name: &str, postal_code: &str) -> VitrineResult<()> {
        self.fill_first_name(first_name).await?;
        self.fill_last_name(last_name).await?;
        self.fill_postal_code(postal_code).await
    }

    /// Fill all three fields from a generated record
    pub async fn fill_record(&self, record: &CheckoutRecord) -> VitrineResult<()> {
        tracing::debug!(record = %record.id, "fill checkout information");
        self.fill_form(&record.first_name, &record.last_name, &record.postal_code)
            .await
    }

    /// Current field values (first name, last name, postal code)
    pub async fn field_values(&self) -> VitrineResult<(String, String, String)> {
        Ok((
            self.ui.input_value(&Self::FIRST_NAME).await?,
            self.ui.input_value(&Self::LAST_NAME).await?,
            self.ui.input_value(&Self::POSTAL_CODE).await?,
        ))
    }

    /// Submit the form
    pub async fn continue_checkout(&self) -> VitrineResult<()> {
        self.ui.click(&Self::CONTINUE).await
    }

    pub async fn cancel(&self) -> VitrineResult<()> {
        self.ui.click(&Self::CANCEL).await
    }

    /// Validation banner text, `None` when no banner is shown
    pub async fn error_message(&self) -> VitrineResult<Option<String>> {
        if self.ui.is_visible(&Self::ERROR).await? {
            Ok(Some(self.ui.read_text(&Self::ERROR).await?))
        } else {
            Ok(None)
        }
    }
}

impl PageObject for CheckoutInformationPage {
    fn page_name(&self) -> &'static str {
        "checkout information"
    }

    fn url_pattern(&self) -> &'static str {
        Self::PATH
    }

    fn ready_locator(&self) -> Locator {
        Self::CONTINUE
    }

    fn interactions(&self) -> &Interactions {
        &self.ui
    }
}

/// Totals block of the overview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    /// Sum of item prices
    pub subtotal: Price,
    /// Tax
    pub tax: Price,
    /// Amount charged
    pub total: Price,
}

impl OrderSummary {
    /// Whether subtotal plus tax equals the total
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.subtotal + self.tax == self.total
    }

    /// Whether the subtotal equals the sum of `items`
    #[must_use]
    pub fn matches_items(&self, items: &[LineItem]) -> bool {
        let sum: Price = items
            .iter()
            .map(|item| Price::from_cents(item.price.cents() * item.quantity))
            .sum();
        sum == self.subtotal
    }
}

/// Step two: order overview
#[derive(Debug, Clone)]
pub struct CheckoutOverviewPage {
    ui: Interactions,
}

impl CheckoutOverviewPage {
    pub const ITEM: Locator = ITEM;
    pub const ITEM_NAME: Locator = ITEM_NAME;
    pub const ITEM_QUANTITY: Locator = ITEM_QUANTITY;
    pub const ITEM_PRICE: Locator = ITEM_PRICE;
    pub const PAYMENT_INFO: Locator = Locator::test_id("payment information", "payment-info-value");
    pub const SHIPPING_INFO: Locator = Locator::test_id("shipping information", "shipping-info-value");
    pub const SUBTOTAL: Locator = Locator::css("item total", ".summary_subtotal_label");
    pub const TAX: Locator = Locator::css("tax", ".summary_tax_label");
    pub const TOTAL: Locator = Locator::css("total", ".summary_total_label");
    pub const FINISH: Locator = Locator::test_id("finish button", "finish");
    pub const CANCEL: Locator = Locator::test_id("cancel button", "cancel");

    pub const PATH: &'static str = "/checkout-step-two.html";

    #[must_use]
    pub const fn new(ui: Interactions) -> Self {
        Self { ui }
    }

    /// Locators this page touches
    #[must_use]
    pub fn registry() -> Vec<Locator> {
        vec![
            Self::ITEM,
            Self::ITEM_NAME,
            Self::ITEM_QUANTITY,
            Self::ITEM_PRICE,
            Self::PAYMENT_INFO,
            Self::SHIPPING_INFO,
            Self::SUBTOTAL,
            Self::TAX,
            Self::TOTAL,
            Self::FINISH,
            Self::CANCEL,
        ]
    }

    #[must_use]
    pub fn header(&self) -> HeaderBar {
        HeaderBar::new(self.ui.clone())
    }

    pub async fn line_items(&self) -> VitrineResult<Vec<LineItem>> {
        read_line_items(&self.ui).await
    }

    async fn read_price(&self, locator: &Locator) -> VitrineResult<Price> {
        let text = self.ui.read_text(locator).await?;
        Price::parse(&text).ok_or_else(|| VitrineError::page(format!("unreadable amount '{text}'")))
    }

    /// Subtotal, tax and total as displayed
    pub async fn summary(&self) -> VitrineResult<OrderSummary> {
        Ok(OrderSummary {
            subtotal: self.read_price(&Self::SUBTOTAL).await?,
            tax: self.read_price(&Self::TAX).await?,
            total: self.read_price(&Self::TOTAL).await?,
        })
    }

    pub async fn payment_info(&self) -> VitrineResult<String> {
        self.ui.read_text(&Self::PAYMENT_INFO).await
    }

    pub async fn shipping_info(&self) -> VitrineResult<String> {
        self.ui.read_text(&Self::SHIPPING_INFO).await
    }

    /// Place the order
    pub async fn finish(&self) -> VitrineResult<()> {
        self.ui.click(&Self::FINISH).await
    }

    pub async fn cancel(&self) -> VitrineResult<()> {
        self.ui.click(&Self::CANCEL).await
    }
}

impl PageObject for CheckoutOverviewPage {
    fn page_name(&self) -> &'static str {
        "checkout overview"
    }

    fn url_pattern(&self) -> &'static str {
        Self::PATH
    }

    fn ready_locator(&self) -> Locator {
        Self::FINISH
    }

    fn interactions(&self) -> &Interactions {
        &self.ui
    }
}

/// Order confirmation
#[derive(Debug, Clone)]
pub struct CheckoutCompletePage {
    ui: Interactions,
}

impl CheckoutCompletePage {
    pub const HEADER: Locator = Locator::css("confirmation header", ".complete-header");
    pub const TEXT: Locator = Locator::css("confirmation text", ".complete-text");
    pub const PONY_EXPRESS: Locator = Locator::css("pony express image", ".pony_express");
    pub const BACK_HOME: Locator = Locator::test_id("back home button", "back-to-products");

    pub const PATH: &'static str = "/checkout-complete.html";

    #[must_use]
    pub const fn new(ui: Interactions) -> Self {
        Self { ui }
    }

    /// Locators this page touches
    #[must_use]
    pub fn registry() -> Vec<Locator> {
        vec![Self::HEADER, Self::TEXT, Self::PONY_EXPRESS, Self::BACK_HOME]
    }

    #[must_use]
    pub fn header(&self) -> HeaderBar {
        HeaderBar::new(self.ui.clone())
    }

    pub async fn header_text(&self) -> VitrineResult<String> {
        self.ui.read_text(&Self::HEADER).await
    }

    pub async fn body_text(&self) -> VitrineResult<String> {
        self.ui.read_text(&Self::TEXT).await
    }

    /// Confirmation view shown with its header and image
    pub async fn is_order_complete(&self) -> VitrineResult<bool> {
        Ok(self.is_loaded().await?
            && self.ui.is_visible(&Self::HEADER).await?
            && self.ui.is_visible(&Self::PONY_EXPRESS).await?)
    }

    pub async fn back_to_products(&self) -> VitrineResult<()> {
        self.ui.click(&Self::BACK_HOME).await
    }
}

impl PageObject for CheckoutCompletePage {
    fn page_name(&self) -> &'static str {
        "checkout complete"
    }

    fn url_pattern(&self) -> &'static str {
        Self::PATH
    }

    fn ready_locator(&self) -> Locator {
        Self::BACK_HOME
    }

    fn interactions(&self) -> &Interactions {
        &self.ui
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pages::{CartPage, InventoryPage, LoginPage};
    use crate::simulation::test_context;

    async fn at_information(user: &str, products: &[&str]) -> (std::sync::Arc<dyn crate::driver::PageDriver>, Interactions) {
        let (page, ui) = test_context().await;
        let login = LoginPage::new(ui.clone());
        login.open().await.unwrap();
        login.login(user, "secret_sauce").await.unwrap();
        let inventory = InventoryPage::new(ui.clone());
        inventory.wait_until_loaded().await.unwrap();
        for product in products {
            inventory.add_to_cart(product).await.unwrap();
        }
        inventory.header().open_cart().await.unwrap();
        CartPage::new(ui.clone()).checkout().await.unwrap();
        CheckoutInformationPage::new(ui.clone())
            .wait_until_loaded()
            .await
            .unwrap();
        (page, ui)
    }

    mod information_tests {
        use super::*;

        #[tokio::test]
        async fn test_missing_postal_code() {
            let (_page, ui) = at_information("standard_user", &[]).await;
            let info = CheckoutInformationPage::new(ui);
            info.fill_first_name("Ada").await.unwrap();
            info.fill_last_name("Lovelace").await.unwrap();
            info.continue_checkout().await.unwrap();
            assert_eq!(
                info.error_message().await.unwrap().as_deref(),
                Some("Error: Postal Code is required")
            );
            assert!(info.is_loaded().await.unwrap());
        }

        #[tokio::test]
        async fn test_cancel_returns_to_cart() {
            let (_page, ui) = at_information("standard_user", &[]).await;
            CheckoutInformationPage::new(ui.clone()).cancel().await.unwrap();
            CartPage::new(ui).wait_until_loaded().await.unwrap();
        }

        #[tokio::test]
        async fn test_problem_user_last_name_lands_in_first_name() {
            let (_page, ui) = at_information("problem_user", &[]).await;
            let info = CheckoutInformationPage::new(ui);
            info.fill_form("Ada", "Lovelace", "12345").await.unwrap();
            let (first, last, postal) = info.field_values().await.unwrap();
            assert_eq!(first, "Lovelace");
            assert_eq!(last, "");
            assert_eq!(postal, "12345");
        }
    }

    mod overview_tests {
        use super::*;

        #[tokio::test]
        async fn test_summary_is_consistent() {
            let (_page, ui) =
                at_information("standard_user", &["Sauce Labs Backpack", "Sauce Labs Bolt T-Shirt"]).await;
            let info = CheckoutInformationPage::new(ui.clone());
            info.fill_form("Ada", "Lovelace", "12345").await.unwrap();
            info.continue_checkout().await.unwrap();
            let overview = CheckoutOverviewPage::new(ui.clone());
            overview.wait_until_loaded().await.unwrap();

            let items = overview.line_items().await.unwrap();
            let summary = overview.summary().await.unwrap();
            assert_eq!(summary.subtotal, Price::from_cents(4598));
            assert_eq!(summary.tax, Price::from_cents(368));
            assert_eq!(summary.total, Price::from_cents(4966));
            assert!(summary.is_consistent());
            assert!(summary.matches_items(&items));
            assert_eq!(overview.payment_info().await.unwrap(), "SauceCard #31337");
            assert_eq!(
                overview.shipping_info().await.unwrap(),
                "Free Pony Express Delivery!"
            );

            overview.finish().await.unwrap();
            let complete = CheckoutCompletePage::new(ui);
            complete.wait_until_loaded().await.unwrap();
            assert!(complete.is_order_complete().await.unwrap());
            assert_eq!(
                complete.header_text().await.unwrap(),
                "Thank you for your order!"
            );
            assert_eq!(complete.header().cart_badge_count().await.unwrap(), 0);
        }

        #[test]
        fn test_inconsistent_summary() {
            let summary = OrderSummary {
                subtotal: Price::from_cents(1000),
                tax: Price::from_cents(80),
                total: Price::from_cents(1000),
            };
            assert!(!summary.is_consistent());
        }
    }
}
