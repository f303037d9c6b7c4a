//! Product listing.

use super::header::HeaderBar;
use crate::interaction::Interactions;
use crate::locator::{slugify, Locator, Selector};
use crate::page_object::PageObject;
use crate::price::Price;
use crate::result::{VitrineError, VitrineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort orders offered by the product listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortCriterion {
    /// Name (A to Z)
    NameAscending,
    /// Name (Z to A)
    NameDescending,
    /// Price (low to high)
    PriceAscending,
    /// Price (high to low)
    PriceDescending,
}

impl SortCriterion {
    /// All criteria, in the order the dropdown lists them
    pub const ALL: [Self; 4] = [
        Self::NameAscending,
        Self::NameDescending,
        Self::PriceAscending,
        Self::PriceDescending,
    ];

    /// `<option>` value
    #[must_use]
    pub const fn option_value(self) -> &'static str {
        match self {
            Self::NameAscending => "az",
            Self::NameDescending => "za",
            Self::PriceAscending => "lohi",
            Self::PriceDescending => "hilo",
        }
    }

    /// Label shown in the dropdown
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NameAscending => "Name (A to Z)",
            Self::NameDescending => "Name (Z to A)",
            Self::PriceAscending => "Price (low to high)",
            Self::PriceDescending => "Price (high to low)",
        }
    }

    /// Criterion for an `<option>` value
    #[must_use]
    pub fn from_option_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.option_value() == value)
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortCriterion {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "az" | "name-asc" | "name-ascending" => Ok(Self::NameAscending),
            "za" | "name-desc" | "name-descending" => Ok(Self::NameDescending),
            "lohi" | "price-asc" | "price-ascending" => Ok(Self::PriceAscending),
            "hilo" | "price-desc" | "price-descending" => Ok(Self::PriceDescending),
            _ => Err(VitrineError::UnsupportedSortCriterion {
                criterion: s.to_string(),
            }),
        }
    }
}

/// One product row as displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    /// Display name
    pub name: String,
    /// Description text
    pub description: String,
    /// Displayed price
    pub price: Price,
}

/// The product listing at `/inventory.html`
#[derive(Debug, Clone)]
pub struct InventoryPage {
    ui: Interactions,
}

impl InventoryPage {
    pub const CONTAINER: Locator = Locator::css("inventory container", ".inventory_container");
    pub const ITEM: Locator = Locator::css("inventory item", ".inventory_item");
    pub const ITEM_NAME: Locator = Locator::css("item name", ".inventory_item_name");
    pub const ITEM_DESCRIPTION: Locator = Locator::css("item description", ".inventory_item_desc");
    pub const ITEM_PRICE: Locator = Locator::css("item price", ".inventory_item_price");
    pub const SORT: Locator = Locator::css("sort dropdown", ".product_sort_container");
    pub const ACTIVE_SORT: Locator = Locator::css("active sort", ".active_option");

    /// Path of the listing
    pub const PATH: &'static str = "/inventory.html";

    #[must_use]
    pub const fn new(ui: Interactions) -> Self {
        Self { ui }
    }

    /// Locators this page touches
    #[must_use]
    pub fn registry() -> Vec<Locator> {
        vec![
            Self::CONTAINER,
            Self::ITEM,
            Self::ITEM_NAME,
            Self::ITEM_DESCRIPTION,
            Self::ITEM_PRICE,
            Self::SORT,
            Self::ACTIVE_SORT,
        ]
    }

    /// Header bar of this page
    #[must_use]
    pub fn header(&self) -> HeaderBar {
        HeaderBar::new(self.ui.clone())
    }

    /// Navigate to the listing and wait for it
    pub async fn open(&self) -> VitrineResult<()> {
        self.ui.open(Self::PATH).await?;
        self.wait_until_loaded().await
    }

    pub async fn product_count(&self) -> VitrineResult<usize> {
        self.ui.count(&Self::ITEM).await
    }

    /// Product names in display order
    pub async fn product_names(&self) -> VitrineResult<Vec<String>> {
        self.ui.all_texts(&Self::ITEM_NAME).await
    }

    pub async fn product_descriptions(&self) -> VitrineResult<Vec<String>> {
        self.ui.all_texts(&Self::ITEM_DESCRIPTION).await
    }

    /// Prices in display order
    pub async fn product_prices(&self) -> VitrineResult<Vec<Price>> {
        parse_prices(self.ui.all_texts(&Self::ITEM_PRICE).await?)
    }

    /// Every displayed row
    pub async fn products(&self) -> VitrineResult<Vec<ProductSummary>> {
        let names = self.product_names().await?;
        let descriptions = self.product_descriptions().await?;
        let prices = self.product_prices().await?;
        Ok(names
            .into_iter()
            .zip(descriptions)
            .zip(prices)
            .map(|((name, description), price)| ProductSummary {
                name,
                description,
                price,
            })
            .collect())
    }

    async fn require_product(&self, name: &str) -> VitrineResult<()> {
        if self.product_names().await?.iter().any(|n| n == name) {
            Ok(())
        } else {
            Err(VitrineError::ProductNotFound {
                name: name.to_string(),
            })
        }
    }

    /// Click "Add to cart" on the row named `name`
    pub async fn add_to_cart(&self, name: &str) -> VitrineResult<()> {
        self.require_product(name).await?;
        tracing::debug!(product = name, "add to cart");
        self.ui.click(&add_button(name)).await
    }

    /// Click "Remove" on the row named `name`
    pub async fn remove_from_cart(&self, name: &str) -> VitrineResult<()> {
        self.require_product(name).await?;
        tracing::debug!(product = name, "remove from cart");
        self.ui.click(&remove_button(name)).await
    }

    /// Whether the row named `name` shows its "Remove" control
    pub async fn is_in_cart(&self, name: &str) -> VitrineResult<bool> {
        self.require_product(name).await?;
        Ok(self.ui.count(&remove_button(name)).await? > 0)
    }

    /// Add every product not yet in the cart; returns how many were added
    pub async fn add_all_to_cart(&self) -> VitrineResult<usize> {
        let mut added = 0;
        for name in self.product_names().await? {
            if self.ui.count(&add_button(&name)).await? > 0 {
                self.ui.click(&add_button(&name)).await?;
                added += 1;
            }
        }
        Ok(added)
    }

    /// Choose a sort order
    pub async fn sort_by(&self, criterion: SortCriterion) -> VitrineResult<()> {
        tracing::debug!(%criterion, "sort");
        self.ui
            .select_option(&Self::SORT, criterion.option_value())
            .await
    }

    /// Choose a sort order by name; unknown names leave the order untouched
    pub async fn sort_by_name(&self, criterion: &str) -> VitrineResult<()> {
        let criterion: SortCriterion = criterion.parse()?;
        self.sort_by(criterion).await
    }

    /// Sort order currently selected
    pub async fn current_sort(&self) -> VitrineResult<SortCriterion> {
        let value = self.ui.input_value(&Self::SORT).await?;
        SortCriterion::from_option_value(&value)
            .ok_or_else(|| VitrineError::page(format!("unexpected sort option '{value}'")))
    }

    pub async fn footer_text(&self) -> VitrineResult<String> {
        self.header().footer_text().await
    }
}

impl PageObject for InventoryPage {
    fn page_name(&self) -> &'static str {
        "inventory"
    }

    fn url_pattern(&self) -> &'static str {
        Self::PATH
    }

    fn ready_locator(&self) -> Locator {
        Self::CONTAINER
    }

    fn interactions(&self) -> &Interactions {
        &self.ui
    }
}

fn add_button(name: &str) -> Locator {
    Locator::dynamic(
        format!("add to cart: {name}"),
        Selector::test_id(format!("add-to-cart-{}", slugify(name))),
    )
}

pub(crate) fn remove_button(name: &str) -> Locator {
    Locator::dynamic(
        format!("remove: {name}"),
        Selector::test_id(format!("remove-{}", slugify(name))),
    )
}

pub(crate) fn parse_prices(texts: Vec<String>) -> VitrineResult<Vec<Price>> {
    texts
        .into_iter()
        .map(|text| {
            Price::parse(&text).ok_or_else(|| VitrineError::page(format!("unreadable price '{text}'")))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pages::LoginPage;
    use crate::simulation::test_context;

    async fn inventory(user: &str) -> (std::sync::Arc<dyn crate::driver::PageDriver>, InventoryPage) {
        let (page, ui) = test_context().await;
        let login = LoginPage::new(ui.clone());
        login.open().await.unwrap();
        login.login(user, "secret_sauce").await.unwrap();
        let inventory = InventoryPage::new(ui);
        inventory.wait_until_loaded().await.unwrap();
        (page, inventory)
    }

    mod sort_criterion_tests {
        use super::*;

        #[test]
        fn test_parse_aliases() {
            assert_eq!("az".parse::<SortCriterion>().unwrap(), SortCriterion::NameAscending);
            assert_eq!(
                "price-descending".parse::<SortCriterion>().unwrap(),
                SortCriterion::PriceDescending
            );
            assert_eq!(
                "NAME_DESC".parse::<SortCriterion>().unwrap(),
                SortCriterion::NameDescending
            );
        }

        #[test]
        fn test_unknown_is_unsupported() {
            let err = "popularity".parse::<SortCriterion>().unwrap_err();
            assert!(matches!(
                err,
                VitrineError::UnsupportedSortCriterion { ref criterion } if criterion == "popularity"
            ));
        }

        #[test]
        fn test_option_values_round_trip() {
            for criterion in SortCriterion::ALL {
                assert_eq!(
                    SortCriterion::from_option_value(criterion.option_value()),
                    Some(criterion)
                );
            }
        }
    }

    mod listing_tests {
        use super::*;

        #[tokio::test]
        async fn test_six_products_sorted_by_name() {
            let (_page, inventory) = inventory("standard_user").await;
            let names = inventory.product_names().await.unwrap();
            assert_eq!(names.len(), 6);
            let mut sorted = names.clone();
            sorted.sort();
            assert_eq!(names, sorted);
            assert_eq!(inventory.current_sort().await.unwrap(), SortCriterion::NameAscending);
        }

        #[tokio::test]
        async fn test_sort_by_price() {
            let (_page, inventory) = inventory("standard_user").await;
            inventory.sort_by(SortCriterion::PriceAscending).await.unwrap();
            let prices = inventory.product_prices().await.unwrap();
            assert!(prices.windows(2).all(|w| w[0] <= w[1]));
            assert_eq!(prices[0], Price::from_cents(799));
        }

        #[tokio::test]
        async fn test_unsupported_sort_keeps_order() {
            let (_page, inventory) = inventory("standard_user").await;
            let before = inventory.product_names().await.unwrap();
            let err = inventory.sort_by_name("rating").await.unwrap_err();
            assert_eq!(err.kind(), "UnsupportedSortCriterion");
            assert_eq!(inventory.product_names().await.unwrap(), before);
        }

        #[tokio::test]
        async fn test_unknown_product() {
            let (_page, inventory) = inventory("standard_user").await;
            let err = inventory.add_to_cart("Sauce Labs Teapot").await.unwrap_err();
            assert!(matches!(err, VitrineError::ProductNotFound { .. }));
        }

        #[tokio::test]
        async fn test_add_and_remove() {
            let (_page, inventory) = inventory("standard_user").await;
            inventory.add_to_cart("Sauce Labs Onesie").await.unwrap();
            assert!(inventory.is_in_cart("Sauce Labs Onesie").await.unwrap());
            assert_eq!(inventory.header().cart_badge_count().await.unwrap(), 1);
            inventory.remove_from_cart("Sauce Labs Onesie").await.unwrap();
            assert_eq!(inventory.header().cart_badge_count().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_add_all() {
            let (_page, inventory) = inventory("standard_user").await;
            inventory.add_to_cart("Sauce Labs Backpack").await.unwrap();
            assert_eq!(inventory.add_all_to_cart().await.unwrap(), 5);
            assert_eq!(inventory.header().cart_badge_count().await.unwrap(), 6);
        }

        #[tokio::test]
        async fn test_problem_user_cannot_remove() {
            let (_page, inventory) = inventory("problem_user").await;
            inventory.add_to_cart("Sauce Labs Backpack").await.unwrap();
            let err = inventory
                .remove_from_cart("Sauce Labs Backpack")
                .await
                .unwrap_err();
            match err {
                VitrineError::ElementNotActionable { reason, .. } => assert_eq!(reason, "disabled"),
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
