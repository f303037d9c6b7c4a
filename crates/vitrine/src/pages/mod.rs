//! Page objects for the Sauce Demo storefront.
//!
//! Each page is a record of its `const` locators plus an
//! [`Interactions`](crate::interaction::Interactions) value bound to the
//! current browsing context. Pages return what they observe (strings,
//! counts, prices, structured rows) and leave pass/fail to the caller.

mod cart;
mod checkout;
mod header;
mod inventory;
mod login;

pub use cart::{CartPage, LineItem};
pub use checkout::{CheckoutCompletePage, CheckoutInformationPage, CheckoutOverviewPage, OrderSummary};
pub use header::HeaderBar;
pub use inventory::{InventoryPage, ProductSummary, SortCriterion};
pub use login::LoginPage;

use crate::locator::Locator;

/// Locator registries of every page, keyed by page name
#[must_use]
pub fn registries() -> Vec<(&'static str, Vec<Locator>)> {
    vec![
        ("header", HeaderBar::registry()),
        ("login", LoginPage::registry()),
        ("inventory", InventoryPage::registry()),
        ("cart", CartPage::registry()),
        ("checkout information", CheckoutInformationPage::registry()),
        ("checkout overview", CheckoutOverviewPage::registry()),
        ("checkout complete", CheckoutCompletePage::registry()),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_locator_names_unique_per_page() {
        for (page, locators) in registries() {
            let names: HashSet<&str> = locators.iter().map(Locator::name).collect();
            assert_eq!(names.len(), locators.len(), "duplicate locator name on {page}");
        }
    }

    #[test]
    fn test_registries_fixed() {
        assert_eq!(registries(), registries());
        assert_eq!(LoginPage::registry()[0].selector().to_css(), "[data-test=\"username\"]");
    }
}
