use crate::assertion::Assertion;
use crate::config::UserRole;
use crate::fixture::TestScope;
use crate::harness::Scenario;
use crate::page_object::{path_of, PageObject};
use crate::pages::{CartPage, InventoryPage};
use crate::result::VitrineResult;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "navigation: protected pages require login",
            &["navigation", "negative", "security"],
            protected_pages_require_login,
        ),
        Scenario::new(
            "navigation: logout returns to login",
            &["navigation", "smoke"],
            logout_returns_to_login,
        ),
        Scenario::new(
            "navigation: all items link leaves the cart",
            &["navigation", "regression"],
            all_items_link_leaves_cart,
        ),
        Scenario::new(
            "navigation: browser back returns to inventory",
            &["navigation", "regression"],
            browser_back_returns_to_inventory,
        ),
        Scenario::new(
            "navigation: menu opens and closes",
            &["navigation", "regression"],
            menu_opens_and_closes,
        ),
    ]
}

async fn protected_pages_require_login(scope: TestScope) -> VitrineResult<()> {
    let ui = scope.interactions();
    let login = scope.login_page();
    for path in [InventoryPage::PATH, CartPage::PATH] {
        ui.open(path).await?;
        login.wait_until_loaded().await?;
        let expected = format!("Epic sadface: You can only access '{path}' when you are logged in.");
        Assertion::equals(&Some(expected), &login.error_message().await?)
            .context(path)
            .check()?;
    }
    Ok(())
}

async fn logout_returns_to_login(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    inventory.header().logout().await?;
    let login = scope.login_page();
    login.wait_until_loaded().await?;
    Assertion::equals("", login.username_value().await?.as_str()).check()?;

    scope.interactions().open(InventoryPage::PATH).await?;
    login.wait_until_loaded().await?;
    Assertion::is_true(login.is_error_displayed().await?, "session ended with logout").check()
}

async fn all_items_link_leaves_cart(scope: TestScope) -> VitrineResult<()> {
    let cart = scope.cart_with_items(1).await?;
    cart.header().all_items().await?;
    let inventory = scope.inventory_page();
    inventory.wait_until_loaded().await?;
    Assertion::equals("Products", inventory.header().title().await?.as_str()).check()
}

async fn browser_back_returns_to_inventory(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    inventory.header().open_cart().await?;
    scope.cart_page().wait_until_loaded().await?;

    let ui = scope.interactions();
    ui.go_back().await?;
    inventory.wait_until_loaded().await?;
    let url = ui.current_url().await?;
    Assertion::equals(InventoryPage::PATH, path_of(&url).as_str()).check()
}

async fn menu_opens_and_closes(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    let header = inventory.header();
    header.open_menu().await?;
    header.close_menu().await?;
    Assertion::is_true(inventory.is_loaded().await?, "inventory still displayed").check()
}
