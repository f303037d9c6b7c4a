//! Header bar shared by every signed-in view.

use super::login::LoginPage;
use crate::interaction::Interactions;
use crate::locator::Locator;
use crate::result::{VitrineError, VitrineResult};
use crate::wait::WaitCondition;

/// Logo, burger menu, cart link and badge
#[derive(Debug, Clone)]
pub struct HeaderBar {
    ui: Interactions,
}

impl HeaderBar {
    pub const LOGO: Locator = Locator::css("app logo", ".app_logo");
    pub const TITLE: Locator = Locator::css("page title", ".title");
    pub const MENU_BUTTON: Locator = Locator::css("menu button", "#react-burger-menu-btn");
    pub const CLOSE_MENU_BUTTON: Locator = Locator::css("close menu button", "#react-burger-cross-btn");
    pub const ALL_ITEMS_LINK: Locator = Locator::css("all items link", "#inventory_sidebar_link");
    pub const LOGOUT_LINK: Locator = Locator::css("logout link", "#logout_sidebar_link");
    pub const RESET_LINK: Locator = Locator::css("reset app state link", "#reset_sidebar_app_state_link");
    pub const CART_LINK: Locator = Locator::css("cart link", ".shopping_cart_link");
    pub const CART_BADGE: Locator = Locator::css("cart badge", ".shopping_cart_badge");
    pub const FOOTER: Locator = Locator::css("footer", ".footer");

    #[must_use]
    pub const fn new(ui: Interactions) -> Self {
        Self { ui }
    }

    /// Locators this component touches
    #[must_use]
    pub fn registry() -> Vec<Locator> {
        vec![
            Self::LOGO,
            Self::TITLE,
            Self::MENU_BUTTON,
            Self::CLOSE_MENU_BUTTON,
            Self::ALL_ITEMS_LINK,
            Self::LOGOUT_LINK,
            Self::RESET_LINK,
            Self::CART_LINK,
            Self::CART_BADGE,
            Self::FOOTER,
        ]
    }

    /// Number shown on the cart badge; an absent badge means an empty cart
    pub async fn cart_badge_count(&self) -> VitrineResult<usize> {
        if self.ui.count(&Self::CART_BADGE).await? == 0 {
            return Ok(0);
        }
        let text = self.ui.read_text(&Self::CART_BADGE).await?;
        text.trim()
            .parse()
            .map_err(|_| VitrineError::page(format!("cart badge shows '{text}'")))
    }

    pub async fn open_cart(&self) -> VitrineResult<()> {
        self.ui.click(&Self::CART_LINK).await
    }

    /// Open the burger menu and wait for its links
    pub async fn open_menu(&self) -> VitrineResult<()> {
        self.ui.click(&Self::MENU_BUTTON).await?;
        let _ = self
            .ui
            .wait_for(&Self::LOGOUT_LINK, WaitCondition::Visible)
            .await?;
        Ok(())
    }

    pub async fn close_menu(&self) -> VitrineResult<()> {
        self.ui.click(&Self::CLOSE_MENU_BUTTON).await?;
        let _ = self
            .ui
            .wait_for(&Self::LOGOUT_LINK, WaitCondition::Hidden)
            .await?;
        Ok(())
    }

    /// Sign out through the menu and wait for the login form
    pub async fn logout(&self) -> VitrineResult<()> {
        self.open_menu().await?;
        self.ui.click(&Self::LOGOUT_LINK).await?;
        let _ = self
            .ui
            .wait_for(&LoginPage::LOGIN_BUTTON, WaitCondition::Visible)
            .await?;
        Ok(())
    }

    /// Empty the cart through the menu
    pub async fn reset_app_state(&self) -> VitrineResult<()> {
        self.open_menu().await?;
        self.ui.click(&Self::RESET_LINK).await?;
        self.close_menu().await
    }

    /// Back to the listing through the menu
    pub async fn all_items(&self) -> VitrineResult<()> {
        self.open_menu().await?;
        self.ui.click(&Self::ALL_ITEMS_LINK).await
    }

    pub async fn is_logo_visible(&self) -> VitrineResult<bool> {
        self.ui.is_visible(&Self::LOGO).await
    }

    pub async fn title(&self) -> VitrineResult<String> {
        self.ui.read_text(&Self::TITLE).await
    }

    pub async fn footer_text(&self) -> VitrineResult<String> {
        self.ui.read_text(&Self::FOOTER).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::simulation::test_context;

    async fn signed_in() -> (std::sync::Arc<dyn crate::driver::PageDriver>, HeaderBar) {
        let (page, ui) = test_context().await;
        let login = LoginPage::new(ui.clone());
        login.open().await.unwrap();
        login.login("standard_user", "secret_sauce").await.unwrap();
        let _ = ui.wait_for_url("inventory.html").await.unwrap();
        (page, HeaderBar::new(ui))
    }

    #[tokio::test]
    async fn test_empty_cart_has_no_badge() {
        let (_page, header) = signed_in().await;
        assert_eq!(header.cart_badge_count().await.unwrap(), 0);
        assert!(header.is_logo_visible().await.unwrap());
        assert_eq!(header.title().await.unwrap(), "Products");
    }

    #[tokio::test]
    async fn test_menu_open_and_close() {
        let (_page, header) = signed_in().await;
        header.open_menu().await.unwrap();
        header.close_menu().await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let (_page, header) = signed_in().await;
        header.logout().await.unwrap();
    }
}
