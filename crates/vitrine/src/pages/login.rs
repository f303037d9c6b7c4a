//! Login form.

use crate::interaction::Interactions;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::VitrineResult;

/// The login form at `/`
#[derive(Debug, Clone)]
pub struct LoginPage {
    ui: Interactions,
}

impl LoginPage {
    pub const USERNAME: Locator = Locator::test_id("username field", "username");
    pub const PASSWORD: Locator = Locator::test_id("password field", "password");
    pub const LOGIN_BUTTON: Locator = Locator::test_id("login button", "login-button");
    pub const ERROR: Locator = Locator::test_id("error banner", "error");
    pub const ERROR_BUTTON: Locator = Locator::css("error close button", ".error-button");
    pub const LOGO: Locator = Locator::css("login logo", ".login_logo");
    pub const CREDENTIALS: Locator = Locator::css("accepted usernames", "#login_credentials");
    pub const PASSWORD_HINT: Locator = Locator::css("password hint", ".login_password");

    /// Path of the form
    pub const PATH: &'static str = "/";

    #[must_use]
    pub const fn new(ui: Interactions) -> Self {
        Self { ui }
    }

    /// Locators this page touches
    #[must_use]
    pub fn registry() -> Vec<Locator> {
        vec![
            Self::USERNAME,
            Self::PASSWORD,
            Self::LOGIN_BUTTON,
            Self::ERROR,
            Self::ERROR_BUTTON,
            Self::LOGO,
            Self::CREDENTIALS,
            Self::PASSWORD_HINT,
        ]
    }

    /// Navigate to the form and wait for it
    pub async fn open(&self) -> VitrineResult<()> {
        self.ui.open(Self::PATH).await?;
        self.wait_until_loaded().await
    }

    /// Fill both fields and submit. The outcome is read from the page
    /// afterwards (URL, error banner).
    pub async fn login(&self, username: &str, password: &str) -> VitrineResult<()> {
        tracing::debug!(username, "login");
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.submit().await
    }

    pub async fn enter_username(&self, username: &str) -> VitrineResult<()> {
        self.ui.fill(&Self::USERNAME, username).await
    }

    pub async fn enter_password(&self, password: &str) -> VitrineResult<()> {
        self.ui.fill(&Self::PASSWORD, password).await
    }

    pub async fn submit(&self) -> VitrineResult<()> {
        self.ui.click(&Self::LOGIN_BUTTON).await
    }

    /// Submit by pressing Enter in the password field
    pub async fn submit_with_enter(&self) -> VitrineResult<()> {
        self.ui.press_key(&Self::PASSWORD, "Enter").await
    }

    /// Error banner text, `None` when no banner is shown
    pub async fn error_message(&self) -> VitrineResult<Option<String>> {
        if self.ui.is_visible(&Self::ERROR).await? {
            Ok(Some(self.ui.read_text(&Self::ERROR).await?))
        } else {
            Ok(None)
        }
    }

    pub async fn is_error_displayed(&self) -> VitrineResult<bool> {
        self.ui.is_visible(&Self::ERROR).await
    }

    pub async fn dismiss_error(&self) -> VitrineResult<()> {
        self.ui.click(&Self::ERROR_BUTTON).await
    }

    /// Usernames listed under the form
    pub async fn accepted_usernames(&self) -> VitrineResult<Vec<String>> {
        let text = self.ui.read_text(&Self::CREDENTIALS).await?;
        Ok(text
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Shared password shown under the form
    pub async fn password_hint(&self) -> VitrineResult<String> {
        let text = self.ui.read_text(&Self::PASSWORD_HINT).await?;
        Ok(text.lines().last().unwrap_or_default().trim().to_string())
    }

    pub async fn logo_text(&self) -> VitrineResult<String> {
        self.ui.read_text(&Self::LOGO).await
    }

    pub async fn username_placeholder(&self) -> VitrineResult<Option<String>> {
        self.ui.attribute(&Self::USERNAME, "placeholder").await
    }

    pub async fn password_placeholder(&self) -> VitrineResult<Option<String>> {
        self.ui.attribute(&Self::PASSWORD, "placeholder").await
    }

    /// Current contents of the username field
    pub async fn username_value(&self) -> VitrineResult<String> {
        self.ui.input_value(&Self::USERNAME).await
    }

    /// Current contents of the password field
    pub async fn password_value(&self) -> VitrineResult<String> {
        self.ui.input_value(&Self::PASSWORD).await
    }
}

impl PageObject for LoginPage {
    fn page_name(&self) -> &'static str {
        "login"
    }

    fn url_pattern(&self) -> &'static str {
        Self::PATH
    }

    fn ready_locator(&self) -> Locator {
        Self::LOGIN_BUTTON
    }

    fn interactions(&self) -> &Interactions {
        &self.ui
    }
}
