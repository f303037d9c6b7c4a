//! State machine of the Sauce Demo storefront.

use super::dom::{Action, Node};
use crate::config::{UserRole, DEFAULT_PASSWORD};
use crate::locator::slugify;
use crate::pages::SortCriterion;
use crate::price::Price;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub(crate) const BLANK: &str = "about:blank";
pub(crate) const LOGIN_PATH: &str = "/";
pub(crate) const INVENTORY_PATH: &str = "/inventory.html";
pub(crate) const CART_PATH: &str = "/cart.html";
pub(crate) const INFORMATION_PATH: &str = "/checkout-step-one.html";
pub(crate) const OVERVIEW_PATH: &str = "/checkout-step-two.html";
pub(crate) const COMPLETE_PATH: &str = "/checkout-complete.html";

const PROTECTED: [&str; 5] = [
    INVENTORY_PATH,
    CART_PATH,
    INFORMATION_PATH,
    OVERVIEW_PATH,
    COMPLETE_PATH,
];

const TAX_PERCENT: u32 = 8;

/// One catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Display name
    pub name: &'static str,
    /// Description text
    pub description: &'static str,
    /// Unit price
    pub price: Price,
}

/// Products offered by the storefront, in default (A to Z) order
pub const CATALOG: [Product; 6] = [
    Product {
        name: "Sauce Labs Backpack",
        description: "carry.allTheThings() with the sleek, streamlined Sly Pack that melds uncompromising style with unequaled laptop and tablet protection.",
        price: Price::from_cents(2999),
    },
    Product {
        name: "Sauce Labs Bike Light",
        description: "A red light isn't the desired state in testing but it sure helps when riding your bike at night. Water-resistant with 3 lighting modes, 1 AAA battery included.",
        price: Price::from_cents(999),
    },
    Product {
        name: "Sauce Labs Bolt T-Shirt",
        description: "Get your testing superhero on with the Sauce Labs bolt T-shirt. From American Apparel, 100% ringspun combed cotton, heather gray with red bolt.",
        price: Price::from_cents(1599),
    },
    Product {
        name: "Sauce Labs Fleece Jacket",
        description: "It's not every day that you come across a midweight quarter-zip fleece jacket capable of handling everything from a relaxing day outdoors to a busy day at the office.",
        price: Price::from_cents(4999),
    },
    Product {
        name: "Sauce Labs Onesie",
        description: "Rib snap infant onesie for the junior automation engineer in development. Reinforced 3-snap bottom closure, two-needle hemmed sleeved and bottom won't unravel.",
        price: Price::from_cents(799),
    },
    Product {
        name: "Test.allTheThings() T-Shirt (Red)",
        description: "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard to automate a few tests. Super-soft and comfy ringspun combed cotton.",
        price: Price::from_cents(1599),
    },
];

#[derive(Debug)]
pub(crate) struct Storefront {
    path: String,
    user: Option<String>,
    cart: Vec<usize>,
    sort: SortCriterion,
    inputs: BTreeMap<&'static str, String>,
    error: Option<String>,
    menu_open: bool,
    history: Vec<String>,
    ready_at: Option<Instant>,
    performance_delay: Duration,
}

impl Storefront {
    pub fn new(performance_delay: Duration) -> Self {
        Self {
            path: BLANK.to_string(),
            user: None,
            cart: Vec::new(),
            sort: SortCriterion::NameAscending,
            inputs: BTreeMap::new(),
            error: None,
            menu_open: false,
            history: Vec::new(),
            ready_at: None,
            performance_delay,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &'static str {
        if self.path == BLANK {
            ""
        } else {
            "Swag Labs"
        }
    }

    fn is(&self, role: UserRole) -> bool {
        self.user.as_deref() == Some(role.default_username())
    }

    fn go(&mut self, path: &str) {
        let previous = std::mem::replace(&mut self.path, path.to_string());
        self.history.push(previous);
        self.menu_open = false;
        self.error = None;
        self.inputs.clear();
    }

    /// Navigation by URL; protected views bounce to the login form
    pub fn open(&mut self, path: &str) {
        let path = if path.is_empty() { LOGIN_PATH } else { path };
        if PROTECTED.contains(&path) && self.user.is_none() {
            self.go(LOGIN_PATH);
            self.error = Some(format!(
                "Epic sadface: You can only access '{path}' when you are logged in."
            ));
        } else {
            self.go(path);
        }
    }

    pub fn back(&mut self) {
        if let Some(previous) = self.history.pop() {
            self.path = previous;
            self.menu_open = false;
            self.error = None;
            self.inputs.clear();
        }
    }

    pub fn reload(&mut self) {
        self.menu_open = false;
        self.error = None;
        self.inputs.clear();
    }

    fn subtotal(&self) -> Price {
        self.cart.iter().map(|i| CATALOG[*i].price).sum()
    }

    fn display_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..CATALOG.len()).collect();
        match self.sort {
            SortCriterion::NameAscending => {
                order.sort_by(|a, b| CATALOG[*a].name.cmp(CATALOG[*b].name));
            }
            SortCriterion::NameDescending => {
                order.sort_by(|a, b| CATALOG[*b].name.cmp(CATALOG[*a].name));
            }
            SortCriterion::PriceAscending => order.sort_by(|a, b| {
                CATALOG[*a]
                    .price
                    .cmp(&CATALOG[*b].price)
                    .then(CATALOG[*a].name.cmp(CATALOG[*b].name))
            }),
            SortCriterion::PriceDescending => order.sort_by(|a, b| {
                CATALOG[*b]
                    .price
                    .cmp(&CATALOG[*a].price)
                    .then(CATALOG[*a].name.cmp(CATALOG[*b].name))
            }),
        }
        order
    }

    // ------------------------------------------------------------------
    // Interactions
    // ------------------------------------------------------------------

    pub fn activate(&mut self, action: Action, now: Instant) -> Result<(), String> {
        match action {
            Action::Login => self.login(now),
            Action::DismissError => self.error = None,
            Action::AddToCart(i) => {
                if !self.cart.contains(&i) {
                    self.cart.push(i);
                }
            }
            Action::RemoveFromCart(i) => self.cart.retain(|c| *c != i),
            Action::OpenCart => self.go(CART_PATH),
            Action::OpenMenu => self.menu_open = true,
            Action::CloseMenu => self.menu_open = false,
            Action::Logout => {
                self.user = None;
                self.ready_at = None;
                self.go(LOGIN_PATH);
            }
            Action::ResetState => {
                self.cart.clear();
                self.sort = SortCriterion::NameAscending;
            }
            Action::AllItems | Action::ContinueShopping | Action::CancelOverview | Action::BackHome => {
                self.go(INVENTORY_PATH);
            }
            Action::Checkout => self.go(INFORMATION_PATH),
            Action::ContinueCheckout => self.continue_checkout(),
            Action::CancelInformation => self.go(CART_PATH),
            Action::Finish => {
                if !self.is(UserRole::Error) {
                    self.cart.clear();
                    self.go(COMPLETE_PATH);
                }
            }
            Action::Input(_) | Action::Sort | Action::None => {}
        }
        Ok(())
    }

    pub fn fill(&mut self, action: Action, text: &str) -> Result<(), String> {
        let Action::Input(field) = action else {
            return Err("element is not an editable field".to_string());
        };
        let field = if field == "lastName" && self.is(UserRole::Problem) {
            "firstName"
        } else {
            field
        };
        let _ = self.inputs.insert(field, text.to_string());
        Ok(())
    }

    pub fn select(&mut self, action: Action, value: &str) -> Result<(), String> {
        if action != Action::Sort {
            return Err("element is not a <select>".to_string());
        }
        let criterion = SortCriterion::from_option_value(value)
            .ok_or_else(|| format!("no <option> with value '{value}'"))?;
        if !self.is(UserRole::Problem) {
            self.sort = criterion;
        }
        Ok(())
    }

    pub fn press(&mut self, action: Action, key: &str, now: Instant) -> Result<(), String> {
        if key != "Enter" {
            return Ok(());
        }
        match action {
            Action::Input("username" | "password") | Action::Login => self.login(now),
            Action::Input(_) | Action::ContinueCheckout => self.continue_checkout(),
            other => self.activate(other, now)?,
        }
        Ok(())
    }

    fn input(&self, field: &str) -> &str {
        self.inputs.get(field).map_or("", String::as_str)
    }

    fn login(&mut self, now: Instant) {
        let username = self.input("username").to_string();
        let password = self.input("password").to_string();
        let known = UserRole::ALL
            .iter()
            .any(|role| role.default_username() == username);

        let error = if username.is_empty() {
            Some("Epic sadface: Username is required")
        } else if password.is_empty() {
            Some("Epic sadface: Password is required")
        } else if !known || password != DEFAULT_PASSWORD {
            Some("Epic sadface: Username and password do not match any user in this service")
        } else if username == UserRole::Locked.default_username() {
            Some("Epic sadface: Sorry, this user has been locked out.")
        } else {
            None
        };

        match error {
            Some(message) => self.error = Some(message.to_string()),
            None => {
                self.user = Some(username);
                self.ready_at = self
                    .is(UserRole::Performance)
                    .then(|| now + self.performance_delay);
                self.go(INVENTORY_PATH);
            }
        }
    }

    fn continue_checkout(&mut self) {
        let missing = [
            ("firstName", "First Name"),
            ("lastName", "Last Name"),
            ("postalCode", "Postal Code"),
        ]
        .into_iter()
        .find(|(field, _)| self.input(field).is_empty());
        match missing {
            Some((_, label)) => self.error = Some(format!("Error: {label} is required")),
            None => self.go(OVERVIEW_PATH),
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    pub fn render(&self, now: Instant) -> Vec<Node> {
        match self.path.as_str() {
            BLANK => Vec::new(),
            LOGIN_PATH => self.render_login(),
            INVENTORY_PATH => self.render_inventory(now),
            CART_PATH => self.render_cart(),
            INFORMATION_PATH => self.render_information(),
            OVERVIEW_PATH => self.render_overview(),
            COMPLETE_PATH => self.render_complete(),
            _ => vec![Node::new("h1").class("error_404").text("404 Not Found")],
        }
    }

    fn error_nodes(&self, nodes: &mut Vec<Node>) {
        if let Some(message) = &self.error {
            nodes.push(Node::new("h3").test_id("error").text(message.clone()));
            nodes.push(
                Node::new("button")
                    .class("error-button")
                    .test_id("error-button")
                    .action(Action::DismissError),
            );
        }
    }

    fn render_login(&self) -> Vec<Node> {
        let usernames: Vec<&str> = UserRole::ALL.iter().map(|r| r.default_username()).collect();
        let mut nodes = vec![
            Node::new("div").class("login_logo").text("Swag Labs"),
            Node::new("input")
                .id("user-name")
                .class("input_error")
                .test_id("username")
                .attr("placeholder", "Username")
                .value(self.input("username"))
                .action(Action::Input("username")),
            Node::new("input")
                .id("password")
                .class("input_error")
                .test_id("password")
                .attr("placeholder", "Password")
                .attr("type", "password")
                .value(self.input("password"))
                .action(Action::Input("password")),
            Node::new("input")
                .id("login-button")
                .class("submit-button")
                .test_id("login-button")
                .attr("type", "submit")
                .value("Login")
                .text("Login")
                .action(Action::Login),
        ];
        self.error_nodes(&mut nodes);
        nodes.push(
            Node::new("div")
                .id("login_credentials")
                .class("login_credentials")
                .test_id("login-credentials")
                .text(format!("Accepted usernames are:\n{}", usernames.join("\n"))),
        );
        nodes.push(
            Node::new("div")
                .class("login_password")
                .test_id("login-password")
                .text(format!("Password for all users:\n{DEFAULT_PASSWORD}")),
        );
        nodes
    }

    fn header(&self, title: &'static str) -> Vec<Node> {
        let mut nodes = vec![
            Node::new("div").class("app_logo").text("Swag Labs"),
            Node::new("button")
                .id("react-burger-menu-btn")
                .text("Open Menu")
                .action(Action::OpenMenu),
            Node::new("a")
                .id("inventory_sidebar_link")
                .class("bm-item")
                .test_id("inventory-sidebar-link")
                .text("All Items")
                .visible(self.menu_open)
                .action(Action::AllItems),
            Node::new("a")
                .id("logout_sidebar_link")
                .class("bm-item")
                .test_id("logout-sidebar-link")
                .text("Logout")
                .visible(self.menu_open)
                .action(Action::Logout),
            Node::new("a")
                .id("reset_sidebar_app_state_link")
                .class("bm-item")
                .test_id("reset-sidebar-link")
                .text("Reset App State")
                .visible(self.menu_open)
                .action(Action::ResetState),
            Node::new("button")
                .id("react-burger-cross-btn")
                .text("Close Menu")
                .visible(self.menu_open)
                .action(Action::CloseMenu),
            Node::new("a")
                .class("shopping_cart_link")
                .test_id("shopping-cart-link")
                .action(Action::OpenCart),
        ];
        if !self.cart.is_empty() {
            nodes.push(
                Node::new("span")
                    .class("shopping_cart_badge")
                    .test_id("shopping-cart-badge")
                    .text(self.cart.len().to_string()),
            );
        }
        nodes.push(Node::new("span").class("title").test_id("title").text(title));
        nodes
    }

    fn footer(nodes: &mut Vec<Node>) {
        nodes.push(Node::new("footer").class("footer").test_id("footer").text(
            "\u{a9} 2026 Sauce Labs. All Rights Reserved. Terms of Service | Privacy Policy",
        ));
    }

    fn item_nodes(nodes: &mut Vec<Node>, index: usize) {
        let product = &CATALOG[index];
        nodes.push(
            Node::new("div")
                .class("inventory_item_name")
                .test_id("inventory-item-name")
                .text(product.name),
        );
        nodes.push(
            Node::new("div")
                .class("inventory_item_desc")
                .test_id("inventory-item-desc")
                .text(product.description),
        );
        nodes.push(
            Node::new("div")
                .class("inventory_item_price")
                .test_id("inventory-item-price")
                .text(product.price.to_string()),
        );
    }

    fn render_inventory(&self, now: Instant) -> Vec<Node> {
        let mut nodes = self.header("Products");
        if self.ready_at.is_some_and(|ready| now < ready) {
            return nodes;
        }
        nodes.push(
            Node::new("div")
                .id("inventory_container")
                .class("inventory_container"),
        );
        nodes.push(
            Node::new("select")
                .class("product_sort_container")
                .test_id("product-sort-container")
                .value(self.sort.option_value())
                .action(Action::Sort),
        );
        nodes.push(
            Node::new("span")
                .class("active_option")
                .test_id("active-option")
                .text(self.sort.label()),
        );
        nodes.push(Node::new("div").class("inventory_list").test_id("inventory-list"));
        let problem = self.is(UserRole::Problem);
        for index in self.display_order() {
            let product = &CATALOG[index];
            nodes.push(Node::new("div").class("inventory_item").test_id("inventory-item"));
            nodes.push(
                Node::new("img")
                    .class("inventory_item_img")
                    .attr("alt", product.name),
            );
            Self::item_nodes(&mut nodes, index);
            let slug = slugify(product.name);
            let button = if self.cart.contains(&index) {
                Node::new("button")
                    .class("btn")
                    .class("btn_inventory")
                    .test_id(format!("remove-{slug}"))
                    .text("Remove")
                    .enabled(!problem)
                    .action(Action::RemoveFromCart(index))
            } else {
                Node::new("button")
                    .class("btn")
                    .class("btn_inventory")
                    .test_id(format!("add-to-cart-{slug}"))
                    .text("Add to cart")
                    .action(Action::AddToCart(index))
            };
            nodes.push(button);
        }
        Self::footer(&mut nodes);
        nodes
    }

    fn cart_rows(&self, nodes: &mut Vec<Node>, removable: bool) {
        for index in &self.cart {
            nodes.push(Node::new("div").class("cart_item").test_id("inventory-item"));
            nodes.push(
                Node::new("div")
                    .class("cart_quantity")
                    .test_id("item-quantity")
                    .text("1"),
            );
            Self::item_nodes(nodes, *index);
            if removable {
                nodes.push(
                    Node::new("button")
                        .class("btn")
                        .class("cart_button")
                        .test_id(format!("remove-{}", slugify(CATALOG[*index].name)))
                        .text("Remove")
                        .action(Action::RemoveFromCart(*index)),
                );
            }
        }
    }

    fn render_cart(&self) -> Vec<Node> {
        let mut nodes = self.header("Your Cart");
        nodes.push(Node::new("div").class("cart_list").test_id("cart-list"));
        self.cart_rows(&mut nodes, true);
        nodes.push(
            Node::new("button")
                .id("continue-shopping")
                .test_id("continue-shopping")
                .text("Continue Shopping")
                .action(Action::ContinueShopping),
        );
        nodes.push(
            Node::new("button")
                .id("checkout")
                .test_id("checkout")
                .text("Checkout")
                .action(Action::Checkout),
        );
        Self::footer(&mut nodes);
        nodes
    }

    fn render_information(&self) -> Vec<Node> {
        let mut nodes = self.header("Checkout: Your Information");
        for (id, field, placeholder) in [
            ("first-name", "firstName", "First Name"),
            ("last-name", "lastName", "Last Name"),
            ("postal-code", "postalCode", "Zip/Postal Code"),
        ] {
            nodes.push(
                Node::new("input")
                    .id(id)
                    .test_id(field)
                    .attr("placeholder", placeholder)
                    .value(self.input(field))
                    .action(Action::Input(field)),
            );
        }
        self.error_nodes(&mut nodes);
        nodes.push(
            Node::new("button")
                .id("cancel")
                .test_id("cancel")
                .text("Cancel")
                .action(Action::CancelInformation),
        );
        nodes.push(
            Node::new("input")
                .id("continue")
                .class("submit-button")
                .test_id("continue")
                .attr("type", "submit")
                .value("Continue")
                .text("Continue")
                .action(Action::ContinueCheckout),
        );
        Self::footer(&mut nodes);
        nodes
    }

    fn render_overview(&self) -> Vec<Node> {
        let mut nodes = self.header("Checkout: Overview");
        nodes.push(Node::new("div").class("cart_list").test_id("cart-list"));
        self.cart_rows(&mut nodes, false);
        let subtotal = self.subtotal();
        let tax = subtotal.percent(TAX_PERCENT);
        nodes.push(
            Node::new("div")
                .class("summary_value_label")
                .test_id("payment-info-value")
                .text("SauceCard #31337"),
        );
        nodes.push(
            Node::new("div")
                .class("summary_value_label")
                .test_id("shipping-info-value")
                .text("Free Pony Express Delivery!"),
        );
        nodes.push(
            Node::new("div")
                .class("summary_subtotal_label")
                .test_id("subtotal-label")
                .text(format!("Item total: {subtotal}")),
        );
        nodes.push(
            Node::new("div")
                .class("summary_tax_label")
                .test_id("tax-label")
                .text(format!("Tax: {tax}")),
        );
        nodes.push(
            Node::new("div")
                .class("summary_total_label")
                .test_id("total-label")
                .text(format!("Total: {}", subtotal + tax)),
        );
        nodes.push(
            Node::new("button")
                .id("cancel")
                .test_id("cancel")
                .text("Cancel")
                .action(Action::CancelOverview),
        );
        nodes.push(
            Node::new("button")
                .id("finish")
                .test_id("finish")
                .text("Finish")
                .action(Action::Finish),
        );
        Self::footer(&mut nodes);
        nodes
    }

    fn render_complete(&self) -> Vec<Node> {
        let mut nodes = self.header("Checkout: Complete!");
        nodes.push(
            Node::new("img")
                .class("pony_express")
                .test_id("pony-express")
                .attr("alt", "Pony Express"),
        );
        nodes.push(
            Node::new("h2")
                .class("complete-header")
                .test_id("complete-header")
                .text("Thank you for your order!"),
        );
        nodes.push(
            Node::new("div")
                .class("complete-text")
                .test_id("complete-text")
                .text("Your order has been dispatched, and will arrive just as fast as the pony can get there!"),
        );
        nodes.push(
            Node::new("button")
                .id("back-to-products")
                .test_id("back-to-products")
                .text("Back Home")
                .action(Action::BackHome),
        );
        Self::footer(&mut nodes);
        nodes
    }
}
