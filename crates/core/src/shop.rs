//! Shopping domain values: catalog products, cart lines, and preferences.

use serde::{Deserialize, Serialize};

/// Currency assigned to every user that has not chosen one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// A catalog product. Immutable at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,
    pub stock_count: u32,
}

impl Product {
    fn new(product_id: &str, name: &str, unit_price: f64, stock_count: u32) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            stock_count,
        }
    }
}

/// One line in a user's cart. A cart holds at most one line per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartItem {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            quantity,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Merge `quantity` units of `product` into `cart`: bump the existing line for
/// that product, or append a new one.
pub fn merge_into_cart(cart: &mut Vec<CartItem>, product: &Product, quantity: u32) {
    match cart
        .iter_mut()
        .find(|item| item.product_id == product.product_id)
    {
        Some(item) => item.quantity = item.quantity.saturating_add(quantity),
        None => cart.push(CartItem::from_product(product, quantity)),
    }
}

/// Sum of `unit_price * quantity` over the cart.
pub fn cart_total(cart: &[CartItem]) -> f64 {
    cart.iter().map(CartItem::line_total).sum()
}

/// The product catalog. Process-wide reference data; no tool mutates it.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Look up a product by name, ignoring case. Names are matched exactly
    /// otherwise, the same way `remove_from_cart` matches cart lines.
    pub fn find(&self, name: &str) -> Option<&Product> {
        let needle = name.to_lowercase();
        self.products
            .iter()
            .find(|p| p.name.to_lowercase() == needle)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for Catalog {
    /// The built-in storefront.
    fn default() -> Self {
        Self::new(vec![
            Product::new("prod-1", "Laptop", 999.0, 10),
            Product::new("prod-2", "Mouse", 29.0, 50),
            Product::new("prod-3", "Keyboard", 79.0, 30),
            Product::new("prod-4", "Monitor", 299.0, 15),
            Product::new("prod-5", "Headphones", 149.0, 25),
        ])
    }
}

/// Per-user checkout preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.into()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            payment_method: None,
            currency: default_currency(),
        }
    }
}

impl Preferences {
    /// Field-level merge: fields absent from `update` keep their current value.
    pub fn merge(&mut self, update: PreferencesUpdate) {
        if let Some(payment_method) = update.payment_method {
            self.payment_method = Some(payment_method);
        }
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
    }
}

/// A partial preferences update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    #[serde(default)]
    pub payment_method: Option<String>,

    #[serde(default)]
    pub currency: Option<String>,
}
