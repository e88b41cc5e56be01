//! `view_cart` — the user's cart with its total.

use cartwright_core::error::ToolError;
use cartwright_core::shop::{CartItem, cart_total};
use cartwright_core::tool::ToolContext;
use serde::Serialize;

use crate::outcome::to_output;

pub(crate) const NAME: &str = "view_cart";
pub(crate) const DESCRIPTION: &str = "Shows items in cart";

pub(crate) fn schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {}
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartView {
    cart: Vec<CartItem>,
    total: f64,
    item_count: usize,
}

pub(crate) async fn run(ctx: &mut ToolContext<'_>) -> Result<serde_json::Value, ToolError> {
    // No user simply means nothing in the cart.
    let cart = match ctx.state.user_id() {
        Some(user_id) => ctx.store.cart(user_id).await,
        None => Vec::new(),
    };
    to_output(
        NAME,
        CartView {
            total: cart_total(&cart),
            item_count: cart.len(),
            cart,
        },
    )
}
