//! `remove_from_cart` — drop every line whose product name matches.

use cartwright_core::error::ToolError;
use cartwright_core::tool::ToolContext;
use serde::Deserialize;

use crate::outcome::{CartOutcome, ShopError, store_failure, to_output};

pub(crate) const NAME: &str = "remove_from_cart";
pub(crate) const DESCRIPTION: &str = "Removes an item from cart";

pub(crate) fn schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "productName": {
                "type": "string",
                "description": "Name of the product to remove"
            }
        },
        "required": ["productName"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Input {
    product_name: String,
}

/// Succeeds even when nothing matched; the cart is then written back unchanged.
pub(crate) async fn run(
    input: Input,
    ctx: &mut ToolContext<'_>,
) -> Result<serde_json::Value, ToolError> {
    let Some(user_id) = ctx.state.user_id().map(str::to_string) else {
        return to_output(NAME, CartOutcome::failed(ShopError::UserNotFound));
    };

    let needle = input.product_name.to_lowercase();
    let mut cart = ctx.store.cart(&user_id).await;
    cart.retain(|item| item.name.to_lowercase() != needle);
    ctx.store
        .set_cart(&user_id, cart.clone())
        .await
        .map_err(store_failure(NAME))?;

    to_output(
        NAME,
        CartOutcome::done(format!("Removed {}", input.product_name), cart),
    )
}
