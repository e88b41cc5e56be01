//! `add_to_cart` — merge a catalog product into the user's cart.

use cartwright_core::error::ToolError;
use cartwright_core::shop::merge_into_cart;
use cartwright_core::tool::ToolContext;
use serde::Deserialize;
use tracing::debug;

use crate::outcome::{CartOutcome, ShopError, store_failure, to_output};

pub(crate) const NAME: &str = "add_to_cart";
pub(crate) const DESCRIPTION: &str = "Adds an item to the shopping cart";

pub(crate) fn schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "productName": {
                "type": "string",
                "minLength": 1,
                "description": "Name of the product, as listed in the catalog"
            },
            "quantity": {
                "type": "integer",
                "minimum": 1,
                "maximum": u32::MAX,
                "default": 1,
                "description": "How many units to add (default: 1)"
            }
        },
        "required": ["productName"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Input {
    product_name: String,
    #[serde(default = "one")]
    quantity: u32,
}

fn one() -> u32 {
    1
}

pub(crate) async fn run(
    input: Input,
    ctx: &mut ToolContext<'_>,
) -> Result<serde_json::Value, ToolError> {
    let Some(user_id) = ctx.state.user_id().map(str::to_string) else {
        return to_output(NAME, CartOutcome::failed(ShopError::UserNotFound));
    };
    let Some(product) = ctx.catalog.find(&input.product_name) else {
        return to_output(
            NAME,
            CartOutcome::failed(ShopError::ProductNotFound(input.product_name)),
        );
    };

    let mut cart = ctx.store.cart(&user_id).await;
    merge_into_cart(&mut cart, product, input.quantity);
    ctx.store
        .set_cart(&user_id, cart.clone())
        .await
        .map_err(store_failure(NAME))?;

    debug!(user_id = %user_id, product = %product.product_id, quantity = input.quantity, "Cart updated");
    to_output(
        NAME,
        CartOutcome::done(format!("Added {}x {}", input.quantity, product.name), cart),
    )
}
