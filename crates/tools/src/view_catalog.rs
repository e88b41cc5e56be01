//! `view_catalog` — list every product the store sells.

use cartwright_core::error::ToolError;
use cartwright_core::shop::Product;
use cartwright_core::tool::ToolContext;
use serde::Serialize;

use crate::outcome::to_output;

pub(crate) const NAME: &str = "view_catalog";
pub(crate) const DESCRIPTION: &str = "Shows all available products in the catalog";

pub(crate) fn schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {}
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogView<'a> {
    products: &'a [Product],
    total_products: usize,
}

pub(crate) async fn run(ctx: &mut ToolContext<'_>) -> Result<serde_json::Value, ToolError> {
    let products = ctx.catalog.products();
    to_output(
        NAME,
        CatalogView {
            products,
            total_products: products.len(),
        },
    )
}
