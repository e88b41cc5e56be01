//! Domain failures and the result shapes shared by the cart tools.
//!
//! Domain failures are never `Err`: they are part of the tool's normal output
//! so the model can read them and answer the user.

use cartwright_core::error::{StoreError, ToolError};
use cartwright_core::shop::CartItem;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// The session has no user bound.
    UserNotFound,
    /// No catalog product has this name.
    ProductNotFound(String),
}

impl ShopError {
    pub fn code(&self) -> &'static str {
        match self {
            ShopError::UserNotFound => "user_not_found",
            ShopError::ProductNotFound(_) => "product_not_found",
        }
    }
}

impl std::fmt::Display for ShopError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShopError::UserNotFound => write!(f, "User not found"),
            ShopError::ProductNotFound(name) => write!(f, "Product not found: {name}"),
        }
    }
}

/// Result of a tool that changes the cart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartOutcome {
    pub success: bool,
    pub message: String,
    pub cart: Option<Vec<CartItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl CartOutcome {
    pub fn done(message: impl Into<String>, cart: Vec<CartItem>) -> Self {
        Self {
            success: true,
            message: message.into(),
            cart: Some(cart),
            error: None,
        }
    }

    pub fn failed(error: ShopError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            cart: None,
            error: Some(error.code()),
        }
    }
}

/// Serialize a tool's output.
pub(crate) fn to_output(
    tool_name: &str,
    value: impl Serialize,
) -> Result<serde_json::Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::ExecutionFailed {
        tool_name: tool_name.to_string(),
        reason: format!("cannot serialize output: {e}"),
    })
}

pub(crate) fn store_failure(tool_name: &str) -> impl FnOnce(StoreError) -> ToolError + '_ {
    move |source| ToolError::Store {
        tool_name: tool_name.to_string(),
        source,
    }
}
