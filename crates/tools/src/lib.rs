//! Shopping-assistant tools for Cartwright.
//!
//! The tool set is closed: [`ShopTool`] enumerates every tool, and
//! [`shop_registry`] maps each name to its variant once at startup. Anything
//! the model asks for outside that set is rejected by the registry as an
//! unknown tool.

mod add_to_cart;
pub mod outcome;
mod preferences;
mod remove_from_cart;
mod view_cart;
mod view_catalog;

use async_trait::async_trait;
use cartwright_core::error::{FieldViolation, ToolError};
use cartwright_core::tool::{Tool, ToolContext, ToolRegistry};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub use outcome::{CartOutcome, ShopError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShopTool {
    ViewCatalog,
    AddToCart,
    ViewCart,
    RemoveFromCart,
    UpdatePreferences,
    GetPreferences,
}

impl ShopTool {
    pub const ALL: [ShopTool; 6] = [
        ShopTool::ViewCatalog,
        ShopTool::AddToCart,
        ShopTool::ViewCart,
        ShopTool::RemoveFromCart,
        ShopTool::UpdatePreferences,
        ShopTool::GetPreferences,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShopTool::ViewCatalog => view_catalog::NAME,
            ShopTool::AddToCart => add_to_cart::NAME,
            ShopTool::ViewCart => view_cart::NAME,
            ShopTool::RemoveFromCart => remove_from_cart::NAME,
            ShopTool::UpdatePreferences => preferences::UPDATE_NAME,
            ShopTool::GetPreferences => preferences::GET_NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }
}

impl std::fmt::Display for ShopTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deserialize schema-checked input into the tool's typed form.
fn parse<T: DeserializeOwned>(tool: ShopTool, input: serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::SchemaValidationFailed {
        tool: tool.to_string(),
        violations: vec![FieldViolation {
            field: "<input>".into(),
            reason: e.to_string(),
        }],
    })
}

#[async_trait]
impl Tool for ShopTool {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn description(&self) -> &str {
        match self {
            ShopTool::ViewCatalog => view_catalog::DESCRIPTION,
            ShopTool::AddToCart => add_to_cart::DESCRIPTION,
            ShopTool::ViewCart => view_cart::DESCRIPTION,
            ShopTool::RemoveFromCart => remove_from_cart::DESCRIPTION,
            ShopTool::UpdatePreferences => preferences::UPDATE_DESCRIPTION,
            ShopTool::GetPreferences => preferences::GET_DESCRIPTION,
        }
    }

    fn parameters_schema(&self) -> serde_json::Value {
        match self {
            ShopTool::ViewCatalog => view_catalog::schema(),
            ShopTool::AddToCart => add_to_cart::schema(),
            ShopTool::ViewCart => view_cart::schema(),
            ShopTool::RemoveFromCart => remove_from_cart::schema(),
            ShopTool::UpdatePreferences => preferences::update_schema(),
            ShopTool::GetPreferences => preferences::get_schema(),
        }
    }

    async fn execute(
        &self,
        input: serde_json::Value,
        ctx: &mut ToolContext<'_>,
    ) -> Result<serde_json::Value, ToolError> {
        match self {
            ShopTool::ViewCatalog => view_catalog::run(ctx).await,
            ShopTool::AddToCart => add_to_cart::run(parse(*self, input)?, ctx).await,
            ShopTool::ViewCart => view_cart::run(ctx).await,
            ShopTool::RemoveFromCart => remove_from_cart::run(parse(*self, input)?, ctx).await,
            ShopTool::UpdatePreferences => preferences::update(parse(*self, input)?, ctx).await,
            ShopTool::GetPreferences => preferences::get(ctx).await,
        }
    }
}

/// Create the registry holding every shopping tool.
pub fn shop_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in ShopTool::ALL {
        registry.register(Arc::new(tool));
    }
    registry
}
