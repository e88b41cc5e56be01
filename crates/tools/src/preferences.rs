//! `update_preferences` and `get_preferences`.

use cartwright_core::error::ToolError;
use cartwright_core::session::PREFERENCES;
use cartwright_core::shop::{Preferences, PreferencesUpdate};
use cartwright_core::tool::ToolContext;
use serde::Serialize;

use crate::outcome::{ShopError, store_failure, to_output};

pub(crate) const UPDATE_NAME: &str = "update_preferences";
pub(crate) const UPDATE_DESCRIPTION: &str = "Updates user preferences";
pub(crate) const GET_NAME: &str = "get_preferences";
pub(crate) const GET_DESCRIPTION: &str = "Gets user preferences";

pub(crate) fn update_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "paymentMethod": {
                "type": "string",
                "description": "Preferred payment method, e.g. \"visa\" or \"paypal\""
            },
            "currency": {
                "type": "string",
                "minLength": 1,
                "description": "ISO currency code, e.g. \"USD\""
            }
        }
    })
}

pub(crate) fn get_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {}
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreferencesOutcome {
    success: bool,
    preferences: Option<Preferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

#[derive(Serialize)]
struct PreferencesView {
    preferences: Preferences,
}

/// Merge the update onto the stored preferences, persist, and mirror the
/// merged value into the session.
pub(crate) async fn update(
    input: PreferencesUpdate,
    ctx: &mut ToolContext<'_>,
) -> Result<serde_json::Value, ToolError> {
    let Some(user_id) = ctx.state.user_id().map(str::to_string) else {
        let error = ShopError::UserNotFound;
        return to_output(
            UPDATE_NAME,
            PreferencesOutcome {
                success: false,
                preferences: None,
                message: Some(error.to_string()),
                error: Some(error.code()),
            },
        );
    };

    let mut preferences = ctx.store.preferences(&user_id).await;
    preferences.merge(input);
    ctx.store
        .save_preferences(&user_id, preferences.clone())
        .await
        .map_err(store_failure(UPDATE_NAME))?;
    ctx.state.set(PREFERENCES, &preferences);

    to_output(
        UPDATE_NAME,
        PreferencesOutcome {
            success: true,
            preferences: Some(preferences),
            message: None,
            error: None,
        },
    )
}

/// Always reads the store, never the session copy.
pub(crate) async fn get(ctx: &mut ToolContext<'_>) -> Result<serde_json::Value, ToolError> {
    let preferences = match ctx.state.user_id() {
        Some(user_id) => ctx.store.preferences(user_id).await,
        None => Preferences::default(),
    };
    to_output(GET_NAME, PreferencesView { preferences })
}
