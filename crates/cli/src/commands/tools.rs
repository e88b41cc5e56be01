//! `cartwright tools` and `cartwright call`.

use cartwright_agent::Session;
use cartwright_core::tool::ToolCall;
use cartwright_tools::shop_registry;

use super::{load_config, resolve_user};

pub fn list(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let definitions = shop_registry().definitions();
    if json {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }
    for def in &definitions {
        println!("  {:<20} {}", def.name, def.description);
    }
    Ok(())
}

pub async fn call(
    name: &str,
    input: &str,
    user: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let input: serde_json::Value =
        serde_json::from_str(input).map_err(|e| format!("--input is not valid JSON: {e}"))?;

    let store = cartwright_store::open_from_config(&config.store);
    let mut session = Session::builder(resolve_user(&config, user), store)
        .with_config(&config)
        .start()
        .await;

    let call = ToolCall {
        id: format!("cli_{}", uuid::Uuid::new_v4().simple()),
        name: name.to_string(),
        input,
    };
    let result = session.dispatch(&call).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    let summary = session.summary().await;
    tracing::debug!(summary = %serde_json::to_string(&summary)?, "Session ended");
    Ok(())
}
