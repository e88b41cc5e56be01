//! `cartwright show` and `cartwright history` - read-only views of the store.

use super::{load_config, resolve_user};

pub async fn show(user: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let user_id = resolve_user(&config, user);
    let store = cartwright_store::open_from_config(&config.store);

    let record = store.user_record(&user_id).await;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub async fn history(user: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let user_id = resolve_user(&config, user);
    let store = cartwright_store::open_from_config(&config.store);

    let messages = store.messages(&user_id).await;
    if messages.is_empty() {
        println!("No messages stored for {user_id}.");
        return Ok(());
    }
    for message in &messages {
        println!("[{}] {}", message.role, message.text());
    }
    Ok(())
}
