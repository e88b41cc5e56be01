//! In-memory store - useful for testing and ephemeral sessions.

use async_trait::async_trait;
use cartwright_core::error::StoreError;
use cartwright_core::message::Message;
use cartwright_core::shop::{CartItem, Preferences};
use cartwright_core::store::{StateStore, StoreSnapshot};
use tokio::sync::RwLock;

/// A store that keeps the snapshot in memory only.
/// Writes cannot fail; nothing survives the process.
#[derive(Default)]
pub struct InMemoryStore {
    snapshot: RwLock<StoreSnapshot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }
}

#[async_trait]
impl StateStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn snapshot(&self) -> StoreSnapshot {
        self.snapshot.read().await.clone()
    }

    async fn cart(&self, user_id: &str) -> Vec<CartItem> {
        self.snapshot.read().await.cart(user_id)
    }

    async fn set_cart(&self, user_id: &str, cart: Vec<CartItem>) -> Result<(), StoreError> {
        self.snapshot.write().await.set_cart(user_id, cart);
        Ok(())
    }

    async fn messages(&self, user_id: &str) -> Vec<Message> {
        self.snapshot.read().await.messages(user_id)
    }

    async fn append_message(&self, user_id: &str, message: &Message) -> Result<bool, StoreError> {
        Ok(self.snapshot.write().await.append_message(user_id, message))
    }

    async fn preferences(&self, user_id: &str) -> Preferences {
        self.snapshot.read().await.preferences(user_id)
    }

    async fn save_preferences(
        &self,
        user_id: &str,
        preferences: Preferences,
    ) -> Result<(), StoreError> {
        self.snapshot
            .write()
            .await
            .save_preferences(user_id, preferences);
        Ok(())
    }
}
