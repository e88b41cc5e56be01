//! Persistent store trait — durable per-user carts, transcripts and preferences.
//!
//! The whole durable state is one [`StoreSnapshot`]. Backends keep it in
//! memory, apply every mutation to a copy, persist the copy in full, and only
//! then make it current. Reads never fail: unknown users read as empty.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::message::Message;
use crate::shop::{CartItem, Preferences};

/// The full durable state for all users.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub carts: BTreeMap<String, Vec<CartItem>>,

    #[serde(default)]
    pub messages: BTreeMap<String, Vec<Message>>,

    #[serde(default)]
    pub preferences: BTreeMap<String, Preferences>,
}

/// Everything the store knows about one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub cart: Vec<CartItem>,
    pub messages: Vec<Message>,
    pub preferences: Preferences,
}

impl StoreSnapshot {
    pub fn cart(&self, user_id: &str) -> Vec<CartItem> {
        self.carts.get(user_id).cloned().unwrap_or_default()
    }

    pub fn set_cart(&mut self, user_id: &str, cart: Vec<CartItem>) {
        self.carts.insert(user_id.to_string(), cart);
    }

    pub fn messages(&self, user_id: &str) -> Vec<Message> {
        self.messages.get(user_id).cloned().unwrap_or_default()
    }

    /// Append the text-only form of `message`. Returns `false` (and changes
    /// nothing) when the message has no text to keep.
    pub fn append_message(&mut self, user_id: &str, message: &Message) -> bool {
        let Some(stored) = message.text_only() else {
            return false;
        };
        self.messages
            .entry(user_id.to_string())
            .or_default()
            .push(stored);
        true
    }

    pub fn preferences(&self, user_id: &str) -> Preferences {
        self.preferences.get(user_id).cloned().unwrap_or_default()
    }

    pub fn save_preferences(&mut self, user_id: &str, preferences: Preferences) {
        self.preferences.insert(user_id.to_string(), preferences);
    }

    /// The user's record; unknown users get the empty default record.
    pub fn user_record(&self, user_id: &str) -> UserRecord {
        UserRecord {
            cart: self.cart(user_id),
            messages: self.messages(user_id),
            preferences: self.preferences(user_id),
        }
    }

    /// Every user id that appears in any of the three maps.
    pub fn user_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .carts
            .keys()
            .chain(self.messages.keys())
            .chain(self.preferences.keys())
            .cloned()
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// The core StateStore trait.
///
/// Implementations: JSON file (durable), in-memory (tests, ephemeral runs).
/// Every mutating call persists before returning.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// The backend name (e.g., "file", "memory").
    fn name(&self) -> &str;

    /// A copy of the entire current state.
    async fn snapshot(&self) -> StoreSnapshot;

    async fn cart(&self, user_id: &str) -> Vec<CartItem>;

    /// Replace the user's cart wholesale.
    async fn set_cart(&self, user_id: &str, cart: Vec<CartItem>) -> Result<(), StoreError>;

    async fn messages(&self, user_id: &str) -> Vec<Message>;

    /// Append the text-only form of `message`. `Ok(false)` means the message
    /// carried no text and was dropped without touching storage.
    async fn append_message(&self, user_id: &str, message: &Message) -> Result<bool, StoreError>;

    async fn preferences(&self, user_id: &str) -> Preferences;

    /// Replace the user's preferences wholesale.
    async fn save_preferences(
        &self,
        user_id: &str,
        preferences: Preferences,
    ) -> Result<(), StoreError>;

    async fn user_record(&self, user_id: &str) -> UserRecord {
        self.snapshot().await.user_record(user_id)
    }
}
