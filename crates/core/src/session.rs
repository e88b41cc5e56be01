//! Per-conversation key/value state.
//!
//! `SessionState` is seeded from the store when a conversation starts and is
//! the working copy for that conversation. It is never written to the store
//! directly: durability happens through tools and hooks.

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use crate::shop::Preferences;

/// Key holding the conversation's user identifier.
pub const USER_ID: &str = "userId";
/// Key holding the session's view of the user's preferences.
pub const PREFERENCES: &str = "preferences";
/// Key holding the RFC 3339 timestamp of session creation.
pub const SESSION_STARTED: &str = "sessionStarted";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    values: BTreeMap<String, serde_json::Value>,
}

impl SessionState {
    /// An empty state with no user bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// A state bound to `user_id`, carrying the stored preferences and a fresh
    /// session-start timestamp.
    pub fn seeded(user_id: &str, preferences: &Preferences) -> Self {
        let mut state = Self::new();
        state.values.insert(USER_ID.into(), user_id.into());
        state.set(PREFERENCES, preferences);
        state
            .values
            .insert(SESSION_STARTED.into(), Utc::now().to_rfc3339().into());
        state
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Typed read. `None` if the key is absent or holds a different shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Store any serializable value under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.values.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.values.remove(key)
    }

    /// The bound user, if any. Empty strings count as unbound.
    pub fn user_id(&self) -> Option<&str> {
        self.values
            .get(USER_ID)
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn preferences(&self) -> Option<Preferences> {
        self.get_as(PREFERENCES)
    }

    pub fn all(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_state_has_well_known_keys() {
        let prefs = Preferences {
            payment_method: Some("paypal".into()),
            currency: "GBP".into(),
        };
        let state = SessionState::seeded("u1", &prefs);
        assert_eq!(state.user_id(), Some("u1"));
        assert_eq!(state.preferences(), Some(prefs));
        let started = state.get(SESSION_STARTED).and_then(|v| v.as_str()).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(started).is_ok());
    }

    #[test]
    fn empty_user_id_is_unbound() {
        let mut state = SessionState::new();
        assert!(state.user_id().is_none());
        state.set(USER_ID, "");
        assert!(state.user_id().is_none());
    }

    #[test]
    fn tools_can_store_arbitrary_values() {
        let mut state = SessionState::new();
        state.set("lastViewed", vec!["prod-1", "prod-2"]);
        let viewed: Vec<String> = state.get_as("lastViewed").unwrap();
        assert_eq!(viewed, vec!["prod-1", "prod-2"]);
        assert!(state.get_as::<u32>("lastViewed").is_none());
        assert!(state.remove("lastViewed").is_some());
        assert!(state.all().is_empty());
    }
}
