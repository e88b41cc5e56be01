//! File-based store - the whole snapshot as one JSON document.
//!
//! The snapshot is loaded into memory on open. Every mutation takes the store
//! lock, applies the change to a copy, writes the copy to disk in full, and
//! only then replaces the in-memory snapshot. A failed write leaves the store
//! exactly as it was and is returned to the caller.
//!
//! Storage location: `~/.cartwright/database.json` unless configured.

use async_trait::async_trait;
use cartwright_core::error::StoreError;
use cartwright_core::message::Message;
use cartwright_core::shop::{CartItem, Preferences};
use cartwright_core::store::{StateStore, StoreSnapshot};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub struct JsonFileStore {
    path: PathBuf,
    snapshot: Mutex<StoreSnapshot>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts empty (created on first write). An unreadable or
    /// corrupt file also starts empty; it is overwritten on the next write.
    pub fn open(path: PathBuf) -> Self {
        let snapshot = Self::load(&path);
        debug!(
            path = %path.display(),
            users = snapshot.user_ids().len(),
            "JSON file store loaded"
        );
        Self {
            path,
            snapshot: Mutex::new(snapshot),
        }
    }

    /// Default path: `~/.cartwright/database.json`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".cartwright").join("database.json")
    }

    /// Read the entire durable state, degrading to empty on any failure.
    pub fn load(path: &Path) -> StoreSnapshot {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return StoreSnapshot::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Store unreadable, starting empty");
                return StoreSnapshot::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Store corrupt, starting empty");
                StoreSnapshot::default()
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `f` to a copy of the snapshot, persist the copy, then commit it.
    async fn commit<R>(&self, f: impl FnOnce(&mut StoreSnapshot) -> R) -> Result<R, StoreError> {
        let mut current = self.snapshot.lock().await;
        let mut next = current.clone();
        let out = f(&mut next);
        self.write(&next).await?;
        *current = next;
        Ok(out)
    }

    /// Write the snapshot to a sibling temp file and rename it into place.
    async fn write(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_failed(format!("cannot create directory: {e}")))?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| self.write_failed(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.write_failed(e.to_string()))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Store snapshot written");
        Ok(())
    }

    fn write_failed(&self, reason: String) -> StoreError {
        StoreError::WriteFailed {
            path: self.path.display().to_string(),
            reason,
        }
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn snapshot(&self) -> StoreSnapshot {
        self.snapshot.lock().await.clone()
    }

    async fn cart(&self, user_id: &str) -> Vec<CartItem> {
        self.snapshot.lock().await.cart(user_id)
    }

    async fn set_cart(&self, user_id: &str, cart: Vec<CartItem>) -> Result<(), StoreError> {
        self.commit(|s| s.set_cart(user_id, cart)).await
    }

    async fn messages(&self, user_id: &str) -> Vec<Message> {
        self.snapshot.lock().await.messages(user_id)
    }

    async fn append_message(&self, user_id: &str, message: &Message) -> Result<bool, StoreError> {
        if message.text_only().is_none() {
            debug!(user_id, message_id = %message.id, "No text to persist, skipping message");
            return Ok(false);
        }
        self.commit(|s| s.append_message(user_id, message)).await
    }

    async fn preferences(&self, user_id: &str) -> Preferences {
        self.snapshot.lock().await.preferences(user_id)
    }

    async fn save_preferences(
        &self,
        user_id: &str,
        preferences: Preferences,
    ) -> Result<(), StoreError> {
        self.commit(|s| s.save_preferences(user_id, preferences)).await
    }
}
