//! State store implementations for Cartwright.

pub mod in_memory;
pub mod json_file;

pub use in_memory::InMemoryStore;
pub use json_file::JsonFileStore;

use cartwright_config::StoreConfig;
use cartwright_core::store::StateStore;
use std::sync::Arc;
use tracing::info;

/// Open the store described by the configuration.
///
/// Unknown backend names are rejected by config validation; anything other
/// than "memory" opens the JSON file store.
pub fn open_from_config(config: &StoreConfig) -> Arc<dyn StateStore> {
    match config.backend.as_str() {
        "memory" => {
            info!("Using in-memory store; nothing will be persisted");
            Arc::new(InMemoryStore::new())
        }
        _ => {
            info!(path = %config.path.display(), "Using JSON file store");
            Arc::new(JsonFileStore::open(config.path.clone()))
        }
    }
}
