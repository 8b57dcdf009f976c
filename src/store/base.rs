use std::sync::Arc;

use tracing::info;

use super::{file_store::FileStore, memory_store::MemoryStore};
use crate::config::StoreConfig;
use crate::error::Result;

/// A persistent string-to-string store, the client-side equivalent of
/// browser local storage.
///
/// `set_items` must apply all pairs as one unit: a reader never observes a
/// subset of them. `remove_items` never fails; backends log and move on.
pub trait KeyValueStore: Send + Sync {
    fn get_name(&self) -> &str;
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_items(&self, items: &[(&str, String)]) -> Result<()>;
    fn remove_items(&self, keys: &[&str]);
}

/// Creates a concrete store implementation based on the StoreConfig.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config {
        StoreConfig::Memory => {
            info!("Using in-memory session store; sessions end with the process.");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreConfig::File { path } => {
            let store = FileStore::open(path)?;
            info!("Using file session store at '{}'", path.display());
            Ok(Arc::new(store))
        }
    }
}
