//! File-backed persistence for the watcher's snapshot.

pub mod json_file;

pub use json_file::JsonFileStore;

use courtwatch_core::config::WatchConfig;

/// Store at the paths named in the configuration.
pub fn store_for(config: &WatchConfig) -> JsonFileStore {
    JsonFileStore::new(config.cache_path.clone(), config.meta_path.clone())
}
