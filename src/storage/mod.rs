//! Local Key-Value Storage
//!
//! Best-effort client-side persistence, the equivalent of browser local
//! storage:
//!
//! - **memory**: In-process store, lost on exit
//! - **file**: JSON file store, atomically rewritten on every change
//! - **preferences**: Typed access to the language preference
//! - **error**: Error types
//!
//! Values are strings; [`KeyValueStoreExt`] layers JSON encoding on top.
//! There is no schema versioning: a value that fails to decode reads as
//! absent.

pub mod error;
pub mod file;
pub mod memory;
pub mod preferences;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use preferences::{Language, Preferences};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Liked-post state mirrored from the forum page
pub const LIKED_POSTS_KEY: &str = "likedPosts";
/// UI language preference
pub const LANGUAGE_KEY: &str = "language";
/// Persisted access/refresh token pair
pub const AUTH_TOKENS_KEY: &str = "authTokens";

/// String key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All keys currently stored, sorted
    fn keys(&self) -> Vec<String>;
}

/// JSON helpers for any [`KeyValueStore`]
pub trait KeyValueStoreExt {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T>;

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ignoring unreadable stored value");
                None
            }
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        let mut liked = BTreeMap::new();
        liked.insert(4u64, true);
        store.set_json(LIKED_POSTS_KEY, &liked).unwrap();

        let loaded: BTreeMap<u64, bool> = store.get_json(LIKED_POSTS_KEY).unwrap();
        assert_eq!(loaded.get(&4), Some(&true));
    }

    #[test]
    fn test_corrupt_value_reads_as_absent() {
        let store = MemoryStore::new();
        store.set(LIKED_POSTS_KEY, "{not json").unwrap();

        let loaded: Option<BTreeMap<u64, bool>> = store.get_json(LIKED_POSTS_KEY);
        assert!(loaded.is_none());
    }

    #[test]
    fn test_trait_object_helpers() {
        let store: std::sync::Arc<dyn KeyValueStore> = std::sync::Arc::new(MemoryStore::new());
        store.set_json(LANGUAGE_KEY, &"tr").unwrap();
        assert_eq!(store.get_json::<String>(LANGUAGE_KEY).as_deref(), Some("tr"));
    }
}
