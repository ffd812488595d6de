//! JSON file store
//!
//! The whole map lives in memory and is rewritten to disk after every
//! change. Writes go to a sibling temp file first and are renamed into
//! place so a crash never leaves a half-written file.

use super::{KeyValueStore, StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Key-value store persisted as a JSON object on disk
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

/// On-disk format
#[derive(Serialize, Deserialize, Default)]
struct StoreData {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, creating it lazily on first write
    ///
    /// An unreadable file is treated as empty and overwritten on the next
    /// write.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();

        let entries = if path.exists() {
            match Self::load_from_file(&path) {
                Ok(data) => data.entries,
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Discarding unreadable store file");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = ?path, keys = entries.len(), "Opened file store");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> StorageResult<StoreData> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| StorageError::Serialization(format!("Failed to load store: {}", e)))
    }

    fn persist(&self, data: &StoreData) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, data).map_err(|e| {
                StorageError::Serialization(format!("Failed to persist store: {}", e))
            })?;
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        let mut data = StoreData {
            entries: entries.clone(),
        };
        data.entries.insert(key.to_string(), value.to_string());
        // Memory only changes once the file has been replaced
        self.persist(&data)?;
        *entries = data.entries;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut data = StoreData {
            entries: entries.clone(),
        };
        data.entries.remove(key);
        self.persist(&data)?;
        *entries = data.entries;
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}
