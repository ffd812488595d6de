//! User preferences kept in local storage

use super::{KeyValueStore, KeyValueStoreExt, StorageResult, LANGUAGE_KEY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Supported UI languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Tr,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Tr => "tr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "tr" | "turkish" => Ok(Language::Tr),
            other => Err(format!("Unsupported language: {}. Use: en, tr", other)),
        }
    }
}

/// Typed view over the preference keys of a store
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored language, or the default when unset or unreadable
    pub fn language(&self) -> Language {
        self.store.get_json(LANGUAGE_KEY).unwrap_or_default()
    }

    pub fn set_language(&self, language: Language) -> StorageResult<()> {
        self.store.set_json(LANGUAGE_KEY, &language)
    }
}
