//! File-backed settings store — the native stand-in for browser local
//! storage.
//!
//! A single JSON object of string keys and string values, flushed to disk on
//! every write. The file is tiny and owned by one process, so whole-map
//! rewrites are fine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::StorageError;

/// Well-known settings keys, preserved from the original storage schema.
pub mod keys {
    pub const API_KEY: &str = "openaiApiKey";
    pub const THEME: &str = "theme";
    pub const SHOW_DELETE_BUTTON: &str = "showDeleteButton";
}

/// Persisted key→value settings.
pub struct SettingsStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl SettingsStore {
    /// Open (or initialize) the settings file under `dir`.
    ///
    /// A missing file starts empty. A corrupt file also starts empty, with a
    /// logged warning, rather than blocking startup.
    pub async fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).await?;
        let path = dir.join("settings.json");
        let values = match fs::read_to_string(&path).await {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Unreadable settings file, starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Get a value by key.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    /// Set a value and flush the whole map to disk.
    pub async fn set(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value.into());
        let text = serde_json::to_string_pretty(&*values)?;
        fs::write(&self.path, text).await?;
        Ok(())
    }

    /// Get a boolean stored as JSON text (`"true"` / `"false"`).
    pub async fn get_bool(&self, key: &str) -> Option<bool> {
        let raw = self.get(key).await?;
        serde_json::from_str(&raw).ok()
    }

    /// Set a boolean as JSON text.
    pub async fn set_bool(&self, key: &str, value: bool) -> Result<(), StorageError> {
        self.set(key, value.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = SettingsStore::open(dir.path()).await.unwrap();
        store.set(keys::THEME, "dark").await.unwrap();
        store.set(keys::API_KEY, "sk-test").await.unwrap();

        let reopened = SettingsStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get(keys::THEME).await.as_deref(), Some("dark"));
        assert_eq!(reopened.get(keys::API_KEY).await.as_deref(), Some("sk-test"));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path()).await.unwrap();
        assert_eq!(store.get("nope").await, None);
    }

    #[tokio::test]
    async fn booleans_are_json_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path()).await.unwrap();

        store.set_bool(keys::SHOW_DELETE_BUTTON, true).await.unwrap();
        assert_eq!(
            store.get(keys::SHOW_DELETE_BUTTON).await.as_deref(),
            Some("true")
        );
        assert_eq!(store.get_bool(keys::SHOW_DELETE_BUTTON).await, Some(true));

        store.set_bool(keys::SHOW_DELETE_BUTTON, false).await.unwrap();
        assert_eq!(store.get_bool(keys::SHOW_DELETE_BUTTON).await, Some(false));
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("settings.json"), "not json{")
            .await
            .unwrap();

        let store = SettingsStore::open(dir.path()).await.unwrap();
        assert_eq!(store.get(keys::THEME).await, None);

        // Still writable after the bad read
        store.set(keys::THEME, "light").await.unwrap();
        assert_eq!(store.get(keys::THEME).await.as_deref(), Some("light"));
    }
}
