//! API credential lifecycle.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::CredentialError;
use crate::storage::{SettingsStore, keys};

/// Process-wide holder of the API credential.
///
/// Absent at cold start, set by user action, held for the process lifetime.
/// It may be overwritten but never partially updated. An absent credential is
/// the signal for the presentation layer to block behind a credential prompt;
/// no other feature is reachable until one is set.
pub struct CredentialHolder {
    storage: Arc<SettingsStore>,
    current: RwLock<Option<SecretString>>,
}

impl CredentialHolder {
    /// Load the holder, picking up any previously persisted credential.
    /// Blank persisted values are treated as absent.
    pub async fn load(storage: Arc<SettingsStore>) -> Self {
        let current = storage
            .get(keys::API_KEY)
            .await
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from);
        Self {
            storage,
            current: RwLock::new(current),
        }
    }

    /// The currently held credential, if any.
    pub async fn get(&self) -> Option<SecretString> {
        self.current.read().await.clone()
    }

    /// Persist and hold a new credential. Blank or whitespace-only values are
    /// rejected; the caller should re-prompt.
    ///
    /// Returns the held secret so the caller can build a client and trigger
    /// the initial fetch.
    pub async fn set(&self, value: &str) -> Result<SecretString, CredentialError> {
        if value.trim().is_empty() {
            return Err(CredentialError::Invalid);
        }
        // A failed disk write still leaves the credential usable in memory.
        if let Err(e) = self.storage.set(keys::API_KEY, value).await {
            warn!(error = %e, "Failed to persist API key");
        }
        let secret = SecretString::from(value.to_string());
        *self.current.write().await = Some(secret.clone());
        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    async fn fresh_storage() -> (tempfile::TempDir, Arc<SettingsStore>) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SettingsStore::open(dir.path()).await.unwrap());
        (dir, storage)
    }

    #[tokio::test]
    async fn absent_at_cold_start() {
        let (_dir, storage) = fresh_storage().await;
        let holder = CredentialHolder::load(storage).await;
        assert!(holder.get().await.is_none());
    }

    #[tokio::test]
    async fn blank_values_rejected() {
        let (_dir, storage) = fresh_storage().await;
        let holder = CredentialHolder::load(storage).await;

        assert!(matches!(holder.set("").await, Err(CredentialError::Invalid)));
        assert!(matches!(
            holder.set("   \t").await,
            Err(CredentialError::Invalid)
        ));
        assert!(holder.get().await.is_none());
    }

    #[tokio::test]
    async fn set_persists_and_reloads() {
        let (_dir, storage) = fresh_storage().await;
        {
            let holder = CredentialHolder::load(Arc::clone(&storage)).await;
            holder.set("sk-live-1").await.unwrap();
        }

        assert_eq!(storage.get(keys::API_KEY).await.as_deref(), Some("sk-live-1"));

        let reloaded = CredentialHolder::load(storage).await;
        let key = reloaded.get().await.unwrap();
        assert_eq!(key.expose_secret(), "sk-live-1");
    }

    #[tokio::test]
    async fn blank_persisted_value_treated_absent() {
        let (_dir, storage) = fresh_storage().await;
        storage.set(keys::API_KEY, "  ").await.unwrap();

        let holder = CredentialHolder::load(storage).await;
        assert!(holder.get().await.is_none());
    }

    #[tokio::test]
    async fn overwrite_replaces_whole_value() {
        let (_dir, storage) = fresh_storage().await;
        let holder = CredentialHolder::load(storage).await;

        holder.set("sk-old").await.unwrap();
        holder.set("sk-new").await.unwrap();
        assert_eq!(holder.get().await.unwrap().expose_secret(), "sk-new");
    }
}
