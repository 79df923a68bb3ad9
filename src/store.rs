//! Assistant collection store — keeps the local view of the remote
//! collection consistent with call outcomes.
//!
//! Local state only mutates inside the success branch of the triggering
//! call's continuation; a failed call leaves the collection untouched and the
//! user may retry. Overlapping updates for the same id are not serialized:
//! the last response to resolve wins. That race is acceptable for a
//! single-operator tool and deliberately not strengthened.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tracing::{error, info};

use crate::api::AssistantsApi;
use crate::assistant::{Assistant, AssistantDraft, CreateAssistant, DEFAULT_MODEL, UpdateAssistant};
use crate::error::StoreError;

/// Busy signal published while a remote call is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BusyState {
    pub busy: bool,
    pub message: String,
}

/// Clears the busy signal on drop, so every exit path releases it.
struct BusyGuard<'a> {
    tx: &'a watch::Sender<BusyState>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(tx: &'a watch::Sender<BusyState>, message: impl Into<String>) -> Self {
        tx.send_replace(BusyState {
            busy: true,
            message: message.into(),
        });
        Self { tx }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.tx.send_replace(BusyState::default());
    }
}

#[derive(Debug, Default)]
struct StoreState {
    assistants: Vec<Assistant>,
    /// Weak lookup key; may dangle if the referenced id was removed.
    selected_id: Option<String>,
    pending_temperature: Option<f64>,
    pending_top_p: Option<f64>,
}

/// Local view of the remote assistant collection and the selection cursor.
pub struct AssistantStore {
    api: Arc<dyn AssistantsApi>,
    list_limit: usize,
    state: RwLock<StoreState>,
    busy: watch::Sender<BusyState>,
}

impl AssistantStore {
    pub fn new(api: Arc<dyn AssistantsApi>, list_limit: usize) -> Arc<Self> {
        let (busy, _) = watch::channel(BusyState::default());
        Arc::new(Self {
            api,
            list_limit,
            state: RwLock::new(StoreState::default()),
            busy,
        })
    }

    /// Subscribe to the busy/status signal.
    pub fn subscribe_busy(&self) -> watch::Receiver<BusyState> {
        self.busy.subscribe()
    }

    /// Snapshot of the current collection, in fetch/create order.
    pub async fn assistants(&self) -> Vec<Assistant> {
        self.state.read().await.assistants.clone()
    }

    /// Currently selected id, which may dangle.
    pub async fn selected_id(&self) -> Option<String> {
        self.state.read().await.selected_id.clone()
    }

    /// The selected assistant, or `None` when the selection is absent or
    /// dangles. A dangling selection is not an error; it just resolves to
    /// nothing.
    pub async fn selected(&self) -> Option<Assistant> {
        let state = self.state.read().await;
        let id = state.selected_id.as_deref()?;
        state.assistants.iter().find(|a| a.id == id).cloned()
    }

    /// Select an id. Purely local; the id is not validated against the
    /// collection.
    pub async fn select(&self, id: impl Into<String>) {
        self.state.write().await.selected_id = Some(id.into());
    }

    /// Replace the entire collection with the remote listing (no merge).
    /// Selects the first element when the collection is non-empty and no
    /// selection exists.
    pub async fn fetch_all(&self) -> Result<(), StoreError> {
        let _busy = BusyGuard::acquire(&self.busy, "Fetching assistants...");
        match self.api.list(self.list_limit).await {
            Ok(assistants) => {
                let mut state = self.state.write().await;
                info!(count = assistants.len(), "Fetched assistant list");
                state.assistants = assistants;
                if state.selected_id.is_none() {
                    state.selected_id = state.assistants.first().map(|a| a.id.clone());
                }
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch assistants");
                Err(StoreError::Fetch(e))
            }
        }
    }

    /// Create a new assistant from a draft, append the remote copy, and
    /// select it. Blank names are rejected before any network call.
    pub async fn create(&self, draft: AssistantDraft) -> Result<Assistant, StoreError> {
        if draft.name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }
        let fields = CreateAssistant {
            name: draft.name.clone(),
            instructions: draft.instructions.unwrap_or_default(),
            model: draft.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        };
        let _busy = BusyGuard::acquire(
            &self.busy,
            format!("Creating assistant \"{}\"...", fields.name),
        );
        match self.api.create(fields).await {
            Ok(created) => {
                let mut state = self.state.write().await;
                info!(id = %created.id, name = %created.name, "Assistant created");
                state.selected_id = Some(created.id.clone());
                state.assistants.push(created.clone());
                Ok(created)
            }
            Err(e) => {
                error!(error = %e, "Failed to create assistant");
                Err(StoreError::Create {
                    name: draft.name,
                    source: e,
                })
            }
        }
    }

    /// Push the full mutable field set for `assistant` and reconcile the
    /// remote copy in place, position preserved. A success response for an id
    /// no longer in the collection is dropped silently.
    pub async fn update(&self, assistant: &Assistant) -> Result<(), StoreError> {
        let fields = UpdateAssistant::from_assistant(assistant);
        let _busy = BusyGuard::acquire(
            &self.busy,
            format!("Updating assistant \"{}\"...", assistant.name),
        );
        match self.api.update(&assistant.id, fields).await {
            Ok(updated) => {
                let mut state = self.state.write().await;
                if let Some(slot) = state.assistants.iter_mut().find(|a| a.id == updated.id) {
                    info!(id = %updated.id, "Assistant updated");
                    *slot = updated;
                }
                Ok(())
            }
            Err(e) => {
                error!(id = %assistant.id, error = %e, "Failed to update assistant");
                Err(StoreError::Update {
                    name: assistant.name.clone(),
                    source: e,
                })
            }
        }
    }

    /// Delete by id. If the removed element was selected, selection moves to
    /// the new first element, or to none when the collection empties.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _busy = BusyGuard::acquire(&self.busy, "Deleting assistant...");
        match self.api.delete(id).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                state.assistants.retain(|a| a.id != id);
                if state.selected_id.as_deref() == Some(id) {
                    state.selected_id = state.assistants.first().map(|a| a.id.clone());
                }
                info!(id = %id, "Assistant deleted");
                Ok(())
            }
            Err(e) => {
                error!(id = %id, error = %e, "Failed to delete assistant");
                Err(StoreError::Delete {
                    id: id.to_string(),
                    source: e,
                })
            }
        }
    }

    // ── Pending slider edits ────────────────────────────────────────
    //
    // A pending value is an uncommitted local edit held separately from the
    // committed copy, so intermediate drag positions never hit the network.

    /// Hold an uncommitted temperature.
    pub async fn set_pending_temperature(&self, value: f64) {
        self.state.write().await.pending_temperature = Some(value);
    }

    /// Hold an uncommitted top_p.
    pub async fn set_pending_top_p(&self, value: f64) {
        self.state.write().await.pending_top_p = Some(value);
    }

    /// Uncommitted temperature, if any.
    pub async fn pending_temperature(&self) -> Option<f64> {
        self.state.read().await.pending_temperature
    }

    /// Uncommitted top_p, if any.
    pub async fn pending_top_p(&self) -> Option<f64> {
        self.state.read().await.pending_top_p
    }

    /// Commit the pending temperature for `id`. Issues an update only when
    /// the pending value differs from the committed one; the pending value is
    /// cleared regardless of outcome.
    pub async fn commit_temperature(&self, id: &str) -> Result<(), StoreError> {
        let (pending, target) = {
            let mut state = self.state.write().await;
            let pending = state.pending_temperature.take();
            let target = state.assistants.iter().find(|a| a.id == id).cloned();
            (pending, target)
        };
        let (Some(pending), Some(mut target)) = (pending, target) else {
            return Ok(());
        };
        if target.temperature == Some(pending) {
            return Ok(());
        }
        target.temperature = Some(pending);
        self.update(&target).await
    }

    /// Commit the pending top_p for `id`; same discipline as
    /// [`commit_temperature`](Self::commit_temperature).
    pub async fn commit_top_p(&self, id: &str) -> Result<(), StoreError> {
        let (pending, target) = {
            let mut state = self.state.write().await;
            let pending = state.pending_top_p.take();
            let target = state.assistants.iter().find(|a| a.id == id).cloned();
            (pending, target)
        };
        let (Some(pending), Some(mut target)) = (pending, target) else {
            return Ok(());
        };
        if target.top_p == Some(pending) {
            return Ok(());
        }
        target.top_p = Some(pending);
        self.update(&target).await
    }
}
