//! Remote Assistants API — the trait the store depends on, plus the HTTP
//! implementation.

pub mod http;

pub use http::OpenAiClient;

use async_trait::async_trait;

use crate::assistant::{Assistant, CreateAssistant, UpdateAssistant};
use crate::error::ApiError;

/// Backend-agnostic interface to the remote assistant collection.
///
/// Failures are opaque `ApiError`s treated uniformly by callers. No retries,
/// no timeouts beyond what the transport provides.
#[async_trait]
pub trait AssistantsApi: Send + Sync {
    /// List up to `limit` assistants, in the remote collection's order.
    async fn list(&self, limit: usize) -> Result<Vec<Assistant>, ApiError>;

    /// Create a new assistant and return the remote copy.
    async fn create(&self, fields: CreateAssistant) -> Result<Assistant, ApiError>;

    /// Update an existing assistant and return the remote copy.
    async fn update(&self, id: &str, fields: UpdateAssistant) -> Result<Assistant, ApiError>;

    /// Delete an assistant by id.
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}
