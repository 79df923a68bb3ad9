//! Error types for Assistant Desk.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Remote Assistants API errors. Callers treat every variant uniformly as an
/// opaque failure; the variants exist for diagnostics, not for branching.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Collection-synchronization errors surfaced to the presentation layer.
///
/// Any failed remote call leaves the local collection untouched; the user may
/// retry the same action.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to fetch the assistant list, check that your API key is valid")]
    Fetch(#[source] ApiError),

    #[error("Failed to create assistant \"{name}\", please retry later")]
    Create {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to update assistant \"{name}\", please retry later")]
    Update {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to delete assistant {id}, please retry later")]
    Delete {
        id: String,
        #[source]
        source: ApiError,
    },

    #[error("Assistant name cannot be empty")]
    EmptyName,
}

/// Credential lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("API key cannot be empty")]
    Invalid,
}

/// Settings-file errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
