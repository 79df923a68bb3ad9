//! Configuration types.

use std::path::PathBuf;

use crate::assistant::DEFAULT_MODEL;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the remote Assistants API.
    pub api_base_url: String,
    /// Page-size cap for list calls.
    pub list_limit: usize,
    /// Model used for new assistants when the draft leaves it unset.
    pub default_model: String,
    /// Directory holding the settings file.
    pub settings_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.openai.com/v1".to_string(),
            list_limit: 20,
            default_model: DEFAULT_MODEL.to_string(),
            settings_dir: default_settings_dir(),
        }
    }
}

/// Resolve the settings directory: `$ASSISTANT_DESK_DIR` if set, otherwise
/// `$HOME/.assistant-desk`.
pub fn default_settings_dir() -> PathBuf {
    std::env::var("ASSISTANT_DESK_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".assistant-desk")
        })
}
