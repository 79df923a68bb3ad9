//! Assistant Desk — manage OpenAI Assistants from the terminal.

pub mod api;
pub mod assistant;
pub mod config;
pub mod credential;
pub mod error;
pub mod storage;
pub mod store;
pub mod theme;
