use produktsync::AutomationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The record carries no article number, so the Shop search cannot run.
    #[error("product record has no article number")]
    MissingIdentifier,

    #[error("invalid price value: {0:?}")]
    InvalidPrice(String),

    #[error(transparent)]
    Automation(#[from] AutomationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
