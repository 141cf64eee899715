//! Errors raised while assembling a game session
//!
//! The per-tick simulation itself has no recoverable failures; everything here
//! is detected at startup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// A spawn asked for presentation metadata that was never registered
    #[error("presentation not registered: {0}")]
    UnknownPresentation(String),

    /// The catalog has nothing to spawn for a required kind group
    #[error("no presentations registered for {0}")]
    EmptyPresentationSet(&'static str),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
