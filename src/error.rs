use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    /// Neither embedding credential is configured.
    #[error("No OPENAI_API_KEY or OPENROUTER_KEY set")]
    MissingCredentials,

    #[error("Database not found at {}", .0.display())]
    StoreNotFound(PathBuf),

    /// Business-logic storage errors (open failures, pragma failures)
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Test case file error: {0}")]
    CaseFile(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raw database errors from rusqlite
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type ProbeResult<T> = Result<T, ProbeError>;
