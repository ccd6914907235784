use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Command not found: {0}. Type 'help' to see available commands.")]
    NotFound(String),

    #[error("Too many requests, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Store read timed out after {0:?}")]
    StoreTimeout(Duration),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ShellError {
    /// True for failures of the external project store, which callers surface
    /// differently from an empty result.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, ShellError::Store(_) | ShellError::StoreTimeout(_))
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;
