use thiserror::Error;

/// Errors surfaced by the classroom store.
///
/// "Not found" is deliberately absent: lookups by an unknown id return
/// `Ok(None)` or `false` because the caller treats them as routine.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid data format: {0}")]
    Format(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        StoreError::Format(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        StoreError::Storage(msg.into())
    }

    /// Stable error code used on the IPC wire.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "validation_failed",
            StoreError::Format(_) => "bad_format",
            StoreError::Storage(_) => "storage_failed",
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Storage(format!("failed to encode payload: {}", e))
    }
}
