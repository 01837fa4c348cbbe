use thiserror::Error;

use crate::store::StoreError;

/// Errors at the fallible edges of the engine: persisted data and storage.
///
/// Degenerate numeric input is never an error.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid timestamp in `{field}`: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("unsupported record version {0}")]
    UnsupportedVersion(u32),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("session not found: {0}")]
    SessionNotFound(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
