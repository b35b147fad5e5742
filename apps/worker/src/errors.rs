use thiserror::Error;

use crate::batch::BatchState;

/// Failure to read the movie catalog. Always fatal to the batch.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog source unavailable: {0}")]
    SourceUnavailable(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::SourceUnavailable(e.to_string())
    }
}

/// Failure to persist a single recommendation. Never fatal to the batch.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Batch-level errors. Per-item failures never surface here.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Batch aborted: {0}")]
    Aborted(#[from] CatalogError),

    #[error("Batch already started (state: {0:?})")]
    AlreadyStarted(BatchState),
}
