use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read the store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("The store file is not valid JSON for its record type: {0}")]
    Json(#[from] serde_json::Error),

    #[error("The store file {0} does not exist.")]
    NotFound(PathBuf),
}
