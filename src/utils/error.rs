use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// The registry database does not exist. Raised once at open time so the
    /// caller can tell a misconfigured system apart from a rejected certificate.
    #[error("registry store not found at {}", .0.display())]
    StoreNotFound(PathBuf),

    #[error("registry store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("OCR service error: {0}")]
    Ocr(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("import error: {0}")]
    Import(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
