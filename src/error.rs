//! Error types for paginated listings

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaginationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Page {page} failed to load: {reason}")]
    Load { page: usize, reason: String },

    #[error("Load for page {0} was superseded")]
    Superseded(usize),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PaginationError {
    /// Shorthand for a data-source failure on a given page
    pub fn load(page: usize, reason: impl Into<String>) -> Self {
        Self::Load {
            page,
            reason: reason.into(),
        }
    }
}

pub type PaginationResult<T> = Result<T, PaginationError>;
