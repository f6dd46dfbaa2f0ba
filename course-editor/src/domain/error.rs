use thiserror::Error;

use super::models::{ActivityId, SectionId};

/// A store operation referenced something that is not in the tree.
///
/// The tree is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("section not found: {0}")]
    SectionNotFound(SectionId),
    #[error("activity not found: {0}")]
    ActivityNotFound(ActivityId),
    #[error("index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors reported by a course backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("not authorized to edit this course")]
    Unauthorized,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("{0}")]
    Unknown(String),
}

impl BackendError {
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }
}

/// Errors surfaced by the course editor service.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("a reorder is still being saved")]
    Busy,
    #[error("{0} has not been saved yet")]
    Provisional(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl EditorError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
