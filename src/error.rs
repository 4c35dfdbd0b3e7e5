// src/error.rs
use pagecut_dom::DocumentError;
use pagecut_pagination::PaginationError;
use thiserror::Error;

/// Everything that can go wrong between reading a fixture and printing a report.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Document failed to build: {0}")]
    Document(#[from] DocumentError),

    #[error("Pagination failed: {0}")]
    Pagination(#[from] PaginationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
