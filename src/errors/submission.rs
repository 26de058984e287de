//! Errors surfaced by the submit-and-confirm collaborator

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Confirmation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Invalid receipt: {0}")]
    InvalidReceipt(String),
}

impl SubmissionError {
    /// Network and timeout failures may succeed on a later attempt with the same route.
    pub fn is_transient(&self) -> bool {
        matches!(self, SubmissionError::Network(_) | SubmissionError::Timeout(_))
    }
}
