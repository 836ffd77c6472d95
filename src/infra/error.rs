//! Error types for EcoProof infrastructure.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in the submission workflow and its stores.
#[derive(Error, Debug)]
pub enum EcoError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Submission not found
    #[error("submission not found: {0}")]
    SubmissionNotFound(Uuid),

    /// Student not found in the ledger
    #[error("student not found: {0}")]
    StudentNotFound(String),

    /// Review attempted on a submission that is no longer reviewable
    #[error("submission {id} is not reviewable (status: {status})")]
    NotReviewable { id: Uuid, status: String },

    /// Request validation error
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown status value at a store or wire boundary
    #[error("invalid submission status: {0}")]
    InvalidStatus(String),

    /// Points ledger rejected or failed an award
    #[error("ledger error for student {student_id}: {message}")]
    Ledger { student_id: String, message: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for EcoProof operations
pub type Result<T> = std::result::Result<T, EcoError>;
