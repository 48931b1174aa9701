//! Domain-specific errors for the notes backend.
//!
//! Contains error variants for common failure cases like:
//! - Billing input errors (invalid storage quantity, declined charge)
//! - Note errors (not found, empty content, missing id)
//! - Request errors (missing body, unauthenticated caller)
//!
//! The `Display` text of each variant is what a caller sees in the
//! `{"error": ...}` body of a failed request.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage must be a non-negative integer, got {0}.")]
    InvalidStorage(String),

    #[error("Item not found.")]
    NoteNotFound,

    #[error("Note content must not be empty.")]
    EmptyContent,

    #[error("Missing request body.")]
    MissingBody,

    #[error("Missing note id.")]
    MissingNoteId,

    #[error("Unauthenticated.")]
    Unauthenticated,

    #[error("{0}")]
    PaymentDeclined(String),

    #[error("Invalid configuration for {key}: {reason}")]
    Config { key: &'static str, reason: String },

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
