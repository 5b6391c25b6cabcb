//! Cross-cutting error types for Rollcall.
//!
//! Storage-specific errors (`DatabaseError`) are defined in `roll-db`; this
//! module covers errors that can originate from any crate.

use thiserror::Error;

/// Errors that can be raised by any Rollcall crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (format, enum value, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
