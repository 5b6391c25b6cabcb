//! Database error types for roll-db.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Input failed validation before any write was attempted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An attendance record for this subject and day already exists.
    /// Surfaced by the UNIQUE(subject_id, day) constraint; callers treat it
    /// as "no-op, already done".
    #[error("Attendance already marked for {subject_id} on {day}")]
    AlreadyMarked { subject_id: String, day: NaiveDate },

    /// Amend/retract attempted on a record not dated today.
    #[error("Attendance record for {subject_id} dated {day} is outside the amend window")]
    OutOfWindow { subject_id: String, day: NaiveDate },

    /// A cascading-delete step failed partway. The store is left in the
    /// orphan-safe state (references repaired or partially repaired, entity
    /// still present), never with dangling references.
    #[error("Cascade failed during {stage}: {source}")]
    Cascade {
        stage: &'static str,
        source: Box<DatabaseError>,
    },

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Wrap an error as a cascade failure at the given stage.
    #[must_use]
    pub fn cascade(stage: &'static str, source: Self) -> Self {
        Self::Cascade {
            stage,
            source: Box::new(source),
        }
    }

    /// Whether an error is the libSQL surface of a UNIQUE constraint hit.
    #[must_use]
    pub fn is_unique_violation(err: &libsql::Error) -> bool {
        err.to_string().contains("UNIQUE constraint failed")
    }
}
