//! Teacher entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A teacher record. Referenced by classes two ways: as the single-valued
/// primary teacher (`Class::teacher_id`) and through subject-assignment
/// entries (`SubjectAssignment::teacher_id`). Deletion goes through the
/// cascading coordinator so neither reference is ever left dangling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub subject: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}
