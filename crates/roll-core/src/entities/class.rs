//! Class entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A class (homeroom) record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub grade: Option<String>,
    /// Primary teacher reference; cleared (not dangled) when that teacher is
    /// deleted.
    pub teacher_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One entry in a class's subject-assignment list: this teacher teaches this
/// subject to this class. Stored one row per entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubjectAssignment {
    pub id: String,
    pub class_id: String,
    pub teacher_id: String,
    pub subject: String,
}
