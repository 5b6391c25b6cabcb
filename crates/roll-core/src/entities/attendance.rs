//! Attendance ledger entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::AttendanceStatus;

/// One attendance mark for one student on one calendar day.
///
/// `total_present` and `total_days` are running totals *as of this record*,
/// stored rather than recomputed at read time. For a subject's records ordered by
/// `day`, `total_days` increments by one per record and `total_present` by
/// one per `Present` record. At most one record exists per `(subject_id,
/// day)` pair, enforced by a storage-level UNIQUE constraint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: String,
    /// Student identifier.
    pub subject_id: String,
    /// Calendar day, no time component.
    pub day: NaiveDate,
    pub status: AttendanceStatus,
    pub total_present: u32,
    pub total_days: u32,
    pub created_at: DateTime<Utc>,
}
