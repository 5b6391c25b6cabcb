//! Attendance ledger repository.
//!
//! One record per student per day, carrying running totals as of that
//! record. Uniqueness of `(subject_id, day)` is enforced by the storage
//! constraint, not by a check-then-insert: two racing marks produce exactly
//! one success and one `AlreadyMarked`.

use chrono::NaiveDate;

use roll_core::entities::AttendanceRecord;
use roll_core::enums::AttendanceStatus;
use roll_core::ids::PREFIX_ATTENDANCE;

use crate::error::DatabaseError;
use crate::helpers::{column_u32, parse_date, parse_datetime, parse_enum};
use crate::service::RollService;

const SELECT_COLS: &str =
    "id, subject_id, day, status, total_present, total_days, created_at";

fn row_to_record(row: &libsql::Row) -> Result<AttendanceRecord, DatabaseError> {
    Ok(AttendanceRecord {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        day: parse_date(&row.get::<String>(2)?)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        total_present: column_u32(row, 4)?,
        total_days: column_u32(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl RollService {
    /// The most recent record for a subject, if any.
    async fn latest_attendance(
        &self,
        subject_id: &str,
    ) -> Result<Option<AttendanceRecord>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM attendance_records
                     WHERE subject_id = ?1 ORDER BY day DESC LIMIT 1"
                ),
                [subject_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    /// Mark attendance for a student on a day, extending the running totals.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty `subject_id`, a `day` in the future, or a
    ///   `day` earlier than the subject's latest record (running totals are
    ///   positional; an out-of-order mark would corrupt them).
    /// - `AlreadyMarked` if a record for `(subject_id, day)` exists, raised
    ///   by the UNIQUE constraint even under concurrent marking.
    pub async fn mark_attendance(
        &self,
        subject_id: &str,
        day: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, DatabaseError> {
        if subject_id.is_empty() {
            return Err(DatabaseError::Validation(
                "subject_id must not be empty".to_string(),
            ));
        }
        // A future-dated record would sit outside the amend/retract window
        // forever and block every earlier mark until its day arrives.
        if day > self.today() {
            return Err(DatabaseError::Validation(format!(
                "cannot mark {subject_id} for future day {day}"
            )));
        }

        let prior = self.latest_attendance(subject_id).await?;
        if let Some(ref latest) = prior {
            if day < latest.day {
                return Err(DatabaseError::Validation(format!(
                    "cannot mark {subject_id} for {day}: later record dated {} exists",
                    latest.day
                )));
            }
        }
        let (prior_present, prior_days) =
            prior.map_or((0, 0), |r| (r.total_present, r.total_days));

        let id = self.db().generate_id(PREFIX_ATTENDANCE).await?;
        let created_at = self.now();
        let total_present = prior_present + u32::from(status.is_present());
        let total_days = prior_days + 1;

        let result = self
            .db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO attendance_records ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                libsql::params![
                    id.as_str(),
                    subject_id,
                    day.format("%Y-%m-%d").to_string(),
                    status.as_str(),
                    i64::from(total_present),
                    i64::from(total_days),
                    created_at.to_rfc3339()
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(AttendanceRecord {
                id,
                subject_id: subject_id.to_string(),
                day,
                status,
                total_present,
                total_days,
                created_at,
            }),
            Err(err) if DatabaseError::is_unique_violation(&err) => {
                Err(DatabaseError::AlreadyMarked {
                    subject_id: subject_id.to_string(),
                    day,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Amend the status of today's record for a subject.
    ///
    /// Recomputes `total_present` against the prior record's fixed totals;
    /// `total_days` is unchanged. Today is by construction the subject's
    /// latest record, so no later counters exist to recompute.
    ///
    /// # Errors
    ///
    /// `NotFound` if the subject has no records at all; `OutOfWindow` if its
    /// latest record is not dated today.
    pub async fn amend_today(
        &self,
        subject_id: &str,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, DatabaseError> {
        let record = self.today_record(subject_id).await?;

        // Strip this record's own contribution to recover the prior total.
        let prior_present = record.total_present - u32::from(record.status.is_present());
        let total_present = prior_present + u32::from(status.is_present());

        self.db()
            .conn()
            .execute(
                "UPDATE attendance_records SET status = ?1, total_present = ?2 WHERE id = ?3",
                libsql::params![status.as_str(), i64::from(total_present), record.id.as_str()],
            )
            .await?;

        Ok(AttendanceRecord {
            status,
            total_present,
            ..record
        })
    }

    /// Retract today's record for a subject.
    ///
    /// # Errors
    ///
    /// Same window rules as [`Self::amend_today`].
    pub async fn retract_today(&self, subject_id: &str) -> Result<(), DatabaseError> {
        let record = self.today_record(subject_id).await?;
        self.db()
            .conn()
            .execute(
                "DELETE FROM attendance_records WHERE id = ?1",
                [record.id.as_str()],
            )
            .await?;
        Ok(())
    }

    /// A subject's full attendance history, chronological.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn attendance_history(
        &self,
        subject_id: &str,
    ) -> Result<Vec<AttendanceRecord>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM attendance_records
                     WHERE subject_id = ?1 ORDER BY day ASC"
                ),
                [subject_id],
            )
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_record(&row)?);
        }
        Ok(records)
    }

    /// The subject's latest record, required to be dated today.
    async fn today_record(&self, subject_id: &str) -> Result<AttendanceRecord, DatabaseError> {
        let latest =
            self.latest_attendance(subject_id)
                .await?
                .ok_or_else(|| DatabaseError::NotFound {
                    entity_type: "attendance".to_string(),
                    id: subject_id.to_string(),
                })?;
        if latest.day != self.today() {
            return Err(DatabaseError::OutOfWindow {
                subject_id: subject_id.to_string(),
                day: latest.day,
            });
        }
        Ok(latest)
    }
}
