//! Teacher repository and cascading-deletion coordinator.
//!
//! Deleting a teacher repairs every cross-reference *before* removing the
//! row: a crash mid-cascade leaves an orphan teacher nothing points to (a
//! recoverable inconsistency) rather than dangling references to a deleted
//! teacher. The ordering is load-bearing; do not reorder the steps.

use roll_core::audit_detail::{CascadeErrorDetail, CascadeSummary};
use roll_core::entities::{NewAuditRecord, RequestMeta, Teacher};
use roll_core::enums::{AuditAction, EntityType};
use roll_core::ids::PREFIX_TEACHER;

use crate::error::DatabaseError;
use crate::helpers::{column_u64, get_opt_string, parse_datetime};
use crate::service::RollService;

const SELECT_COLS: &str = "id, name, subject, email, created_at";

fn row_to_teacher(row: &libsql::Row) -> Result<Teacher, DatabaseError> {
    Ok(Teacher {
        id: row.get(0)?,
        name: row.get(1)?,
        subject: get_opt_string(row, 2)?,
        email: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl RollService {
    /// Create a teacher, recording a `create` audit entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn create_teacher(
        &self,
        name: &str,
        subject: Option<&str>,
        email: Option<&str>,
        meta: &RequestMeta,
    ) -> Result<Teacher, DatabaseError> {
        let id = self.db().generate_id(PREFIX_TEACHER).await?;
        let now = self.now();

        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO teachers ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![id.as_str(), name, subject, email, now.to_rfc3339()],
            )
            .await?;

        self.audit_best_effort(NewAuditRecord {
            action: AuditAction::Create,
            entity_type: EntityType::Teacher,
            entity_id: id.clone(),
            actor_id: meta.actor_or_system().to_string(),
            description: format!("Created teacher {name}"),
            detail: None,
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
        })
        .await;

        Ok(Teacher {
            id,
            name: name.to_string(),
            subject: subject.map(String::from),
            email: email.map(String::from),
            created_at: now,
        })
    }

    /// Fetch a teacher by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such teacher exists.
    pub async fn get_teacher(&self, id: &str) -> Result<Teacher, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM teachers WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| DatabaseError::NotFound {
            entity_type: EntityType::Teacher.to_string(),
            id: id.to_string(),
        })?;
        row_to_teacher(&row)
    }

    /// List teachers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_teachers(&self, limit: u32) -> Result<Vec<Teacher>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM teachers ORDER BY created_at DESC LIMIT {limit}"
                ),
                (),
            )
            .await?;
        let mut teachers = Vec::new();
        while let Some(row) = rows.next().await? {
            teachers.push(row_to_teacher(&row)?);
        }
        Ok(teachers)
    }

    /// Delete a teacher, repairing every reference to it first.
    ///
    /// Steps, in order: (1) verify the teacher exists; (2) clear
    /// `classes.teacher_id` where it matches, then remove the teacher's
    /// subject-assignment entries; (3) delete the teacher row; (4) append an
    /// audit record for the attempt (success or failure) before returning.
    /// An audit append failure is logged and swallowed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the teacher does not exist. No side effects, no audit
    ///   record: nothing was attempted.
    /// - `Cascade` if a repair or deletion step failed; earlier repairs are
    ///   not rolled back, leaving the orphan-safe state.
    pub async fn delete_teacher(
        &self,
        teacher_id: &str,
        meta: &RequestMeta,
    ) -> Result<CascadeSummary, DatabaseError> {
        self.get_teacher(teacher_id).await?;

        match self.cascade_delete_teacher(teacher_id).await {
            Ok(summary) => {
                self.audit_best_effort(NewAuditRecord {
                    action: AuditAction::Delete,
                    entity_type: EntityType::Teacher,
                    entity_id: teacher_id.to_string(),
                    actor_id: meta.actor_or_system().to_string(),
                    description: format!(
                        "Deleted teacher {teacher_id}: {} classes updated, {} subject assignments removed",
                        summary.classes_updated, summary.subjects_removed
                    ),
                    detail: serde_json::to_value(summary).ok(),
                    ip_address: meta.ip_address.clone(),
                    user_agent: meta.user_agent.clone(),
                })
                .await;
                Ok(summary)
            }
            Err(err) => {
                let stage = match &err {
                    DatabaseError::Cascade { stage, .. } => *stage,
                    _ => "cascade",
                };
                self.audit_best_effort(NewAuditRecord {
                    action: AuditAction::Delete,
                    entity_type: EntityType::Teacher,
                    entity_id: teacher_id.to_string(),
                    actor_id: meta.actor_or_system().to_string(),
                    description: format!("Failed to delete teacher {teacher_id}"),
                    detail: serde_json::to_value(CascadeErrorDetail {
                        stage: stage.to_string(),
                        error: err.to_string(),
                    })
                    .ok(),
                    ip_address: meta.ip_address.clone(),
                    user_agent: meta.user_agent.clone(),
                })
                .await;
                Err(err)
            }
        }
    }

    /// Steps 2–3 of the cascade: repair both reference shapes, then delete
    /// the teacher row. Each step is a separate statement so its counter is
    /// auditable in isolation.
    async fn cascade_delete_teacher(
        &self,
        teacher_id: &str,
    ) -> Result<CascadeSummary, DatabaseError> {
        let conn = self.db().conn();

        // (a) Single-valued reference: clear the primary-teacher field.
        let primaries_cleared = conn
            .execute(
                "UPDATE classes SET teacher_id = NULL WHERE teacher_id = ?1",
                [teacher_id],
            )
            .await
            .map_err(|e| DatabaseError::cascade("clear_primary_teacher", e.into()))?;

        // (b) Multi-valued reference: count the classes that will lose
        // entries, then remove the entries themselves.
        let mut rows = conn
            .query(
                "SELECT COUNT(DISTINCT class_id) FROM class_subjects WHERE teacher_id = ?1",
                [teacher_id],
            )
            .await
            .map_err(|e| DatabaseError::cascade("count_subject_classes", e.into()))?;
        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::cascade("count_subject_classes", e.into()))?
            .ok_or_else(|| DatabaseError::cascade("count_subject_classes", DatabaseError::NoResult))?;
        let subject_classes = column_u64(&row, 0)?;

        let subjects_removed = conn
            .execute(
                "DELETE FROM class_subjects WHERE teacher_id = ?1",
                [teacher_id],
            )
            .await
            .map_err(|e| DatabaseError::cascade("remove_subject_assignments", e.into()))?;

        // (3) Only now is the teacher row itself removed.
        conn.execute("DELETE FROM teachers WHERE id = ?1", [teacher_id])
            .await
            .map_err(|e| DatabaseError::cascade("delete_teacher_row", e.into()))?;

        Ok(CascadeSummary {
            classes_updated: primaries_cleared + subject_classes,
            subjects_removed,
        })
    }
}
