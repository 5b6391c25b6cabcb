//! Class repository.
//!
//! Classes hold the two reference shapes the deletion coordinator repairs:
//! the single-valued primary teacher (`teacher_id`) and the multi-valued
//! subject-assignment list (`class_subjects` rows).

use roll_core::entities::{Class, NewAuditRecord, RequestMeta, SubjectAssignment};
use roll_core::enums::{AuditAction, EntityType};
use roll_core::ids::{PREFIX_CLASS, PREFIX_SUBJECT};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::RollService;

const SELECT_COLS: &str = "id, name, grade, teacher_id, created_at";

fn row_to_class(row: &libsql::Row) -> Result<Class, DatabaseError> {
    Ok(Class {
        id: row.get(0)?,
        name: row.get(1)?,
        grade: get_opt_string(row, 2)?,
        teacher_id: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

fn row_to_assignment(row: &libsql::Row) -> Result<SubjectAssignment, DatabaseError> {
    Ok(SubjectAssignment {
        id: row.get(0)?,
        class_id: row.get(1)?,
        teacher_id: row.get(2)?,
        subject: row.get(3)?,
    })
}

impl RollService {
    /// Create a class, recording a `create` audit entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn create_class(
        &self,
        name: &str,
        grade: Option<&str>,
        teacher_id: Option<&str>,
        meta: &RequestMeta,
    ) -> Result<Class, DatabaseError> {
        let id = self.db().generate_id(PREFIX_CLASS).await?;
        let now = self.now();

        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO classes ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![id.as_str(), name, grade, teacher_id, now.to_rfc3339()],
            )
            .await?;

        self.audit_best_effort(NewAuditRecord {
            action: AuditAction::Create,
            entity_type: EntityType::Class,
            entity_id: id.clone(),
            actor_id: meta.actor_or_system().to_string(),
            description: format!("Created class {name}"),
            detail: None,
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
        })
        .await;

        Ok(Class {
            id,
            name: name.to_string(),
            grade: grade.map(String::from),
            teacher_id: teacher_id.map(String::from),
            created_at: now,
        })
    }

    /// Fetch a class by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such class exists.
    pub async fn get_class(&self, id: &str) -> Result<Class, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM classes WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| DatabaseError::NotFound {
            entity_type: EntityType::Class.to_string(),
            id: id.to_string(),
        })?;
        row_to_class(&row)
    }

    /// Add an entry to a class's subject-assignment list.
    ///
    /// # Errors
    ///
    /// `NotFound` if the class does not exist.
    pub async fn assign_subject(
        &self,
        class_id: &str,
        teacher_id: &str,
        subject: &str,
    ) -> Result<SubjectAssignment, DatabaseError> {
        self.get_class(class_id).await?;

        let id = self.db().generate_id(PREFIX_SUBJECT).await?;
        self.db()
            .conn()
            .execute(
                "INSERT INTO class_subjects (id, class_id, teacher_id, subject)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![id.as_str(), class_id, teacher_id, subject],
            )
            .await?;

        Ok(SubjectAssignment {
            id,
            class_id: class_id.to_string(),
            teacher_id: teacher_id.to_string(),
            subject: subject.to_string(),
        })
    }

    /// A class's subject-assignment list.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn subjects_for_class(
        &self,
        class_id: &str,
    ) -> Result<Vec<SubjectAssignment>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, class_id, teacher_id, subject FROM class_subjects
                 WHERE class_id = ?1 ORDER BY subject",
                [class_id],
            )
            .await?;
        let mut assignments = Vec::new();
        while let Some(row) = rows.next().await? {
            assignments.push(row_to_assignment(&row)?);
        }
        Ok(assignments)
    }

    /// Classes referencing a teacher through either shape: as primary
    /// teacher or through a subject-assignment entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn classes_for_teacher(
        &self,
        teacher_id: &str,
    ) -> Result<Vec<Class>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM classes
                     WHERE teacher_id = ?1
                        OR id IN (SELECT class_id FROM class_subjects WHERE teacher_id = ?1)
                     ORDER BY name"
                ),
                [teacher_id],
            )
            .await?;
        let mut classes = Vec::new();
        while let Some(row) = rows.next().await? {
            classes.push(row_to_class(&row)?);
        }
        Ok(classes)
    }
}
