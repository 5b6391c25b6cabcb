//! # roll-db
//!
//! libSQL state for Rollcall: the append-only audit ledger, the per-student
//! attendance ledger, the cascading teacher-deletion coordinator, and the
//! plain entity repositories they collaborate with.
//!
//! All repository methods are implemented as `impl RollService`; see
//! [`service::RollService`].

pub mod clock;
pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;

mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for all Rollcall state operations.
///
/// Wraps a libSQL database and connection, and provides prefixed ID
/// generation. Migrations run automatically on open.
pub struct RollDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl RollDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        let roll_db = Self { db, conn };
        roll_db.run_migrations().await?;
        Ok(roll_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g. `"tch-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the
    /// prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> RollDb {
        RollDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "teachers",
            "classes",
            "class_subjects",
            "attendance_records",
            "audit_trail",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("tch").await.unwrap();
        assert!(id.starts_with("tch-"), "ID should start with 'tch-': {id}");
        assert_eq!(
            id.len(),
            12,
            "ID should be 12 chars (3 prefix + 1 dash + 8 hex): {id}"
        );

        let hex_part = &id[4..];
        assert!(
            hex_part.chars().all(|c| c.is_ascii_hexdigit()),
            "Random part should be hex: {hex_part}"
        );
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in roll_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        // Run migrations again, should not fail
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn attendance_unique_constraint_is_storage_level() {
        let db = test_db().await;

        db.conn()
            .execute(
                "INSERT INTO attendance_records (id, subject_id, day, status, total_present, total_days, created_at)
                 VALUES ('att-t1', 'S001', '2026-08-24', 'present', 1, 1, '2026-08-24T08:00:00+00:00')",
                (),
            )
            .await
            .unwrap();

        // Same (subject_id, day), different row id: the constraint, not the
        // application, must reject this.
        let result = db
            .conn()
            .execute(
                "INSERT INTO attendance_records (id, subject_id, day, status, total_present, total_days, created_at)
                 VALUES ('att-t2', 'S001', '2026-08-24', 'absent', 1, 2, '2026-08-24T09:00:00+00:00')",
                (),
            )
            .await;
        assert!(result.is_err(), "duplicate (subject_id, day) should be rejected");
    }
}
