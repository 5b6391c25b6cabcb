//! Service layer orchestrating database mutations with audit.
//!
//! `RollService` wraps `RollDb` (raw database access), a [`Clock`] (source of
//! "now"/"today"), and the general configuration (paging limits). All repo
//! methods are implemented as `impl RollService`.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use roll_config::GeneralConfig;

use crate::RollDb;
use crate::clock::{Clock, SystemClock};
use crate::error::DatabaseError;

/// Orchestrates database mutations with an audit trail.
///
/// Privileged mutation methods follow this protocol:
/// 1. Validate and execute the primary SQL
/// 2. Append an audit record
/// 3. If the audit append fails, log it and return the primary outcome
///    unchanged (an audit failure never unwinds a completed mutation)
pub struct RollService {
    db: RollDb,
    general: GeneralConfig,
    clock: Arc<dyn Clock>,
}

impl RollService {
    /// Create a new service wrapping a local database, using the wall clock.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for
    ///   tests.
    /// * `general` - Paging configuration (see `roll-config`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str, general: GeneralConfig) -> Result<Self, DatabaseError> {
        let db = RollDb::open_local(db_path).await?;
        Ok(Self {
            db,
            general,
            clock: Arc::new(SystemClock),
        })
    }

    /// Create from an existing `RollDb` with an explicit clock (for testing).
    #[must_use]
    pub fn from_db(db: RollDb, general: GeneralConfig, clock: Arc<dyn Clock>) -> Self {
        Self { db, general, clock }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &RollDb {
        &self.db
    }

    /// Paging configuration.
    #[must_use]
    pub const fn general(&self) -> &GeneralConfig {
        &self.general
    }

    /// The current instant per the service clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The current calendar day per the service clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
