//! Typed audit detail payloads.
//!
//! Audit records carry a free-form `detail` JSON blob; these types give the
//! common shapes a schema. `CascadeSummary` doubles as the return value of
//! the teacher-deletion coordinator.

use serde::{Deserialize, Serialize};

/// Counts of reference repairs performed by a cascading teacher deletion.
///
/// `classes_updated` counts classes touched by either repair step (primary
/// teacher field cleared, or subject assignments removed); a class repaired
/// by both steps contributes to both addends. `subjects_removed` counts the
/// individual subject-assignment entries deleted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CascadeSummary {
    pub classes_updated: u64,
    pub subjects_removed: u64,
}

/// Detail recorded when a cascading deletion fails partway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CascadeErrorDetail {
    /// Which step of the cascade failed.
    pub stage: String,
    /// Display form of the underlying error.
    pub error: String,
}
