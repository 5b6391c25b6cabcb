//! Audit trail entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{AuditAction, EntityType};

/// Actor recorded when a mutation has no authenticated caller.
pub const ACTOR_SYSTEM: &str = "system";

/// An append-only audit trail record. Immutable once written; `id` and
/// `created_at` are assigned server-side on append.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditRecord {
    pub id: String,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: String,
    /// Who performed the action, or [`ACTOR_SYSTEM`].
    pub actor_id: String,
    /// Human-readable summary of the mutation.
    pub description: String,
    /// Free-form structured payload (cascade counts, captured error text).
    pub detail: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The caller-supplied portion of an audit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewAuditRecord {
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub actor_id: String,
    pub description: String,
    pub detail: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Request metadata forwarded into audit records. Every field is optional;
/// absent values are recorded as empty/omitted, never fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestMeta {
    pub actor_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMeta {
    /// The actor to record: the supplied one, or [`ACTOR_SYSTEM`].
    #[must_use]
    pub fn actor_or_system(&self) -> &str {
        self.actor_id.as_deref().unwrap_or(ACTOR_SYSTEM)
    }
}
