//! Audit trail repository.
//!
//! Append-only records of privileged mutations, with filtered/paginated
//! retrieval and time-windowed aggregation. Nothing in this workspace ever
//! issues an UPDATE or DELETE against `audit_trail`. Queries sort
//! explicitly and never rely on storage order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use roll_core::entities::{AuditRecord, NewAuditRecord};
use roll_core::enums::{AuditAction, EntityType};
use roll_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::helpers::{column_u64, get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::RollService;

/// Filter criteria for audit queries. All predicates are conjunctive.
#[derive(Debug, Default, Clone)]
pub struct AuditFilter {
    pub action: Option<AuditAction>,
    pub entity_type: Option<EntityType>,
    pub actor_id: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`.
    pub to: Option<DateTime<Utc>>,
}

/// Sortable audit columns. A closed enum so callers can never inject SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditSortField {
    Id,
    Action,
    EntityType,
    EntityId,
    ActorId,
    Description,
    IpAddress,
    UserAgent,
    #[default]
    CreatedAt,
}

impl AuditSortField {
    const fn as_column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Action => "action",
            Self::EntityType => "entity_type",
            Self::EntityId => "entity_id",
            Self::ActorId => "actor_id",
            Self::Description => "description",
            Self::IpAddress => "ip_address",
            Self::UserAgent => "user_agent",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// 1-based page request. A `page_size` of 0 means "use the configured
/// default"; anything above the configured maximum is clamped down to it.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
    pub sort: AuditSortField,
    pub order: SortOrder,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 0,
            sort: AuditSortField::default(),
            order: SortOrder::default(),
        }
    }
}

/// Pagination metadata returned alongside every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_matching: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// One page of audit records plus its pagination metadata.
#[derive(Debug)]
pub struct AuditPage {
    pub records: Vec<AuditRecord>,
    pub page: PageInfo,
}

/// Per-action aggregation: total count plus a breakdown by entity type.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSummary {
    pub total: u64,
    pub by_entity: BTreeMap<EntityType, u64>,
}

/// Aggregated counts keyed by action.
pub type AuditSummary = BTreeMap<AuditAction, ActionSummary>;

const SELECT_COLS: &str = "id, action, entity_type, entity_id, actor_id, description, detail, \
                           ip_address, user_agent, created_at";

fn row_to_record(row: &libsql::Row) -> Result<AuditRecord, DatabaseError> {
    Ok(AuditRecord {
        id: row.get(0)?,
        action: parse_enum(&row.get::<String>(1)?)?,
        entity_type: parse_enum(&row.get::<String>(2)?)?,
        entity_id: row.get(3)?,
        actor_id: row.get(4)?,
        description: row.get(5)?,
        detail: parse_optional_json(get_opt_string(row, 6)?.as_deref())?,
        ip_address: get_opt_string(row, 7)?,
        user_agent: get_opt_string(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

/// Build the WHERE clause and parameter list for a filter.
fn filter_clause(filter: &AuditFilter) -> (String, Vec<libsql::Value>) {
    let mut conditions = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if let Some(action) = filter.action {
        params.push(libsql::Value::Text(action.as_str().to_string()));
        conditions.push(format!("action = ?{}", params.len()));
    }
    if let Some(entity_type) = filter.entity_type {
        params.push(libsql::Value::Text(entity_type.as_str().to_string()));
        conditions.push(format!("entity_type = ?{}", params.len()));
    }
    if let Some(ref actor_id) = filter.actor_id {
        params.push(libsql::Value::Text(actor_id.clone()));
        conditions.push(format!("actor_id = ?{}", params.len()));
    }
    if let Some(from) = filter.from {
        params.push(libsql::Value::Text(from.to_rfc3339()));
        conditions.push(format!("created_at >= ?{}", params.len()));
    }
    if let Some(to) = filter.to {
        params.push(libsql::Value::Text(to.to_rfc3339()));
        conditions.push(format!("created_at < ?{}", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, params)
}

impl RollService {
    /// Append an audit record. `id` and `created_at` are assigned here.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, new: NewAuditRecord) -> Result<AuditRecord, DatabaseError> {
        let id = self.db().generate_id(PREFIX_AUDIT).await?;
        let created_at = self.now();

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO audit_trail ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    new.action.as_str(),
                    new.entity_type.as_str(),
                    new.entity_id.as_str(),
                    new.actor_id.as_str(),
                    new.description.as_str(),
                    new.detail.as_ref().map(std::string::ToString::to_string),
                    new.ip_address.as_deref(),
                    new.user_agent.as_deref(),
                    created_at.to_rfc3339()
                ],
            )
            .await?;

        Ok(AuditRecord {
            id,
            action: new.action,
            entity_type: new.entity_type,
            entity_id: new.entity_id,
            actor_id: new.actor_id,
            description: new.description,
            detail: new.detail,
            ip_address: new.ip_address,
            user_agent: new.user_agent,
            created_at,
        })
    }

    /// Append an audit record for an already-completed mutation.
    ///
    /// A failure here must not unwind the caller's primary outcome: it is
    /// logged for operator visibility and otherwise swallowed. Mutation
    /// paths call this; everything else uses [`Self::append_audit`].
    pub(crate) async fn audit_best_effort(&self, new: NewAuditRecord) {
        if let Err(error) = self.append_audit(new).await {
            tracing::error!(%error, "audit append failed; primary mutation outcome unaffected");
        }
    }

    /// Query audit records with optional filters, explicit sort, and 1-based
    /// pagination.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if either the count or the page query fails.
    pub async fn query_audit(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<AuditPage, DatabaseError> {
        let page_size = if page.page_size == 0 {
            self.general().default_page_size
        } else {
            page.page_size.min(self.general().max_page_size)
        }
        .max(1);
        let current_page = page.page.max(1);

        let (where_clause, params) = filter_clause(filter);

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT COUNT(*) FROM audit_trail {where_clause}"),
                libsql::params_from_iter(params.clone()),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let total_matching = column_u64(&row, 0)?;

        let offset = u64::from(current_page - 1) * u64::from(page_size);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM audit_trail {where_clause}
             ORDER BY {} {} LIMIT {page_size} OFFSET {offset}",
            page.sort.as_column(),
            page.order.as_sql(),
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_record(&row)?);
        }

        let total_pages = u32::try_from(total_matching.div_ceil(u64::from(page_size)))
            .unwrap_or(u32::MAX);
        Ok(AuditPage {
            records,
            page: PageInfo {
                current_page,
                total_pages,
                total_matching,
                has_next: u64::from(current_page) * u64::from(page_size) < total_matching,
                has_prev: current_page > 1,
            },
        })
    }

    /// Aggregate audit records over `[from, to)`: counts per
    /// (action, entity type) pair plus a total per action.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn aggregate_audit(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<AuditSummary, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT action, entity_type, COUNT(*)
                 FROM audit_trail
                 WHERE created_at >= ?1 AND created_at < ?2
                 GROUP BY action, entity_type",
                libsql::params![from.to_rfc3339(), to.to_rfc3339()],
            )
            .await?;

        let mut summary = AuditSummary::new();
        while let Some(row) = rows.next().await? {
            let action: AuditAction = parse_enum(&row.get::<String>(0)?)?;
            let entity_type: EntityType = parse_enum(&row.get::<String>(1)?)?;
            let count = column_u64(&row, 2)?;

            let entry = summary.entry(action).or_default();
            entry.total += count;
            entry.by_entity.insert(entity_type, count);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{TEST_NOW, test_service};
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use roll_core::entities::ACTOR_SYSTEM;
    use rstest::rstest;

    fn record(action: AuditAction, entity_type: EntityType, entity_id: &str) -> NewAuditRecord {
        NewAuditRecord {
            action,
            entity_type,
            entity_id: entity_id.to_string(),
            actor_id: ACTOR_SYSTEM.to_string(),
            description: format!("{action} {entity_type} {entity_id}"),
            detail: None,
            ip_address: None,
            user_agent: None,
        }
    }

    #[tokio::test]
    async fn append_assigns_id_and_timestamp() {
        let svc = test_service().await;
        let stored = svc
            .append_audit(record(AuditAction::Create, EntityType::Teacher, "tch-1"))
            .await
            .unwrap();

        assert!(stored.id.starts_with("aud-"));
        assert_eq!(stored.created_at, *TEST_NOW);

        let page = svc
            .query_audit(&AuditFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0], stored);
    }

    #[tokio::test]
    async fn filters_are_conjunctive() {
        let svc = test_service().await;
        svc.append_audit(record(AuditAction::Delete, EntityType::Teacher, "tch-1"))
            .await
            .unwrap();
        svc.append_audit(record(AuditAction::Delete, EntityType::Class, "cls-1"))
            .await
            .unwrap();
        svc.append_audit(record(AuditAction::Create, EntityType::Teacher, "tch-2"))
            .await
            .unwrap();

        let page = svc
            .query_audit(
                &AuditFilter {
                    action: Some(AuditAction::Delete),
                    entity_type: Some(EntityType::Teacher),
                    ..AuditFilter::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].entity_id, "tch-1");
    }

    #[tokio::test]
    async fn actor_filter() {
        let svc = test_service().await;
        let mut by_admin = record(AuditAction::Update, EntityType::Notice, "ntc-1");
        by_admin.actor_id = "usr-admin".to_string();
        svc.append_audit(by_admin).await.unwrap();
        svc.append_audit(record(AuditAction::Update, EntityType::Notice, "ntc-2"))
            .await
            .unwrap();

        let page = svc
            .query_audit(
                &AuditFilter {
                    actor_id: Some("usr-admin".to_string()),
                    ..AuditFilter::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].entity_id, "ntc-1");
    }

    #[tokio::test]
    async fn timestamp_window_is_inclusive_exclusive() {
        let svc = test_service().await;
        svc.append_audit(record(AuditAction::Create, EntityType::Student, "stu-1"))
            .await
            .unwrap();

        // from == created_at matches (inclusive)
        let page = svc
            .query_audit(
                &AuditFilter {
                    from: Some(*TEST_NOW),
                    ..AuditFilter::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.records.len(), 1);

        // to == created_at excludes (exclusive)
        let page = svc
            .query_audit(
                &AuditFilter {
                    to: Some(*TEST_NOW),
                    ..AuditFilter::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert!(page.records.is_empty());
    }

    #[rstest]
    #[case(1, 4, 10, 3, true, false)]
    #[case(2, 4, 10, 3, true, true)]
    #[case(3, 4, 10, 3, false, true)]
    #[case(1, 10, 10, 1, false, false)]
    #[case(1, 3, 0, 0, false, false)]
    #[tokio::test]
    async fn pagination_metadata_is_exact(
        #[case] page: u32,
        #[case] page_size: u32,
        #[case] total: u64,
        #[case] total_pages: u32,
        #[case] has_next: bool,
        #[case] has_prev: bool,
    ) {
        let svc = test_service().await;
        for i in 0..total {
            svc.append_audit(record(
                AuditAction::Create,
                EntityType::Homework,
                &format!("hwk-{i}"),
            ))
            .await
            .unwrap();
        }

        let result = svc
            .query_audit(
                &AuditFilter::default(),
                PageRequest {
                    page,
                    page_size,
                    ..PageRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            result.page,
            PageInfo {
                current_page: page,
                total_pages,
                total_matching: total,
                has_next,
                has_prev,
            }
        );
    }

    #[tokio::test]
    async fn page_size_is_clamped() {
        let svc = test_service().await;
        for i in 0..3 {
            svc.append_audit(record(
                AuditAction::Create,
                EntityType::Timetable,
                &format!("ttb-{i}"),
            ))
            .await
            .unwrap();
        }

        // Above the configured max (100): clamped, so one page holds all 3.
        let result = svc
            .query_audit(
                &AuditFilter::default(),
                PageRequest {
                    page_size: 10_000,
                    ..PageRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(result.records.len(), 3);
        assert_eq!(result.page.total_pages, 1);

        // Zero: replaced by the configured default (20).
        let result = svc
            .query_audit(&AuditFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(result.page.total_pages, 1);
    }

    #[tokio::test]
    async fn explicit_sort_by_entity_id() {
        let svc = test_service().await;
        for id in ["b", "c", "a"] {
            svc.append_audit(record(AuditAction::Create, EntityType::Class, id))
                .await
                .unwrap();
        }

        let page = svc
            .query_audit(
                &AuditFilter::default(),
                PageRequest {
                    sort: AuditSortField::EntityId,
                    order: SortOrder::Asc,
                    ..PageRequest::default()
                },
            )
            .await
            .unwrap();
        let ids: Vec<_> = page.records.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn aggregate_groups_by_action_then_entity() {
        let svc = test_service().await;
        svc.append_audit(record(AuditAction::Delete, EntityType::Teacher, "tch-1"))
            .await
            .unwrap();
        svc.append_audit(record(AuditAction::Delete, EntityType::Teacher, "tch-2"))
            .await
            .unwrap();
        svc.append_audit(record(AuditAction::Delete, EntityType::Class, "cls-1"))
            .await
            .unwrap();
        svc.append_audit(record(AuditAction::Create, EntityType::Student, "stu-1"))
            .await
            .unwrap();

        let summary = svc
            .aggregate_audit(*TEST_NOW - Duration::days(7), *TEST_NOW + Duration::days(1))
            .await
            .unwrap();

        let deletes = &summary[&AuditAction::Delete];
        assert_eq!(deletes.total, 3);
        assert_eq!(deletes.by_entity[&EntityType::Teacher], 2);
        assert_eq!(deletes.by_entity[&EntityType::Class], 1);
        assert_eq!(summary[&AuditAction::Create].total, 1);
        assert!(!summary.contains_key(&AuditAction::Update));
    }

    #[tokio::test]
    async fn aggregate_respects_window() {
        let svc = test_service().await;
        svc.append_audit(record(AuditAction::Delete, EntityType::Teacher, "tch-1"))
            .await
            .unwrap();

        // Window ending exactly at the record's timestamp excludes it.
        let summary = svc
            .aggregate_audit(*TEST_NOW - Duration::days(7), *TEST_NOW)
            .await
            .unwrap();
        assert!(summary.is_empty());
    }
}
