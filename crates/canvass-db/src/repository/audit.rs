//! SurrealDB implementation of [`AuditLogRepository`].
//!
//! Entries are append-only: the table definition forbids update and
//! delete. The entry timestamp is supplied by the caller so that the
//! rate window and the audit trail share one clock.

use canvass_core::error::CanvassResult;
use canvass_core::models::access::Action;
use canvass_core::models::audit::{AuditEntry, CreateAuditEntry};
use canvass_core::repository::AuditLogRepository;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AuditRow {
    identity_id: String,
    action: String,
    resource_type: String,
    resource_id: Option<String>,
    allowed: bool,
    reason: String,
    payload: Value,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AuditRowWithId {
    record_id: String,
    identity_id: String,
    action: String,
    resource_type: String,
    resource_id: Option<String>,
    allowed: bool,
    reason: String,
    payload: Value,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn row_to_entry(row: AuditRow, id: Uuid) -> Result<AuditEntry, DbError> {
    let action = row
        .action
        .parse::<Action>()
        .map_err(|e| DbError::Decode(e.to_string()))?;
    Ok(AuditEntry {
        id,
        identity_id: row.identity_id,
        action,
        resource_type: row.resource_type,
        resource_id: row.resource_id,
        allowed: row.allowed,
        reason: row.reason,
        payload: row.payload,
        timestamp: row.timestamp,
    })
}

impl AuditRowWithId {
    fn try_into_entry(self) -> Result<AuditEntry, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        row_to_entry(
            AuditRow {
                identity_id: self.identity_id,
                action: self.action,
                resource_type: self.resource_type,
                resource_id: self.resource_id,
                allowed: self.allowed,
                reason: self.reason,
                payload: self.payload,
                timestamp: self.timestamp,
            },
            id,
        )
    }
}

/// The payload column is an object; scalars and arrays are wrapped so
/// the caller's data is still recorded verbatim.
fn payload_object(payload: Option<Value>) -> Value {
    match payload {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(obj @ Value::Object(_)) => obj,
        Some(other) => {
            let mut wrapped = Map::new();
            wrapped.insert("value".into(), other);
            Value::Object(wrapped)
        }
    }
}

/// SurrealDB implementation of the audit log repository.
#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    async fn append(&self, input: CreateAuditEntry) -> CanvassResult<AuditEntry> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('audit_log', $id) SET \
                 identity_id = $identity_id, \
                 action = $action, \
                 resource_type = $resource_type, \
                 resource_id = $resource_id, \
                 allowed = $allowed, \
                 reason = $reason, \
                 payload = $payload, \
                 timestamp = $timestamp",
            )
            .bind(("id", id_str.clone()))
            .bind(("identity_id", input.identity_id))
            .bind(("action", input.action.as_str().to_string()))
            .bind(("resource_type", input.resource_type))
            .bind(("resource_id", input.resource_id))
            .bind(("allowed", input.allowed))
            .bind(("reason", input.reason))
            .bind(("payload", payload_object(input.payload)))
            .bind(("timestamp", input.timestamp))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<AuditRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "audit_log".into(),
            id: id_str,
        })?;

        Ok(row_to_entry(row, id)?)
    }

    async fn count_recent(
        &self,
        identity_id: &str,
        action: Action,
        since: DateTime<Utc>,
    ) -> CanvassResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM audit_log \
                 WHERE identity_id = $identity_id \
                 AND action = $action \
                 AND timestamp >= $since \
                 GROUP ALL",
            )
            .bind(("identity_id", identity_id.to_string()))
            .bind(("action", action.as_str().to_string()))
            .bind(("since", since))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn list_for_identity(
        &self,
        identity_id: &str,
        limit: u64,
    ) -> CanvassResult<Vec<AuditEntry>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM audit_log \
                 WHERE identity_id = $identity_id \
                 ORDER BY timestamp DESC \
                 LIMIT $limit",
            )
            .bind(("identity_id", identity_id.to_string()))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuditRowWithId> = result.take(0).map_err(DbError::from)?;

        let entries = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_object_wraps_non_objects() {
        assert_eq!(payload_object(None), json!({}));
        assert_eq!(payload_object(Some(Value::Null)), json!({}));
        assert_eq!(
            payload_object(Some(json!({"name": "Ana"}))),
            json!({"name": "Ana"})
        );
        assert_eq!(payload_object(Some(json!([1, 2]))), json!({"value": [1, 2]}));
    }
}
