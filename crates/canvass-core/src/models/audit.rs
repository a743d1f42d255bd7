//! Audit log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::access::Action;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub identity_id: String,
    pub action: Action,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub allowed: bool,
    pub reason: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditEntry {
    pub identity_id: String,
    pub action: Action,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub allowed: bool,
    pub reason: String,
    pub payload: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}
