//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The decision engine is generic
//! over these traits so it can run against SurrealDB in production and
//! against in-process fakes in tests.

use chrono::{DateTime, Utc};

use crate::error::CanvassResult;
use crate::models::{
    access::Action,
    audit::{AuditEntry, CreateAuditEntry},
    device::DeviceState,
    identity::{CreateIdentity, Identity, IdentityStatus},
};

pub trait IdentityRepository: Send + Sync {
    fn create(&self, input: CreateIdentity) -> impl Future<Output = CanvassResult<Identity>> + Send;
    /// Returns `CanvassError::NotFound` when no identity has this id.
    fn get_by_id(&self, id: &str) -> impl Future<Output = CanvassResult<Identity>> + Send;
    fn set_status(
        &self,
        id: &str,
        status: IdentityStatus,
    ) -> impl Future<Output = CanvassResult<Identity>> + Send;
}

pub trait DeviceStateRepository: Send + Sync {
    /// Returns `CanvassError::NotFound` when the identity never reported.
    fn get(&self, identity_id: &str) -> impl Future<Output = CanvassResult<DeviceState>> + Send;
    /// Upsert the active flag for an identity.
    fn set_active(
        &self,
        identity_id: &str,
        active: bool,
    ) -> impl Future<Output = CanvassResult<DeviceState>> + Send;
}

// ---------------------------------------------------------------------------
// Audit (append-only)
// ---------------------------------------------------------------------------

pub trait AuditLogRepository: Send + Sync {
    /// Append a new audit entry. No update or delete operations exist.
    fn append(
        &self,
        input: CreateAuditEntry,
    ) -> impl Future<Output = CanvassResult<AuditEntry>> + Send;
    /// Count entries for `(identity_id, action)` with a timestamp at or
    /// after `since`.
    fn count_recent(
        &self,
        identity_id: &str,
        action: Action,
        since: DateTime<Utc>,
    ) -> impl Future<Output = CanvassResult<u64>> + Send;
    /// Most recent entries for an identity, newest first.
    fn list_for_identity(
        &self,
        identity_id: &str,
        limit: u64,
    ) -> impl Future<Output = CanvassResult<Vec<AuditEntry>>> + Send;
}
