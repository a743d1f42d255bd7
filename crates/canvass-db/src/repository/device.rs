//! SurrealDB implementation of [`DeviceStateRepository`].
//!
//! One record per monitor, keyed by identity id. The record is upserted
//! whenever the mobile client starts or stops location reporting.

use canvass_core::error::CanvassResult;
use canvass_core::models::device::DeviceState;
use canvass_core::repository::DeviceStateRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DeviceStateRow {
    active: bool,
    updated_at: DateTime<Utc>,
}

impl DeviceStateRow {
    fn into_state(self, identity_id: String) -> DeviceState {
        DeviceState {
            identity_id,
            active: self.active,
            updated_at: self.updated_at,
        }
    }
}

/// SurrealDB implementation of the device-state repository.
#[derive(Clone)]
pub struct SurrealDeviceStateRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDeviceStateRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DeviceStateRepository for SurrealDeviceStateRepository<C> {
    async fn get(&self, identity_id: &str) -> CanvassResult<DeviceState> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('device_state', $id)")
            .bind(("id", identity_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DeviceStateRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "device_state".into(),
            id: identity_id.to_string(),
        })?;

        Ok(row.into_state(identity_id.to_string()))
    }

    async fn set_active(&self, identity_id: &str, active: bool) -> CanvassResult<DeviceState> {
        let result = self
            .db
            .query(
                "UPSERT type::record('device_state', $id) SET \
                 active = $active, updated_at = time::now()",
            )
            .bind(("id", identity_id.to_string()))
            .bind(("active", active))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DeviceStateRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "device_state".into(),
            id: identity_id.to_string(),
        })?;

        Ok(row.into_state(identity_id.to_string()))
    }
}
