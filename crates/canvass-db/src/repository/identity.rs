//! SurrealDB implementation of [`IdentityRepository`].

use canvass_core::error::CanvassResult;
use canvass_core::models::identity::{CreateIdentity, Identity, IdentityStatus};
use canvass_core::repository::IdentityRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct IdentityRow {
    display_name: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<IdentityStatus, DbError> {
    match s {
        "Active" => Ok(IdentityStatus::Active),
        "Inactive" => Ok(IdentityStatus::Inactive),
        "Suspended" => Ok(IdentityStatus::Suspended),
        other => Err(DbError::Decode(format!("unknown identity status: {other}"))),
    }
}

fn status_to_string(s: IdentityStatus) -> &'static str {
    match s {
        IdentityStatus::Active => "Active",
        IdentityStatus::Inactive => "Inactive",
        IdentityStatus::Suspended => "Suspended",
    }
}

impl IdentityRow {
    fn into_identity(self, id: String) -> Result<Identity, DbError> {
        Ok(Identity {
            id,
            display_name: self.display_name,
            role: self.role,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Identity repository.
#[derive(Clone)]
pub struct SurrealIdentityRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealIdentityRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> IdentityRepository for SurrealIdentityRepository<C> {
    async fn create(&self, input: CreateIdentity) -> CanvassResult<Identity> {
        let result = self
            .db
            .query(
                "CREATE type::record('identity', $id) SET \
                 display_name = $display_name, \
                 role = $role, \
                 status = $status",
            )
            .bind(("id", input.id.clone()))
            .bind(("display_name", input.display_name))
            .bind(("role", input.role))
            .bind(("status", status_to_string(input.status).to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<IdentityRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "identity".into(),
            id: input.id.clone(),
        })?;

        Ok(row.into_identity(input.id)?)
    }

    async fn get_by_id(&self, id: &str) -> CanvassResult<Identity> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('identity', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdentityRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "identity".into(),
            id: id.to_string(),
        })?;

        Ok(row.into_identity(id.to_string())?)
    }

    async fn set_status(&self, id: &str, status: IdentityStatus) -> CanvassResult<Identity> {
        let result = self
            .db
            .query(
                "UPDATE type::record('identity', $id) SET \
                 status = $status, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("status", status_to_string(status).to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<IdentityRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "identity".into(),
            id: id.to_string(),
        })?;

        Ok(row.into_identity(id.to_string())?)
    }
}
