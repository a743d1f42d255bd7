//! Access decision service — the ordered check pipeline.

use canvass_core::error::{CanvassError, CanvassResult};
use canvass_core::models::access::{Action, Role};
use canvass_core::models::audit::CreateAuditEntry;
use canvass_core::models::identity::IdentityStatus;
use canvass_core::repository::{AuditLogRepository, DeviceStateRepository, IdentityRepository};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::config::AccessConfig;
use crate::decision::{AccessRequest, Decision, DenyReason, Outcome};
use crate::policy::{GPS_GATED_RESOURCE, policy_for};

/// A deny reached part-way through the pipeline, with whatever role had
/// been resolved by then.
struct Denied {
    reason: DenyReason,
    role: Option<Role>,
}

impl Denied {
    fn new(reason: DenyReason, role: Option<Role>) -> Self {
        Self { reason, role }
    }
}

/// Access decision service.
///
/// Generic over repository implementations so that the decision layer
/// has no dependency on the database crate.
pub struct AccessDecisionService<I, D, A>
where
    I: IdentityRepository,
    D: DeviceStateRepository,
    A: AuditLogRepository,
{
    identities: I,
    devices: D,
    audit: A,
    config: AccessConfig,
}

impl<I, D, A> AccessDecisionService<I, D, A>
where
    I: IdentityRepository,
    D: DeviceStateRepository,
    A: AuditLogRepository,
{
    pub fn new(identities: I, devices: D, audit: A, config: AccessConfig) -> Self {
        Self {
            identities,
            devices,
            audit,
            config,
        }
    }

    /// Decide whether the request may proceed.
    ///
    /// Never fails: collaborator errors and timeouts become a deny with
    /// `internal_error`. Exactly one audit entry is appended per call,
    /// whatever the outcome.
    pub async fn decide(&self, request: AccessRequest) -> Decision {
        let timestamp = Utc::now();
        // Lookup, rate count and audit append all key on the same id.
        let request = AccessRequest {
            identity_id: request.identity_id.trim().to_string(),
            ..request
        };

        let (outcome, role) = match self.evaluate(&request, timestamp).await {
            Ok(role) => (Outcome::Allow, Some(role)),
            Err(denied) => (Outcome::Deny(denied.reason), denied.role),
        };

        let outcome = self.record(&request, outcome, timestamp).await;

        info!(
            identity_id = %request.identity_id,
            action = %request.action,
            resource_type = %request.resource_type,
            role = role.map(|r| r.as_str()).unwrap_or("unknown"),
            allowed = outcome.is_allowed(),
            reason = %outcome,
            "Access decision made"
        );

        Decision {
            outcome,
            role,
            timestamp,
        }
    }

    async fn evaluate(&self, request: &AccessRequest, now: DateTime<Utc>) -> Result<Role, Denied> {
        // 0. Caller must be identified.
        let identity_id = request.identity_id.as_str();
        if identity_id.is_empty() {
            return Err(Denied::new(DenyReason::NotAuthenticated, None));
        }

        // 1. Identity resolution.
        let identity = self
            .bounded("identity lookup", self.identities.get_by_id(identity_id))
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    Denied::new(DenyReason::UserNotFound, None)
                } else {
                    internal("identity lookup", &e, None)
                }
            })?;

        let role = identity.role.parse::<Role>().ok();

        // 2. Account status.
        if identity.status != IdentityStatus::Active {
            return Err(Denied::new(DenyReason::AccountNotActive, role));
        }

        // 3. Role resolution.
        let Some(role) = role else {
            warn!(identity_id, role = %identity.role, "Identity carries an unknown role");
            return Err(Denied::new(DenyReason::InvalidRole, None));
        };
        let Some(policy) = policy_for(role) else {
            return Err(Denied::new(DenyReason::InvalidRole, Some(role)));
        };

        // 4. Role policy.
        policy
            .evaluate(request.action, &request.resource_type)
            .map_err(|denial| Denied::new(DenyReason::PolicyDenied(denial), Some(role)))?;

        // 5. Field presence for monitors editing voter records.
        if role == Role::Monitor
            && request.resource_type == GPS_GATED_RESOURCE
            && request.action.is_mutating()
        {
            let active = match self
                .bounded("device state lookup", self.devices.get(identity_id))
                .await
            {
                Ok(state) => state.active,
                Err(e) if e.is_not_found() => false,
                Err(e) => return Err(internal("device state lookup", &e, Some(role))),
            };
            if !active {
                return Err(Denied::new(DenyReason::GpsInactive, Some(role)));
            }
        }

        // 6. Rate window for sensitive mutations.
        if matches!(request.action, Action::Update | Action::Delete) {
            let Some(since) = self
                .config
                .rate_window()
                .and_then(|window| now.checked_sub_signed(window))
            else {
                error!(
                    rate_window_secs = self.config.rate_window_secs,
                    "Rate window out of range, denying request"
                );
                return Err(Denied::new(DenyReason::InternalError, Some(role)));
            };
            let recent = self
                .bounded(
                    "rate window count",
                    self.audit.count_recent(identity_id, request.action, since),
                )
                .await
                .map_err(|e| internal("rate window count", &e, Some(role)))?;
            if recent > self.config.rate_limit {
                warn!(
                    identity_id,
                    action = %request.action,
                    recent,
                    limit = self.config.rate_limit,
                    "Rate limit exceeded"
                );
                return Err(Denied::new(DenyReason::RateLimitExceeded, Some(role)));
            }
        }

        Ok(role)
    }

    /// Append the audit entry for a reached outcome. An allow that
    /// cannot be recorded is turned into an internal-error deny.
    async fn record(
        &self,
        request: &AccessRequest,
        outcome: Outcome,
        timestamp: DateTime<Utc>,
    ) -> Outcome {
        let entry = CreateAuditEntry {
            identity_id: request.identity_id.clone(),
            action: request.action,
            resource_type: request.resource_type.clone(),
            resource_id: request.resource_id.clone(),
            allowed: outcome.is_allowed(),
            reason: outcome.to_string(),
            payload: request.payload.clone(),
            timestamp,
        };

        match self.bounded("audit append", self.audit.append(entry)).await {
            Ok(_) => outcome,
            Err(e) => {
                error!(
                    identity_id = %request.identity_id,
                    action = %request.action,
                    error = %e,
                    "Failed to append audit entry"
                );
                if outcome.is_allowed() {
                    Outcome::Deny(DenyReason::InternalError)
                } else {
                    outcome
                }
            }
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = CanvassResult<T>>,
    ) -> CanvassResult<T> {
        match tokio::time::timeout(self.config.store_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(CanvassError::Timeout {
                operation: operation.into(),
            }),
        }
    }
}

fn internal(operation: &'static str, err: &CanvassError, role: Option<Role>) -> Denied {
    error!(operation, error = %err, "Collaborator failure, denying request");
    Denied::new(DenyReason::InternalError, role)
}
