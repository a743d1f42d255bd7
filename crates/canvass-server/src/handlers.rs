//! HTTP request handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use canvass_access::{AccessDecisionService, AccessRequest, Decision, DenyReason, Outcome};
use canvass_core::repository::{AuditLogRepository, DeviceStateRepository, IdentityRepository};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Wire form of a decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    pub allowed: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub timestamp: String,
}

impl From<&Decision> for CheckResponse {
    fn from(decision: &Decision) -> Self {
        Self {
            allowed: decision.allowed(),
            reason: decision.reason().to_string(),
            detail: decision.detail(),
            role: decision.role.map(|r| r.as_str().to_string()),
            timestamp: decision.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// 200 for allow, 403 for policy denials, 429 for rate limiting and
/// 500 when the engine could not reach a decision.
pub fn status_for(outcome: &Outcome) -> StatusCode {
    match outcome {
        Outcome::Allow => StatusCode::OK,
        Outcome::Deny(DenyReason::RateLimitExceeded) => StatusCode::TOO_MANY_REQUESTS,
        Outcome::Deny(DenyReason::InternalError) => StatusCode::INTERNAL_SERVER_ERROR,
        Outcome::Deny(_) => StatusCode::FORBIDDEN,
    }
}

/// Gate a write attempted by the mobile client.
pub async fn security_check<I, D, A>(
    State(service): State<Arc<AccessDecisionService<I, D, A>>>,
    body: Result<Json<AccessRequest>, JsonRejection>,
) -> Response
where
    I: IdentityRepository + 'static,
    D: DeviceStateRepository + 'static,
    A: AuditLogRepository + 'static,
{
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            // No identity can be attributed, so nothing is audited.
            tracing::warn!(error = %rejection, "Rejected malformed security check request");
            let response = CheckResponse {
                allowed: false,
                reason: DenyReason::InternalError.code().to_string(),
                detail: None,
                role: None,
                timestamp: Utc::now().to_rfc3339(),
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
        }
    };

    let decision = service.decide(request).await;
    (status_for(&decision.outcome), Json(CheckResponse::from(&decision))).into_response()
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
