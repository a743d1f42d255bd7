//! Request and decision types.

use std::fmt;

use canvass_core::models::access::{Action, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::PolicyDenial;

/// A caller asking whether it may perform `action` on `resource_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    pub identity_id: String,
    pub action: Action,
    pub resource_type: String,
    /// Recorded for audit only.
    #[serde(default)]
    pub resource_id: Option<String>,
    /// Recorded for audit only.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

/// Why a request was denied. Exactly one reason per denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    NotAuthenticated,
    UserNotFound,
    AccountNotActive,
    InvalidRole,
    PolicyDenied(PolicyDenial),
    GpsInactive,
    RateLimitExceeded,
    InternalError,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::NotAuthenticated => "not_authenticated",
            DenyReason::UserNotFound => "user_not_found",
            DenyReason::AccountNotActive => "account_not_active",
            DenyReason::InvalidRole => "invalid_role",
            DenyReason::PolicyDenied(_) => "policy_denied",
            DenyReason::GpsInactive => "gps_inactive",
            DenyReason::RateLimitExceeded => "rate_limit_exceeded",
            DenyReason::InternalError => "internal_error",
        }
    }

    /// Role-specific sub-reason, only present for policy denials.
    pub fn detail(&self) -> Option<String> {
        match self {
            DenyReason::PolicyDenied(denial) => Some(denial.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Allow,
    Deny(DenyReason),
}

impl Outcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Outcome::Allow)
    }

    pub fn reason_code(&self) -> &'static str {
        match self {
            Outcome::Allow => "ok",
            Outcome::Deny(reason) => reason.code(),
        }
    }

    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Outcome::Allow => None,
            Outcome::Deny(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Deny(DenyReason::PolicyDenied(denial)) => {
                write!(f, "policy_denied: {denial}")
            }
            other => f.write_str(other.reason_code()),
        }
    }
}

/// Result of a single `decide` call.
#[derive(Debug, Clone)]
pub struct Decision {
    pub outcome: Outcome,
    /// The caller's role, when it could be resolved.
    pub role: Option<Role>,
    pub timestamp: DateTime<Utc>,
}

impl Decision {
    pub fn allowed(&self) -> bool {
        self.outcome.is_allowed()
    }

    pub fn reason(&self) -> &'static str {
        self.outcome.reason_code()
    }

    pub fn detail(&self) -> Option<String> {
        self.outcome.deny_reason().and_then(DenyReason::detail)
    }
}
