//! Static role policy table.
//!
//! Each role maps to one declarative [`RolePolicy`] entry. The decision
//! pipeline looks the entry up once and evaluates it the same way for
//! every role, so adding a role means adding a row here.

use std::fmt;

use canvass_core::models::access::{Action, Role};

/// Resource type whose mutation by a monitor requires an active GPS
/// session.
pub const GPS_GATED_RESOURCE: &str = "voters";

/// Which resource types a role may touch at all.
#[derive(Debug, Clone, Copy)]
pub enum ResourceScope {
    Any,
    Only(&'static [&'static str]),
}

/// An action forbidden for a role, on one resource type or on all.
#[derive(Debug, Clone, Copy)]
pub struct Prohibition {
    pub action: Action,
    /// `None` forbids the action on every resource type.
    pub resource_type: Option<&'static str>,
}

impl Prohibition {
    fn matches(&self, action: Action, resource_type: &str) -> bool {
        self.action == action && self.resource_type.is_none_or(|r| r == resource_type)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RolePolicy {
    pub role: Role,
    pub resources: ResourceScope,
    /// Resource types that are read-only for this role.
    pub mutation_restricted: &'static [&'static str],
    pub prohibited: &'static [Prohibition],
}

/// Role-specific reason surfaced with a `policy_denied` outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDenial {
    /// Mutation of a read-only resource type.
    RestrictedResource(Role),
    /// Resource type outside the role's scope.
    ResourceNotPermitted(Role),
    /// Action explicitly prohibited for the role.
    ActionForbidden(Role, Action),
}

impl fmt::Display for PolicyDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyDenial::RestrictedResource(role) => write!(f, "restricted_table_for_{role}"),
            PolicyDenial::ResourceNotPermitted(role) => {
                write!(f, "resource_not_permitted_for_{role}")
            }
            PolicyDenial::ActionForbidden(role, action) => {
                write!(f, "{}_forbidden_for_{role}", action.as_str().to_lowercase())
            }
        }
    }
}

impl RolePolicy {
    pub fn evaluate(&self, action: Action, resource_type: &str) -> Result<(), PolicyDenial> {
        if let ResourceScope::Only(allowed) = self.resources {
            if !allowed.contains(&resource_type) {
                return Err(PolicyDenial::ResourceNotPermitted(self.role));
            }
        }

        if action.is_mutating() && self.mutation_restricted.contains(&resource_type) {
            return Err(PolicyDenial::RestrictedResource(self.role));
        }

        if self
            .prohibited
            .iter()
            .any(|p| p.matches(action, resource_type))
        {
            return Err(PolicyDenial::ActionForbidden(self.role, action));
        }

        Ok(())
    }
}

static POLICY_TABLE: [RolePolicy; 4] = [
    RolePolicy {
        role: Role::SuperAdmin,
        resources: ResourceScope::Any,
        mutation_restricted: &[],
        prohibited: &[],
    },
    RolePolicy {
        role: Role::Admin,
        resources: ResourceScope::Any,
        mutation_restricted: &["users", "roles", "salaries"],
        prohibited: &[],
    },
    RolePolicy {
        role: Role::Monitor,
        resources: ResourceScope::Only(&[
            "voters",
            "families",
            "reports",
            "issues",
            "route_history",
        ]),
        mutation_restricted: &[],
        prohibited: &[Prohibition {
            action: Action::Delete,
            resource_type: Some("voters"),
        }],
    },
    RolePolicy {
        role: Role::Voter,
        resources: ResourceScope::Only(&["voters", "families", "issues"]),
        mutation_restricted: &[],
        prohibited: &[Prohibition {
            action: Action::Delete,
            resource_type: None,
        }],
    },
];

/// Look up the policy entry for a role.
pub fn policy_for(role: Role) -> Option<&'static RolePolicy> {
    POLICY_TABLE.iter().find(|p| p.role == role)
}
