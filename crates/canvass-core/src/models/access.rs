//! Roles and actions evaluated by the access policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CanvassError;

/// Closed set of permission classes a caller can hold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Monitor,
    Voter,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::Monitor, Role::Voter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Monitor => "monitor",
            Role::Voter => "voter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CanvassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "monitor" => Ok(Role::Monitor),
            "voter" => Ok(Role::Voter),
            other => Err(CanvassError::Validation {
                message: format!("unknown role: {other}"),
            }),
        }
    }
}

/// Operation a caller intends to perform on a resource type.
///
/// The SQL-flavoured names `INSERT` and `SELECT` are accepted on input
/// as aliases for `CREATE` and `READ`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    #[serde(alias = "INSERT")]
    Create,
    #[serde(alias = "SELECT")]
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Read => "READ",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
        }
    }

    /// Whether the action changes stored data.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Action::Read)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CanvassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" | "INSERT" => Ok(Action::Create),
            "READ" | "SELECT" => Ok(Action::Read),
            "UPDATE" => Ok(Action::Update),
            "DELETE" => Ok(Action::Delete),
            other => Err(CanvassError::Validation {
                message: format!("unknown action: {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tags_round_trip_through_from_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("coordinator".parse::<Role>().is_err());
    }

    #[test]
    fn sql_aliases_deserialize_to_canonical_actions() {
        let insert: Action = serde_json::from_str("\"INSERT\"").unwrap();
        let select: Action = serde_json::from_str("\"SELECT\"").unwrap();
        assert_eq!(insert, Action::Create);
        assert_eq!(select, Action::Read);
        assert_eq!(serde_json::to_string(&Action::Create).unwrap(), "\"CREATE\"");
    }

    #[test]
    fn only_read_is_non_mutating() {
        assert!(!Action::Read.is_mutating());
        assert!(Action::Create.is_mutating());
        assert!(Action::Update.is_mutating());
        assert!(Action::Delete.is_mutating());
    }

    #[test]
    fn lowercase_action_is_rejected() {
        assert!("delete".parse::<Action>().is_err());
        assert!(serde_json::from_str::<Action>("\"PATCH\"").is_err());
    }
}
