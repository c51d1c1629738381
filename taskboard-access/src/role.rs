// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Roles a dashboard user can hold.
///
/// Roles are not transitive for visibility: an admin does not implicitly match selectors aimed at
/// domain leads or members. Per-feature carve-outs are applied by the resolver instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    SuperAdmin,
    Admin,
    DomainLead,
    Member,
}

impl Role {
    /// All roles in descending order of privilege.
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::DomainLead, Role::Member];

    /// Wire representation as stored on user documents and inside `role-<role>` selectors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super-admin",
            Role::Admin => "admin",
            Role::DomainLead => "domain-lead",
            Role::Member => "member",
        }
    }

    /// Returns `true` for super-admins and admins.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super-admin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "domain-lead" => Ok(Role::DomainLead),
            "member" => Ok(Role::Member),
            other => Err(RoleError::UnknownRole(other.to_string())),
        }
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Deserialize an optional role, mapping unknown role strings to `None`.
///
/// User documents are written by other tools and may carry roles this crate does not know about.
/// Those principals are evaluated as members without a role instead of failing to load.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value.parse::<Role>() {
        Ok(role) => Some(role),
        Err(err) => {
            tracing::warn!(%err, "ignoring role on principal");
            None
        }
    }))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Role, RoleError};

    #[rstest]
    #[case("super-admin", Role::SuperAdmin)]
    #[case("admin", Role::Admin)]
    #[case("domain-lead", Role::DomainLead)]
    #[case("member", Role::Member)]
    fn parse_wire_strings(#[case] input: &str, #[case] expected: Role) {
        assert_eq!(input.parse::<Role>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[rstest]
    #[case("Admin")]
    #[case("superadmin")]
    #[case("")]
    #[case("lead")]
    fn reject_unknown_roles(#[case] input: &str) {
        assert_eq!(
            input.parse::<Role>(),
            Err(RoleError::UnknownRole(input.to_string()))
        );
    }

    #[test]
    fn admin_roles() {
        assert!(Role::SuperAdmin.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(!Role::DomainLead.is_admin());
        assert!(!Role::Member.is_admin());
    }
}
