// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::role::{self, Role};

/// An authenticated dashboard user whose access is being evaluated.
///
/// The `domain`, `domains` and `role` fields are denormalized copies kept on the user document.
/// They can drift from the authoritative [`DomainRecord`](crate::DomainRecord)s; see
/// [`MembershipSource`](crate::MembershipSource) for how the two are combined.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,

    #[serde(default)]
    pub email: String,

    /// `None` when the stored role is missing or unknown. Such principals are treated as members
    /// without any domain.
    #[serde(default, deserialize_with = "role::deserialize_lenient")]
    pub role: Option<Role>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,

    /// Domain currently selected in the dashboard. Scopes views, never grants access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_domain: Option<String>,
}

impl Principal {
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role: Some(role),
            ..Default::default()
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_active_domain(mut self, domain: impl Into<String>) -> Self {
        self.active_domain = Some(domain.into());
        self
    }

    /// Role used for rule selection. Principals without a role fall back to the most restrictive
    /// one.
    pub fn effective_role(&self) -> Role {
        self.role.unwrap_or(Role::Member)
    }

    /// Returns `true` if the principal holds the given role explicitly.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    /// Domains recorded on the user document itself, `domain` first.
    ///
    /// Empty for principals without a role, whatever their stored fields say.
    pub fn denormalized_domains(&self) -> impl Iterator<Item = &str> {
        self.domain
            .iter()
            .chain(self.domains.iter())
            .filter(|_| self.role.is_some())
            .map(String::as_str)
            .filter(|domain| !domain.is_empty())
    }

    /// Returns `true` if the given address is this principal's email.
    ///
    /// Empty addresses never match.
    pub fn has_email(&self, email: &str) -> bool {
        !self.email.is_empty() && self.email.eq_ignore_ascii_case(email)
    }
}

/// Reference to a user embedded in a target document (assignee, lead, author).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }

    /// Returns `true` if this reference points at the given principal.
    ///
    /// References are compared by id only. Empty ids never match.
    pub fn refers_to(&self, principal: &Principal) -> bool {
        !self.id.is_empty() && self.id == principal.id
    }
}

impl From<&Principal> for UserRef {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.clone(),
            email: Some(principal.email.clone()),
        }
    }
}
