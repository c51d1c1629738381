// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::selector::Selector;
use crate::target::Timestamp;

/// The two kinds of access which are resolved for a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Permission to see a target.
    View,

    /// Permission to edit or delete a target.
    Manage,
}

impl Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Access::View => "view",
            Access::Manage => "manage",
        };

        write!(f, "{}", s)
    }
}

/// Why access was granted or refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    /// Super-admins and admins bypass the rules of this feature.
    AdminOverride(Role),

    /// A selector of the target matched the principal.
    SelectorMatched(Selector),

    /// The principal is one of the task's assignees.
    Assignee,

    /// The task belongs to a domain the principal leads.
    LeadsDomain(String),

    /// The principal authored the announcement.
    Author,

    /// The principal leads the domain curating the documentation library.
    DocumentationCurator,

    /// No principal was supplied.
    NoPrincipal,

    /// The target's selector list is empty.
    NoSelectors,

    /// None of the target's selectors matched the principal.
    NoSelectorMatched,

    /// The announcement is a draft, archived or has an unknown status.
    NotPublished,

    /// The announcement is scheduled for publication later.
    Scheduled(Timestamp),

    /// The task lies outside every domain the principal leads.
    OutsideDomain,

    /// The task still waits to be handed out by another lead.
    AwaitingAnotherLead,

    /// The principal is not assigned to the task.
    NotAssigned,

    /// Only the author of the announcement may manage it.
    NotAuthor,

    /// The principal's role does not allow this.
    RoleNotPermitted(Option<Role>),
}

impl Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::AdminOverride(role) => write!(f, "{role} override"),
            Reason::SelectorMatched(selector) => write!(f, "matched selector '{selector}'"),
            Reason::Assignee => write!(f, "assigned to the task"),
            Reason::LeadsDomain(domain) => write!(f, "leads domain '{domain}'"),
            Reason::Author => write!(f, "author of the announcement"),
            Reason::DocumentationCurator => write!(f, "leads the documentation domain"),
            Reason::NoPrincipal => write!(f, "no principal"),
            Reason::NoSelectors => write!(f, "target has no selectors"),
            Reason::NoSelectorMatched => write!(f, "no selector matched"),
            Reason::NotPublished => write!(f, "announcement is not published"),
            Reason::Scheduled(at) => write!(f, "announcement is scheduled for {at}"),
            Reason::OutsideDomain => write!(f, "task is outside the led domains"),
            Reason::AwaitingAnotherLead => write!(f, "task awaits assignment by another lead"),
            Reason::NotAssigned => write!(f, "not assigned to the task"),
            Reason::NotAuthor => write!(f, "not the author of the announcement"),
            Reason::RoleNotPermitted(Some(role)) => write!(f, "role {role} is not permitted"),
            Reason::RoleNotPermitted(None) => write!(f, "principal has no role"),
        }
    }
}

/// Outcome of an access check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allowed(Reason),
    Denied(Reason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed(_))
    }

    pub fn is_denied(&self) -> bool {
        !self.is_allowed()
    }

    pub fn reason(&self) -> &Reason {
        match self {
            Decision::Allowed(reason) | Decision::Denied(reason) => reason,
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Allowed(reason) => write!(f, "allowed ({reason})"),
            Decision::Denied(reason) => write!(f, "denied ({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::role::Role;
    use crate::selector::Selector;
    use crate::target::Timestamp;

    use super::{Access, Decision, Reason};

    #[test]
    fn display() {
        assert_eq!(Access::View.to_string(), "view");
        assert_eq!(Access::Manage.to_string(), "manage");

        assert_eq!(
            Decision::Allowed(Reason::SelectorMatched(Selector::All)).to_string(),
            "allowed (matched selector 'all')"
        );
        assert_eq!(
            Decision::Denied(Reason::Scheduled(Timestamp::from_millis(42))).to_string(),
            "denied (announcement is scheduled for 42)"
        );
        assert_eq!(
            Decision::Allowed(Reason::AdminOverride(Role::SuperAdmin)).to_string(),
            "allowed (super-admin override)"
        );
    }

    #[test]
    fn reasons() {
        let decision = Decision::Denied(Reason::NoPrincipal);
        assert!(decision.is_denied());
        assert_eq!(decision.reason(), &Reason::NoPrincipal);
    }
}
