// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-contained access-check documents.
//!
//! A request bundles everything a decision depends on, so a decision taken by a route handler can
//! be replayed and inspected later:
//!
//! ```json
//! {
//!   "principal": { "id": "L1", "email": "l1@example.org", "role": "domain-lead" },
//!   "target": { "kind": "task", "id": "t1", "domain": "Mechanical", "status": "Unassigned" },
//!   "domains": [{ "id": "Mechanical", "leads": ["l1@example.org"] }],
//!   "now": 1700000000000
//! }
//! ```
use serde::{Deserialize, Serialize};

use crate::access::Decision;
use crate::domain::DomainRecords;
use crate::principal::Principal;
use crate::resolver::{AccessResolver, Snapshot};
use crate::target::{Announcement, DocumentationItem, Target, Task, Timestamp};

/// Owned version of [`Target`] with a `kind` tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TargetDocument {
    Task(Task),
    Announcement(Announcement),
    Documentation(DocumentationItem),
}

impl TargetDocument {
    pub fn as_target(&self) -> Target<'_> {
        match self {
            TargetDocument::Task(task) => Target::Task(task),
            TargetDocument::Announcement(announcement) => Target::Announcement(announcement),
            TargetDocument::Documentation(item) => Target::Documentation(item),
        }
    }
}

/// Inputs of a single access decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCheckRequest {
    #[serde(default)]
    pub principal: Option<Principal>,

    pub target: TargetDocument,

    #[serde(default)]
    pub domains: DomainRecords,

    /// Time of the decision. Current time when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now: Option<Timestamp>,
}

/// Outcome of an [`AccessCheckRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessCheckReport {
    pub view: Decision,
    pub manage: Decision,
}

impl AccessCheckRequest {
    /// Evaluate view and manage access for the request.
    pub fn evaluate(&self, resolver: &AccessResolver) -> AccessCheckReport {
        let snapshot = Snapshot::new(&self.domains, self.now.unwrap_or_else(Timestamp::now));
        let target = self.target.as_target();

        AccessCheckReport {
            view: resolver.explain_view(self.principal.as_ref(), target, &snapshot),
            manage: resolver.explain_manage(self.principal.as_ref(), target, &snapshot),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::access::{Decision, Reason};
    use crate::resolver::AccessResolver;

    use super::{AccessCheckRequest, TargetDocument};

    #[test]
    fn evaluate_task_request() {
        let json = r#"{
            "principal": {"id": "L1", "email": "l1@example.org", "role": "domain-lead"},
            "target": {
                "kind": "task",
                "id": "t1",
                "domain": "Mechanical",
                "status": "Unassigned",
                "assignedToLead": {"id": "L1"}
            },
            "domains": [{"id": "Mechanical", "leads": ["l1@example.org"]}],
            "now": 1700000000000
        }"#;
        let request: AccessCheckRequest = serde_json::from_str(json).unwrap();
        assert_matches!(request.target, TargetDocument::Task(_));

        let report = request.evaluate(&AccessResolver::default());
        assert_eq!(
            report.view,
            Decision::Allowed(Reason::LeadsDomain("Mechanical".into()))
        );
        assert!(report.manage.is_allowed());
    }

    #[test]
    fn missing_principal_is_denied() {
        let json = r#"{
            "target": {"kind": "documentation", "id": "d1", "viewableBy": ["all"], "type": "file"}
        }"#;
        let request: AccessCheckRequest = serde_json::from_str(json).unwrap();
        let report = request.evaluate(&AccessResolver::default());
        assert_eq!(report.view, Decision::Denied(Reason::NoPrincipal));
        assert_eq!(report.manage, Decision::Denied(Reason::NoPrincipal));
    }

    #[test]
    fn scheduled_announcement() {
        let json = r#"{
            "principal": {"id": "U1", "email": "u1@example.org", "role": "member"},
            "target": {
                "kind": "announcement",
                "id": "a1",
                "targets": ["all"],
                "status": "published",
                "publishAt": 1700003600000
            },
            "now": 1700000000000
        }"#;
        let request: AccessCheckRequest = serde_json::from_str(json).unwrap();
        let report = request.evaluate(&AccessResolver::default());
        assert_matches!(report.view, Decision::Denied(Reason::Scheduled(_)));
    }
}
