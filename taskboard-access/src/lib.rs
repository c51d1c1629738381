// SPDX-License-Identifier: MIT OR Apache-2.0

//! Visibility and permission resolution for a role-based team dashboard.
//!
//! Users hold one of four roles (super-admin, admin, domain-lead, member) and belong to domains.
//! Tasks are scoped to a domain, while announcements and documentation items carry lists of
//! [`Selector`]s naming who may see them. [`AccessResolver`] decides whether a [`Principal`] may
//! view or manage such a target, given a [`Snapshot`] of the authoritative [`DomainRecord`]s.
//!
//! Decisions fail closed: a missing principal, a missing domain record or a malformed selector
//! never grants access.
//!
//! ```
//! use taskboard_access::{
//!     AccessResolver, DomainRecord, DomainRecords, Principal, Role, Snapshot, Task, TaskStatus,
//!     Timestamp, UserRef,
//! };
//!
//! let domains = DomainRecords::from(vec![
//!     DomainRecord::new("Mechanical").with_lead("lead@example.org"),
//! ]);
//! let snapshot = Snapshot::new(&domains, Timestamp::now());
//! let resolver = AccessResolver::default();
//!
//! let lead = Principal::new("L1", "lead@example.org", Role::DomainLead);
//! let task = Task::new("t1", "Mechanical", TaskStatus::Unassigned)
//!     .with_lead(UserRef::new("L1"));
//!
//! assert!(resolver.can_view(Some(&lead), &task, &snapshot));
//! assert!(!resolver.can_view(None, &task, &snapshot));
//! ```
mod access;
mod config;
pub mod documentation;
mod domain;
mod principal;
mod recipients;
pub mod request;
mod resolver;
mod role;
pub mod selector;
mod target;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
#[cfg(test)]
mod tests;
pub mod traits;

pub use access::{Access, Decision, Reason};
pub use config::{DEFAULT_DOCUMENTATION_DOMAIN, MembershipSource, ResolverConfig};
pub use documentation::{DocumentationTree, DocumentationTreeError};
pub use domain::{DomainRecord, DomainRecords, Membership};
pub use principal::{Principal, UserRef};
pub use resolver::{AccessResolver, Snapshot};
pub use role::{Role, RoleError};
pub use selector::{Selector, SelectorError, SelectorList, Subrole};
pub use target::{
    Announcement, AnnouncementStatus, DocumentationItem, DocumentationKind, Target, Task,
    TaskStatus, Timestamp,
};
