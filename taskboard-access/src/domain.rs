// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::MembershipSource;
use crate::principal::Principal;
use crate::role::Role;
use crate::traits::DomainDirectory;

/// Authoritative record of who leads and who belongs to a domain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Domain name.
    pub id: String,

    /// Email addresses of the domain's leads.
    #[serde(default)]
    pub leads: BTreeSet<String>,

    /// Email addresses of the domain's members.
    #[serde(default)]
    pub members: BTreeSet<String>,
}

impl DomainRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_lead(mut self, email: impl Into<String>) -> Self {
        self.leads.insert(email.into());
        self
    }

    pub fn with_member(mut self, email: impl Into<String>) -> Self {
        self.members.insert(email.into());
        self
    }

    /// Returns `true` if the given address is listed as a lead.
    pub fn has_lead(&self, email: &str) -> bool {
        contains_email(&self.leads, email)
    }

    /// Returns `true` if the given address is listed as a member.
    pub fn has_member(&self, email: &str) -> bool {
        contains_email(&self.members, email)
    }
}

fn contains_email(set: &BTreeSet<String>, email: &str) -> bool {
    !email.is_empty() && set.iter().any(|entry| entry.eq_ignore_ascii_case(email))
}

/// In-memory snapshot of domain records keyed by domain name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DomainRecord>", into = "Vec<DomainRecord>")]
pub struct DomainRecords(BTreeMap<String, DomainRecord>);

impl DomainRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any previous record of the same domain.
    pub fn insert(&mut self, record: DomainRecord) -> Option<DomainRecord> {
        self.0.insert(record.id.clone(), record)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl DomainDirectory for DomainRecords {
    fn record(&self, domain: &str) -> Option<&DomainRecord> {
        self.0.get(domain)
    }

    fn records(&self) -> impl Iterator<Item = &DomainRecord> {
        self.0.values()
    }
}

impl FromIterator<DomainRecord> for DomainRecords {
    fn from_iter<T: IntoIterator<Item = DomainRecord>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
        )
    }
}

impl From<Vec<DomainRecord>> for DomainRecords {
    fn from(records: Vec<DomainRecord>) -> Self {
        records.into_iter().collect()
    }
}

impl From<DomainRecords> for Vec<DomainRecord> {
    fn from(records: DomainRecords) -> Self {
        records.0.into_values().collect()
    }
}

/// Domain membership of principals, resolved against a snapshot of domain records.
///
/// Membership is the union of the domain records listing the principal's email and, under
/// [`MembershipSource::Union`], the role and domain fields stored on the principal itself.
#[derive(Debug)]
pub struct Membership<'a, D> {
    directory: &'a D,
    source: MembershipSource,
}

impl<'a, D> Membership<'a, D>
where
    D: DomainDirectory,
{
    pub fn new(directory: &'a D, source: MembershipSource) -> Self {
        Self { directory, source }
    }

    /// Returns `true` if the principal leads the given domain.
    pub fn is_lead(&self, principal: &Principal, domain: &str) -> bool {
        self.directory
            .record(domain)
            .is_some_and(|record| record.has_lead(&principal.email))
            || self.denormalized_with_role(principal, domain, Role::DomainLead)
    }

    /// Returns `true` if the principal is a (non-lead) member of the given domain.
    pub fn is_member(&self, principal: &Principal, domain: &str) -> bool {
        self.directory
            .record(domain)
            .is_some_and(|record| record.has_member(&principal.email))
            || self.denormalized_with_role(principal, domain, Role::Member)
    }

    /// Returns `true` if the given domain is part of the principal's effective domain set.
    pub fn belongs_to(&self, principal: &Principal, domain: &str) -> bool {
        self.directory.record(domain).is_some_and(|record| {
            record.has_lead(&principal.email) || record.has_member(&principal.email)
        }) || self.denormalized(principal, domain)
    }

    /// All domains the principal effectively belongs to.
    pub fn domains_of(&self, principal: &Principal) -> BTreeSet<String> {
        let mut domains: BTreeSet<String> = self
            .directory
            .records()
            .filter(|record| {
                record.has_lead(&principal.email) || record.has_member(&principal.email)
            })
            .map(|record| record.id.clone())
            .collect();

        if self.source.uses_denormalized() {
            domains.extend(principal.denormalized_domains().map(str::to_string));
        }

        domains
    }

    /// All domains the principal effectively leads.
    pub fn led_by(&self, principal: &Principal) -> BTreeSet<String> {
        let mut domains: BTreeSet<String> = self
            .directory
            .records()
            .filter(|record| record.has_lead(&principal.email))
            .map(|record| record.id.clone())
            .collect();

        if self.source.uses_denormalized() && principal.has_role(Role::DomainLead) {
            domains.extend(principal.denormalized_domains().map(str::to_string));
        }

        domains
    }

    fn denormalized(&self, principal: &Principal, domain: &str) -> bool {
        self.source.uses_denormalized() && principal.denormalized_domains().any(|d| d == domain)
    }

    fn denormalized_with_role(&self, principal: &Principal, domain: &str, role: Role) -> bool {
        principal.has_role(role) && self.denormalized(principal, domain)
    }
}
