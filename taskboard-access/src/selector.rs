// SPDX-License-Identifier: MIT OR Apache-2.0

//! Visibility selectors attached to announcements and documentation items.
//!
//! Stored documents carry selectors as plain strings following a small closed grammar:
//!
//! ```text
//! "all"
//! "role-<role>"            role ∈ {super-admin, admin, domain-lead, member}
//! "domain-<domainName>"
//! "<domainName>-lead"
//! "<domainName>-member"
//! "<literal-email-address>"
//! ```
//!
//! Strings are parsed once into [`Selector`] when a document is loaded. Strings which do not
//! follow the grammar are kept aside in the [`SelectorList`] so they survive a round-trip to the
//! database, but they never match anyone.
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

use crate::role::{Role, RoleError};

const ALL: &str = "all";
const ROLE_PREFIX: &str = "role-";
const DOMAIN_PREFIX: &str = "domain-";
const LEAD_SUFFIX: &str = "-lead";
const MEMBER_SUFFIX: &str = "-member";

/// Position a user holds inside a single domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subrole {
    Lead,
    Member,
}

impl Subrole {
    fn suffix(&self) -> &'static str {
        match self {
            Subrole::Lead => LEAD_SUFFIX,
            Subrole::Member => MEMBER_SUFFIX,
        }
    }
}

/// A single visibility rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Everyone.
    All,

    /// Every user holding the given role.
    Role(Role),

    /// Every lead or member of the given domain.
    Domain(String),

    /// Only the leads, or only the members, of the given domain.
    DomainRole { domain: String, subrole: Subrole },

    /// A single user, addressed by email.
    Email(String),
}

impl Selector {
    /// Parse a selector from its wire representation.
    ///
    /// Email addresses are recognised first (any string containing `@`), so addresses such as
    /// `domain-admin@example.org` are never mistaken for domain selectors. The `domain-` prefix
    /// takes precedence over the `-lead` / `-member` suffixes.
    pub fn new(value: &str) -> Result<Self, SelectorError> {
        if value == ALL {
            return Ok(Selector::All);
        }

        if let Some((local, host)) = value.split_once('@') {
            if local.is_empty() || host.is_empty() {
                return Err(SelectorError::MalformedEmail(value.to_string()));
            }
            return Ok(Selector::Email(value.to_string()));
        }

        if let Some(role) = value.strip_prefix(ROLE_PREFIX) {
            return Ok(Selector::Role(role.parse()?));
        }

        if let Some(domain) = value.strip_prefix(DOMAIN_PREFIX) {
            return Ok(Selector::Domain(domain_name(value, domain)?));
        }

        if let Some(domain) = value.strip_suffix(LEAD_SUFFIX) {
            return Ok(Selector::DomainRole {
                domain: domain_name(value, domain)?,
                subrole: Subrole::Lead,
            });
        }

        if let Some(domain) = value.strip_suffix(MEMBER_SUFFIX) {
            return Ok(Selector::DomainRole {
                domain: domain_name(value, domain)?,
                subrole: Subrole::Member,
            });
        }

        Err(SelectorError::UnrecognizedSelector(value.to_string()))
    }

    /// Returns `true` if this is the `all` selector.
    pub fn is_all(&self) -> bool {
        matches!(self, Selector::All)
    }

    /// Name of the domain this selector refers to, if any.
    pub fn domain(&self) -> Option<&str> {
        match self {
            Selector::Domain(domain) | Selector::DomainRole { domain, .. } => Some(domain),
            Selector::All | Selector::Role(_) | Selector::Email(_) => None,
        }
    }
}

fn domain_name(value: &str, domain: &str) -> Result<String, SelectorError> {
    if domain.is_empty() {
        return Err(SelectorError::EmptyDomain(value.to_string()));
    }
    Ok(domain.to_string())
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::All => write!(f, "{ALL}"),
            Selector::Role(role) => write!(f, "{ROLE_PREFIX}{role}"),
            Selector::Domain(domain) => write!(f, "{DOMAIN_PREFIX}{domain}"),
            Selector::DomainRole { domain, subrole } => write!(f, "{domain}{}", subrole.suffix()),
            Selector::Email(email) => write!(f, "{email}"),
        }
    }
}

impl Serialize for Selector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Selector::new(&value).map_err(serde::de::Error::custom)
    }
}

/// Ordered list of selectors as stored on a target.
///
/// An empty list means "nobody". Malformed entries are retained verbatim and re-emitted on
/// serialisation but are otherwise ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorList {
    raw: Vec<String>,
    selectors: Vec<Selector>,
    rejected: Vec<String>,
}

impl SelectorList {
    /// Parse a list of wire strings, logging and retaining malformed entries.
    pub fn parse<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for value in values {
            let value = value.as_ref();
            match Selector::new(value) {
                Ok(selector) => list.selectors.push(selector),
                Err(err) => {
                    warn!(%err, "ignoring malformed selector");
                    list.rejected.push(value.to_string());
                }
            }
            list.raw.push(value.to_string());
        }
        list
    }

    /// Well-formed selectors, in stored order.
    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.selectors.iter()
    }

    /// Raw strings which could not be parsed.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    /// Returns `true` if the list holds no entries at all, well-formed or not.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Number of stored entries, including malformed ones.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the list contains the `all` selector.
    pub fn contains_all(&self) -> bool {
        self.selectors.iter().any(Selector::is_all)
    }
}

impl FromIterator<Selector> for SelectorList {
    fn from_iter<T: IntoIterator<Item = Selector>>(iter: T) -> Self {
        let selectors: Vec<Selector> = iter.into_iter().collect();
        Self {
            raw: selectors.iter().map(ToString::to_string).collect(),
            selectors,
            rejected: Vec::new(),
        }
    }
}

impl Serialize for SelectorList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SelectorList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<String> = Vec::deserialize(deserializer)?;
        Ok(SelectorList::parse(raw))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("unrecognized selector '{0}'")]
    UnrecognizedSelector(String),

    #[error("selector '{0}' names an empty domain")]
    EmptyDomain(String),

    #[error("selector '{0}' is not a valid email address")]
    MalformedEmail(String),

    #[error(transparent)]
    Role(#[from] RoleError),
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rstest::rstest;

    use crate::role::{Role, RoleError};

    use super::{Selector, SelectorError, SelectorList, Subrole};

    #[rstest]
    #[case::all("all", Selector::All)]
    #[case::role("role-domain-lead", Selector::Role(Role::DomainLead))]
    #[case::super_admin("role-super-admin", Selector::Role(Role::SuperAdmin))]
    #[case::domain("domain-Mechanical", Selector::Domain("Mechanical".into()))]
    #[case::lead(
        "Mechanical-lead",
        Selector::DomainRole { domain: "Mechanical".into(), subrole: Subrole::Lead }
    )]
    #[case::member(
        "Web Dev-member",
        Selector::DomainRole { domain: "Web Dev".into(), subrole: Subrole::Member }
    )]
    #[case::email("ada@example.org", Selector::Email("ada@example.org".into()))]
    #[case::email_looking_like_domain(
        "domain-admin@example.org",
        Selector::Email("domain-admin@example.org".into())
    )]
    #[case::domain_prefix_wins("domain-ops-lead", Selector::Domain("ops-lead".into()))]
    fn parse_wire_strings(#[case] input: &str, #[case] expected: Selector) {
        let selector: Selector = input.parse().unwrap();
        assert_eq!(selector, expected);
        assert_eq!(selector.to_string(), input);
    }

    #[rstest]
    #[case("")]
    #[case("All")]
    #[case("everyone")]
    #[case("domain-")]
    #[case("-lead")]
    #[case("-member")]
    #[case("@example.org")]
    #[case("ada@")]
    fn reject_malformed(#[case] input: &str) {
        assert!(Selector::new(input).is_err());
    }

    #[test]
    fn unknown_role_is_malformed() {
        assert_matches!(
            Selector::new("role-owner"),
            Err(SelectorError::Role(RoleError::UnknownRole(role))) if role == "owner"
        );
    }

    #[test]
    fn list_keeps_rejected_entries() {
        let list = SelectorList::parse(["all", "role-owner", "Design-lead", "???"]);
        assert_eq!(list.len(), 4);
        assert_eq!(list.iter().count(), 2);
        assert_eq!(list.rejected(), &["role-owner".to_string(), "???".to_string()]);
        assert!(list.contains_all());
    }

    #[test]
    fn list_wire_format_is_preserved() {
        let json = r#"["role-admin","bogus","Design-member","bo@example.org"]"#;
        let list: SelectorList = serde_json::from_str(json).unwrap();
        assert_eq!(list.iter().count(), 3);
        assert_eq!(serde_json::to_string(&list).unwrap(), json);
    }

    #[test]
    fn empty_list() {
        let list: SelectorList = serde_json::from_str("[]").unwrap();
        assert!(list.is_empty());
        assert!(!list.contains_all());
    }

    #[test]
    fn list_from_selectors() {
        let list: SelectorList = [Selector::Role(Role::Member), Selector::All]
            .into_iter()
            .collect();
        assert_eq!(
            serde_json::to_string(&list).unwrap(),
            r#"["role-member","all"]"#
        );
    }
}
