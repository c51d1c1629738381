// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

/// Name of the domain whose leads curate the documentation library.
pub const DEFAULT_DOCUMENTATION_DOMAIN: &str = "Documentation";

/// Which sources establish a principal's domain membership.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MembershipSource {
    /// Domain records first, falling back to the role and domain fields stored on the user.
    #[default]
    Union,

    /// Only the `leads` / `members` sets of domain records count.
    Authoritative,
}

impl MembershipSource {
    pub(crate) fn uses_denormalized(&self) -> bool {
        matches!(self, MembershipSource::Union)
    }
}

/// Configuration for an access resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Leads of this domain may manage documentation items.
    pub documentation_domain: String,

    /// How domain membership is established.
    pub membership: MembershipSource,

    /// Whether admins may create tasks. Admins may always edit and delete them.
    pub admins_create_tasks: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            documentation_domain: DEFAULT_DOCUMENTATION_DOMAIN.to_string(),
            membership: MembershipSource::default(),
            admins_create_tasks: false,
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documentation_domain(mut self, domain: impl Into<String>) -> Self {
        self.documentation_domain = domain.into();
        self
    }

    pub fn membership(mut self, source: MembershipSource) -> Self {
        self.membership = source;
        self
    }

    pub fn admins_create_tasks(mut self, allowed: bool) -> Self {
        self.admins_create_tasks = allowed;
        self
    }
}
