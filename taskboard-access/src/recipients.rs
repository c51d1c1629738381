// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolve the email recipients of an announcement from its selectors.
//!
//! Uses the same matching rules as visibility checks. Neither the admin carve-out nor the
//! publication gate apply here: a `role-domain-lead` selector reaches leads only, and callers
//! decide themselves when an announcement is sent.
use std::collections::BTreeSet;

use tracing::debug;

use crate::principal::Principal;
use crate::resolver::{AccessResolver, Snapshot};
use crate::selector::{Selector, SelectorList};
use crate::traits::DomainDirectory;

impl AccessResolver {
    /// Lower-cased, de-duplicated addresses of every user matched by the selectors.
    ///
    /// Literal email selectors are included even when no user record carries the address. Users
    /// without an email address are skipped.
    pub fn resolve_recipients<'u, D>(
        &self,
        selectors: &SelectorList,
        users: impl IntoIterator<Item = &'u Principal>,
        snapshot: &Snapshot<'_, D>,
    ) -> BTreeSet<String>
    where
        D: DomainDirectory,
    {
        let mut recipients: BTreeSet<String> = selectors
            .iter()
            .filter_map(|selector| match selector {
                Selector::Email(email) => Some(email.to_ascii_lowercase()),
                _ => None,
            })
            .collect();

        if selectors.is_empty() {
            return recipients;
        }

        for user in users {
            if user.email.is_empty() {
                continue;
            }

            if self.matching_selector(user, selectors, snapshot).is_some() {
                recipients.insert(user.email.to_ascii_lowercase());
            }
        }

        debug!(count = recipients.len(), "resolved recipients");
        recipients
    }
}
