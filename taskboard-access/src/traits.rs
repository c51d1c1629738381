// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces the resolver consumes.
use crate::domain::DomainRecord;

/// Read access to a snapshot of all domain records.
///
/// Implementations are expected to represent one consistent snapshot. Callers must re-run any
/// access decision when the snapshot changes; the resolver cannot detect staleness.
pub trait DomainDirectory {
    /// Get the record of a domain by name.
    fn record(&self, domain: &str) -> Option<&DomainRecord>;

    /// Iterate over all known domain records.
    fn records(&self) -> impl Iterator<Item = &DomainRecord>;
}
