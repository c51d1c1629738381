// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.
//!
//! Principals are created with an email derived from their id, `L1` becomes `l1@example.org`.
use rstest::fixture;

use crate::domain::{DomainRecord, DomainRecords};
use crate::principal::Principal;
use crate::role::Role;
use crate::target::Timestamp;

/// Fixed "current time" used across tests.
pub const NOW: Timestamp = Timestamp::from_millis(1_700_000_000_000);

pub const HOUR: u64 = 60 * 60 * 1000;

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

pub fn email_of(id: &str) -> String {
    format!("{}@example.org", id.to_lowercase())
}

pub fn principal(id: &str, role: Role) -> Principal {
    Principal::new(id, email_of(id), role)
}

pub fn super_admin() -> Principal {
    principal("S1", Role::SuperAdmin)
}

pub fn admin() -> Principal {
    principal("A1", Role::Admin)
}

/// Domain lead known through the denormalized fields only.
pub fn lead(id: &str, domain: &str) -> Principal {
    principal(id, Role::DomainLead).with_domain(domain)
}

/// Domain member known through the denormalized fields only.
pub fn member(id: &str, domain: &str) -> Principal {
    principal(id, Role::Member).with_domain(domain)
}

#[fixture]
pub fn now() -> Timestamp {
    setup_logging();
    NOW
}

/// Records for `Mechanical`, `Design` and `Documentation`. `Electrical` deliberately has none.
#[fixture]
pub fn domain_records() -> DomainRecords {
    DomainRecords::from(vec![
        DomainRecord::new("Mechanical"),
        DomainRecord::new("Design")
            .with_lead(email_of("D1"))
            .with_member(email_of("D2")),
        DomainRecord::new("Documentation"),
    ])
}
