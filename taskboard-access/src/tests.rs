// SPDX-License-Identifier: MIT OR Apache-2.0

use rstest::rstest;

use crate::access::{Decision, Reason};
use crate::domain::{DomainRecord, DomainRecords};
use crate::principal::{Principal, UserRef};
use crate::resolver::{AccessResolver, Snapshot};
use crate::role::Role;
use crate::selector::SelectorList;
use crate::target::{
    Announcement, AnnouncementStatus, DocumentationItem, Target, Task, TaskStatus, Timestamp,
};
use crate::test_utils::{
    HOUR, admin, domain_records, lead, member, now, principal, super_admin,
};

fn every_principal() -> Vec<Principal> {
    let mut no_role = member("U9", "Mechanical");
    no_role.role = None;

    vec![
        super_admin(),
        admin(),
        lead("L1", "Mechanical"),
        member("U1", "Mechanical"),
        no_role,
        Principal::default(),
    ]
}

fn docs(selectors: &[&str]) -> DocumentationItem {
    DocumentationItem::file("doc", SelectorList::parse(selectors))
}

fn announcement(selectors: &[&str]) -> Announcement {
    Announcement::new(
        "news",
        SelectorList::parse(selectors),
        AnnouncementStatus::Published,
    )
}

#[rstest]
fn missing_principal_is_denied_everything(domain_records: DomainRecords, now: Timestamp) {
    let resolver = AccessResolver::default();
    let snapshot = Snapshot::new(&domain_records, now);

    let task = Task::new("t1", "Mechanical", TaskStatus::Assigned);
    let news = announcement(&["all"]);
    let item = docs(&["all"]);
    let targets = [
        Target::from(&task),
        Target::from(&news),
        Target::from(&item),
    ];

    for target in targets {
        assert!(!resolver.can_view(None, target, &snapshot));
        assert!(!resolver.can_manage(None, target, &snapshot));
    }
}

#[rstest]
#[case("")]
#[case("everyone")]
#[case("role-owner")]
#[case("domain-")]
#[case("-member")]
#[case("Role-admin")]
fn malformed_selectors_fail_closed(
    domain_records: DomainRecords,
    now: Timestamp,
    #[case] selector: &str,
) {
    let resolver = AccessResolver::default();
    let snapshot = Snapshot::new(&domain_records, now);

    // Super-admins bypass documentation selectors, so they are left out here.
    for principal in every_principal().iter().skip(1) {
        assert!(!resolver.can_view(Some(principal), &docs(&[selector]), &snapshot));

        // Only the admin carve-out of announcements grants access.
        let admin_override = principal.effective_role().is_admin();
        assert_eq!(
            resolver.can_view(Some(principal), &announcement(&[selector]), &snapshot),
            admin_override
        );
    }
}

#[rstest]
fn empty_selector_list_means_nobody(domain_records: DomainRecords, now: Timestamp) {
    let resolver = AccessResolver::default();
    let snapshot = Snapshot::new(&domain_records, now);

    let lead = lead("L1", "Mechanical");
    assert_eq!(
        resolver.explain_view(Some(&lead), &docs(&[]), &snapshot),
        Decision::Denied(Reason::NoSelectors)
    );
    assert!(!resolver.can_view(Some(&lead), &announcement(&[]), &snapshot));
    assert!(!resolver.can_view(Some(&admin()), &docs(&[]), &snapshot));
}

#[rstest]
fn all_short_circuits(domain_records: DomainRecords, now: Timestamp) {
    let resolver = AccessResolver::default();
    let snapshot = Snapshot::new(&domain_records, now);

    for principal in every_principal() {
        for selectors in [
            vec!["all"],
            vec!["role-super-admin", "all"],
            vec!["bogus", "domain-Electrical", "all"],
        ] {
            assert!(resolver.can_view(Some(&principal), &docs(&selectors), &snapshot));
            assert!(resolver.can_view(Some(&principal), &announcement(&selectors), &snapshot));
        }
    }
}

#[rstest]
fn domain_fallback_consistency(now: Timestamp) {
    let records = DomainRecords::from(vec![DomainRecord::new("D").with_lead("lead@example.org")]);
    let snapshot = Snapshot::new(&records, now);
    let resolver = AccessResolver::default();

    // Recorded as lead of D in the domain record only, no denormalized domain field.
    let principal = Principal::new("P1", "lead@example.org", Role::DomainLead);
    assert!(principal.domain.is_none());

    assert!(resolver.can_view(Some(&principal), &docs(&["D-lead"]), &snapshot));
    assert!(resolver.can_view(Some(&principal), &docs(&["domain-D"]), &snapshot));
    assert!(!resolver.can_view(Some(&principal), &docs(&["D-member"]), &snapshot));
}

#[rstest]
fn temporal_gate(domain_records: DomainRecords, now: Timestamp) {
    let resolver = AccessResolver::default();
    let snapshot = Snapshot::new(&domain_records, now);
    let scheduled = announcement(&["all"]).with_publish_at(now.add_millis(HOUR));

    assert_eq!(
        resolver.explain_view(Some(&member("U1", "Mechanical")), &scheduled, &snapshot),
        Decision::Denied(Reason::Scheduled(now.add_millis(HOUR)))
    );
    assert!(resolver.can_view(Some(&super_admin()), &scheduled, &snapshot));
    assert!(!resolver.can_view(Some(&lead("L1", "Mechanical")), &scheduled, &snapshot));

    // Once the publication time has passed everyone targeted sees it.
    let later = Snapshot::new(&domain_records, now.add_millis(2 * HOUR));
    assert!(resolver.can_view(Some(&member("U1", "Mechanical")), &scheduled, &later));
    assert!(resolver.can_view(Some(&lead("L1", "Mechanical")), &scheduled, &later));
}

#[rstest]
fn lead_awaiting_assignment(domain_records: DomainRecords, now: Timestamp) {
    let resolver = AccessResolver::default();
    let snapshot = Snapshot::new(&domain_records, now);
    let task = Task::new("t1", "Mechanical", TaskStatus::Unassigned).with_lead(UserRef::new("L1"));

    assert!(resolver.can_view(Some(&lead("L1", "Mechanical")), &task, &snapshot));
    assert_eq!(
        resolver.explain_view(Some(&lead("L2", "Mechanical")), &task, &snapshot),
        Decision::Denied(Reason::AwaitingAnotherLead)
    );

    // Once handed out, every lead of the domain sees it.
    let assigned = Task {
        status: TaskStatus::Assigned,
        ..task
    };
    assert!(resolver.can_view(Some(&lead("L2", "Mechanical")), &assigned, &snapshot));
}

#[rstest]
fn member_scoping(domain_records: DomainRecords, now: Timestamp) {
    let resolver = AccessResolver::default();
    let snapshot = Snapshot::new(&domain_records, now);
    let task =
        Task::new("t1", "Mechanical", TaskStatus::Assigned).with_assignee(UserRef::new("U1"));

    assert!(!resolver.can_view(Some(&principal("U2", Role::Member)), &task, &snapshot));
    assert!(resolver.can_view(Some(&principal("U1", Role::Member)), &task, &snapshot));
}

#[rstest]
fn missing_role_ignores_stored_domain(domain_records: DomainRecords, now: Timestamp) {
    let resolver = AccessResolver::default();
    let snapshot = Snapshot::new(&domain_records, now);
    let mut no_role = member("U9", "Mechanical").with_domains(["Design"]);
    no_role.role = None;

    for selectors in [["domain-Mechanical"], ["domain-Design"], ["Mechanical-member"]] {
        assert_eq!(
            resolver.explain_view(Some(&no_role), &docs(&selectors), &snapshot),
            Decision::Denied(Reason::NoSelectorMatched)
        );
        assert_eq!(
            resolver.explain_view(Some(&no_role), &announcement(&selectors), &snapshot),
            Decision::Denied(Reason::NoSelectorMatched)
        );
    }
}

#[rstest]
fn decisions_are_idempotent(domain_records: DomainRecords, now: Timestamp) {
    let resolver = AccessResolver::default();
    let snapshot = Snapshot::new(&domain_records, now);

    let task = Task::new("t1", "Mechanical", TaskStatus::Unassigned).with_lead(UserRef::new("L1"));
    let news = announcement(&["Mechanical-member", "role-admin"]);
    let item = docs(&["Design-lead"]);
    let targets = [
        Target::from(&task),
        Target::from(&news),
        Target::from(&item),
    ];

    for principal in every_principal() {
        for target in targets {
            let view = resolver.explain_view(Some(&principal), target, &snapshot);
            let manage = resolver.explain_manage(Some(&principal), target, &snapshot);
            assert_eq!(view, resolver.explain_view(Some(&principal), target, &snapshot));
            assert_eq!(manage, resolver.explain_manage(Some(&principal), target, &snapshot));
            assert_eq!(view.is_allowed(), resolver.can_view(Some(&principal), target, &snapshot));
        }
    }
}
